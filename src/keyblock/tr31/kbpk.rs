//! Key Block Protection Key (KBPK) processing: derivation of the Key Block
//! Encryption Key (KBEK) and Key Block Authentication Key (KBAK) from the
//! KBPK, plus Key Check Value (KCV) computation.
//!
//! Two binding methods exist, one per pair of format versions:
//! - **Variant binding** (A, C): KBEK/KBAK are fixed XOR masks of the KBPK.
//! - **Derivation binding** (B, D): KBEK/KBAK are produced by a CMAC-based
//!   KDF in counter mode, keyed by the KBPK, over a fixed 8-byte template
//!   that differs by KBPK length and by which key (encryption/authentication)
//!   is being derived.
//!
//! The TDES derivation templates and AES derivation templates below are
//! taken verbatim from `tr31_crypto.c`'s `tr31_derive_kb{ek,ak}_*_input`
//! constants (TR-31:2018 §5.3.2.1 and §5.3.2.3).

use crate::error::Tr31Error;
use crate::primitives::des::TDES_BLOCK_LEN;
use crate::primitives::mac::{aes_cmac, tdes_cmac};
use crate::utils::xor_byte_arrays;

const KBEK_VARIANT_XOR: u8 = 0x45;
const KBAK_VARIANT_XOR: u8 = 0x4D;

/// Derive KBEK/KBAK from a TDES KBPK by the fixed-XOR variant method
/// (TR-31 versions A and C). KBPK must be 16 (2-key TDES) or 24 (3-key
/// TDES) bytes.
pub fn tdes_variant_kbek_kbak(kbpk: &[u8]) -> Result<(Vec<u8>, Vec<u8>), Tr31Error> {
    if kbpk.len() != 16 && kbpk.len() != 24 {
        return Err(Tr31Error::UnsupportedKbpkLength(format!(
            "TDES KBPK must be 16 or 24 bytes, got {}",
            kbpk.len()
        )));
    }
    let kbek_mask = vec![KBEK_VARIANT_XOR; kbpk.len()];
    let kbak_mask = vec![KBAK_VARIANT_XOR; kbpk.len()];
    let kbek = xor_byte_arrays(kbpk, &kbek_mask).map_err(Tr31Error::Internal)?;
    let kbak = xor_byte_arrays(kbpk, &kbak_mask).map_err(Tr31Error::Internal)?;
    Ok((kbek, kbak))
}

// TR-31:2018 table 1, TDES derivation binding (version B).
const TDES2_KBEK_TEMPLATE: [u8; 8] = [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80];
const TDES3_KBEK_TEMPLATE: [u8; 8] = [0x01, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0xC0];
const TDES2_KBAK_TEMPLATE: [u8; 8] = [0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x80];
const TDES3_KBAK_TEMPLATE: [u8; 8] = [0x01, 0x00, 0x01, 0x00, 0x00, 0x01, 0x00, 0xC0];

/// Derive N bytes (N = `kbpk.len()`) from `kbpk` by repeated TDES-CMAC over
/// `template`, incrementing the template's first byte (the counter) between
/// calls, truncating the final block if N is not a multiple of 8.
fn tdes_derive(kbpk: &[u8], template: [u8; 8], out_len: usize) -> Result<Vec<u8>, Tr31Error> {
    let mut out = Vec::with_capacity(out_len);
    let mut counter_input = template;
    while out.len() < out_len {
        let block = tdes_cmac(kbpk, &counter_input)?;
        out.extend_from_slice(&block);
        counter_input[0] += 1;
    }
    out.truncate(out_len);
    Ok(out)
}

/// Derive KBEK/KBAK from a TDES KBPK by the CMAC-based KDF (TR-31 version
/// B, TR-31:2018 §5.3.2.1). KBPK must be 16 or 24 bytes.
pub fn tdes_derive_kbek_kbak(kbpk: &[u8]) -> Result<(Vec<u8>, Vec<u8>), Tr31Error> {
    let (kbek_tpl, kbak_tpl) = match kbpk.len() {
        16 => (TDES2_KBEK_TEMPLATE, TDES2_KBAK_TEMPLATE),
        24 => (TDES3_KBEK_TEMPLATE, TDES3_KBAK_TEMPLATE),
        other => {
            return Err(Tr31Error::UnsupportedKbpkLength(format!(
                "TDES KBPK must be 16 or 24 bytes, got {}",
                other
            )))
        }
    };
    let kbek = tdes_derive(kbpk, kbek_tpl, kbpk.len())?;
    let kbak = tdes_derive(kbpk, kbak_tpl, kbpk.len())?;
    Ok((kbek, kbak))
}

// TR-31:2018 table 2, AES derivation binding (version D).
const AES128_KBEK_TEMPLATE: [u8; 8] = [0x01, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x80];
const AES192_KBEK_TEMPLATE: [u8; 8] = [0x01, 0x00, 0x00, 0x00, 0x00, 0x03, 0x00, 0xC0];
const AES256_KBEK_TEMPLATE: [u8; 8] = [0x01, 0x00, 0x00, 0x00, 0x00, 0x04, 0x01, 0x00];
const AES128_KBAK_TEMPLATE: [u8; 8] = [0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x00, 0x80];
const AES192_KBAK_TEMPLATE: [u8; 8] = [0x01, 0x00, 0x01, 0x00, 0x00, 0x03, 0x00, 0xC0];
const AES256_KBAK_TEMPLATE: [u8; 8] = [0x01, 0x00, 0x01, 0x00, 0x00, 0x04, 0x01, 0x00];

/// Derive N bytes from `kbpk` by repeated AES-CMAC over `template`,
/// incrementing the counter byte between calls.
fn aes_derive(kbpk: &[u8], template: [u8; 8], out_len: usize) -> Result<Vec<u8>, Tr31Error> {
    let mut out = Vec::with_capacity(out_len);
    let mut counter_input = template;
    while out.len() < out_len {
        let block = aes_cmac(kbpk, &counter_input)?;
        out.extend_from_slice(&block);
        counter_input[0] += 1;
    }
    out.truncate(out_len);
    Ok(out)
}

/// Derive KBEK/KBAK from an AES KBPK by the CMAC-based KDF (TR-31 version
/// D, TR-31:2018 §5.3.2.3). KBPK must be 16, 24, or 32 bytes.
pub fn aes_derive_kbek_kbak(kbpk: &[u8]) -> Result<(Vec<u8>, Vec<u8>), Tr31Error> {
    let (kbek_tpl, kbak_tpl) = match kbpk.len() {
        16 => (AES128_KBEK_TEMPLATE, AES128_KBAK_TEMPLATE),
        24 => (AES192_KBEK_TEMPLATE, AES192_KBAK_TEMPLATE),
        32 => (AES256_KBEK_TEMPLATE, AES256_KBAK_TEMPLATE),
        other => {
            return Err(Tr31Error::UnsupportedKbpkLength(format!(
                "AES KBPK must be 16, 24, or 32 bytes, got {}",
                other
            )))
        }
    };
    let kbek = aes_derive(kbpk, kbek_tpl, kbpk.len())?;
    let kbak = aes_derive(kbpk, kbak_tpl, kbpk.len())?;
    Ok((kbek, kbak))
}

/// TDES KCV: first 3 bytes of TDES-ECB(key, 0^8) (ANSI X9.24-1:2017 A.2
/// legacy approach).
pub fn tdes_kcv(key: &[u8]) -> Result<[u8; 3], Tr31Error> {
    let zero = [0u8; TDES_BLOCK_LEN];
    let ct = crate::primitives::des::tdes_ecb_encrypt(key, &zero)?;
    Ok([ct[0], ct[1], ct[2]])
}

/// AES KCV: first 5 bytes of AES-CMAC(key, 0^16).
pub fn aes_kcv(key: &[u8]) -> Result<[u8; 5], Tr31Error> {
    let zero = [0u8; crate::primitives::aes::AES_BLOCK_LEN];
    let mac = aes_cmac(key, &zero)?;
    Ok([mac[0], mac[1], mac[2], mac[3], mac[4]])
}
