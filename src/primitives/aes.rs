//! AES block primitives: ECB and CBC, no padding.
//!
//! Thin wrappers over `soft-aes`, the AES provider already used throughout
//! this codebase (`src/pin/iso_9564/format_4.rs`). The wrappers exist to
//! give AES the same `Result<_, Tr31Error>` signature as the TDES side in
//! `primitives::des`, and to enforce the "no padding, exact block multiple"
//! contract uniformly across both ciphers.

use crate::error::Tr31Error;
use soft_aes::aes::{aes_dec_cbc, aes_dec_ecb, aes_enc_cbc, aes_enc_ecb};

pub const AES_BLOCK_LEN: usize = 16;

fn map_soft_aes_err(e: impl std::fmt::Display) -> Tr31Error {
    Tr31Error::Internal(format!("AES primitive failure: {}", e))
}

/// Encrypt a single 16-byte block under AES-ECB. Key must be 16, 24, or 32
/// bytes.
pub fn aes_ecb_encrypt(key: &[u8], pt: &[u8; AES_BLOCK_LEN]) -> Result<[u8; AES_BLOCK_LEN], Tr31Error> {
    let ct = aes_enc_ecb(pt, key, None).map_err(map_soft_aes_err)?;
    ct.try_into()
        .map_err(|_| Tr31Error::Internal("AES ECB output was not one block".into()))
}

/// Decrypt a single 16-byte block under AES-ECB.
pub fn aes_ecb_decrypt(key: &[u8], ct: &[u8; AES_BLOCK_LEN]) -> Result<[u8; AES_BLOCK_LEN], Tr31Error> {
    let pt = aes_dec_ecb(ct, key, None).map_err(map_soft_aes_err)?;
    pt.try_into()
        .map_err(|_| Tr31Error::Internal("AES ECB output was not one block".into()))
}

/// Encrypt `pt` under AES-CBC with the given 16-byte IV. `pt.len()` must be
/// a positive multiple of 16; no padding is added.
pub fn aes_cbc_encrypt(key: &[u8], iv: &[u8; AES_BLOCK_LEN], pt: &[u8]) -> Result<Vec<u8>, Tr31Error> {
    if pt.is_empty() || pt.len() % AES_BLOCK_LEN != 0 {
        return Err(Tr31Error::InvalidPayloadField(format!(
            "length must be a positive multiple of {}",
            AES_BLOCK_LEN
        )));
    }
    aes_enc_cbc(pt, key, iv, None).map_err(map_soft_aes_err)
}

/// Decrypt `ct` under AES-CBC with the given 16-byte IV. `ct.len()` must be
/// a positive multiple of 16; no padding is removed.
pub fn aes_cbc_decrypt(key: &[u8], iv: &[u8; AES_BLOCK_LEN], ct: &[u8]) -> Result<Vec<u8>, Tr31Error> {
    if ct.is_empty() || ct.len() % AES_BLOCK_LEN != 0 {
        return Err(Tr31Error::InvalidPayloadField(format!(
            "length must be a positive multiple of {}",
            AES_BLOCK_LEN
        )));
    }
    aes_dec_cbc(ct, key, iv, None).map_err(map_soft_aes_err)
}
