//! TDES (2-key and 3-key Triple DES) block primitives: ECB and CBC, no
//! padding.
//!
//! The `soft-aes` crate the rest of this codebase depends on has no TDES
//! support, so the raw block cipher comes from the `des` crate instead.
//! CBC chaining is built by hand out of repeated ECB-block calls rather than
//! via the `cbc` crate, the same way `soft-aes` builds its own CBC mode and
//! the original TR-31 reference implementation builds CBC out of
//! block-level primitives.

use crate::error::Tr31Error;
use cipher::generic_array::GenericArray;
use cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use des::{TdesEde2, TdesEde3};

pub const TDES_BLOCK_LEN: usize = 8;

fn encrypt_block(key: &[u8], block: &[u8; TDES_BLOCK_LEN]) -> Result<[u8; TDES_BLOCK_LEN], Tr31Error> {
    let mut buf = *block;
    let ga = GenericArray::from_mut_slice(&mut buf);
    match key.len() {
        16 => {
            let cipher = TdesEde2::new_from_slice(key)
                .map_err(|e| Tr31Error::Internal(format!("TDES key error: {}", e)))?;
            cipher.encrypt_block(ga);
        }
        24 => {
            let cipher = TdesEde3::new_from_slice(key)
                .map_err(|e| Tr31Error::Internal(format!("TDES key error: {}", e)))?;
            cipher.encrypt_block(ga);
        }
        other => {
            return Err(Tr31Error::UnsupportedKbpkLength(format!(
                "TDES key must be 16 or 24 bytes, got {}",
                other
            )))
        }
    }
    Ok(buf)
}

fn decrypt_block(key: &[u8], block: &[u8; TDES_BLOCK_LEN]) -> Result<[u8; TDES_BLOCK_LEN], Tr31Error> {
    let mut buf = *block;
    let ga = GenericArray::from_mut_slice(&mut buf);
    match key.len() {
        16 => {
            let cipher = TdesEde2::new_from_slice(key)
                .map_err(|e| Tr31Error::Internal(format!("TDES key error: {}", e)))?;
            cipher.decrypt_block(ga);
        }
        24 => {
            let cipher = TdesEde3::new_from_slice(key)
                .map_err(|e| Tr31Error::Internal(format!("TDES key error: {}", e)))?;
            cipher.decrypt_block(ga);
        }
        other => {
            return Err(Tr31Error::UnsupportedKbpkLength(format!(
                "TDES key must be 16 or 24 bytes, got {}",
                other
            )))
        }
    }
    Ok(buf)
}

/// Encrypt a single 8-byte block under TDES-ECB. Key must be 16 (2-key) or
/// 24 (3-key) bytes.
pub fn tdes_ecb_encrypt(key: &[u8], pt: &[u8; TDES_BLOCK_LEN]) -> Result<[u8; TDES_BLOCK_LEN], Tr31Error> {
    encrypt_block(key, pt)
}

/// Decrypt a single 8-byte block under TDES-ECB.
pub fn tdes_ecb_decrypt(key: &[u8], ct: &[u8; TDES_BLOCK_LEN]) -> Result<[u8; TDES_BLOCK_LEN], Tr31Error> {
    decrypt_block(key, ct)
}

/// Encrypt `pt` under TDES-CBC with the given 8-byte IV. `pt.len()` must be
/// a positive multiple of 8; no padding is added.
pub fn tdes_cbc_encrypt(key: &[u8], iv: &[u8; TDES_BLOCK_LEN], pt: &[u8]) -> Result<Vec<u8>, Tr31Error> {
    if pt.is_empty() || pt.len() % TDES_BLOCK_LEN != 0 {
        return Err(Tr31Error::InvalidPayloadField(format!(
            "length must be a positive multiple of {}",
            TDES_BLOCK_LEN
        )));
    }

    let mut out = Vec::with_capacity(pt.len());
    let mut chain = *iv;
    for block in pt.chunks_exact(TDES_BLOCK_LEN) {
        let mut xored = [0u8; TDES_BLOCK_LEN];
        for i in 0..TDES_BLOCK_LEN {
            xored[i] = block[i] ^ chain[i];
        }
        let ct_block = encrypt_block(key, &xored)?;
        out.extend_from_slice(&ct_block);
        chain = ct_block;
    }
    Ok(out)
}

/// Decrypt `ct` under TDES-CBC with the given 8-byte IV. `ct.len()` must be
/// a positive multiple of 8; no padding is removed.
pub fn tdes_cbc_decrypt(key: &[u8], iv: &[u8; TDES_BLOCK_LEN], ct: &[u8]) -> Result<Vec<u8>, Tr31Error> {
    if ct.is_empty() || ct.len() % TDES_BLOCK_LEN != 0 {
        return Err(Tr31Error::InvalidPayloadField(format!(
            "length must be a positive multiple of {}",
            TDES_BLOCK_LEN
        )));
    }

    let mut out = Vec::with_capacity(ct.len());
    let mut chain = *iv;
    for block in ct.chunks_exact(TDES_BLOCK_LEN) {
        let mut ct_block = [0u8; TDES_BLOCK_LEN];
        ct_block.copy_from_slice(block);
        let pt_block = decrypt_block(key, &ct_block)?;
        for i in 0..TDES_BLOCK_LEN {
            out.push(pt_block[i] ^ chain[i]);
        }
        chain = ct_block;
    }
    Ok(out)
}
