//! Decrypt/verify pipeline (C5) and the public key-block context (C6).
//!
//! [`import`] is the sole entry point: it parses a TR-31 key block string,
//! and if a KBPK is supplied, verifies its authenticator and decrypts its
//! payload. The exact binding method and MAC/decrypt ordering is dispatched
//! by format version, per TR-31:2018 §5 and the original `tr31_crypto.c`
//! reference this module is grounded on:
//!
//! - Versions A/C (variant binding): decrypt first under a zero IV, then
//!   compute the CBC-MAC over the ASCII header and the *decrypted* payload.
//! - Versions B/D (derivation binding): compute the CMAC over the ASCII
//!   header and the *encrypted* payload first, verify it, then use the
//!   verified authenticator itself as the CBC IV to decrypt the payload.
//!
//! MAC verification always happens before the recovered key is surfaced to
//! the caller, and a mismatch is always reported as
//! [`Tr31Error::KeyBlockVerificationFailed`] regardless of which byte
//! diverged.

use crate::error::{Tr31Error, Tr31Result};
use crate::keyblock::tr31::header::KeyBlockHeader;
use crate::keyblock::tr31::key_version::KeyVersion;
use crate::keyblock::tr31::kbpk::{
    aes_derive_kbek_kbak, aes_kcv, tdes_derive_kbek_kbak, tdes_kcv, tdes_variant_kbek_kbak,
};
use crate::primitives::aes::{aes_cbc_decrypt, AES_BLOCK_LEN};
use crate::primitives::des::{tdes_cbc_decrypt, TDES_BLOCK_LEN};
use crate::primitives::mac::{aes_cmac, tdes_cbc_mac, tdes_cmac};
use crate::utils::constant_time_eq;
use tracing::{debug, instrument, trace, warn};
use zeroize::{Zeroize, Zeroizing};

/// A cryptographic key recovered from a TR-31 key block.
#[derive(Debug)]
pub struct Tr31Key {
    usage: String,
    algorithm: String,
    mode_of_use: String,
    key_version: KeyVersion,
    exportability: String,
    length: usize,
    data: Zeroizing<Vec<u8>>,
    kcv: Option<Vec<u8>>,
}

impl Tr31Key {
    /// Two-character key usage code (header bytes 5-6).
    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Single-character algorithm code (header byte 7).
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Single-character mode-of-use code (header byte 8).
    pub fn mode_of_use(&self) -> &str {
        &self.mode_of_use
    }

    /// Parsed key version field interpretation.
    pub fn key_version(&self) -> KeyVersion {
        self.key_version
    }

    /// Single-character exportability code (header byte 11).
    pub fn exportability(&self) -> &str {
        &self.exportability
    }

    /// Length of the recovered key in bytes. Zero if no KBPK was supplied.
    pub fn length(&self) -> usize {
        self.length
    }

    /// The recovered key bytes. Empty if no KBPK was supplied to `import`.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Key Check Value of the recovered key, if its algorithm supports one
    /// (TDES: 3 bytes, AES: 5 bytes). `None` for other algorithms or when
    /// no key was recovered.
    pub fn kcv(&self) -> Option<&[u8]> {
        self.kcv.as_deref()
    }

    /// Explicitly scrub the recovered key bytes and KCV, without waiting
    /// for `Drop`. Idempotent: safe to call more than once.
    pub fn zeroize(&mut self) {
        self.data.zeroize();
        self.length = 0;
        if let Some(mut kcv) = self.kcv.take() {
            kcv.zeroize();
        }
    }
}

/// A parsed and (if a KBPK was supplied) decrypted and verified TR-31 key
/// block.
#[derive(Debug)]
pub struct Tr31KeyBlock {
    version: char,
    length: usize,
    key: Tr31Key,
    opt_blocks: Vec<(u16, Vec<u8>)>,
    header: Vec<u8>,
    payload: Vec<u8>,
    authenticator: Vec<u8>,
}

impl Tr31KeyBlock {
    /// Format version: one of `A`, `B`, `C`, `D`.
    pub fn version(&self) -> char {
        self.version
    }

    /// Total length in bytes of the original ASCII key block.
    pub fn length(&self) -> usize {
        self.length
    }

    /// The recovered key and its attributes.
    pub fn key(&self) -> &Tr31Key {
        &self.key
    }

    /// Optional blocks in header order, excluding the terminal padding
    /// block (`PB`), which is structural and not exposed here.
    pub fn opt_blocks(&self) -> &[(u16, Vec<u8>)] {
        &self.opt_blocks
    }

    /// Raw ASCII header bytes, including any optional blocks and padding.
    pub fn header_bytes(&self) -> &[u8] {
        &self.header
    }

    /// Raw binary (encrypted) payload bytes, as carried in the key block.
    pub fn payload_bytes(&self) -> &[u8] {
        &self.payload
    }

    /// Raw binary authenticator bytes.
    pub fn authenticator_bytes(&self) -> &[u8] {
        &self.authenticator
    }

    /// Explicitly scrub the recovered key's secret material, without
    /// waiting for `Drop`. The retained header/payload/authenticator bytes
    /// are not secret and are left untouched. Idempotent.
    pub fn zeroize(&mut self) {
        self.key.zeroize();
    }
}

fn opt_block_id_to_u16(id: &str) -> u16 {
    let bytes = id.as_bytes();
    ((bytes[0] as u16) << 8) | bytes[1] as u16
}

/// Walk the optional-block chain, returning `(id, data)` pairs in order,
/// excluding a terminal `PB` block. Returns an error if `PB` appears
/// anywhere but last.
fn collect_opt_blocks(
    header: &KeyBlockHeader,
) -> Tr31Result<Vec<(u16, Vec<u8>)>> {
    let mut out = Vec::new();
    let Some(first) = header.opt_blocks().as_deref() else {
        return Ok(out);
    };

    let mut current = Some(first);
    while let Some(block) = current {
        let is_last = block.next().is_none();
        if block.id() == "PB" && !is_last {
            return Err(Tr31Error::InvalidOptionalBlockData(
                "padding block PB must be the last optional block".into(),
            ));
        }
        if block.id() != "PB" {
            out.push((opt_block_id_to_u16(block.id()), block.data().as_bytes().to_vec()));
        }
        current = block.next();
    }
    Ok(out)
}

/// Cipher block size, authenticator byte length, and a descriptive label
/// for each format version.
fn version_params(version: char) -> Tr31Result<(usize, usize)> {
    match version {
        'A' | 'C' => Ok((TDES_BLOCK_LEN, 4)),
        'B' => Ok((TDES_BLOCK_LEN, TDES_BLOCK_LEN)),
        'D' => Ok((AES_BLOCK_LEN, AES_BLOCK_LEN)),
        other => Err(Tr31Error::UnsupportedVersion(other.to_string())),
    }
}

fn decode_hex_field(s: &str, field: &str) -> Tr31Result<Vec<u8>> {
    if s.len() % 2 != 0 || !s.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)) {
        return Err(field_error(
            field,
            format!("'{}' is not an even-length uppercase hex string", s),
        ));
    }
    hex::decode(s).map_err(|e| field_error(field, e.to_string()))
}

fn field_error(field: &str, msg: String) -> Tr31Error {
    match field {
        "payload" => Tr31Error::InvalidPayloadField(msg),
        "authenticator" => Tr31Error::InvalidAuthenticatorField(msg),
        _ => Tr31Error::Internal(msg),
    }
}

/// Compute a Key Check Value for a recovered key, if its algorithm
/// supports one.
fn compute_kcv(algorithm: &str, key: &[u8]) -> Option<Vec<u8>> {
    if key.is_empty() {
        return None;
    }
    match algorithm {
        "T" => tdes_kcv(key).ok().map(|k| k.to_vec()),
        "A" => aes_kcv(key).ok().map(|k| k.to_vec()),
        _ => None,
    }
}

/// Extract the recovered key from a decrypted payload: a 2-byte big-endian
/// bit length, followed by the key bytes, followed by padding (discarded).
fn extract_key_from_payload(payload: &[u8]) -> Tr31Result<Vec<u8>> {
    if payload.len() < 2 {
        return Err(Tr31Error::InvalidKeyLength(
            "payload too short to contain a key length prefix".into(),
        ));
    }
    let bit_len = u16::from_be_bytes([payload[0], payload[1]]) as usize;
    if bit_len % 8 != 0 {
        return Err(Tr31Error::InvalidKeyLength(format!(
            "key length in bits ({}) is not a multiple of 8",
            bit_len
        )));
    }
    let byte_len = bit_len / 8;
    if byte_len > payload.len() - 2 {
        return Err(Tr31Error::InvalidKeyLength(format!(
            "key length {} exceeds available payload bytes {}",
            byte_len,
            payload.len() - 2
        )));
    }
    Ok(payload[2..2 + byte_len].to_vec())
}

/// Parse, and if `kbpk` is supplied, decrypt and verify a TR-31 key block.
///
/// If `kbpk` is `None`, the key block is parsed and structurally validated
/// but no MAC verification or decryption is performed; the returned key's
/// `data()` is empty and `length()` is zero.
#[instrument(skip(input, kbpk), fields(input_len = input.len(), kbpk_present = kbpk.is_some()))]
pub fn import(input: &str, kbpk: Option<&[u8]>) -> Tr31Result<Tr31KeyBlock> {
    trace!("importing key block");
    if input.len() < 16 || input.len() > 9999 {
        warn!(len = input.len(), "key block length outside [16, 9999]");
        return Err(Tr31Error::InvalidLength(format!(
            "total length {} outside [16, 9999]",
            input.len()
        )));
    }
    if !input.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(Tr31Error::InvalidLength(
            "key block must be pure ASCII alphanumeric".into(),
        ));
    }

    // The overall-length check (§4.4 validation order, item 1) must be
    // decided before any other header field is validated, so it is done
    // here directly against the raw length digits rather than after
    // `KeyBlockHeader::new_from_str` has already validated version,
    // usage, algorithm, mode, key version, and exportability.
    let declared_length: usize = input[1..5].parse().map_err(|_| {
        Tr31Error::InvalidLengthField("key block length is not decimal".into())
    })?;
    if declared_length != input.len() {
        return Err(Tr31Error::InvalidLengthField(format!(
            "header length field {} does not match input length {}",
            declared_length,
            input.len()
        )));
    }

    let header = KeyBlockHeader::new_from_str(input)?;

    let version = header
        .version_id()
        .chars()
        .next()
        .expect("version_id is a single validated character");
    debug!(
        version = %version,
        key_usage = header.key_usage(),
        num_opt_blocks = header.num_optional_blocks(),
        "header parsed"
    );
    let (block_size, auth_len) = version_params(version)?;

    let opt_blocks = collect_opt_blocks(&header)?;

    let header_len = header.len();
    if input.len() < header_len {
        return Err(Tr31Error::InvalidLengthField(
            "header length exceeds total key block length".into(),
        ));
    }
    let remainder = &input[header_len..];

    let auth_hex_len = auth_len * 2;
    if remainder.len() < auth_hex_len {
        return Err(Tr31Error::InvalidAuthenticatorField(
            "key block too short to contain the authenticator".into(),
        ));
    }
    let payload_hex_len = remainder.len() - auth_hex_len;
    let payload_hex = &remainder[..payload_hex_len];
    let auth_hex = &remainder[payload_hex_len..];

    let payload = decode_hex_field(payload_hex, "payload")?;
    let authenticator = decode_hex_field(auth_hex, "authenticator")?;

    if payload.is_empty() || payload.len() % block_size != 0 {
        return Err(Tr31Error::InvalidPayloadField(format!(
            "payload length {} is not a positive multiple of the cipher block size {}",
            payload.len(),
            block_size
        )));
    }
    if authenticator.len() != auth_len {
        return Err(Tr31Error::InvalidAuthenticatorField(format!(
            "expected {} authenticator bytes, got {}",
            auth_len,
            authenticator.len()
        )));
    }

    let header_ascii = input[..header_len].as_bytes();

    let (key_bytes, kcv) = match kbpk {
        None => (Vec::new(), None),
        Some(kbpk) => {
            let decrypted: Zeroizing<Vec<u8>> = match version {
                'A' | 'C' => {
                    let (kbek, kbak) = tdes_variant_kbek_kbak(kbpk)?;
                    let kbek = Zeroizing::new(kbek);
                    let kbak = Zeroizing::new(kbak);

                    let iv = [0u8; TDES_BLOCK_LEN];
                    let decrypted = Zeroizing::new(tdes_cbc_decrypt(&kbek, &iv, &payload)?);

                    let mut mac_input = header_ascii.to_vec();
                    mac_input.extend_from_slice(&decrypted);
                    let mac = tdes_cbc_mac(&kbak, &mac_input)?;
                    if !constant_time_eq(&mac[..auth_len], &authenticator) {
                        warn!(version = %version, "CBC-MAC authenticator mismatch");
                        return Err(Tr31Error::KeyBlockVerificationFailed);
                    }
                    decrypted
                }
                'B' => {
                    let (kbek, kbak) = tdes_derive_kbek_kbak(kbpk)?;
                    let kbek = Zeroizing::new(kbek);
                    let kbak = Zeroizing::new(kbak);

                    let mut mac_input = header_ascii.to_vec();
                    mac_input.extend_from_slice(&payload);
                    let mac = tdes_cmac(&kbak, &mac_input)?;
                    if !constant_time_eq(&mac, &authenticator) {
                        warn!(version = %version, "TDES-CMAC authenticator mismatch");
                        return Err(Tr31Error::KeyBlockVerificationFailed);
                    }

                    let iv: [u8; TDES_BLOCK_LEN] = authenticator
                        .clone()
                        .try_into()
                        .expect("authenticator length already validated against TDES_BLOCK_LEN");
                    Zeroizing::new(tdes_cbc_decrypt(&kbek, &iv, &payload)?)
                }
                'D' => {
                    let (kbek, kbak) = aes_derive_kbek_kbak(kbpk)?;
                    let kbek = Zeroizing::new(kbek);
                    let kbak = Zeroizing::new(kbak);

                    let mut mac_input = header_ascii.to_vec();
                    mac_input.extend_from_slice(&payload);
                    let mac = aes_cmac(&kbak, &mac_input)?;
                    if !constant_time_eq(&mac, &authenticator) {
                        warn!(version = %version, "AES-CMAC authenticator mismatch");
                        return Err(Tr31Error::KeyBlockVerificationFailed);
                    }

                    let iv: [u8; AES_BLOCK_LEN] = authenticator
                        .clone()
                        .try_into()
                        .expect("authenticator length already validated against AES_BLOCK_LEN");
                    Zeroizing::new(aes_cbc_decrypt(&kbek, &iv, &payload)?)
                }
                other => return Err(Tr31Error::UnsupportedVersion(other.to_string())),
            };

            let key_bytes = extract_key_from_payload(&decrypted)?;
            let kcv = compute_kcv(header.algorithm(), &key_bytes);
            (key_bytes, kcv)
        }
    };

    let key_len = key_bytes.len();
    let key = Tr31Key {
        usage: header.key_usage().to_string(),
        algorithm: header.algorithm().to_string(),
        mode_of_use: header.mode_of_use().to_string(),
        key_version: header.key_version(),
        exportability: header.exportability().to_string(),
        length: key_len,
        data: Zeroizing::new(key_bytes),
        kcv,
    };

    debug!(version = %version, key_len, "key block imported successfully");

    Ok(Tr31KeyBlock {
        version,
        length: input.len(),
        key,
        opt_blocks,
        header: header_ascii.to_vec(),
        payload,
        authenticator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::aes::aes_cbc_encrypt;
    use crate::primitives::des::tdes_cbc_encrypt;

    /// Build the plaintext payload layout: 2-byte bit-length prefix, key
    /// bytes, then zero padding to a block multiple.
    fn build_plaintext_payload(key: &[u8], block_size: usize) -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend_from_slice(&((key.len() * 8) as u16).to_be_bytes());
        payload.extend_from_slice(key);
        while payload.len() % block_size != 0 {
            payload.push(0);
        }
        payload
    }

    /// Assemble a version D key block ascii string the same way the
    /// pipeline verifies it, so the fixture and the code under test agree
    /// on every byte without depending on an external published vector.
    fn build_version_d_block(kbpk: &[u8], header_str: &str, key: &[u8]) -> String {
        let (kbek, kbak) = aes_derive_kbek_kbak(kbpk).unwrap();
        let plaintext = build_plaintext_payload(key, AES_BLOCK_LEN);

        let mut mac_input = header_str.as_bytes().to_vec();
        // The authenticator covers the *encrypted* payload; to build a
        // valid fixture we need the ciphertext before we know the MAC,
        // and the MAC before we know the IV. Derive both from a
        // deterministic zero IV pass: TR-31 test tooling normally
        // round-trips through tr31_wrap, but since this crate is
        // import-only we construct the fixture directly here instead.
        let zero_iv = [0u8; AES_BLOCK_LEN];
        let ciphertext = aes_cbc_encrypt(&kbek, &zero_iv, &plaintext).unwrap();
        mac_input.extend_from_slice(&ciphertext);
        let mac = aes_cmac(&kbak, &mac_input).unwrap();
        let iv: [u8; AES_BLOCK_LEN] = mac.clone().try_into().unwrap();
        let ciphertext = aes_cbc_encrypt(&kbek, &iv, &plaintext).unwrap();

        let mut mac_input = header_str.as_bytes().to_vec();
        mac_input.extend_from_slice(&ciphertext);
        let mac = aes_cmac(&kbak, &mac_input).unwrap();

        format!(
            "{}{}{}",
            header_str,
            hex::encode_upper(&ciphertext),
            hex::encode_upper(&mac)
        )
    }

    fn build_version_a_block(kbpk: &[u8], header_str: &str, key: &[u8]) -> String {
        let (kbek, kbak) = tdes_variant_kbek_kbak(kbpk).unwrap();
        let plaintext = build_plaintext_payload(key, TDES_BLOCK_LEN);
        let iv = [0u8; TDES_BLOCK_LEN];
        let ciphertext = tdes_cbc_encrypt(&kbek, &iv, &plaintext).unwrap();

        let mut mac_input = header_str.as_bytes().to_vec();
        mac_input.extend_from_slice(&plaintext);
        let mac = tdes_cbc_mac(&kbak, &mac_input).unwrap();

        format!(
            "{}{}{}",
            header_str,
            hex::encode_upper(&ciphertext),
            hex::encode_upper(&mac[..4])
        )
    }

    #[test]
    fn test_import_version_d_round_trip() {
        let kbpk =
            hex::decode("88E1AB2A2E3DD38C1FA039A536500CC8A87AB9D62DC92C01058FA79F44657DE6")
                .unwrap();
        let key = hex::decode("3F419E1CB7079442AA37474C2EFBF8B8").unwrap();

        // header: D, length placeholder, usage D0, algorithm A, mode B,
        // key version 00, exportability E, 0 opt blocks, reserved 00
        let mut header = KeyBlockHeader::new_with_values("D", "D0", "A", "B", "00", "E").unwrap();
        // payload plaintext is 2+16 = 18 bytes -> rounds up to 32 (2 AES blocks)
        // total length = 16 (header) + 32*2 (payload hex) + 16*2 (mac hex) = 112
        header.set_kb_length(16 + 64 + 32).unwrap();
        let header_str = header.export_str().unwrap();

        let block = build_version_d_block(&kbpk, &header_str, &key);
        assert_eq!(block.len(), 16 + 64 + 32);

        let imported = import(&block, Some(&kbpk)).unwrap();
        assert_eq!(imported.version(), 'D');
        assert_eq!(imported.key().data(), key.as_slice());
        assert_eq!(imported.key().usage(), "D0");
        assert_eq!(imported.key().algorithm(), "A");
        assert_eq!(imported.key().mode_of_use(), "B");
        assert_eq!(imported.key().exportability(), "E");
        assert!(imported.key().kcv().is_some());
    }

    #[test]
    fn test_import_version_d_tamper_fails() {
        let kbpk =
            hex::decode("88E1AB2A2E3DD38C1FA039A536500CC8A87AB9D62DC92C01058FA79F44657DE6")
                .unwrap();
        let key = hex::decode("3F419E1CB7079442AA37474C2EFBF8B8").unwrap();
        let mut header = KeyBlockHeader::new_with_values("D", "D0", "A", "B", "00", "E").unwrap();
        header.set_kb_length(16 + 64 + 32).unwrap();
        let header_str = header.export_str().unwrap();
        let mut block = build_version_d_block(&kbpk, &header_str, &key);

        // Flip the last hex character of the authenticator.
        let last = block.pop().unwrap();
        let flipped = if last == '0' { '1' } else { '0' };
        block.push(flipped);

        let result = import(&block, Some(&kbpk));
        assert_eq!(result.unwrap_err(), Tr31Error::KeyBlockVerificationFailed);
    }

    #[test]
    fn test_import_without_kbpk_skips_verification() {
        let kbpk =
            hex::decode("88E1AB2A2E3DD38C1FA039A536500CC8A87AB9D62DC92C01058FA79F44657DE6")
                .unwrap();
        let key = hex::decode("3F419E1CB7079442AA37474C2EFBF8B8").unwrap();
        let mut header = KeyBlockHeader::new_with_values("D", "D0", "A", "B", "00", "E").unwrap();
        header.set_kb_length(16 + 64 + 32).unwrap();
        let header_str = header.export_str().unwrap();
        let block = build_version_d_block(&kbpk, &header_str, &key);

        let imported = import(&block, None).unwrap();
        assert_eq!(imported.key().data(), &[] as &[u8]);
        assert_eq!(imported.key().length(), 0);
        assert_eq!(imported.key().usage(), "D0");
    }

    #[test]
    fn test_import_version_a_variant_binding_round_trip() {
        let kbpk = hex::decode("0123456789ABCDEFFEDCBA98765432100123456789ABCDE").unwrap();
        let key = hex::decode("0011223344556677").unwrap();

        let mut header = KeyBlockHeader::new_with_values("A", "K0", "T", "B", "00", "E").unwrap();
        // plaintext 2+8=10 -> rounds up to 16 (2 TDES blocks)
        // total = 16 + 16*2 + 4*2 = 16 + 32 + 8 = 56
        header.set_kb_length(16 + 32 + 8).unwrap();
        let header_str = header.export_str().unwrap();

        let block = build_version_a_block(&kbpk, &header_str, &key);
        assert_eq!(block.len(), 56);

        let imported = import(&block, Some(&kbpk)).unwrap();
        assert_eq!(imported.version(), 'A');
        assert_eq!(imported.key().data(), key.as_slice());
    }

    fn build_version_b_block(kbpk: &[u8], header_str: &str, key: &[u8]) -> String {
        let (kbek, kbak) = tdes_derive_kbek_kbak(kbpk).unwrap();
        let plaintext = build_plaintext_payload(key, TDES_BLOCK_LEN);

        let zero_iv = [0u8; TDES_BLOCK_LEN];
        let ciphertext = tdes_cbc_encrypt(&kbek, &zero_iv, &plaintext).unwrap();
        let mut mac_input = header_str.as_bytes().to_vec();
        mac_input.extend_from_slice(&ciphertext);
        let mac = tdes_cmac(&kbak, &mac_input).unwrap();
        let iv: [u8; TDES_BLOCK_LEN] = mac.clone().try_into().unwrap();
        let ciphertext = tdes_cbc_encrypt(&kbek, &iv, &plaintext).unwrap();

        let mut mac_input = header_str.as_bytes().to_vec();
        mac_input.extend_from_slice(&ciphertext);
        let mac = tdes_cmac(&kbak, &mac_input).unwrap();

        format!(
            "{}{}{}",
            header_str,
            hex::encode_upper(&ciphertext),
            hex::encode_upper(&mac)
        )
    }

    #[test]
    fn test_import_version_b_derivation_binding_round_trip() {
        let kbpk = hex::decode("89E88CF7931444F334BD7547FC3F380C0000000000000000").unwrap();
        let key = hex::decode("F039121BEC83D26B169BDCD5B22AAF8F").unwrap();

        let mut header = KeyBlockHeader::new_with_values("B", "K0", "T", "B", "00", "E").unwrap();
        // plaintext 2+16=18 -> rounds up to 24 (3 TDES blocks)
        // total = 16 + 24*2 + 8*2 = 16 + 48 + 16 = 80
        header.set_kb_length(16 + 48 + 16).unwrap();
        let header_str = header.export_str().unwrap();

        let block = build_version_b_block(&kbpk, &header_str, &key);
        assert_eq!(block.len(), 80);

        let imported = import(&block, Some(&kbpk)).unwrap();
        assert_eq!(imported.version(), 'B');
        assert_eq!(imported.key().data(), key.as_slice());
        assert_eq!(imported.key().key_version(), KeyVersion::Unused);
    }

    #[test]
    fn test_import_rejects_truncated_length_field() {
        let result = import("D0144", None);
        assert!(matches!(
            result,
            Err(Tr31Error::InvalidLength(_)) | Err(Tr31Error::InvalidLengthField(_))
        ));
        assert_ne!(result.unwrap_err(), Tr31Error::KeyBlockVerificationFailed);
    }

    #[test]
    fn test_import_rejects_length_field_mismatch() {
        let mut header = KeyBlockHeader::new_with_values("D", "D0", "A", "B", "00", "E").unwrap();
        header.set_kb_length(9999).unwrap();
        let header_str = header.export_str().unwrap();
        // pad out to the claimed length with hex-looking filler so the
        // length check itself (not a later hex-decode error) is exercised
        let mut block = header_str;
        while block.len() < 9999 {
            block.push('0');
        }
        block.truncate(100);
        let result = import(&block, None);
        assert!(matches!(result, Err(Tr31Error::InvalidLengthField(_))));
    }

    #[test]
    fn test_length_mismatch_takes_priority_over_later_field_errors() {
        // Version byte 'Z' is unsupported *and* the length field disagrees
        // with the physical buffer length; the length check must win per
        // the §4.4 validation order, not `UnsupportedVersion`.
        let mut block = "Z0048K0TB0000E00".to_string();
        block.push_str(&"0".repeat(32));
        // declared length (0048) does not match the actual buffer length.
        block.truncate(40);
        let result = import(&block, None);
        assert!(matches!(result, Err(Tr31Error::InvalidLengthField(_))));
    }

    #[test]
    fn test_key_zeroize_clears_secret_material() {
        let kbpk =
            hex::decode("88E1AB2A2E3DD38C1FA039A536500CC8A87AB9D62DC92C01058FA79F44657DE6")
                .unwrap();
        let key = hex::decode("3F419E1CB7079442AA37474C2EFBF8B8").unwrap();
        let mut header = KeyBlockHeader::new_with_values("D", "D0", "A", "B", "00", "E").unwrap();
        header.set_kb_length(16 + 64 + 32).unwrap();
        let header_str = header.export_str().unwrap();
        let block = build_version_d_block(&kbpk, &header_str, &key);

        let mut imported = import(&block, Some(&kbpk)).unwrap();
        assert_eq!(imported.key().data(), key.as_slice());

        imported.zeroize();
        assert_eq!(imported.key().data(), &[] as &[u8]);
        assert_eq!(imported.key().length(), 0);
        assert!(imported.key().kcv().is_none());
    }
}
