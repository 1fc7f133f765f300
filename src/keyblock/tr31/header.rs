//! TR-31 key block headers.
//!
//! The header is a fixed 16-byte ASCII prefix followed by an optional-block
//! chain. All fields use uppercase ASCII printable characters; lengths and
//! counts are plain decimal digits.
//!
//! # Fields (TR-31:2018, p. 15ff.)
//! - Byte 0: Key Block Version ID (1AN)
//! - Bytes 1-4: Key Block Length (4N)
//! - Bytes 5-6: Key Usage (2AN)
//! - Byte 7: Algorithm (1AN)
//! - Byte 8: Mode of Use (1AN)
//! - Bytes 9-10: Key Version Number (2AN)
//! - Byte 11: Exportability (1AN)
//! - Bytes 12-13: Number of Optional Blocks (2N)
//! - Bytes 14-15: Reserved (2 characters, accepted and preserved, not otherwise validated)
//! - Bytes 16+: Optional-block chain, if any

use crate::error::Tr31Error;
use crate::keyblock::tr31::constants::{
    ALLOWED_ALGORITHMS, ALLOWED_EXPORTABILITIES, ALLOWED_KEY_USAGES, ALLOWED_MODES_OF_USE,
    ALLOWED_VERSION_IDS,
};
use crate::keyblock::tr31::key_version::KeyVersion;
use crate::keyblock::tr31::opt_block::OptBlock;

/// The header of a TR-31 key block.
#[derive(Debug, PartialEq)]
pub struct KeyBlockHeader {
    version_id: String,
    kb_length: u16,
    key_usage: String,
    algorithm: String,
    mode_of_use: String,
    key_version: KeyVersion,
    exportability: String,
    num_opt_blocks: u8,
    reserved_field: String,
    opt_blocks: Option<Box<OptBlock>>,
}

impl KeyBlockHeader {
    /// Create a new, empty `KeyBlockHeader`.
    pub fn new_empty() -> Self {
        Self {
            version_id: String::new(),
            kb_length: 0,
            key_usage: String::new(),
            algorithm: String::new(),
            mode_of_use: String::new(),
            key_version: KeyVersion::Unused,
            exportability: String::new(),
            num_opt_blocks: 0,
            reserved_field: "00".to_string(),
            opt_blocks: None,
        }
    }

    /// Create a new `KeyBlockHeader` with the given field values.
    pub fn new_with_values(
        version_id: &str,
        key_usage: &str,
        algorithm: &str,
        mode_of_use: &str,
        key_version_field: &str,
        exportability: &str,
    ) -> Result<Self, Tr31Error> {
        let mut header = KeyBlockHeader::new_empty();
        header.set_version_id(version_id)?;
        header.set_key_usage(key_usage)?;
        header.set_algorithm(algorithm)?;
        header.set_mode_of_use(mode_of_use)?;
        header.set_key_version_field_str(key_version_field)?;
        header.set_exportability(exportability)?;
        Ok(header)
    }

    /// Parse a `KeyBlockHeader` from the ASCII header prefix of a key block string.
    ///
    /// Validation proceeds in header-field order so the first malformed
    /// field determines the reported error.
    pub fn new_from_str(header_str: &str) -> Result<Self, Tr31Error> {
        if header_str.len() < 16 {
            return Err(Tr31Error::InvalidLength(
                "header must be at least 16 characters".into(),
            ));
        }

        let version_id = &header_str[0..1];
        let kb_length = header_str[1..5]
            .parse::<u16>()
            .map_err(|_| Tr31Error::InvalidLengthField("key block length is not decimal".into()))?;
        let key_usage = &header_str[5..7];
        let algorithm = &header_str[7..8];
        let mode_of_use = &header_str[8..9];
        let key_version_field = &header_str[9..11];
        let exportability = &header_str[11..12];
        let num_optional_blocks = header_str[12..14].parse::<u8>().map_err(|_| {
            Tr31Error::InvalidNumberOfOptionalBlocksField(
                "number of optional blocks is not decimal".into(),
            )
        })?;
        let reserved_field = &header_str[14..16];

        let mut header = Self::new_empty();
        header.set_version_id(version_id)?;
        header.set_kb_length(kb_length)?;
        header.set_key_usage(key_usage)?;
        header.set_algorithm(algorithm)?;
        header.set_mode_of_use(mode_of_use)?;
        header.set_key_version_field_str(key_version_field)?;
        header.set_exportability(exportability)?;
        header.set_num_optional_blocks(num_optional_blocks)?;
        header.set_reserved_field(reserved_field)?;

        if num_optional_blocks > 0 {
            if header_str.len() < 20 {
                return Err(Tr31Error::InvalidOptionalBlockData(
                    "header too short to contain the declared optional blocks".into(),
                ));
            }
            let opt_block_str = &header_str[16..];
            let opt_block = OptBlock::new_from_str(opt_block_str, num_optional_blocks as usize)?;
            header.opt_blocks = Some(Box::new(opt_block));
        }

        Ok(header)
    }

    /// Export the header (including any optional blocks) as its ASCII string form.
    pub fn export_str(&self) -> Result<String, Tr31Error> {
        if self.version_id.is_empty()
            || self.key_usage.is_empty()
            || self.algorithm.is_empty()
            || self.mode_of_use.is_empty()
            || self.exportability.is_empty()
            || self.reserved_field.is_empty()
            || self.kb_length == 0
        {
            return Err(Tr31Error::InvalidLength(
                "export failed due to empty field(s) or zero length".into(),
            ));
        }

        let mut header_str = String::new();
        header_str.push_str(&self.version_id);
        header_str.push_str(&format!("{:04}", self.kb_length));
        header_str.push_str(&self.key_usage);
        header_str.push_str(&self.algorithm);
        header_str.push_str(&self.mode_of_use);
        header_str.push_str(&self.key_version.to_field_string());
        header_str.push_str(&self.exportability);
        header_str.push_str(&format!("{:02}", self.num_opt_blocks));
        header_str.push_str(&self.reserved_field);

        if let Some(ref opt_blocks) = self.opt_blocks {
            header_str.push_str(&opt_blocks.export_str()?);
        }

        Ok(header_str)
    }

    pub fn set_version_id(&mut self, value: &str) -> Result<(), Tr31Error> {
        if ALLOWED_VERSION_IDS.contains(&value) {
            self.version_id = value.to_string();
            Ok(())
        } else {
            Err(Tr31Error::UnsupportedVersion(value.to_string()))
        }
    }

    pub fn version_id(&self) -> &str {
        &self.version_id
    }

    pub fn set_kb_length(&mut self, value: u16) -> Result<(), Tr31Error> {
        if value > 9999 {
            Err(Tr31Error::InvalidLengthField(format!(
                "key block length {} exceeds 9999",
                value
            )))
        } else {
            self.kb_length = value;
            Ok(())
        }
    }

    pub fn kb_length(&self) -> u16 {
        self.kb_length
    }

    pub fn set_key_usage(&mut self, value: &str) -> Result<(), Tr31Error> {
        if ALLOWED_KEY_USAGES.contains(&value) {
            self.key_usage = value.to_string();
            Ok(())
        } else {
            Err(Tr31Error::UnsupportedKeyUsage(value.to_string()))
        }
    }

    pub fn key_usage(&self) -> &str {
        &self.key_usage
    }

    pub fn set_algorithm(&mut self, value: &str) -> Result<(), Tr31Error> {
        if ALLOWED_ALGORITHMS.contains(&value) {
            self.algorithm = value.to_string();
            Ok(())
        } else {
            Err(Tr31Error::UnsupportedAlgorithm(value.to_string()))
        }
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn set_mode_of_use(&mut self, value: &str) -> Result<(), Tr31Error> {
        if ALLOWED_MODES_OF_USE.contains(&value) {
            self.mode_of_use = value.to_string();
            Ok(())
        } else {
            Err(Tr31Error::UnsupportedModeOfUse(value.to_string()))
        }
    }

    pub fn mode_of_use(&self) -> &str {
        &self.mode_of_use
    }

    /// Set the key version field by parsing its two-character ASCII encoding.
    pub fn set_key_version_field_str(&mut self, value: &str) -> Result<(), Tr31Error> {
        self.key_version = KeyVersion::from_str(value)?;
        Ok(())
    }

    /// Set the key version field directly from its parsed interpretation.
    pub fn set_key_version(&mut self, value: KeyVersion) {
        self.key_version = value;
    }

    /// The parsed key version interpretation.
    pub fn key_version(&self) -> KeyVersion {
        self.key_version
    }

    /// The two-character ASCII encoding of the key version field.
    pub fn key_version_field_str(&self) -> String {
        self.key_version.to_field_string()
    }

    pub fn set_exportability(&mut self, value: &str) -> Result<(), Tr31Error> {
        if ALLOWED_EXPORTABILITIES.contains(&value) {
            self.exportability = value.to_string();
            Ok(())
        } else {
            Err(Tr31Error::UnsupportedExportability(value.to_string()))
        }
    }

    pub fn exportability(&self) -> &str {
        &self.exportability
    }

    pub fn set_num_optional_blocks(&mut self, value: u8) -> Result<(), Tr31Error> {
        if value > 99 {
            return Err(Tr31Error::InvalidNumberOfOptionalBlocksField(format!(
                "{} exceeds 99",
                value
            )));
        }
        self.num_opt_blocks = value;
        Ok(())
    }

    pub fn num_optional_blocks(&self) -> u8 {
        self.num_opt_blocks
    }

    /// Set the reserved field (header bytes 14-15).
    ///
    /// Any two ASCII characters are accepted and preserved; the field is
    /// conventionally `"00"` but this implementation does not reject other
    /// values, since the standard does not define their meaning.
    pub fn set_reserved_field(&mut self, value: &str) -> Result<(), Tr31Error> {
        if value.len() != 2 || !value.chars().all(|c| c.is_ascii()) {
            return Err(Tr31Error::InvalidLengthField(format!(
                "reserved field must be 2 ASCII characters: {}",
                value
            )));
        }
        self.reserved_field = value.to_string();
        Ok(())
    }

    pub fn reserved_field(&self) -> &str {
        &self.reserved_field
    }

    /// Set the optional-block chain, updating `num_opt_blocks` to match.
    pub fn set_opt_blocks(&mut self, opt_blocks: Option<Box<OptBlock>>) {
        self.opt_blocks = opt_blocks;
        self.num_opt_blocks = 0;
        if let Some(ref opt_block) = self.opt_blocks {
            let mut current: &OptBlock = opt_block.as_ref();
            self.num_opt_blocks = 1;
            while let Some(next) = current.next() {
                self.num_opt_blocks += 1;
                current = next;
            }
        }
    }

    /// Append a chain of `OptBlock`s to the end of the existing optional blocks.
    pub fn append_opt_blocks(&mut self, opt_block_to_append: OptBlock) {
        let mut additional = 1;
        let mut current = &opt_block_to_append;
        while let Some(next) = current.next() {
            additional += 1;
            current = next;
        }

        match &mut self.opt_blocks {
            Some(existing) => existing.append(opt_block_to_append),
            None => self.opt_blocks = Some(Box::new(opt_block_to_append)),
        }

        self.num_opt_blocks += additional;
    }

    pub fn opt_blocks(&self) -> &Option<Box<OptBlock>> {
        &self.opt_blocks
    }

    /// Total header length in bytes, including optional blocks.
    pub fn len(&self) -> usize {
        let mut header_length = 16;
        if let Some(ref opt_blocks) = self.opt_blocks {
            header_length += opt_blocks.total_length();
        }
        header_length
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pad the header with a trailing `PB` optional block, if needed, so its
    /// length becomes a multiple of the cipher block size (16 bytes for
    /// version D/AES, 8 bytes for versions A/B/C/TDES).
    pub fn finalize(&mut self) -> Result<(), Tr31Error> {
        let block_size = if self.version_id == "D" { 16 } else { 8 };
        let header_length = self.len();

        if let Some(ref mut opt_blocks) = self.opt_blocks {
            if header_length % block_size != 0 {
                let mut padding_needed = block_size - (header_length % block_size);
                if padding_needed < 6 {
                    padding_needed += block_size;
                }
                let padding_data_length = padding_needed - 4;
                let padding_data = "0".repeat(padding_data_length);
                let padding_block = OptBlock::new("PB", &padding_data, None)?;
                opt_blocks.append(padding_block);
                self.num_opt_blocks += 1;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_with_values_and_export() {
        let mut header = KeyBlockHeader::new_with_values("D", "P0", "A", "E", "00", "E").unwrap();
        let opt_block = OptBlock::new("CT", "SomeData", None).unwrap();
        header.set_opt_blocks(Some(Box::new(opt_block)));
        header.finalize().unwrap();
        let header_length = header.len();
        header.set_kb_length(header_length as u16).unwrap();
        let header_str = header.export_str().unwrap();
        let expected = "D0048P0AE00E0200CT12SomeDataPB200000000000000000";
        assert_eq!(header_str, expected);
    }

    #[test]
    fn test_new_from_str_round_trip() {
        let parsed = KeyBlockHeader::new_from_str(
            "D0048P0AE00E0200CT12SomeDataPB200000000000000000",
        )
        .unwrap();
        assert_eq!(parsed.version_id(), "D");
        assert_eq!(parsed.key_usage(), "P0");
        assert_eq!(parsed.key_version(), KeyVersion::Unused);
        assert_eq!(parsed.num_optional_blocks(), 2);
        assert_eq!(
            parsed.opt_blocks().as_ref().unwrap().id(),
            "CT"
        );
    }

    #[test]
    fn test_component_key_version() {
        let header = KeyBlockHeader::new_with_values("A", "K0", "T", "X", "c3", "N").unwrap();
        assert_eq!(header.key_version(), KeyVersion::Component(3));
        assert_eq!(header.key_version_field_str(), "c3");
    }

    #[test]
    fn test_unsupported_version() {
        assert!(matches!(
            KeyBlockHeader::new_with_values("Z", "P0", "A", "E", "00", "E"),
            Err(Tr31Error::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_too_short() {
        assert!(matches!(
            KeyBlockHeader::new_from_str("D0048P0A"),
            Err(Tr31Error::InvalidLength(_))
        ));
    }
}
