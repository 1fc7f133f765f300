//! TR-31 optional blocks.
//!
//! This module defines the `OptBlock` struct which represents an optional
//! block in a TR-31 key block header. In TR-31, optional blocks are used to
//! store additional, non-standard data within a key block. These blocks are
//! identified by unique identifiers and can be linked together to form a
//! chain of optional data segments.
//!
//! # Format
//!
//! An optional block consists of:
//! - An identifier (`id`): a two-character ASCII string identifying the type of data.
//! - A length field: two decimal-digit ASCII characters giving the total block length
//!   (id + length field + data), or `"00"` followed by an extended length field for
//!   blocks whose total length does not fit in two digits.
//! - A data field (`data`): a variable-length string of ASCII characters.
//!
//! # References
//!
//! TR-31: 2018, p. 17-18, 27-33.

use crate::error::Tr31Error;
use std::fmt::Write;

/// Represent an optional block as defined in the TR-31 specification.
///
/// Each `OptBlock` is identified by a two-character ASCII `id`, followed by a
/// length field indicating the total size of the block, and the `data`
/// itself. The `next` field allows chaining multiple `OptBlock`s to form the
/// full optional-block chain of a header.
#[derive(Debug, PartialEq, Clone)]
pub struct OptBlock {
    id: String,
    data: String,
    length: usize,
    next: Option<Box<OptBlock>>,
}

impl OptBlock {
    /// Create a new `OptBlock` instance with the specified `id`, `data`, and optional `next` block.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is not a recognized optional block id, or if
    /// `data` contains non-ASCII characters.
    pub fn new(id: &str, data: &str, next: Option<OptBlock>) -> Result<Self, Tr31Error> {
        let mut opt_block = Self::new_empty();
        opt_block.set_id(id)?;
        opt_block.set_data(data)?;
        opt_block.set_next(next);
        Ok(opt_block)
    }

    /// Create a new empty `OptBlock`.
    pub fn new_empty() -> Self {
        Self {
            id: String::new(),
            data: String::new(),
            length: 0,
            next: None,
        }
    }

    /// Construct a new `OptBlock` instance by parsing an input string.
    ///
    /// `num_opt_blocks` is the expected number of chained blocks to parse
    /// out of `s`, taken from the key block header's optional-block count
    /// field.
    ///
    /// # Errors
    ///
    /// Returns an error if the input string is too short, the length field
    /// is malformed, the id is unrecognized, or `set_data` fails.
    pub fn new_from_str(s: &str, num_opt_blocks: usize) -> Result<Self, Tr31Error> {
        if s.len() < 4 {
            return Err(Tr31Error::InvalidOptionalBlockData(
                "string too short, expected at least 4 characters".into(),
            ));
        }

        let mut opt_block = Self::new_empty();
        opt_block.set_id(&s[..2])?;

        let data_start_offset: usize;
        if &s[2..4] == "00" {
            if s.len() < 8 {
                return Err(Tr31Error::InvalidOptionalBlockData(
                    "string too short for extended length field".into(),
                ));
            }
            let len_of_len = Self::decimal_digits(&s[4..6])?;
            if s.len() < 6 + len_of_len {
                return Err(Tr31Error::InvalidOptionalBlockData(
                    "string too short for extended length digits".into(),
                ));
            }
            opt_block.length = Self::ext_len_from_str(&s[6..6 + len_of_len])?;
            data_start_offset = 6 + len_of_len;
        } else {
            opt_block.length = Self::len_from_str(&s[2..4])?;
            data_start_offset = 4;
        }

        if s.len() < opt_block.length {
            return Err(Tr31Error::InvalidOptionalBlockData(format!(
                "string too short for given length, expected at least {} characters",
                opt_block.length
            )));
        }

        opt_block.set_data(&s[data_start_offset..opt_block.length])?;

        if num_opt_blocks > 1 {
            let next_block_str = &s[opt_block.length..];
            let next_block = OptBlock::new_from_str(next_block_str, num_opt_blocks - 1)?;
            opt_block.set_next(Some(next_block));
        }

        Ok(opt_block)
    }

    /// Return a string representation of the `OptBlock` and its chained blocks.
    ///
    /// # Errors
    ///
    /// Returns an error if this `OptBlock` is uninitialized (`length < 4`).
    pub fn export_str(&self) -> Result<String, Tr31Error> {
        if self.length < 4 {
            return Err(Tr31Error::InvalidOptionalBlockData(
                "length must be at least 4, indicating an uninitialized OptBlock".into(),
            ));
        }

        let mut res = String::new();
        res.push_str(&self.id);

        if self.length < 100 {
            write!(&mut res, "{:02}", self.length)
                .map_err(|e| Tr31Error::Internal(e.to_string()))?;
        } else {
            let len_str = self.length.to_string();
            write!(&mut res, "00{:02}{}", len_str.len(), len_str)
                .map_err(|e| Tr31Error::Internal(e.to_string()))?;
        }

        res.push_str(&self.data);

        if let Some(next) = &self.next {
            res.push_str(&next.export_str()?);
        }

        Ok(res)
    }

    /// Set the identifier for this `OptBlock` instance.
    ///
    /// Unrecognized two-character ids are accepted: TR-31 reserves the
    /// remaining id space for proprietary use.
    pub fn set_id(&mut self, id: &str) -> Result<(), Tr31Error> {
        if id.len() != 2 || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Tr31Error::InvalidOptionalBlockData(format!(
                "invalid id: {}",
                id
            )));
        }
        self.id = id.to_string();
        Ok(())
    }

    /// Return the ID of the `OptBlock`
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Set the data field of the `OptBlock` instance and update its length.
    ///
    /// # Errors
    ///
    /// Returns an error if the id has not been set yet, or if `data`
    /// contains non-ASCII characters.
    pub fn set_data(&mut self, data: &str) -> Result<(), Tr31Error> {
        if self.id.len() != 2 {
            return Err(Tr31Error::InvalidOptionalBlockData(
                "id not set, must be set before data".into(),
            ));
        }
        if !data.chars().all(|c| c.is_ascii()) {
            return Err(Tr31Error::InvalidOptionalBlockData(format!(
                "data has non-ASCII characters: {}",
                data
            )));
        }
        self.data = data.to_string();
        self.set_length()?;
        Ok(())
    }

    /// Returns the data of the `OptBlock`
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Recompute `length` from the current `id` and `data`.
    ///
    /// If the minimal encoding (id + 2-digit length + data) would exceed 99
    /// bytes, the extended length form is used instead, adding a variable
    /// number of bytes for the length-of-length and length digits.
    fn set_length(&mut self) -> Result<(), Tr31Error> {
        let min_len = self.id.len() + 2 + self.data.len();
        if min_len < 100 {
            self.length = min_len;
        } else {
            // extended: id(2) + "00"(2) + len-of-len(2) + length digits + data
            let mut candidate = self.id.len() + 4 + self.data.len();
            loop {
                let digits = candidate.to_string().len();
                let total = self.id.len() + 4 + digits + self.data.len();
                if total == candidate {
                    break;
                }
                candidate = total;
            }
            self.length = candidate;
        }
        if self.length > 9999999 {
            self.length = 0;
            return Err(Tr31Error::InvalidOptionalBlockData(
                "block is too long to encode".into(),
            ));
        }
        Ok(())
    }

    /// Returns the total length of this `OptBlock`.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Set the next optional block in the chain.
    pub fn set_next(&mut self, next_block: Option<OptBlock>) {
        self.next = next_block.map(Box::new);
    }

    /// Return a reference to the next `OptBlock` instance in the chain, if any.
    pub fn next(&self) -> Option<&OptBlock> {
        self.next.as_deref()
    }

    /// Append an `OptBlock` to the end of the chain.
    pub fn append(&mut self, opt_block_to_append: OptBlock) {
        match &mut self.next {
            Some(next_block) => next_block.append(opt_block_to_append),
            None => self.set_next(Some(opt_block_to_append)),
        }
    }

    /// Returns the total length of this `OptBlock` plus all chained blocks.
    pub fn total_length(&self) -> usize {
        let mut total = self.length;
        if let Some(next) = &self.next {
            total += next.total_length();
        }
        total
    }

    /// Parse `s` as all-decimal digits.
    fn decimal_digits(s: &str) -> Result<usize, Tr31Error> {
        s.parse::<usize>().map_err(|_| {
            Tr31Error::InvalidOptionalBlockData(format!(
                "invalid length field: '{}' is not decimal",
                s
            ))
        })
    }

    /// Parse the short (two decimal-digit) length field.
    fn len_from_str(s: &str) -> Result<usize, Tr31Error> {
        if s.len() != 2 {
            return Err(Tr31Error::InvalidOptionalBlockData(format!(
                "invalid length field: expected 2 characters, found '{}'",
                s
            )));
        }
        let len = Self::decimal_digits(s)?;
        if len < 4 {
            return Err(Tr31Error::InvalidOptionalBlockData(format!(
                "invalid length field: value {} is too small (must be at least 4)",
                len
            )));
        }
        Ok(len)
    }

    /// Parse the extended length digits (already stripped of the
    /// length-of-length prefix).
    fn ext_len_from_str(s: &str) -> Result<usize, Tr31Error> {
        let res = Self::decimal_digits(s)?;
        if res < 100 {
            return Err(Tr31Error::InvalidOptionalBlockData(format!(
                "extended length is not greater than 99: {}",
                s
            )));
        }
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_export() {
        let block = OptBlock::new("CT", "112233", None).unwrap();
        assert_eq!(block.length(), 10);
        assert_eq!(block.export_str().unwrap(), "CT10112233");
    }

    #[test]
    fn test_new_from_str_short() {
        let block = OptBlock::new_from_str("CT1211223344", 1).unwrap();
        assert_eq!(block.id(), "CT");
        assert_eq!(block.data(), "11223344");
        assert_eq!(block.length(), 12);
    }

    #[test]
    fn test_new_from_str_chained() {
        let a = OptBlock::new("KS", "1234", None).unwrap();
        let mut b = OptBlock::new("CT", "AB", None).unwrap();
        b.append(a);
        let s = b.export_str().unwrap();
        let parsed = OptBlock::new_from_str(&s, 2).unwrap();
        assert_eq!(parsed.id(), "CT");
        assert_eq!(parsed.next().unwrap().id(), "KS");
    }

    #[test]
    fn test_extended_length_round_trip() {
        let data = "F".repeat(200);
        let block = OptBlock::new("KS", &data, None).unwrap();
        // id(2) + "00"(2) + len-of-len(2) + digits(3) + data(200) = 209
        assert_eq!(block.length(), 209);
        let exported = block.export_str().unwrap();
        assert!(exported.starts_with("KS00"));
        let parsed = OptBlock::new_from_str(&exported, 1).unwrap();
        assert_eq!(parsed.data(), data);
    }

    #[test]
    fn test_invalid_id() {
        // A 2-character alphanumeric id is always accepted (unknown ids
        // pass through as proprietary data); only malformed ids are
        // rejected.
        assert!(OptBlock::new("X", "data", None).is_err());
        assert!(OptBlock::new("X!", "data", None).is_err());
        assert!(OptBlock::new("XX", "data", None).is_ok());
    }

    #[test]
    fn test_string_too_short() {
        assert!(OptBlock::new_from_str("C", 1).is_err());
    }

    #[test]
    fn test_uninitialized_export() {
        let block = OptBlock::new_empty();
        assert!(block.export_str().is_err());
    }
}
