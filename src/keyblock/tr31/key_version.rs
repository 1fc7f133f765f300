use crate::error::Tr31Error;

/// Interpretation of the two-character Key Version Number field (header
/// bytes 9-10).
///
/// TR-31 overloads this field: it can be absent, a version number, or a
/// component number identifying one share of a multi-component key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyVersion {
    /// Field holds the literal `"00"`: the key version is not used.
    Unused,
    /// Field holds a two-digit key version number.
    Value(u8),
    /// Field holds `"c"` followed by a single digit: component number of a
    /// multi-component key.
    Component(u8),
}

impl KeyVersion {
    /// Parse the two-character key version field as it appears in a header.
    pub fn from_str(s: &str) -> Result<Self, Tr31Error> {
        if s.len() != 2 {
            return Err(Tr31Error::InvalidKeyVersionField(format!(
                "expected 2 characters, got {}",
                s.len()
            )));
        }
        if s == "00" {
            return Ok(KeyVersion::Unused);
        }
        let bytes = s.as_bytes();
        if bytes[0] == b'c' || bytes[0] == b'C' {
            let digit = (bytes[1] as char).to_digit(10).ok_or_else(|| {
                Tr31Error::InvalidKeyVersionField(format!(
                    "component number must be a single digit: {}",
                    s
                ))
            })?;
            return Ok(KeyVersion::Component(digit as u8));
        }
        let value = s.parse::<u8>().map_err(|_| {
            Tr31Error::InvalidKeyVersionField(format!("not a valid key version: {}", s))
        })?;
        Ok(KeyVersion::Value(value))
    }

    /// Render back to the two-character header field.
    pub fn to_field_string(self) -> String {
        match self {
            KeyVersion::Unused => "00".to_string(),
            KeyVersion::Value(v) => format!("{:02}", v),
            KeyVersion::Component(c) => format!("c{}", c),
        }
    }
}

impl Default for KeyVersion {
    fn default() -> Self {
        KeyVersion::Unused
    }
}
