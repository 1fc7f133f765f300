//! Error taxonomy for TR-31 key block import.
//!
//! Every structural or cryptographic failure that can occur while parsing
//! and verifying a key block surfaces as one of these variants. MAC
//! verification failure is always reported as [`Tr31Error::KeyBlockVerificationFailed`]
//! and must never be aliased to a more specific variant, since doing so
//! would give an attacker an oracle into *why* a forged key block failed.

use thiserror::Error;

/// Errors produced while importing a TR-31 key block.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum Tr31Error {
    #[error("ERROR TR-31: Invalid length: {0}")]
    InvalidLength(String),

    #[error("ERROR TR-31: Unsupported version: {0}")]
    UnsupportedVersion(String),

    #[error("ERROR TR-31: Invalid length field: {0}")]
    InvalidLengthField(String),

    #[error("ERROR TR-31: Unsupported key usage: {0}")]
    UnsupportedKeyUsage(String),

    #[error("ERROR TR-31: Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("ERROR TR-31: Unsupported mode of use: {0}")]
    UnsupportedModeOfUse(String),

    #[error("ERROR TR-31: Invalid key version field: {0}")]
    InvalidKeyVersionField(String),

    #[error("ERROR TR-31: Unsupported exportability: {0}")]
    UnsupportedExportability(String),

    #[error("ERROR TR-31: Invalid number of optional blocks field: {0}")]
    InvalidNumberOfOptionalBlocksField(String),

    #[error("ERROR TR-31 OPT BLOCK: {0}")]
    InvalidOptionalBlockData(String),

    #[error("ERROR TR-31: Invalid payload field: {0}")]
    InvalidPayloadField(String),

    #[error("ERROR TR-31: Invalid authenticator field: {0}")]
    InvalidAuthenticatorField(String),

    #[error("ERROR TR-31: Unsupported KBPK length: {0}")]
    UnsupportedKbpkLength(String),

    /// Reserved for the no-KBPK path; see DESIGN.md Open Question 2.
    #[error("ERROR TR-31: Invalid key length: {0}")]
    InvalidKeyLength(String),

    /// Always used for any MAC mismatch, regardless of cause.
    #[error("ERROR TR-31: Key block verification failed")]
    KeyBlockVerificationFailed,

    /// Underlying cipher provider failed in a way not otherwise classified.
    #[error("ERROR TR-31: Internal error: {0}")]
    Internal(String),
}

pub type Tr31Result<T> = Result<T, Tr31Error>;
