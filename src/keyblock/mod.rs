//! Key block formats.
//!
//! Currently only TR-31 (ASC X9 TR-31:2018, with legacy versions A/B/C) is
//! implemented.

pub mod tr31;
