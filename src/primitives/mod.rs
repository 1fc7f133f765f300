//! Block cipher and MAC primitives (TDES/AES ECB/CBC, CBC-MAC, CMAC,
//! subkey derivation, constant-time compare).
//!
//! This is the capability layer the rest of the crate binds against; no
//! module outside `primitives` reaches into a specific cipher crate
//! directly.

pub mod aes;
pub mod des;
pub mod mac;
