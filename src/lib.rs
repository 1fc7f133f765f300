//! Import, parse, and cryptographically verify ASC X9 TR-31 key blocks
//! (versions A, B, C, D).
//!
//! ```
//! // A key block string and its protection key (KBPK); see
//! // `keyblock::tr31::import` for the full decrypt/verify pipeline.
//! let kbpk = hex::decode("88E1AB2A2E3DD38C1FA039A536500CC8A87AB9D62DC92C01058FA79F44657DE6")
//!     .unwrap();
//! // `import` returns a structural/cryptographic error for malformed input;
//! // a real key block string is required for a successful import.
//! assert!(tr31::import("not a key block", Some(&kbpk)).is_err());
//! ```

pub mod error;
pub mod keyblock;
pub mod primitives;
mod utils;

pub use error::{Tr31Error, Tr31Result};
pub use keyblock::tr31::{import, Tr31Key, Tr31KeyBlock};
