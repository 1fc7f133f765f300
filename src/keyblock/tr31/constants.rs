/// Predefined allowed version IDs for the key block.
///
/// Each version ID corresponds to a different method of cryptographic protection and layout of the key block:
/// - `A` (0x41): Key block protected using the TDEA Key Variant Binding Method (TR-31:2005).
///   This version is deprecated and should not be used in new applications.
/// - `B` (0x42): Key block protected using the TDEA Key Derivation Binding Method (TR-31:2010).
///   Version B is preferred over version A/C for TDEA implementations.
/// - `C` (0x43): Key block protected using the TDEA Key Variant Binding Method (TR-31:2010).
/// - `D` (0x44): Key block protected using the AES Key Derivation Binding Method (TR-31:2018).
///
/// Note: Numeric key block Version IDs are reserved for proprietary key block definitions.
///       Multiple key block versions may be in use at any time.
///       It is not recommended that Version 'B' or 'C' blocks be converted to version 'A' blocks.
pub const ALLOWED_VERSION_IDS: [&str; 4] = ["A", "B", "C", "D"];

/// Predefined allowed key usages for the key block.
///
/// Key usage defines the type of the key and its intended function, whether it's used for encrypting data,
/// calculating a MAC, etc. The key usage is identified by bytes 5 and 6 in the key block header.
///
/// # Defined Key Usage Values (TR-31: 2018, p. 20-21)
///
/// - `B0`: BDK Base Derivation Key - Used to derive the Initial DUKPT Key in DUKPT process.
/// - `B1`: Initial DUKPT Key - Sent to a PIN Entry Device as the initial key in a DUKPT key management scheme.
/// - `B2`: Base Key Variant Key - Used to create key variants from the Base Key Variant.
/// - `C0`: CVK Card Verification Key - Used to compute or verify card verification codes (e.g., CVV, CVC).
/// - `D0`: Symmetric Key for Data Encryption - Used for encrypting data.
/// - `D1`: Asymmetric Key for Data Encryption - Used for encrypting data with asymmetric algorithms.
/// - `D2`: Data Encryption Key for Decimalization Table - Used in specific data encryption scenarios.
/// - `E0`: EMV/chip Issuer Master Keys - Application cryptograms.
/// - `E1`: EMV/chip Issuer Master Keys - Secure Messaging for Confidentiality.
/// - `E2`: EMV/chip Issuer Master Keys - Secure Messaging for Integrity.
/// - `E3`: EMV/chip Issuer Master Keys - Data Authentication Code.
/// - `E4`: EMV/chip Issuer Master Keys - Dynamic Numbers.
/// - `E5`: EMV/chip Issuer Master Keys - Card Personalization.
/// - `E6`: EMV/chip Issuer Master Keys - Other.
/// - `I0`: Initialization Vector.
/// - `K0`: Key Encryption or Wrapping - Used for key encryption or wrapping operations.
/// - `K1`: TR-31 Key Block Protection Key - Used specifically in TR-31 key block protection.
/// - `K2`: TR-34 Asymmetric key - Used for TR-34 related asymmetric cryptographic operations.
/// - `K3`: Asymmetric Key for Key Agreement/Key Wrapping - Used in key agreement or wrapping using asymmetric cryptography.
/// - `M0`: ISO 16609 MAC algorithm 1 (using TDEA).
/// - `M1`: ISO 9797-1 MAC Algorithm 1
/// - `M2`: ISO 9797-1 MAC Algorithm 2
/// - `M3`: ISO 9797-1 MAC Algorithm 3
/// - `M4`: ISO 9797-1 MAC Algorithm 4
/// - `M5`: ISO 9797-1:1999 MAC Algorithm 5
/// - `M6`: ISO 9797-1:2011 MAC Algorithm 5/CMAC
/// - `M7`: HMAC
/// - `M8`: ISO 9797-1:2011 MAC Algorithm 6
/// - `P0`: PIN Encryption - Used for encrypting PIN data.
/// - `S0`: Asymmetric Key Pair for Digital Signature - Used for digital signing operations.
///
/// Note: Numeric values are reserved for proprietary use and not implemented here.
pub const ALLOWED_KEY_USAGES: [&str; 29] = [
    "B0", "B1", "B2", "C0", "D0", "D1", "D2", "E0", "E1", "E2", "E3", "E4", "E5", "E6", "K0", "K1",
    "K2", "K3", "M0", "M1", "M2", "M3", "M4", "M5", "M6", "M7", "M8", "P0", "S0",
];

/// Predefined allowed algorithms for the key block.
///
/// The algorithm byte in the key block header defines the cryptographic algorithm that can be used with the key.
/// It is identified by byte 7 in the key block header.
///
/// - `A`: AES.
/// - `D`: DEA, included for backward compatibility.
/// - `E`: Elliptic Curve.
/// - `H`: HMAC-SHA1.
/// - `R`: RSA.
/// - `S`: DSA.
/// - `T`: TDEA (Triple DES).
pub const ALLOWED_ALGORITHMS: [&str; 7] = ["A", "D", "E", "H", "R", "S", "T"];

/// Predefined allowed modes of use for the key block, byte 8 of the header.
///
/// - `B`: Encrypt & Decrypt / Wrap & Unwrap.
/// - `C`: MAC Calculate (Generate & Verify).
/// - `D`: Decrypt / Unwrap Only.
/// - `E`: Encrypt / Wrap Only.
/// - `G`: MAC Generate Only.
/// - `N`: No special restrictions beyond Key Usage.
/// - `S`: Signature Only.
/// - `V`: MAC Verify Only.
/// - `X`: Key Derivation.
/// - `Y`: Create Key Variants.
pub const ALLOWED_MODES_OF_USE: [&str; 10] =
    ["B", "C", "D", "E", "G", "N", "S", "V", "X", "Y"];

/// Predefined allowed exportabilities for the key block, byte 11 of the header.
///
/// - `E`: Exportable under a KEK meeting ANSI X9.24 Parts 1 or 2.
/// - `N`: Not exportable.
/// - `S`: Sensitive; exportable under a KEK not necessarily meeting X9.24.
pub const ALLOWED_EXPORTABILITIES: [&str; 3] = ["E", "N", "S"];

/// Defined optional block IDs (TR-31:2018, A.5.6, table 11), for reference:
///
/// - `CT`: Public key certificate.
/// - `HM`: Hash algorithm for HMAC.
/// - `IK`: Initial Key Identifier for an Initial DUKPT Key.
/// - `KC`: Key Check Value of the wrapped key.
/// - `KP`: Key Check Value of the KBPK.
/// - `KS`: Key Set Identifier.
/// - `KV`: Key Block Values.
/// - `PB`: Padding Block, always last, fills to a block-length multiple.
/// - `TS`: Time Stamp the key block was formed.
///
/// Unrecognized two-character IDs are not rejected: TR-31 reserves the
/// remaining alphanumeric id space for proprietary use, so an optional
/// block with an unknown id is preserved as opaque data rather than
/// treated as a parse error. There is deliberately no allow-list constant
/// here: unlike the header fields above, optional block IDs are never
/// validated against a fixed set.
