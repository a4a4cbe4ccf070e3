//! OpenPGP packets the library does not emit itself.
//!
//! - [`legacy`]: streaming writer for Symmetrically Encrypted Data packets

pub mod legacy;

pub use legacy::LegacyEncryptor;
