//! Encryption configuration.
//!
//! Algorithms are carried as their RFC 4880 numeric identifiers so a host
//! can pass them through unchanged. They are resolved against the OpenPGP
//! library only when a message is encrypted, which keeps construction
//! infallible.

use serde::{Deserialize, Serialize};

/// Compression algorithm: no compression (compressed-data packet still emitted)
pub const COMPRESSION_UNCOMPRESSED: u8 = 0;
/// Compression algorithm: ZIP (raw deflate)
pub const COMPRESSION_ZIP: u8 = 1;
/// Compression algorithm: ZLIB
pub const COMPRESSION_ZLIB: u8 = 2;
/// Compression algorithm: BZip2
pub const COMPRESSION_BZIP2: u8 = 3;

/// Symmetric algorithm: IDEA
pub const SYMMETRIC_IDEA: u8 = 1;
/// Symmetric algorithm: TripleDES
pub const SYMMETRIC_TRIPLE_DES: u8 = 2;
/// Symmetric algorithm: CAST5
pub const SYMMETRIC_CAST5: u8 = 3;
/// Symmetric algorithm: Blowfish
pub const SYMMETRIC_BLOWFISH: u8 = 4;
/// Symmetric algorithm: AES with 128-bit key
pub const SYMMETRIC_AES_128: u8 = 7;
/// Symmetric algorithm: AES with 192-bit key
pub const SYMMETRIC_AES_192: u8 = 8;
/// Symmetric algorithm: AES with 256-bit key
pub const SYMMETRIC_AES_256: u8 = 9;
/// Symmetric algorithm: Twofish
pub const SYMMETRIC_TWOFISH: u8 = 10;

/// Immutable settings for a [`PgpEncryptor`](crate::PgpEncryptor).
///
/// Every field is required when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionConfig {
    /// RFC 4880 compression algorithm identifier
    pub compression_algorithm: u8,
    /// RFC 4880 symmetric-key algorithm identifier
    pub symmetric_key_algorithm: u8,
    /// Wrap the output in ASCII armor
    pub armor: bool,
    /// Protect the encrypted data with a modification detection code
    pub with_integrity_check: bool,
}

impl EncryptionConfig {
    /// Creates a configuration from the four encryption settings.
    pub fn new(
        compression_algorithm: u8,
        symmetric_key_algorithm: u8,
        armor: bool,
        with_integrity_check: bool,
    ) -> Self {
        Self {
            compression_algorithm,
            symmetric_key_algorithm,
            armor,
            with_integrity_check,
        }
    }
}
