//! Error types for pgpseal operations.

use thiserror::Error;

/// Result type alias for pgpseal operations.
pub type Result<T> = std::result::Result<T, PgpError>;

/// Message reported when a key source yields no encryption-capable key.
pub const INVALID_PUBLIC_KEY: &str = "Invalid public key";

/// Main error type for pgpseal operations.
#[derive(Error, Debug)]
pub enum PgpError {
    /// Read or write failure on the plaintext source, the destination,
    /// or the key source
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Cryptographic operation errors: unusable key material, unsupported
    /// algorithm identifiers, or failures raised by the OpenPGP library
    #[error("Cryptographic error: {0}")]
    Crypto(String),
}

impl PgpError {
    /// Creates a new cryptographic error.
    pub fn crypto<T: ToString>(msg: T) -> Self {
        Self::Crypto(msg.to_string())
    }

    /// Creates the error reported when no usable recipient key exists.
    pub fn invalid_public_key() -> Self {
        Self::Crypto(INVALID_PUBLIC_KEY.to_string())
    }

    /// Returns true for cryptographic-operation failures.
    pub fn is_crypto(&self) -> bool {
        matches!(self, Self::Crypto(_))
    }

    /// Returns true if this error reports a missing or unusable recipient key.
    pub fn is_invalid_public_key(&self) -> bool {
        matches!(self, Self::Crypto(msg) if msg.starts_with(INVALID_PUBLIC_KEY))
    }
}

/// The OpenPGP library reports everything through `anyhow::Error`; I/O
/// failures are unwrapped so they reach the caller unchanged.
impl From<anyhow::Error> for PgpError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<std::io::Error>() {
            Ok(io) => Self::Io(io),
            Err(err) => Self::Crypto(format!("{:#}", err)),
        }
    }
}
