//! Public-key encryption of a plaintext payload into an OpenPGP message.
//!
//! The message is produced by a stack of writers, innermost first:
//! literal data, compression, encryption, optional ASCII armor, and the
//! caller's destination. Finalizing the innermost writer tears the stack
//! down in that order and flushes every layer. When a layer fails, the
//! remaining writers are dropped without finalizing and the destination
//! holds an incomplete message.

use crate::config::EncryptionConfig;
use crate::crypto::literal::{copy_bounded, literal_writer};
use crate::crypto::provider::provider;
use crate::error::Result;
use crate::keyring::{select_encryption_key, RecipientKey};
use crate::packet::LegacyEncryptor;
use sequoia_openpgp::armor;
use sequoia_openpgp::serialize::stream::{Armorer, Compressor, Encryptor2, Message, Recipient};
use sequoia_openpgp::types::{CompressionAlgorithm, SymmetricAlgorithm};
use std::io::{Read, Write};
use tracing::debug;

/// Encrypts payloads for the first usable key of a key source.
///
/// The configuration is fixed at construction. Each call is independent and
/// the encryptor holds no other state, so one instance can be shared across
/// threads.
///
/// # Examples
/// ```rust,no_run
/// use pgpseal::{EncryptionConfig, PgpEncryptor};
/// use pgpseal::config::{COMPRESSION_ZIP, SYMMETRIC_AES_256};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let encryptor = PgpEncryptor::new(EncryptionConfig::new(
///     COMPRESSION_ZIP,
///     SYMMETRIC_AES_256,
///     true,
///     true,
/// ));
/// let public_key = std::fs::File::open("recipient.asc")?;
/// let encrypted = encryptor.encrypt(b"hello world", public_key)?;
/// assert!(encrypted.starts_with(b"-----BEGIN PGP MESSAGE-----"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PgpEncryptor {
    config: EncryptionConfig,
}

impl PgpEncryptor {
    /// Creates an encryptor. Performs no I/O and cannot fail; algorithm
    /// identifiers are checked when a message is encrypted.
    pub fn new(config: EncryptionConfig) -> Self {
        Self { config }
    }

    /// Returns the encryptor's configuration
    pub fn config(&self) -> &EncryptionConfig {
        &self.config
    }

    /// Encrypts `plaintext` for the first usable key in `public_key` and
    /// returns the complete message.
    pub fn encrypt<K>(&self, plaintext: &[u8], public_key: K) -> Result<Vec<u8>>
    where
        K: Read + Send + Sync,
    {
        let mut encrypted = Vec::with_capacity(plaintext.len() + 1024);
        self.encrypt_stream(&mut encrypted, plaintext, plaintext.len() as u64, public_key)?;
        Ok(encrypted)
    }

    /// Encrypts at most `length` bytes of `source` into `destination`.
    ///
    /// `source` is consumed up to `length` bytes; anything after that is
    /// never read. `public_key` is read but not closed.
    ///
    /// # Errors
    /// Returns [`PgpError::Io`](crate::PgpError::Io) for read or write
    /// failures and [`PgpError::Crypto`](crate::PgpError::Crypto) for
    /// unusable key material, unsupported algorithm identifiers, or library
    /// failures. After an error the destination contents must be discarded.
    pub fn encrypt_stream<W, R, K>(
        &self,
        destination: &mut W,
        source: R,
        length: u64,
        public_key: K,
    ) -> Result<()>
    where
        W: Write + Send + Sync,
        R: Read,
        K: Read + Send + Sync,
    {
        let provider = provider();
        let symmetric = provider.symmetric_algorithm(self.config.symmetric_key_algorithm)?;
        let compression = provider.compression_algorithm(self.config.compression_algorithm)?;
        let recipient = select_encryption_key(public_key)?;

        let mut message = Message::new(destination);
        if self.config.armor {
            message = Armorer::new(message).kind(armor::Kind::Message).build()?;
        }

        let written = if self.config.with_integrity_check {
            encrypt_protected(message, &recipient, symmetric, compression, source, length)?
        } else {
            encrypt_legacy(message, &recipient, symmetric, compression, source, length)?
        };

        debug!(
            plaintext_bytes = written,
            symmetric = %symmetric,
            compression = %compression,
            armor = self.config.armor,
            integrity = self.config.with_integrity_check,
            "Encrypted message"
        );
        Ok(())
    }
}

/// Integrity-protected path: the whole stack is built by the library.
fn encrypt_protected<'a, R: Read>(
    message: Message<'a>,
    recipient: &'a RecipientKey,
    symmetric: SymmetricAlgorithm,
    compression: CompressionAlgorithm,
    source: R,
    length: u64,
) -> Result<u64> {
    let recipients = Some(Recipient::new(recipient.keyid(), recipient));
    let message = Encryptor2::for_recipients(message, recipients)
        .symmetric_algo(symmetric)
        .build()?;
    let message = Compressor::new(message).algo(compression).build()?;
    let mut literal = literal_writer(message)?;

    let written = copy_bounded(source, &mut literal, length)?;
    literal.finalize()?;
    Ok(written)
}

/// No-integrity path: the library's compression and literal layers write
/// into a legacy encrypted data packet, which streams into `message`.
fn encrypt_legacy<R: Read>(
    message: Message<'_>,
    recipient: &RecipientKey,
    symmetric: SymmetricAlgorithm,
    compression: CompressionAlgorithm,
    source: R,
    length: u64,
) -> Result<u64> {
    let mut sealed = LegacyEncryptor::new(message, recipient, symmetric)?;
    let written = {
        let compressed = Compressor::new(Message::new(&mut sealed))
            .algo(compression)
            .build()?;
        let mut literal = literal_writer(compressed)?;
        let written = copy_bounded(source, &mut literal, length)?;
        literal.finalize()?;
        written
    };

    sealed.finish()?.finalize()?;
    Ok(written)
}
