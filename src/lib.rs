//! # pgpseal - OpenPGP public-key encryption
//!
//! Encrypts an in-memory or streamed payload into an OpenPGP message for
//! the first encryption-capable key found in a key-ring source. Packet
//! composition, public-key encryption, compression and armor come from
//! [`sequoia-openpgp`](https://sequoia-pgp.org).
//!
//! A message is assembled as a stack of writers:
//!
//! ```text
//! literal data -> compression -> encryption -> [ASCII armor] -> destination
//! ```
//!
//! ## Configuration
//!
//! [`EncryptionConfig`] carries RFC 4880 algorithm identifiers, the armor
//! flag and the integrity-check flag. With the integrity check on, the data
//! is sealed in a Symmetrically Encrypted Integrity Protected packet. With it
//! off, a legacy Symmetrically Encrypted Data packet is written (AES only).
//!
//! ## Example
//!
//! ```rust,no_run
//! use pgpseal::config::{COMPRESSION_ZIP, SYMMETRIC_AES_256};
//! use pgpseal::{EncryptionConfig, PgpEncryptor};
//! use std::fs::File;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let encryptor = PgpEncryptor::new(EncryptionConfig::new(
//!     COMPRESSION_ZIP,
//!     SYMMETRIC_AES_256,
//!     true,
//!     true,
//! ));
//!
//! let mut output = File::create("report.pdf.asc")?;
//! let input = File::open("report.pdf")?;
//! let length = input.metadata()?.len();
//! encryptor.encrypt_stream(&mut output, input, length, File::open("recipient.asc")?)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod keyring;
pub mod packet;

pub use config::EncryptionConfig;
pub use crypto::PgpEncryptor;
pub use error::{PgpError, Result};
pub use keyring::{select_encryption_key, RecipientKey};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Size of the scratch buffer used to copy plaintext into the literal-data
/// packet
pub const BUFFER_SIZE: usize = 8192;
