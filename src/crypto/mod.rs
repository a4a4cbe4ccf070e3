//! OpenPGP message encryption.
//!
//! - [`encryption`]: the [`PgpEncryptor`] facade and its writer stack
//! - [`literal`]: literal-data packet framing and the bounded plaintext copy
//! - [`provider`]: one-time registration of the cryptographic provider

pub mod encryption;
pub mod literal;
pub mod provider;

pub use encryption::PgpEncryptor;
pub use provider::{provider, Provider};
