//! Process-wide registration of the cryptographic provider.
//!
//! The provider is created once, on first use, from any thread. It resolves
//! numeric algorithm identifiers against what the OpenPGP library's crypto
//! backend actually implements.

use crate::error::{PgpError, Result};
use sequoia_openpgp::types::{CompressionAlgorithm, SymmetricAlgorithm};
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;
use tracing::debug;

/// Name reported for the registered provider
pub const PROVIDER_NAME: &str = "sequoia-openpgp/rust";

static PROVIDER: OnceLock<Provider> = OnceLock::new();
#[cfg(test)]
static REGISTRATIONS: AtomicUsize = AtomicUsize::new(0);

/// Handle to the registered cryptographic provider
#[derive(Debug)]
pub struct Provider {
    name: &'static str,
}

/// Returns the provider, registering it on first call.
pub fn provider() -> &'static Provider {
    PROVIDER.get_or_init(|| {
        #[cfg(test)]
        REGISTRATIONS.fetch_add(1, Ordering::SeqCst);
        debug!(provider = PROVIDER_NAME, "Registered cryptographic provider");
        Provider {
            name: PROVIDER_NAME,
        }
    })
}

/// Number of times the provider has been registered in this process.
#[cfg(test)]
pub(crate) fn registration_count() -> usize {
    REGISTRATIONS.load(Ordering::SeqCst)
}

impl Provider {
    /// Provider name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Resolves an RFC 4880 symmetric-key algorithm identifier.
    pub fn symmetric_algorithm(&self, id: u8) -> Result<SymmetricAlgorithm> {
        let algo = SymmetricAlgorithm::from(id);
        if matches!(algo, SymmetricAlgorithm::Unencrypted) || !algo.is_supported() {
            return Err(PgpError::crypto(format!(
                "Unsupported symmetric-key algorithm: {}",
                id
            )));
        }
        Ok(algo)
    }

    /// Resolves an RFC 4880 compression algorithm identifier.
    pub fn compression_algorithm(&self, id: u8) -> Result<CompressionAlgorithm> {
        let algo = CompressionAlgorithm::from(id);
        if !algo.is_supported() {
            return Err(PgpError::crypto(format!(
                "Unsupported compression algorithm: {}",
                id
            )));
        }
        Ok(algo)
    }
}
