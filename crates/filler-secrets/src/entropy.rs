//! Secure random handle shared by every factory.
//!
//! All secret material is drawn through [`SecureRandom`]. The default source
//! is the operating system CSPRNG, which needs no seeding; a failure to read
//! from it is reported as [`FillerError::RandomSource`] and never papered
//! over with a weaker generator.

use filler_types::{FillerError, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use std::sync::Arc;

/// A source of cryptographically secure random bytes.
pub trait EntropySource: Send + Sync {
    /// Fill `buf` entirely with random bytes.
    fn fill(&self, buf: &mut [u8]) -> Result<()>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// The operating system CSPRNG (`getrandom(2)` and friends).
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| FillerError::RandomSource(format!("operating system CSPRNG failed: {}", e)))
    }

    fn name(&self) -> &'static str {
        "os"
    }
}

/// Cloneable handle to an [`EntropySource`].
#[derive(Clone)]
pub struct SecureRandom {
    source: Arc<dyn EntropySource>,
}

impl SecureRandom {
    /// Handle backed by the operating system CSPRNG.
    pub fn system() -> Self {
        Self::from_source(OsEntropy)
    }

    /// Handle backed by a custom source.
    pub fn from_source(source: impl EntropySource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// Fill `buf` with random bytes.
    pub fn fill(&self, buf: &mut [u8]) -> Result<()> {
        self.source.fill(buf)
    }

    /// Draw a fixed number of random bytes.
    pub fn bytes<const N: usize>(&self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    /// Name of the underlying source.
    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }
}

impl Default for SecureRandom {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for SecureRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureRandom")
            .field("source", &self.source.name())
            .finish()
    }
}
