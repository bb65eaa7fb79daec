//! Generator settings and the one-call entry point.

use filler_core::config::{FillerConfig, MIN_KEY_BITS};
use filler_types::{FillerError, FingerprintFormat, OutputData, Result};
use indexmap::IndexMap;

use crate::entropy::SecureRandom;
use crate::plan::GenerationPlan;
use crate::store::CredentialStore;

/// Parameters fixed for a whole generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorSettings {
    /// RSA modulus size for every key
    pub key_bits: u32,
    /// Validity of certificate authorities, in days
    pub ca_validity_days: u32,
    /// Requested validity of leaf certificates, in days
    pub cert_validity_days: u32,
    /// SSH fingerprint display format
    pub fingerprint: FingerprintFormat,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self::from(&FillerConfig::default())
    }
}

impl From<&FillerConfig> for GeneratorSettings {
    fn from(config: &FillerConfig) -> Self {
        Self {
            key_bits: config.key_bits,
            ca_validity_days: config.ca_validity_days,
            cert_validity_days: config.cert_validity_days,
            fingerprint: config.fingerprint,
        }
    }
}

impl GeneratorSettings {
    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.key_bits < MIN_KEY_BITS {
            return Err(FillerError::KeyGeneration(format!(
                "RSA key size must be at least {} bits (got {})",
                MIN_KEY_BITS, self.key_bits
            )));
        }
        if self.ca_validity_days == 0 || self.cert_validity_days == 0 {
            return Err(FillerError::Config("Validity days must be positive".to_string()));
        }
        Ok(())
    }

    /// Leaf validity, never longer than the authority's own.
    pub fn leaf_validity_days(&self) -> u32 {
        self.cert_validity_days.min(self.ca_validity_days)
    }
}

/// Convenience wrapper around [`CredentialStore`].
pub struct SecretGenerator;

impl SecretGenerator {
    /// Run a plan with the system random source.
    pub fn generate(
        plan: &GenerationPlan,
        settings: GeneratorSettings,
        parameters: &IndexMap<String, String>,
    ) -> Result<OutputData> {
        Self::generate_with(plan, settings, parameters, SecureRandom::system())
    }

    /// Run a plan with an explicit random source.
    pub fn generate_with(
        plan: &GenerationPlan,
        settings: GeneratorSettings,
        parameters: &IndexMap<String, String>,
        random: SecureRandom,
    ) -> Result<OutputData> {
        let mut store = CredentialStore::with_random(settings, random)?;
        for (name, value) in parameters {
            store = store.with_parameter(name.clone(), value.clone());
        }
        store.run(plan)
    }
}
