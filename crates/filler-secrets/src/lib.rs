//! # Filler Secrets
//!
//! Credential generation for a Cloud Foundry deployment.
//!
//! Provides:
//! - Random passwords and password arrays
//! - Standalone RSA key pairs
//! - SSH host keys with fingerprints
//! - Self-signed certificate authorities and the leaves they sign
//! - A [`CredentialStore`] that runs a [`GenerationPlan`] into one [`OutputData`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entropy;
pub mod generator;
pub mod plan;
pub mod store;
pub mod template;
pub mod types;

pub use entropy::{EntropySource, OsEntropy, SecureRandom};
pub use generator::{GeneratorSettings, SecretGenerator};
pub use plan::GenerationPlan;
pub use store::CredentialStore;
pub use types::*;

pub use filler_types::OutputData;
