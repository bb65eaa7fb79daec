//! CLI command implementations.

pub mod generate;
pub mod plan;
pub mod version;

use anyhow::{Context, Result};
use filler_secrets::GenerationPlan;
use std::path::Path;

/// Load a plan file, or the bundled cf-deployment plan when none is given.
pub fn load_plan(path: Option<&Path>) -> Result<GenerationPlan> {
    match path {
        Some(path) => GenerationPlan::load(path)
            .with_context(|| format!("Failed to load plan {}", path.display())),
        None => GenerationPlan::cf_deployment().context("Failed to parse bundled plan"),
    }
}
