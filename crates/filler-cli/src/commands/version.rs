//! Show version information.

use anyhow::Result;
use colored::Colorize;
use filler_core::util::expand_path;
use filler_core::FillerConfig;
use filler_secrets::SecureRandom;
use std::path::Path;

pub fn execute(config: &FillerConfig, config_path: &Path, detailed: bool) -> Result<()> {
    println!("{} {}", filler_core::APP_NAME.cyan().bold(), filler_core::VERSION);

    if detailed {
        println!("\nBuild Information:");
        println!("  Target: {}", std::env::consts::ARCH);
        println!("  OS: {}", std::env::consts::OS);
        println!("  Rust Version: {}", env!("CARGO_PKG_RUST_VERSION"));
        println!("  Random source: {}", SecureRandom::system().source_name());

        println!("\nGenerator Settings:");
        println!("  Key size: {} bits", config.key_bits);
        println!("  CA validity: {} days", config.ca_validity_days);
        println!("  Certificate validity: {} days", config.cert_validity_days);
        println!("  SSH fingerprint: {}", config.fingerprint);
        println!("  Config file: {}", describe_config_file(config_path));
    }

    Ok(())
}

fn describe_config_file(path: &Path) -> String {
    let path = expand_path(path);
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not present, using defaults)", path.display())
    }
}
