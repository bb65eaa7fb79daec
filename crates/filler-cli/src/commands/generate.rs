//! Generate credentials for a deployment.

use anyhow::{Context, Result};
use colored::Colorize;
use filler_core::util::{save_json_file, save_yaml_file};
use filler_core::FillerConfig;
use filler_secrets::plan::SYSTEM_DOMAIN;
use filler_secrets::{GeneratorSettings, OutputData, SecretGenerator};
use indexmap::IndexMap;
use std::path::PathBuf;

use crate::cli::OutputFormat;
use crate::ui::progress;

/// Arguments of `filler generate`.
#[derive(Debug, Clone)]
pub struct Options {
    pub system_domain: Option<String>,
    pub params: Vec<(String, String)>,
    pub plan: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    pub quiet: bool,
}

pub fn execute(config: &FillerConfig, options: &Options) -> Result<()> {
    let plan = super::load_plan(options.plan.as_deref())?;
    let settings = GeneratorSettings::from(config);
    let parameters = parameters(options);

    tracing::info!(
        "Generating {} variables with {}-bit keys",
        plan.expected_len(),
        settings.key_bits
    );

    let pb = progress::spinner(
        &format!("Generating {} variables...", plan.expected_len()),
        options.quiet,
    );
    let result = SecretGenerator::generate(&plan, settings, &parameters);
    pb.finish_and_clear();
    let data = result.context("Credential generation failed")?;

    match &options.output {
        Some(path) => {
            write_file(path, &data, options.format)?;
            if !options.quiet {
                eprintln!(
                    "{} Wrote {} variables to {}",
                    "✓".green().bold(),
                    data.len(),
                    path.display().to_string().cyan()
                );
            }
        }
        None => {
            print!("{}", render(&data, options.format)?);
            if !options.quiet {
                eprintln!("{} Generated {} variables", "✓".green().bold(), data.len());
            }
        }
    }

    Ok(())
}

/// Run parameters, with `--system-domain` taking precedence over `--param system_domain=`.
fn parameters(options: &Options) -> IndexMap<String, String> {
    let mut parameters: IndexMap<String, String> = options.params.iter().cloned().collect();
    if let Some(domain) = &options.system_domain {
        parameters.insert(SYSTEM_DOMAIN.to_string(), domain.clone());
    }
    parameters
}

fn render(data: &OutputData, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(data).context("Failed to encode YAML"),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(data).context("Failed to encode JSON")?;
            json.push('\n');
            Ok(json)
        }
    }
}

fn write_file(path: &std::path::Path, data: &OutputData, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Yaml => save_yaml_file(path, data),
        OutputFormat::Json => save_json_file(path, data),
    }
    .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"
parameters: [system_domain]
components:
  - name: api
    https_url: true
passwords: [nats_password, router_status_password]
password_arrays:
  - name: consul_encrypt_keys
    count: 1
derived:
  system_domain: "${system_domain}"
"#;

    fn options(dir: &tempfile::TempDir, format: OutputFormat) -> Options {
        let plan = dir.path().join("plan.yml");
        std::fs::write(&plan, PLAN).unwrap();

        Options {
            system_domain: Some("bosh-lite.com".to_string()),
            params: vec![("system_domain".to_string(), "ignored.com".to_string())],
            plan: Some(plan),
            output: Some(dir.path().join("out")),
            format,
            quiet: true,
        }
    }

    #[test]
    fn test_system_domain_flag_wins() {
        let dir = tempfile::tempdir().unwrap();
        let parameters = parameters(&options(&dir, OutputFormat::Yaml));
        assert_eq!(parameters.get("system_domain").map(String::as_str), Some("bosh-lite.com"));
        assert_eq!(parameters.len(), 1);
    }

    #[test]
    fn test_generate_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let options = options(&dir, OutputFormat::Yaml);
        execute(&FillerConfig::default(), &options).unwrap();

        let content = std::fs::read_to_string(options.output.unwrap()).unwrap();
        let doc: serde_yaml::Mapping = serde_yaml::from_str(&content).unwrap();
        assert_eq!(doc.len(), 6);
        assert_eq!(doc["api_url"].as_str(), Some("https://api.bosh-lite.com"));
        assert_eq!(doc["system_domain"].as_str(), Some("bosh-lite.com"));
        assert_eq!(doc["consul_encrypt_keys"].as_sequence().map(|s| s.len()), Some(1));

        // Declared order is kept
        let keys: Vec<&str> = doc.keys().filter_map(|k| k.as_str()).collect();
        assert_eq!(keys[0], "api_uri");
        assert_eq!(keys[5], "system_domain");
    }

    #[test]
    fn test_generate_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let options = options(&dir, OutputFormat::Json);
        execute(&FillerConfig::default(), &options).unwrap();

        let content = std::fs::read_to_string(options.output.unwrap()).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(doc["api_uri"], "api.bosh-lite.com");
        assert!(doc["nats_password"].is_string());
    }

    #[cfg(unix)]
    #[test]
    fn test_output_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        for format in [OutputFormat::Yaml, OutputFormat::Json] {
            let options = options(&dir, format);
            execute(&FillerConfig::default(), &options).unwrap();

            let mode = std::fs::metadata(options.output.unwrap()).unwrap().permissions().mode();
            assert_eq!(mode & 0o077, 0);
        }
    }

    #[test]
    fn test_missing_system_domain_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = options(&dir, OutputFormat::Yaml);
        options.system_domain = None;
        options.params.clear();

        let err = execute(&FillerConfig::default(), &options).unwrap_err();
        assert!(format!("{:#}", err).contains("system_domain"));
        assert!(!dir.path().join("out").exists());
    }
}
