//! CLI structure and command definitions.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use filler_core::FillerConfig;
use filler_types::LogLevel;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "filler")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate credentials for a Cloud Foundry deployment", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: ~/.filler/config)
    #[arg(short, long, global = true, env = "FILLER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Suppress output
    #[arg(short, long, global = true, conflicts_with_all = ["verbose", "debug"])]
    pub quiet: bool,
}

/// Serialization of the generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate every variable in a plan
    Generate {
        /// System domain the components live under
        #[arg(short, long, env = "FILLER_SYSTEM_DOMAIN")]
        system_domain: Option<String>,

        /// Extra run parameter, e.g. mysql_host=10.0.0.5 (repeatable)
        #[arg(short = 'P', long = "param", value_name = "NAME=VALUE", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Plan file (the bundled cf-deployment plan if not specified)
        #[arg(short, long)]
        plan: Option<PathBuf>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "yaml")]
        format: OutputFormat,
    },

    /// Show the variables a plan produces
    Plan {
        /// Plan file (the bundled cf-deployment plan if not specified)
        #[arg(short, long)]
        plan: Option<PathBuf>,

        /// Only validate the plan
        #[arg(long)]
        check: bool,
    },

    /// Show version information
    Version {
        /// Show detailed version info
        #[arg(long)]
        detailed: bool,
    },
}

impl Cli {
    /// Log level implied by the verbosity flags, if any was given.
    pub fn log_level(&self) -> Option<LogLevel> {
        if self.debug {
            Some(LogLevel::Debug)
        } else if self.verbose {
            Some(LogLevel::Info)
        } else if self.quiet {
            Some(LogLevel::Error)
        } else {
            None
        }
    }

    pub fn execute(&self, config: &FillerConfig, config_path: &Path) -> Result<()> {
        use crate::commands::*;

        match &self.command {
            Commands::Generate { system_domain, params, plan, output, format } => {
                let options = generate::Options {
                    system_domain: system_domain.clone(),
                    params: params.clone(),
                    plan: plan.clone(),
                    output: output.clone(),
                    format: *format,
                    quiet: self.quiet,
                };
                generate::execute(config, &options)
            }
            Commands::Plan { plan, check } => {
                plan::execute(plan.as_deref(), *check)
            }
            Commands::Version { detailed } => {
                version::execute(config, config_path, *detailed)
            }
        }
    }
}

fn parse_param(s: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    if name.is_empty() {
        return Err(format!("parameter name missing in '{}'", s));
    }
    Ok((name.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "filler",
            "generate",
            "--system-domain",
            "bosh-lite.com",
            "-P",
            "mysql_host=10.0.0.5",
            "--format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Generate { system_domain, params, format, plan, .. } => {
                assert_eq!(system_domain.as_deref(), Some("bosh-lite.com"));
                assert_eq!(params, vec![("mysql_host".to_string(), "10.0.0.5".to_string())]);
                assert_eq!(format, OutputFormat::Json);
                assert!(plan.is_none());
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_param_needs_equals() {
        assert!(Cli::try_parse_from(["filler", "generate", "--param", "mysql_host"]).is_err());
        assert!(Cli::try_parse_from(["filler", "generate", "--param", "=x"]).is_err());
        assert_eq!(
            parse_param("url=a=b").unwrap(),
            ("url".to_string(), "a=b".to_string())
        );
    }

    #[test]
    fn test_verbosity_flags() {
        let cli = Cli::try_parse_from(["filler", "-d", "plan"]).unwrap();
        assert_eq!(cli.log_level(), Some(LogLevel::Debug));

        let cli = Cli::try_parse_from(["filler", "plan", "--check", "-q"]).unwrap();
        assert_eq!(cli.log_level(), Some(LogLevel::Error));

        assert!(Cli::try_parse_from(["filler", "-q", "-v", "plan"]).is_err());
    }
}
