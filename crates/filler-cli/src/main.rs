//! cf-filler CLI entry point.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use filler_core::log;
use filler_core::FillerConfig;

mod cli;
mod commands;
mod ui;

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let path = cli.config.clone().unwrap_or_else(FillerConfig::default_path);
    let mut layered = FillerConfig::layered(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;

    if let Some(level) = cli.log_level() {
        layered.set("log.level", level)?;
    }
    let config = FillerConfig::from_config(&layered).context("Invalid configuration")?;
    log::init(&config.log)?;

    cli.execute(&config, &path)
}
