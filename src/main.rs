//! balrogscript - submit release metadata to Balrog
//!
//! CLI binary run by release automation with a single config file argument.

use anyhow::Result;
use balrog_submit::config::load_config;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;

/// Exit code when the config file cannot be read
const EXIT_BAD_CONFIG: u8 = 5;

#[derive(Parser)]
#[command(name = "balrogscript")]
#[command(about = "Submit release metadata to Balrog")]
#[command(version)]
struct Cli {
    /// Path to the script config file
    config: PathBuf,

    /// Log debug output (also enabled by `verbose` in the config)
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Can't read config file {}!\n{e}", cli.config.display());
            return Ok(ExitCode::from(EXIT_BAD_CONFIG));
        }
    };
    setup_logging(cli.verbose || config.verbose);

    cli::run_submit(&config).await?;
    Ok(ExitCode::SUCCESS)
}
