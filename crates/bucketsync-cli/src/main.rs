//! bucketsync CLI - Command-line interface for bucketsync
//!
//! Provides commands for:
//! - Mirroring a local directory into a bucket
//! - Removing a bucket
//!
//! Every option can also come from a `BUCKET_*` environment variable or
//! the YAML configuration file; flags win over both.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use bucketsync_core::config::ConfigBuilder;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{remove::RemoveCommand, sync::SyncCommand};
use output::{get_formatter, OutputFormat};

#[derive(Debug, Parser)]
#[command(
    name = "bucketsync",
    version,
    about = "Mirror a local directory into a remote bucket"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Enable debug logging
    #[arg(long, env = "BUCKET_DEBUG", global = true, value_parser = commands::switch)]
    debug: bool,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Upload a directory to a bucket
    Sync(SyncCommand),
    /// Remove a bucket
    Remove(RemoveCommand),
}

impl Commands {
    fn apply(&self, builder: ConfigBuilder) -> ConfigBuilder {
        match self {
            Commands::Sync(cmd) => cmd.apply(builder),
            Commands::Remove(cmd) => cmd.apply(builder),
        }
    }
}

/// `-v` and `-vv` take precedence over the configured level
fn effective_level(verbose: u8, configured: &str) -> &str {
    match verbose {
        0 => configured,
        1 => "debug",
        _ => "trace",
    }
}

fn init_tracing(level: &str, json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

async fn run(cli: Cli, format: OutputFormat) -> Result<()> {
    let base = commands::load_config(cli.config.as_deref())?;
    let mut builder = cli.command.apply(ConfigBuilder::from_config(base));
    if cli.debug {
        builder = builder.logging_level("debug");
    }
    let config = commands::finish(builder)?;

    init_tracing(
        effective_level(cli.verbose, &config.logging.level),
        config.logging.json,
    );

    match &cli.command {
        Commands::Sync(cmd) => cmd.execute(&config, format).await,
        Commands::Remove(cmd) => cmd.execute(&config, format).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let format = OutputFormat::from_flag(cli.json);

    match run(cli, format).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            get_formatter(format).error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
