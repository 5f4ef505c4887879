//! CLI subcommands and the plumbing they share
//!
//! Every subcommand resolves its [`Config`] the same way: the YAML file
//! (if any) is loaded first, then flags and their `BUCKET_*` environment
//! fallbacks override it field by field.

pub mod remove;
pub mod sync;

use std::convert::Infallible;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use bucketsync_client::provider::HttpBucketStore;
use bucketsync_core::config::{Config, ConfigBuilder};
use bucketsync_sync::filesystem::LocalFileSystemAdapter;
use bucketsync_sync::{RunOutcome, SyncEngine};
use clap::Args;
use tracing::info;

/// Connection and bucket options shared by all subcommands
#[derive(Debug, Default, Args)]
pub struct StoreArgs {
    /// Gateway URL of the bucket store
    #[arg(long, env = "BUCKET_API", hide_env_values = true)]
    pub api: Option<String>,

    /// API key
    #[arg(long, env = "BUCKET_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// API secret
    #[arg(long, env = "BUCKET_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Pre-issued session token, used instead of deriving one from the key
    #[arg(long, env = "BUCKET_SESSION", hide_env_values = true)]
    pub session: Option<String>,

    /// Thread the bucket lives in
    #[arg(long, env = "BUCKET_THREAD")]
    pub thread: Option<String>,

    /// Bucket name (a random name is generated when absent)
    #[arg(long, env = "BUCKET_NAME")]
    pub name: Option<String>,

    /// Upper bound in seconds on any single remote call
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl StoreArgs {
    /// Overrides configuration values with the ones given on the command line
    pub fn apply(&self, mut builder: ConfigBuilder) -> ConfigBuilder {
        if let Some(api) = non_blank(&self.api) {
            builder = builder.store_api_url(api);
        }
        if let Some(key) = non_blank(&self.key) {
            builder = builder.store_key(key);
        }
        if let Some(secret) = non_blank(&self.secret) {
            builder = builder.store_secret(secret);
        }
        if let Some(session) = non_blank(&self.session) {
            builder = builder.store_session(session);
        }
        if let Some(thread) = non_blank(&self.thread) {
            builder = builder.store_thread(thread);
        }
        if let Some(name) = non_blank(&self.name) {
            builder = builder.bucket_name(name);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.store_request_timeout_secs(timeout);
        }
        builder
    }
}

/// Parses an on/off switch: only the exact value `true` turns it on
///
/// Keeps `BUCKET_CLEAN=1` or `BUCKET_DEBUG=yes` from aborting the run; such
/// values simply leave the switch off.
pub(crate) fn switch(value: &str) -> Result<bool, Infallible> {
    Ok(value == "true")
}

/// Empty environment variables count as unset
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Loads the configuration file
///
/// An explicitly named file must exist and parse. Without one, the default
/// location is tried and silently skipped when absent.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(Config::load_or_default(&Config::default_path())),
    }
}

/// Validates a finished configuration, joining every problem into one error
pub fn finish(builder: ConfigBuilder) -> Result<Config> {
    builder.build_validated().map_err(|errors| {
        let joined = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        anyhow::anyhow!("Invalid configuration: {joined}")
    })
}

/// Wires the HTTP store and local filesystem into an engine and runs it
pub async fn run_engine(config: &Config) -> Result<RunOutcome> {
    let store = Arc::new(HttpBucketStore::from_config(&config.store)?);
    let local_fs = Arc::new(LocalFileSystemAdapter::new());

    info!(api = %config.store.api_url, "Starting bucket run");
    let engine = SyncEngine::new(store, local_fs, config);
    Ok(engine.run().await?)
}
