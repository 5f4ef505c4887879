//! Sync command - Mirror a local directory into a bucket
//!
//! Provides the `bucketsync sync` CLI command which:
//! 1. Merges flags and environment fallbacks over the configuration file
//! 2. Creates the HTTP store and local filesystem adapters
//! 3. Runs the SyncEngine and displays the summary

use std::path::PathBuf;

use anyhow::Result;
use bucketsync_core::config::{Config, ConfigBuilder};
use bucketsync_sync::{RunOutcome, SyncSummary};
use clap::Args;

use super::StoreArgs;
use crate::output::{get_formatter, OutputFormat};

/// Upload a directory to a bucket, creating the bucket if needed
#[derive(Debug, Args)]
pub struct SyncCommand {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Directory to upload
    #[arg(long, env = "BUCKET_PATH")]
    pub path: Option<PathBuf>,

    /// Glob pattern selecting files, relative to the directory
    #[arg(long, env = "BUCKET_PATTERN")]
    pub pattern: Option<String>,

    /// Delete remote entries that no longer exist locally
    #[arg(long, env = "BUCKET_CLEAN", value_parser = super::switch)]
    pub clean: bool,
}

impl SyncCommand {
    /// Overrides configuration values with this command's flags
    pub fn apply(&self, builder: ConfigBuilder) -> ConfigBuilder {
        let mut builder = self.store.apply(builder).bucket_remove(false);
        if let Some(path) = self.path.as_ref().filter(|p| !p.as_os_str().is_empty()) {
            builder = builder.source_path(path.clone());
        }
        if let Some(pattern) = self.pattern.as_deref().filter(|p| !p.trim().is_empty()) {
            builder = builder.source_pattern(pattern);
        }
        if self.clean {
            builder = builder.bucket_clean_orphans(true);
        }
        builder
    }

    /// Execute the sync command
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        formatter.info(&format!(
            "Uploading {} ({})",
            config.source.path.display(),
            config.source.pattern
        ));

        let summary = match super::run_engine(config).await? {
            RunOutcome::Synced(summary) => summary,
            RunOutcome::BucketRemoved { name, .. } => {
                anyhow::bail!("Bucket {name} was removed instead of synced")
            }
        };

        if matches!(format, OutputFormat::Json) {
            formatter.print_json(&summary_json(&summary));
            return Ok(());
        }

        formatter.success(&format!(
            "Synced to bucket {} in {}",
            summary.bucket_name,
            format_duration(summary.duration_ms)
        ));
        formatter.detail("Key", summary.bucket_key.as_str());
        if summary.bucket_created {
            formatter.detail("Created", "yes");
        }
        formatter.detail(
            "Uploaded",
            &format!(
                "{} file{} ({} bytes)",
                summary.files_uploaded,
                if summary.files_uploaded == 1 { "" } else { "s" },
                summary.bytes_uploaded
            ),
        );
        if config.bucket.clean_orphans {
            formatter.detail(
                "Deleted",
                &format!(
                    "{} orphan{}",
                    summary.orphans_deleted,
                    if summary.orphans_deleted == 1 { "" } else { "s" }
                ),
            );
        }
        if let Some(root) = &summary.final_root {
            formatter.detail("Root", root.as_str());
        }

        Ok(())
    }
}

fn summary_json(summary: &SyncSummary) -> serde_json::Value {
    serde_json::json!({
        "bucket_key": summary.bucket_key.as_str(),
        "bucket_name": summary.bucket_name.as_str(),
        "bucket_created": summary.bucket_created,
        "files_uploaded": summary.files_uploaded,
        "bytes_uploaded": summary.bytes_uploaded,
        "orphans_deleted": summary.orphans_deleted,
        "root": summary.final_root.as_ref().map(|r| r.as_str()),
        "duration_ms": summary.duration_ms,
    })
}

fn format_duration(ms: u64) -> String {
    if ms >= 1000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        format!("{ms}ms")
    }
}
