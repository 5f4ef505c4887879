//! Remove command - Delete a bucket by name
//!
//! Provides the `bucketsync remove` CLI command. The first bucket in the
//! thread whose name matches is removed; a missing bucket is an error.

use anyhow::Result;
use bucketsync_core::config::{Config, ConfigBuilder};
use bucketsync_sync::RunOutcome;
use clap::Args;

use super::StoreArgs;
use crate::output::{get_formatter, OutputFormat};

/// Remove a bucket and everything in it
#[derive(Debug, Args)]
pub struct RemoveCommand {
    #[command(flatten)]
    pub store: StoreArgs,
}

impl RemoveCommand {
    /// Overrides configuration values with this command's flags
    pub fn apply(&self, builder: ConfigBuilder) -> ConfigBuilder {
        self.store.apply(builder).bucket_remove(true)
    }

    /// Execute the remove command
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);

        match super::run_engine(config).await? {
            RunOutcome::BucketRemoved { name, key } => {
                if matches!(format, OutputFormat::Json) {
                    formatter.print_json(&serde_json::json!({
                        "removed": true,
                        "bucket_name": name.as_str(),
                        "bucket_key": key.as_str(),
                    }));
                } else {
                    formatter.success(&format!("Removed bucket {name} ({key})"));
                }
                Ok(())
            }
            RunOutcome::Synced(summary) => {
                anyhow::bail!("Bucket {} was synced instead of removed", summary.bucket_name)
            }
        }
    }
}
