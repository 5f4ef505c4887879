//! bucketsync Sync - Bucket reconciliation engine
//!
//! Provides:
//! - One-shot upload of a local directory into a remote bucket
//! - Consistency-token chaining across sequential writes
//! - Orphan detection with a minimal deletion set
//!
//! ## Modules
//!
//! - [`chunker`] - Fixed-size splitting of file contents for streamed upload
//! - [`orphans`] - Remote snapshot tracker computing the deletion set
//! - [`tree`] - Exhaustive remote tree walk
//! - [`engine`] - Orchestrates a full run against the store ports
//! - [`filesystem`] - Local filesystem adapter (tokio fs + glob)

pub mod chunker;
pub mod engine;
pub mod filesystem;
pub mod orphans;
pub mod tree;

use std::future::Future;
use std::time::Duration;

use bucketsync_core::domain::errors::DomainError;
use thiserror::Error;

pub use engine::{RunOutcome, SyncEngine, SyncSummary};
pub use orphans::OrphanTracker;
pub use tree::{RemoteTree, RemoteTreeFetcher};

/// Errors that abort a sync run
///
/// Configuration errors are raised before any remote mutation. Remote and
/// local I/O errors abort the run where they occur; completed writes are
/// not rolled back.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Key or secret missing
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Thread id missing
    #[error("Thread ID required")]
    MissingThread,

    /// The glob matched nothing under the source directory
    #[error("No files found: {dir}")]
    NoFilesFound { dir: String },

    /// Removal requested for a bucket that doesn't exist
    #[error("Bucket not found")]
    BucketNotFound { name: String },

    /// The store accepted a create request but returned no bucket
    #[error("Failed to create bucket")]
    BucketCreateFailed { name: String },

    /// A local or remote path could not be mapped to a bucket path
    #[error(transparent)]
    InvalidPath(#[from] DomainError),

    /// A remote call failed
    #[error("{operation} failed: {source:#}")]
    Remote {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// A remote call did not complete within the configured bound
    #[error("{operation} timed out after {}s", .limit.as_secs_f64())]
    Timeout {
        operation: &'static str,
        limit: Duration,
    },

    /// Reading the local source failed
    #[error("Local I/O error at {path}: {source:#}")]
    LocalIo {
        path: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Awaits a remote call, bounding it by `limit` and classifying the failure
pub(crate) async fn bounded<T, F>(
    operation: &'static str,
    limit: Duration,
    call: F,
) -> Result<T, SyncError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(SyncError::Remote { operation, source }),
        Err(_) => Err(SyncError::Timeout { operation, limit }),
    }
}
