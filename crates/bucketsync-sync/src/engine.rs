//! Bucket synchronization engine
//!
//! The [`SyncEngine`] performs a single run that makes a remote bucket mirror
//! a local directory, or removes a bucket entirely.
//!
//! ## Sync Flow
//!
//! 1. **Validation**: credentials and thread id are checked before any remote call
//! 2. **Session**: reuse a supplied session token or derive one from the key pair
//! 3. **Resolution**: list buckets, first name match wins; remove or create as needed
//! 4. **Snapshot** (optional): walk the remote tree into an [`OrphanTracker`]
//! 5. **Upload**: push every local file in order, chaining the bucket root
//! 6. **Cleanup** (optional): delete whatever the tracker still flags
//!
//! ## Failure semantics
//!
//! Nothing is retried. The first failing call aborts the run and writes that
//! already completed stay in place. Every call is bounded by the configured
//! request timeout; a push gets that bound once per upload block. Local enumeration happens before the
//! bucket is created, so an empty source never leaves a new bucket behind.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bucketsync_core::config::Config;
use bucketsync_core::domain::{BucketKey, BucketName, BucketPath, RootToken, ThreadId};
use bucketsync_core::ports::{
    BucketInfo, Credentials, IBucketStore, ILocalFileSystem, PushContent, Session,
};
use tracing::{debug, info};

use crate::chunker::{chunk, chunk_count};
use crate::orphans::OrphanTracker;
use crate::tree::RemoteTreeFetcher;
use crate::{bounded, SyncError};

// ============================================================================
// Run results
// ============================================================================

/// Summary of a completed upload run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    /// Bucket that was synced into
    pub bucket_key: BucketKey,
    /// Bucket name used for resolution (possibly generated)
    pub bucket_name: BucketName,
    /// Whether the bucket had to be created
    pub bucket_created: bool,
    /// Number of files pushed
    pub files_uploaded: u32,
    /// Total bytes pushed
    pub bytes_uploaded: u64,
    /// Number of recursive deletions issued
    pub orphans_deleted: u32,
    /// Bucket root after the last write, if the store reported one
    pub final_root: Option<RootToken>,
    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

/// Outcome of [`SyncEngine::run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The named bucket was removed
    BucketRemoved { name: BucketName, key: BucketKey },
    /// The local tree was uploaded
    Synced(SyncSummary),
}

// ============================================================================
// SyncEngine
// ============================================================================

/// One-shot synchronization engine
///
/// ## Dependencies
///
/// - `store`: Remote bucket operations (IBucketStore)
/// - `local_filesystem`: Local enumeration and reads (ILocalFileSystem)
/// - `config`: Run settings, captured at construction
pub struct SyncEngine {
    store: Arc<dyn IBucketStore + Send + Sync>,
    local_filesystem: Arc<dyn ILocalFileSystem + Send + Sync>,
    config: Config,
    call_timeout: Duration,
}

impl SyncEngine {
    /// Creates a new `SyncEngine` with the given dependencies
    ///
    /// # Arguments
    /// * `store` - Remote bucket operations (IBucketStore)
    /// * `local_filesystem` - Local file operations (ILocalFileSystem)
    /// * `config` - Run configuration
    pub fn new(
        store: Arc<dyn IBucketStore + Send + Sync>,
        local_filesystem: Arc<dyn ILocalFileSystem + Send + Sync>,
        config: &Config,
    ) -> Self {
        Self {
            store,
            local_filesystem,
            config: config.clone(),
            call_timeout: Duration::from_secs(config.store.request_timeout_secs),
        }
    }

    /// Overrides the per-call timeout taken from the configuration
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Performs one run: removal or upload, depending on the configuration
    ///
    /// # Returns
    /// A [`RunOutcome`] describing what was done
    ///
    /// # Errors
    /// Returns the first [`SyncError`] encountered. Configuration errors are
    /// reported before any remote mutation.
    #[tracing::instrument(skip(self), fields(thread = %self.config.store.thread))]
    pub async fn run(&self) -> Result<RunOutcome, SyncError> {
        let start = Instant::now();

        // Step 1: Validate inputs
        let credentials = Credentials {
            key: self.config.store.key.clone(),
            secret: self.config.store.secret.clone(),
            session_token: self.config.store.session.clone(),
        };
        if !credentials.is_complete() {
            return Err(SyncError::InvalidCredentials);
        }
        let thread = ThreadId::new(self.config.store.thread.clone())
            .map_err(|_| SyncError::MissingThread)?;

        // Step 2: Establish the session
        let session = bounded(
            "establish session",
            self.call_timeout,
            self.store.establish(&credentials, &thread),
        )
        .await?;
        debug!(
            reused = credentials.reusable_session().is_some(),
            expires_at = ?session.expires_at,
            "Session established"
        );

        // Step 3: Resolve the bucket
        let name = BucketName::or_generate(self.config.bucket.name.as_deref());
        let buckets = bounded(
            "list buckets",
            self.call_timeout,
            self.store.list_buckets(&session),
        )
        .await?;
        let existing = buckets.into_iter().find(|b| b.name == name.as_str());

        if self.config.bucket.remove {
            return self.remove_bucket(&session, name, existing).await;
        }

        info!(bucket = %name, exists = existing.is_some(), "Starting sync run");
        let summary = self.sync_into(&session, name, existing, start).await?;
        info!(
            bucket = %summary.bucket_key,
            files_uploaded = summary.files_uploaded,
            bytes_uploaded = summary.bytes_uploaded,
            orphans_deleted = summary.orphans_deleted,
            duration_ms = summary.duration_ms,
            "Upload complete"
        );
        Ok(RunOutcome::Synced(summary))
    }

    async fn remove_bucket(
        &self,
        session: &Session,
        name: BucketName,
        existing: Option<BucketInfo>,
    ) -> Result<RunOutcome, SyncError> {
        let Some(bucket) = existing else {
            return Err(SyncError::BucketNotFound {
                name: name.to_string(),
            });
        };

        bounded(
            "remove bucket",
            self.call_timeout,
            self.store.remove_bucket(session, &bucket.key),
        )
        .await?;
        info!(bucket = %name, key = %bucket.key, "Bucket removed");

        Ok(RunOutcome::BucketRemoved {
            name,
            key: bucket.key,
        })
    }

    async fn sync_into(
        &self,
        session: &Session,
        name: BucketName,
        existing: Option<BucketInfo>,
        start: Instant,
    ) -> Result<SyncSummary, SyncError> {
        let base_dir = self.config.source.path.clone();

        // Step 4: Enumerate local files before anything is created remotely
        let local_files = self.enumerate(&base_dir).await?;

        // Step 5: Reuse or create the bucket
        let (bucket_key, bucket_created) = match existing {
            Some(bucket) => (bucket.key, false),
            None => {
                let created = bounded(
                    "create bucket",
                    self.call_timeout,
                    self.store.create_bucket(session, &name),
                )
                .await?;
                let key = created.ok_or_else(|| SyncError::BucketCreateFailed {
                    name: name.to_string(),
                })?;
                info!(bucket = %name, key = %key, "Bucket created");
                (key, true)
            }
        };

        // Step 6: Snapshot the remote tree when cleaning
        let mut tracker = if self.config.bucket.clean_orphans {
            let tree = RemoteTreeFetcher::new(self.store.as_ref(), self.call_timeout)
                .fetch(session, &bucket_key)
                .await?;
            let tracker = OrphanTracker::from_tree(&tree);
            debug!(
                folders = tracker.folder_count(),
                leafs = tracker.leaf_count(),
                "Remote snapshot loaded"
            );
            Some(tracker)
        } else {
            None
        };

        // Step 7: Read the head once, then chain the root through every push
        let head = bounded(
            "list path",
            self.call_timeout,
            self.store.list_path(session, &bucket_key, None),
        )
        .await?;
        let mut root: Option<RootToken> = head.root;

        let mut files_uploaded = 0u32;
        let mut bytes_uploaded = 0u64;
        for (relative, remote_path) in local_files {
            if let Some(tracker) = tracker.as_mut() {
                tracker.mark_present(&remote_path);
                tracker.keep_ancestors(&remote_path);
            }

            let local_path = base_dir.join(&relative);
            let bytes = self
                .local_filesystem
                .read_file(&local_path)
                .await
                .map_err(|source| SyncError::LocalIo {
                    path: local_path.display().to_string(),
                    source,
                })?;
            let len = bytes.len() as u64;
            debug!(
                path = %remote_path,
                bytes = len,
                chunks = chunk_count(len),
                "Uploading file"
            );

            let content = PushContent::new(remote_path, chunk(bytes));
            let next = bounded(
                "push path",
                push_limit(self.call_timeout, len),
                self.store
                    .push_path(session, &bucket_key, content, root.as_ref()),
            )
            .await?;
            root = next;

            files_uploaded += 1;
            bytes_uploaded += len;
        }

        // Step 8: Delete orphans
        let mut orphans_deleted = 0u32;
        if let Some(tracker) = tracker {
            debug!("Cleaning orphaned nodes");
            for orphan in tracker.deletes() {
                debug!(path = %orphan, "Removing orphan");
                bounded(
                    "remove path",
                    self.call_timeout,
                    self.store.remove_path(session, &bucket_key, &orphan),
                )
                .await?;
                orphans_deleted += 1;
            }
        }

        Ok(SyncSummary {
            bucket_key,
            bucket_name: name,
            bucket_created,
            files_uploaded,
            bytes_uploaded,
            orphans_deleted,
            final_root: root,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Globs the source directory and maps every match to its bucket path
    async fn enumerate(&self, base_dir: &Path) -> Result<Vec<(String, BucketPath)>, SyncError> {
        let pattern = &self.config.source.pattern;
        let files = self
            .local_filesystem
            .glob(base_dir, pattern)
            .await
            .map_err(|source| SyncError::LocalIo {
                path: base_dir.display().to_string(),
                source,
            })?;

        if files.is_empty() {
            return Err(SyncError::NoFilesFound {
                dir: base_dir.display().to_string(),
            });
        }

        files
            .into_iter()
            .map(|relative| -> Result<_, SyncError> {
                let remote = BucketPath::from_relative(&relative)?;
                Ok((relative, remote))
            })
            .collect()
    }
}

/// Bound for pushing `len` bytes: one call timeout per block, at least one
fn push_limit(call_timeout: Duration, len: u64) -> Duration {
    let blocks = u32::try_from(chunk_count(len).max(1)).unwrap_or(u32::MAX);
    call_timeout.saturating_mul(blocks)
}
