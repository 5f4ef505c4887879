//! Bucket store port (driven/secondary port)
//!
//! This module defines the interface for interacting with the remote,
//! content-addressed bucket store. The shipped implementation talks to the
//! store's HTTP gateway (`bucketsync-client`), but the trait is transport
//! agnostic so the sync engine can be exercised against in-memory fakes.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are adapter-specific
//!   and don't need domain-level classification.
//! - Uses `#[async_trait]` for async trait methods.
//! - Every operation takes the [`Session`] explicitly; adapters hold no
//!   per-run state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::newtypes::{BucketKey, BucketName, BucketPath, RootToken, ThreadId};

/// Name of the bookkeeping object the store places in every bucket.
///
/// It is never part of the synchronized tree and tree walks skip it.
pub const SEED_FILE_NAME: &str = ".textileseed";

// ============================================================================
// Session types
// ============================================================================

/// Credentials used to establish a store session
///
/// `key` and `secret` are always required. When `session_token` is present
/// it is reused as-is instead of deriving a fresh token from the key pair.
#[derive(Clone, Default)]
pub struct Credentials {
    /// API key
    pub key: String,
    /// API secret
    pub secret: String,
    /// Pre-issued session token, if any
    pub session_token: Option<String>,
}

impl Credentials {
    /// Returns true if both key and secret are non-blank
    pub fn is_complete(&self) -> bool {
        !self.key.trim().is_empty() && !self.secret.trim().is_empty()
    }

    /// Returns the supplied session token if it is non-blank
    pub fn reusable_session(&self) -> Option<&str> {
        self.session_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// An established session against the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token for authenticating requests
    pub token: String,
    /// Thread every request is scoped to
    pub thread: ThreadId,
    /// When the token expires (`None` for reused tokens of unknown lifetime)
    pub expires_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Bucket and path DTOs
// ============================================================================

/// An entry in the bucket directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketInfo {
    /// Human-facing bucket name (not unique)
    pub name: String,
    /// Store-assigned key
    pub key: BucketKey,
}

/// A child entry returned by a path listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathItem {
    /// Entry name (single segment)
    pub name: String,
    /// Whether the entry is a directory
    pub is_dir: bool,
}

/// Result of listing one directory of a bucket
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathListing {
    /// Current root of the bucket at the time of the listing
    pub root: Option<RootToken>,
    /// Immediate children of the listed directory
    pub items: Vec<PathItem>,
}

/// Content of one file push, already split into chunks
///
/// Created per file at upload time and consumed by the push.
#[derive(Debug, Clone)]
pub struct PushContent {
    /// Destination path inside the bucket
    pub path: BucketPath,
    /// File bytes in upload order
    pub chunks: Vec<Vec<u8>>,
}

impl PushContent {
    /// Creates a new push unit
    pub fn new(path: BucketPath, chunks: Vec<Vec<u8>>) -> Self {
        Self { path, chunks }
    }

    /// Total number of bytes across all chunks
    pub fn total_len(&self) -> u64 {
        self.chunks.iter().map(|c| c.len() as u64).sum()
    }
}

// ============================================================================
// IBucketStore trait
// ============================================================================

/// Port trait for remote bucket store operations
///
/// ## Implementation Notes
///
/// - Implementations must not retry internally; the engine treats every
///   failure as fatal for the run.
/// - `push_path` must send `precondition` to the store so that the write is
///   rejected if the bucket moved past that root.
#[async_trait::async_trait]
pub trait IBucketStore: Send + Sync {
    /// Establishes a session for the given thread
    ///
    /// Reuses `credentials.session_token` when present, otherwise derives a
    /// token from the key pair with a bounded expiry.
    async fn establish(
        &self,
        credentials: &Credentials,
        thread: &ThreadId,
    ) -> anyhow::Result<Session>;

    /// Lists every bucket visible to the session
    async fn list_buckets(&self, session: &Session) -> anyhow::Result<Vec<BucketInfo>>;

    /// Creates a bucket
    ///
    /// # Returns
    /// The new bucket's key, or `None` if the store accepted the request but
    /// returned no bucket root
    async fn create_bucket(
        &self,
        session: &Session,
        name: &BucketName,
    ) -> anyhow::Result<Option<BucketKey>>;

    /// Removes a bucket and everything in it
    async fn remove_bucket(&self, session: &Session, key: &BucketKey) -> anyhow::Result<()>;

    /// Lists the immediate children of a directory
    ///
    /// # Arguments
    /// * `path` - Directory to list, `None` for the bucket root
    async fn list_path(
        &self,
        session: &Session,
        key: &BucketKey,
        path: Option<&BucketPath>,
    ) -> anyhow::Result<PathListing>;

    /// Writes a file, creating intermediate directories as needed
    ///
    /// # Arguments
    /// * `content` - Destination path and chunked bytes
    /// * `precondition` - Root the bucket is expected to be at
    ///
    /// # Returns
    /// The bucket root after the write
    async fn push_path(
        &self,
        session: &Session,
        key: &BucketKey,
        content: PushContent,
        precondition: Option<&RootToken>,
    ) -> anyhow::Result<Option<RootToken>>;

    /// Removes a file or a directory (recursively)
    async fn remove_path(
        &self,
        session: &Session,
        key: &BucketKey,
        path: &BucketPath,
    ) -> anyhow::Result<()>;
}
