//! Local filesystem port (driven/secondary port)
//!
//! This module defines the interface for reading the local source tree:
//! enumerating the files to upload and reading their contents.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because filesystem errors are adapter-specific.
//! - Enumeration returns `/`-separated paths relative to the base directory
//!   regardless of the host platform, so they map directly onto bucket paths.

use std::path::Path;

/// Port trait for local filesystem operations
#[async_trait::async_trait]
pub trait ILocalFileSystem: Send + Sync {
    /// Enumerates regular files under `base_dir` matching `pattern`
    ///
    /// # Arguments
    /// * `base_dir` - Directory the pattern is evaluated against
    /// * `pattern` - Glob pattern such as `**/*`
    ///
    /// # Returns
    /// Relative, `/`-separated file paths in a stable order. Directories
    /// are never returned.
    async fn glob(&self, base_dir: &Path, pattern: &str) -> anyhow::Result<Vec<String>>;

    /// Reads the entire contents of a file
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be read
    async fn read_file(&self, path: &Path) -> anyhow::Result<Vec<u8>>;
}
