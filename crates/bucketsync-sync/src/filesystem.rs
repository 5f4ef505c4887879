//! Local filesystem adapter (secondary/driven adapter)
//!
//! Implements [`ILocalFileSystem`] using `tokio::fs` for reads and the
//! `glob` crate for enumeration.
//!
//! ## Design Decisions
//!
//! - **Files only**: directories matched by the pattern are dropped, so a
//!   pattern like `**/*` yields exactly the files to upload.
//! - **Hidden entries**: a leading `.` must appear literally in the pattern
//!   to match, so dotfiles and dot-directories are skipped by `**/*`.
//! - **Stable order**: results are sorted, which fixes the upload order.
//! - **Missing base**: a base directory that doesn't exist enumerates as
//!   empty rather than failing, leaving the caller to report "no files".

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use bucketsync_core::ports::local_filesystem::ILocalFileSystem;
use glob::MatchOptions;
use tracing::{debug, instrument};

/// Adapter that bridges the [`ILocalFileSystem`] port to the real filesystem.
///
/// This is a zero-sized struct because all operations derive their context
/// from their arguments.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystemAdapter;

impl LocalFileSystemAdapter {
    /// Create a new `LocalFileSystemAdapter`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Enumerates matching regular files as sorted, `/`-separated relative paths
fn glob_files(base_dir: &Path, pattern: &str) -> anyhow::Result<Vec<String>> {
    let base = match std::fs::canonicalize(base_dir) {
        Ok(base) => base,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to resolve {}", base_dir.display()))
        }
    };

    let full_pattern = format!(
        "{}/{}",
        glob::Pattern::escape(&base.to_string_lossy()),
        pattern.trim_start_matches('/')
    );

    let mut files = Vec::new();
    for entry in glob::glob_with(&full_pattern, MATCH_OPTIONS)
        .with_context(|| format!("Invalid glob pattern: {pattern}"))?
    {
        let path = entry.context("Failed to read directory entry")?;
        if !path.is_file() {
            continue;
        }
        files.push(relative_slash_path(&base, &path)?);
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn relative_slash_path(base: &Path, path: &Path) -> anyhow::Result<String> {
    let relative = path
        .strip_prefix(base)
        .with_context(|| format!("{} is outside {}", path.display(), base.display()))?;

    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_string_lossy().into_owned()),
            Component::CurDir => {}
            other => anyhow::bail!("Unexpected path component {other:?} in {}", path.display()),
        }
    }
    Ok(segments.join("/"))
}

#[async_trait::async_trait]
impl ILocalFileSystem for LocalFileSystemAdapter {
    #[instrument(skip(self, base_dir), fields(base = %base_dir.display()))]
    async fn glob(&self, base_dir: &Path, pattern: &str) -> anyhow::Result<Vec<String>> {
        let base: PathBuf = base_dir.to_path_buf();
        let owned_pattern = pattern.to_string();
        let files = tokio::task::spawn_blocking(move || glob_files(&base, &owned_pattern))
            .await
            .context("File enumeration task failed")??;
        debug!(count = files.len(), "enumerated local files");
        Ok(files)
    }

    #[instrument(skip(self, path), fields(path = %path.display()))]
    async fn read_file(&self, path: &Path) -> anyhow::Result<Vec<u8>> {
        debug!("reading file");
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        debug!(bytes = data.len(), "file read complete");
        Ok(data)
    }
}
