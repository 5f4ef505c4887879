//! Remote tree traversal
//!
//! [`RemoteTreeFetcher`] lists a bucket directory by directory until every
//! entry has been seen, producing the snapshot the orphan tracker is built
//! from. Traversal is depth-first with an explicit work stack and issues one
//! list call per directory.

use std::time::Duration;

use bucketsync_core::domain::{BucketKey, BucketPath};
use bucketsync_core::ports::{IBucketStore, Session, SEED_FILE_NAME};
use tracing::{debug, instrument};

use crate::{bounded, SyncError};

/// Flat snapshot of a bucket's contents
///
/// Both lists are in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteTree {
    /// Every file path
    pub files: Vec<BucketPath>,
    /// Every directory path
    pub dirs: Vec<BucketPath>,
}

/// Walks a bucket exhaustively through the store port
pub struct RemoteTreeFetcher<'a> {
    store: &'a dyn IBucketStore,
    call_timeout: Duration,
}

impl<'a> RemoteTreeFetcher<'a> {
    /// Creates a fetcher bounding each list call by `call_timeout`
    pub fn new(store: &'a dyn IBucketStore, call_timeout: Duration) -> Self {
        Self {
            store,
            call_timeout,
        }
    }

    /// Lists the whole bucket
    ///
    /// The store's seed file is skipped at every level.
    ///
    /// # Errors
    /// The first failing list call aborts the walk.
    #[instrument(skip(self, session, key), fields(bucket = %key))]
    pub async fn fetch(&self, session: &Session, key: &BucketKey) -> Result<RemoteTree, SyncError> {
        let mut tree = RemoteTree::default();
        let mut pending = self.list_children(session, key, None, &mut tree).await?;

        while let Some(dir) = pending.pop() {
            let subdirs = self.list_children(session, key, Some(&dir), &mut tree).await?;
            pending.extend(subdirs);
        }

        debug!(
            files = tree.files.len(),
            dirs = tree.dirs.len(),
            "Remote tree fetched"
        );
        Ok(tree)
    }

    /// Lists one directory, records its children and returns the subdirectories
    async fn list_children(
        &self,
        session: &Session,
        key: &BucketKey,
        dir: Option<&BucketPath>,
        tree: &mut RemoteTree,
    ) -> Result<Vec<BucketPath>, SyncError> {
        let listing = bounded(
            "list path",
            self.call_timeout,
            self.store.list_path(session, key, dir),
        )
        .await?;

        let parent = dir.map(BucketPath::as_str).unwrap_or_default();
        let mut subdirs = Vec::new();
        for item in listing.items {
            if item.name == SEED_FILE_NAME {
                continue;
            }
            let path = BucketPath::new(format!("{parent}/{}", item.name))?;
            if item.is_dir {
                tree.dirs.push(path.clone());
                subdirs.push(path);
            } else {
                tree.files.push(path);
            }
        }
        Ok(subdirs)
    }
}
