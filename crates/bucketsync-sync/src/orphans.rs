//! Orphan tracking for remote cleanup
//!
//! The [`OrphanTracker`] holds a snapshot of the remote tree and is told
//! about every file that is about to be uploaded. Whatever remains flagged
//! afterwards exists remotely but not locally, and [`OrphanTracker::deletes`]
//! turns that into the smallest set of recursive deletions.
//!
//! ## Model
//!
//! Every remote path is a node in a prefix tree, flagged as a `folder`, a
//! `leaf`, or neither (intermediate node). Marking a leaf present clears its
//! leaf flag and the folder flag of every ancestor. A folder that is still
//! flagged therefore has no present file anywhere beneath it and can be
//! deleted as a whole, without listing its contents.
//!
//! A path may change type between runs. An uploaded file never leaves its own
//! node flagged as a folder, and none of its ancestors stays flagged as
//! either kind.

use std::collections::BTreeMap;

use bucketsync_core::domain::{BucketPath, DomainError};

use crate::tree::RemoteTree;

#[derive(Debug, Default, Clone)]
struct Node {
    children: BTreeMap<String, Node>,
    /// Set once the node is flagged as a folder or a leaf
    path: Option<BucketPath>,
    folder: bool,
    leaf: bool,
}

/// Snapshot of remote folders and files, reduced by local presence
#[derive(Debug, Default, Clone)]
pub struct OrphanTracker {
    root: Node,
}

impl OrphanTracker {
    /// Creates a tracker from remote folder and file paths
    ///
    /// Both sets may be empty.
    pub fn new<F, L>(folders: F, leafs: L) -> Self
    where
        F: IntoIterator<Item = BucketPath>,
        L: IntoIterator<Item = BucketPath>,
    {
        let mut tracker = Self::default();
        for folder in folders {
            let node = tracker.node_mut(&folder);
            node.folder = true;
            node.path = Some(folder);
        }
        for leaf in leafs {
            let node = tracker.node_mut(&leaf);
            node.leaf = true;
            node.path = Some(leaf);
        }
        tracker
    }

    /// Creates a tracker from a fetched remote tree
    pub fn from_tree(tree: &RemoteTree) -> Self {
        Self::new(tree.dirs.iter().cloned(), tree.files.iter().cloned())
    }

    /// Marks `path` as present locally
    ///
    /// If `path` is a known leaf it stops being an orphan, and so does every
    /// folder above it. Unknown paths leave the tracker untouched. Calling
    /// this twice with the same path has the same effect as calling it once.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPath` if `path` is not an absolute bucket
    /// path. The tracker is not modified in that case.
    pub fn remove(&mut self, path: &str) -> Result<(), DomainError> {
        let path = BucketPath::new(path.to_string())?;
        self.mark_present(&path);
        Ok(())
    }

    /// Typed form of [`OrphanTracker::remove`]
    ///
    /// # Returns
    /// `true` if `path` was a known leaf
    pub fn mark_present(&mut self, path: &BucketPath) -> bool {
        let known = match self.find_mut(path) {
            Some(node) if node.leaf => {
                node.leaf = false;
                true
            }
            _ => false,
        };
        if known {
            self.keep_ancestors(path);
        }
        known
    }

    /// Protects the nodes an upload of `path` lands in
    ///
    /// Every strict ancestor loses both flags: it is a directory locally, even
    /// if the remote tree holds a file there. The node of `path` itself loses
    /// its folder flag, so a remote folder replaced by a file is not deleted
    /// after the upload; its old children stay flagged.
    pub fn keep_ancestors(&mut self, path: &BucketPath) {
        let mut segments = path.segments().peekable();
        let mut node = &mut self.root;
        while let Some(segment) = segments.next() {
            let Some(child) = node.children.get_mut(segment) else {
                return;
            };
            child.folder = false;
            if segments.peek().is_some() {
                child.leaf = false;
            }
            node = child;
        }
    }

    /// Computes the minimal set of recursive deletions
    ///
    /// Returns orphaned files that are not inside an orphaned folder, followed
    /// by the top-most orphaned folder of each branch, shortest path first.
    /// Nothing beneath a returned folder is returned separately.
    pub fn deletes(&self) -> Vec<BucketPath> {
        let mut leafs = Vec::new();
        let mut folders = Vec::new();
        collect_orphans(&self.root, &mut leafs, &mut folders);
        folders.sort_by_key(|folder| folder.as_str().len());
        leafs.extend(folders);
        leafs
    }

    /// Number of folders still flagged as orphans
    pub fn folder_count(&self) -> usize {
        count_flagged(&self.root, |n| n.folder)
    }

    /// Number of files still flagged as orphans
    pub fn leaf_count(&self) -> usize {
        count_flagged(&self.root, |n| n.leaf)
    }

    fn node_mut(&mut self, path: &BucketPath) -> &mut Node {
        let mut node = &mut self.root;
        for segment in path.segments() {
            node = node.children.entry(segment.to_string()).or_default();
        }
        node
    }

    fn find_mut(&mut self, path: &BucketPath) -> Option<&mut Node> {
        let mut node = &mut self.root;
        for segment in path.segments() {
            node = node.children.get_mut(segment)?;
        }
        Some(node)
    }
}

fn collect_orphans(node: &Node, leafs: &mut Vec<BucketPath>, folders: &mut Vec<BucketPath>) {
    for child in node.children.values() {
        if child.folder {
            // Deleting the folder removes everything below it.
            if let Some(path) = &child.path {
                folders.push(path.clone());
            }
            continue;
        }
        if child.leaf {
            if let Some(path) = &child.path {
                leafs.push(path.clone());
            }
        }
        collect_orphans(child, leafs, folders);
    }
}

fn count_flagged(node: &Node, flag: fn(&Node) -> bool) -> usize {
    node.children
        .values()
        .map(|child| usize::from(flag(child)) + count_flagged(child, flag))
        .sum()
}
