//! Property tests for the orphan tracker against a brute-force model
//!
//! Remote and local trees are drawn from a small path space so overlaps are
//! frequent. File and directory names share an alphabet, so a path can be a
//! file on one side and a directory on the other. The model replays the
//! uploads and the returned deletions on the remote file set and checks the
//! outcome file by file.

use std::collections::BTreeSet;

use bucketsync_core::domain::BucketPath;
use bucketsync_sync::OrphanTracker;
use proptest::prelude::*;

fn file_path() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(prop::sample::select(vec!["a", "b", "c"]), 0..3),
        prop::sample::select(vec!["a", "b", "f"]),
    )
        .prop_map(|(dirs, file)| {
            let mut path = String::new();
            for dir in dirs {
                path.push('/');
                path.push_str(dir);
            }
            path.push('/');
            path.push_str(file);
            path
        })
}

/// A set of files that can coexist: no file sits beneath another one
fn file_tree(max: usize) -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set(file_path(), 0..max).prop_map(|files| {
        files
            .iter()
            .filter(|f| !files.iter().any(|other| other != *f && is_under(other, f)))
            .cloned()
            .collect()
    })
}

fn bucket_path(raw: &str) -> BucketPath {
    BucketPath::new(raw.to_string()).unwrap()
}

/// Every strict ancestor directory of every file
fn ancestor_dirs(files: &BTreeSet<String>) -> BTreeSet<String> {
    files
        .iter()
        .flat_map(|f| bucket_path(f).ancestors().map(String::from).collect::<Vec<_>>())
        .collect()
}

fn is_under(path: &str, deleted: &str) -> bool {
    path == deleted || path.starts_with(&format!("{deleted}/"))
}

/// Whether any local file lives beneath `dir`
fn has_local_below(dir: &str, local: &BTreeSet<String>) -> bool {
    local.iter().any(|l| l.starts_with(&format!("{dir}/")))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Replaying the deletions after the uploads leaves exactly the local tree
    #[test]
    fn deletes_leave_exactly_local_files(
        remote in file_tree(12),
        local in file_tree(12),
    ) {
        let dirs = ancestor_dirs(&remote);
        let mut tracker = OrphanTracker::new(
            dirs.iter().map(|d| bucket_path(d)),
            remote.iter().map(|f| bucket_path(f)),
        );
        for file in &local {
            let path = bucket_path(file);
            tracker.mark_present(&path);
            tracker.keep_ancestors(&path);
        }
        let deletes: Vec<String> = tracker.deletes().into_iter().map(String::from).collect();

        // An upload replaces a remote file sitting where the new file needs a
        // directory, and a remote directory sitting where the new file goes.
        let after_upload: BTreeSet<String> = remote
            .iter()
            .filter(|r| !local.iter().any(|l| is_under(l, r) || is_under(r, l)))
            .chain(local.iter())
            .cloned()
            .collect();
        let survivors: BTreeSet<String> = after_upload
            .into_iter()
            .filter(|f| !deletes.iter().any(|d| is_under(f, d)))
            .collect();
        prop_assert_eq!(&survivors, &local);

        // No deletion is implied by another one
        for (i, a) in deletes.iter().enumerate() {
            for (j, b) in deletes.iter().enumerate() {
                if i != j {
                    prop_assert!(!is_under(a, b), "{} is covered by {}", a, b);
                }
            }
        }

        // Folders are collapsed as high as possible
        for d in &deletes {
            let path = bucket_path(d);
            if let Some(parent) = path.parent() {
                let parent = String::from(parent);
                prop_assert!(
                    !dirs.contains(&parent)
                        || has_local_below(&parent, &local)
                        || local.contains(&parent),
                    "{} should have been collapsed into {}",
                    d,
                    parent
                );
            }
        }
    }

    /// With only known files marked, `remove` alone upholds the same outcome
    #[test]
    fn remove_alone_suffices_for_known_files(
        (remote, local) in file_tree(12)
            .prop_flat_map(|remote| {
                let items: Vec<String> = remote.iter().cloned().collect();
                let len = items.len();
                (Just(remote), prop::sample::subsequence(items, 0..=len))
            }),
    ) {
        let local: BTreeSet<String> = local.into_iter().collect();
        let mut tracker = OrphanTracker::new(
            ancestor_dirs(&remote).iter().map(|d| bucket_path(d)),
            remote.iter().map(|f| bucket_path(f)),
        );
        for file in &local {
            tracker.remove(file).unwrap();
        }
        let deletes: Vec<String> = tracker.deletes().into_iter().map(String::from).collect();

        let survivors: BTreeSet<String> = remote
            .iter()
            .filter(|f| !deletes.iter().any(|d| is_under(f, d)))
            .cloned()
            .collect();
        prop_assert_eq!(survivors, local);
    }

    /// Marking the same file twice changes nothing
    #[test]
    fn remove_is_idempotent(
        remote in file_tree(12).prop_filter("needs a file", |r| !r.is_empty()),
        pick in any::<prop::sample::Index>(),
    ) {
        let files: Vec<&String> = remote.iter().collect();
        let chosen = pick.get(&files);
        let mut tracker = OrphanTracker::new(
            ancestor_dirs(&remote).iter().map(|d| bucket_path(d)),
            remote.iter().map(|f| bucket_path(f)),
        );
        tracker.remove(chosen).unwrap();
        let once = tracker.deletes();
        tracker.remove(chosen).unwrap();
        prop_assert_eq!(once, tracker.deletes());
    }
}
