//! Shared fixtures: an in-memory bucket store and local tree helpers

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bucketsync_core::config::{Config, ConfigBuilder};
use bucketsync_core::domain::{BucketKey, BucketName, BucketPath, RootToken, ThreadId};
use bucketsync_core::ports::{
    BucketInfo, Credentials, IBucketStore, PathItem, PathListing, PushContent, Session,
    SEED_FILE_NAME,
};
use bucketsync_sync::filesystem::LocalFileSystemAdapter;
use bucketsync_sync::SyncEngine;
use tempfile::TempDir;

#[derive(Default)]
pub(crate) struct State {
    /// (name, key) in listing order
    buckets: Vec<(String, String)>,
    /// key -> file path -> content
    files: HashMap<String, BTreeMap<String, Vec<u8>>>,
    /// key -> write counter, part of the root token
    versions: HashMap<String, u64>,
    calls: Vec<String>,
    tokens: Vec<String>,
    /// (path, precondition) per push
    pushes: Vec<(String, Option<String>)>,
    /// Root returned by each push
    returned_roots: Vec<String>,
    created_names: Vec<String>,
    next_key: u32,
}

impl State {
    fn root(&self, key: &str) -> String {
        format!("root-{key}-{}", self.versions.get(key).copied().unwrap_or(0))
    }
}

/// In-memory [`IBucketStore`] that records every call
///
/// Pushes are rejected when their precondition doesn't match the current
/// root, like the real store does.
#[derive(Default)]
pub struct MemoryStore {
    pub(crate) state: Mutex<State>,
    /// Operation name (e.g. `list_buckets`) that never completes
    pub hang_on: Option<&'static str>,
    /// Path whose push fails
    pub fail_push_at: Option<&'static str>,
    /// Directory whose listing fails
    pub fail_list_at: Option<&'static str>,
    /// Accept bucket creation but return no key
    pub reject_create: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bucket with the given files and returns its key
    pub fn seed_bucket(&self, name: &str, files: &[&str]) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_key += 1;
        let key = format!("bucket-{}", state.next_key);
        state.buckets.push((name.to_string(), key.clone()));
        let contents = files
            .iter()
            .map(|f| (f.to_string(), b"remote".to_vec()))
            .collect();
        state.files.insert(key.clone(), contents);
        key
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn files(&self, key: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .files
            .get(key)
            .map(|f| f.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn content(&self, key: &str, path: &str) -> Option<Vec<u8>> {
        let state = self.state.lock().unwrap();
        state.files.get(key).and_then(|f| f.get(path).cloned())
    }

    pub fn bucket_names(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.buckets.iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn created_names(&self) -> Vec<String> {
        self.state.lock().unwrap().created_names.clone()
    }

    pub fn tokens(&self) -> Vec<String> {
        self.state.lock().unwrap().tokens.clone()
    }

    pub fn pushes(&self) -> Vec<(String, Option<String>)> {
        self.state.lock().unwrap().pushes.clone()
    }

    pub fn returned_roots(&self) -> Vec<String> {
        self.state.lock().unwrap().returned_roots.clone()
    }

    pub fn root(&self, key: &str) -> String {
        self.state.lock().unwrap().root(key)
    }

    async fn enter(&self, operation: &'static str, call: String, session: Option<&Session>) {
        {
            let mut state = self.state.lock().unwrap();
            state.calls.push(call);
            if let Some(session) = session {
                state.tokens.push(session.token.clone());
            }
        }
        if self.hang_on == Some(operation) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
    }
}

#[async_trait::async_trait]
impl IBucketStore for MemoryStore {
    async fn establish(
        &self,
        credentials: &Credentials,
        thread: &ThreadId,
    ) -> anyhow::Result<Session> {
        self.enter("establish", "establish".to_string(), None).await;
        let token = credentials
            .reusable_session()
            .map(str::to_string)
            .unwrap_or_else(|| format!("derived-{}", credentials.key));
        Ok(Session {
            token,
            thread: thread.clone(),
            expires_at: None,
        })
    }

    async fn list_buckets(&self, session: &Session) -> anyhow::Result<Vec<BucketInfo>> {
        self.enter("list_buckets", "list_buckets".to_string(), Some(session))
            .await;
        let state = self.state.lock().unwrap();
        state
            .buckets
            .iter()
            .map(|(name, key)| -> anyhow::Result<BucketInfo> {
                Ok(BucketInfo {
                    name: name.clone(),
                    key: BucketKey::new(key.clone())?,
                })
            })
            .collect()
    }

    async fn create_bucket(
        &self,
        session: &Session,
        name: &BucketName,
    ) -> anyhow::Result<Option<BucketKey>> {
        self.enter("create_bucket", format!("create_bucket:{name}"), Some(session))
            .await;
        let mut state = self.state.lock().unwrap();
        state.created_names.push(name.to_string());
        if self.reject_create {
            return Ok(None);
        }
        state.next_key += 1;
        let key = format!("bucket-{}", state.next_key);
        state.buckets.push((name.to_string(), key.clone()));
        state.files.insert(key.clone(), BTreeMap::new());
        Ok(Some(BucketKey::new(key)?))
    }

    async fn remove_bucket(&self, session: &Session, key: &BucketKey) -> anyhow::Result<()> {
        self.enter("remove_bucket", format!("remove_bucket:{key}"), Some(session))
            .await;
        let mut state = self.state.lock().unwrap();
        state.buckets.retain(|(_, k)| k != key.as_str());
        state.files.remove(key.as_str());
        Ok(())
    }

    async fn list_path(
        &self,
        session: &Session,
        key: &BucketKey,
        path: Option<&BucketPath>,
    ) -> anyhow::Result<PathListing> {
        let dir = path.map(BucketPath::as_str).unwrap_or("/");
        self.enter("list_path", format!("list_path:{dir}"), Some(session))
            .await;
        if self.fail_list_at == Some(dir) {
            anyhow::bail!("listing {dir} failed");
        }

        let state = self.state.lock().unwrap();
        let files = state
            .files
            .get(key.as_str())
            .ok_or_else(|| anyhow::anyhow!("no such bucket"))?;
        let prefix = match path {
            Some(p) => format!("{}/", p.as_str()),
            None => "/".to_string(),
        };

        let mut children: BTreeMap<String, bool> = BTreeMap::new();
        if path.is_none() {
            children.insert(SEED_FILE_NAME.to_string(), false);
        }
        for file in files.keys() {
            if let Some(rest) = file.strip_prefix(&prefix) {
                match rest.split_once('/') {
                    Some((dir_name, _)) => children.insert(dir_name.to_string(), true),
                    None => children.insert(rest.to_string(), false),
                };
            }
        }

        Ok(PathListing {
            root: Some(RootToken::new(state.root(key.as_str()))?),
            items: children
                .into_iter()
                .map(|(name, is_dir)| PathItem { name, is_dir })
                .collect(),
        })
    }

    async fn push_path(
        &self,
        session: &Session,
        key: &BucketKey,
        content: PushContent,
        precondition: Option<&RootToken>,
    ) -> anyhow::Result<Option<RootToken>> {
        let path = content.path.to_string();
        self.enter("push_path", format!("push_path:{path}"), Some(session))
            .await;
        if self.fail_push_at == Some(path.as_str()) {
            anyhow::bail!("push of {path} failed");
        }

        let mut state = self.state.lock().unwrap();
        state
            .pushes
            .push((path.clone(), precondition.map(|r| r.to_string())));
        let current = state.root(key.as_str());
        if let Some(expected) = precondition {
            if expected.as_str() != current {
                anyhow::bail!("precondition failed: bucket is at {current}");
            }
        }

        let bytes = content.chunks.concat();
        let files = state
            .files
            .get_mut(key.as_str())
            .ok_or_else(|| anyhow::anyhow!("no such bucket"))?;
        // A path is either a file or a directory: the push replaces whichever
        // entries are in its way.
        let nested = format!("{path}/");
        files.retain(|existing, _| {
            !nested.starts_with(&format!("{existing}/")) && !existing.starts_with(&nested)
        });
        files.insert(path, bytes);
        *state.versions.entry(key.to_string()).or_default() += 1;
        let root = state.root(key.as_str());
        state.returned_roots.push(root.clone());
        Ok(Some(RootToken::new(root)?))
    }

    async fn remove_path(
        &self,
        session: &Session,
        key: &BucketKey,
        path: &BucketPath,
    ) -> anyhow::Result<()> {
        self.enter("remove_path", format!("remove_path:{path}"), Some(session))
            .await;
        let mut state = self.state.lock().unwrap();
        let nested = format!("{}/", path.as_str());
        if let Some(files) = state.files.get_mut(key.as_str()) {
            files.retain(|f, _| f != path.as_str() && !f.starts_with(&nested));
        }
        *state.versions.entry(key.to_string()).or_default() += 1;
        Ok(())
    }
}

/// Builder preloaded with valid credentials and `dir` as the source
pub fn config_for(dir: &Path) -> ConfigBuilder {
    ConfigBuilder::new()
        .store_key("key")
        .store_secret("secret")
        .store_thread("thread")
        .bucket_name("site")
        .source_path(dir.to_path_buf())
}

pub fn engine(store: &Arc<MemoryStore>, config: &Config) -> SyncEngine {
    SyncEngine::new(
        store.clone(),
        Arc::new(LocalFileSystemAdapter::new()),
        config,
    )
}

/// Creates a temporary source tree with the given files
pub fn local_tree(files: &[(&str, &[u8])]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (relative, content) in files {
        let path = dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }
    dir
}

/// Calls of one kind, without the operation prefix
pub fn calls_of(store: &MemoryStore, operation: &str) -> Vec<String> {
    let prefix = format!("{operation}:");
    store
        .calls()
        .into_iter()
        .filter_map(|c| c.strip_prefix(&prefix).map(str::to_string))
        .collect()
}
