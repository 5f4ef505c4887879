//! HttpBucketStore - IBucketStore implementation for the store's HTTP gateway
//!
//! Wraps the [`BucketClient`] and delegates to the auth, client and paths
//! modules to fulfil the [`IBucketStore`] port contract.
//!
//! ## Design Notes
//!
//! - No interior mutability: the session travels with every call, so the
//!   provider holds nothing but the client.
//! - Classified [`StoreError`](crate::StoreError)s are wrapped with
//!   `anyhow::Context` here and can be recovered with `downcast_ref`.

use std::time::Duration;

use anyhow::{Context, Result};
use bucketsync_core::config::StoreConfig;
use bucketsync_core::domain::{BucketKey, BucketName, BucketPath, RootToken, ThreadId};
use bucketsync_core::ports::{
    BucketInfo, Credentials, IBucketStore, PathListing, PushContent, Session,
};
use tracing::{debug, instrument};

use crate::auth;
use crate::client::BucketClient;
use crate::paths;

/// Bucket store reached through the HTTP gateway
#[derive(Debug, Clone)]
pub struct HttpBucketStore {
    client: BucketClient,
}

impl HttpBucketStore {
    /// Creates a store over an existing client
    pub fn new(client: BucketClient) -> Self {
        Self { client }
    }

    /// Creates a store for the gateway named in the configuration
    ///
    /// # Errors
    /// Fails if the configured URL is unusable or the HTTP client can't be built.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let client = BucketClient::new(
            &config.api_url,
            Duration::from_secs(config.request_timeout_secs),
        )
        .with_context(|| format!("Failed to create client for {}", config.api_url))?;
        Ok(Self::new(client))
    }
}

#[async_trait::async_trait]
impl IBucketStore for HttpBucketStore {
    #[instrument(skip_all, fields(thread = %thread))]
    async fn establish(&self, credentials: &Credentials, thread: &ThreadId) -> Result<Session> {
        auth::establish(&self.client, credentials, thread).await
    }

    async fn list_buckets(&self, session: &Session) -> Result<Vec<BucketInfo>> {
        let buckets = self
            .client
            .list_buckets(session)
            .await
            .context("Failed to list buckets")?;
        debug!(count = buckets.len(), "Listed buckets");
        Ok(buckets)
    }

    async fn create_bucket(&self, session: &Session, name: &BucketName) -> Result<Option<BucketKey>> {
        self.client
            .create_bucket(session, name)
            .await
            .with_context(|| format!("Failed to create bucket {name}"))
    }

    async fn remove_bucket(&self, session: &Session, key: &BucketKey) -> Result<()> {
        self.client
            .remove_bucket(session, key)
            .await
            .with_context(|| format!("Failed to remove bucket {key}"))
    }

    async fn list_path(
        &self,
        session: &Session,
        key: &BucketKey,
        path: Option<&BucketPath>,
    ) -> Result<PathListing> {
        paths::list_path(&self.client, session, key, path)
            .await
            .with_context(|| {
                format!(
                    "Failed to list {}",
                    path.map(BucketPath::as_str).unwrap_or("/")
                )
            })
    }

    async fn push_path(
        &self,
        session: &Session,
        key: &BucketKey,
        content: PushContent,
        precondition: Option<&RootToken>,
    ) -> Result<Option<RootToken>> {
        let path = content.path.clone();
        let root = paths::push_path(&self.client, session, key, content, precondition)
            .await
            .with_context(|| format!("Failed to push {path}"))?;
        debug!(path = %path, root = ?root.as_ref().map(RootToken::as_str), "Pushed path");
        Ok(root)
    }

    async fn remove_path(&self, session: &Session, key: &BucketKey, path: &BucketPath) -> Result<()> {
        paths::remove_path(&self.client, session, key, path)
            .await
            .with_context(|| format!("Failed to remove {path}"))
    }
}
