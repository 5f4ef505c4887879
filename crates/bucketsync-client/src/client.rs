//! Bucket store HTTP client
//!
//! Provides a typed HTTP client for the store's gateway. Handles the
//! session headers, URL construction from path segments, status
//! classification and JSON decoding.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use bucketsync_client::client::BucketClient;
//! use bucketsync_core::domain::ThreadId;
//! use bucketsync_core::ports::Session;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = BucketClient::new("https://api.hub.textile.io", Duration::from_secs(60))?;
//! let session = Session {
//!     token: "session-token".to_string(),
//!     thread: ThreadId::new("thread-id".to_string())?,
//!     expires_at: None,
//! };
//! for bucket in client.list_buckets(&session).await? {
//!     println!("{} ({})", bucket.name, bucket.key);
//! }
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use bucketsync_core::config::DEFAULT_REQUEST_TIMEOUT_SECS;
use bucketsync_core::domain::{BucketKey, BucketName, RootToken};
use bucketsync_core::ports::{BucketInfo, Session};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::StoreError;

/// Header naming the thread every bucket call is scoped to
pub const THREAD_HEADER: &str = "X-Thread-Id";

// ============================================================================
// Gateway response types
// ============================================================================

/// Bucket root as reported by the gateway
///
/// `path` is the content address of the bucket's current head and doubles
/// as the root token for push preconditions.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RootResponse {
    pub(crate) key: Option<String>,
    #[allow(dead_code)]
    pub(crate) name: Option<String>,
    pub(crate) path: Option<String>,
}

impl RootResponse {
    /// Extracts the root token, treating a missing or empty path as none
    pub(crate) fn into_token(root: Option<Self>) -> Result<Option<RootToken>, StoreError> {
        root.and_then(|r| r.path)
            .filter(|p| !p.trim().is_empty())
            .map(RootToken::new)
            .transpose()
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))
    }
}

/// Response from `GET /buckets`
#[derive(Debug, Deserialize)]
struct ListBucketsResponse {
    #[serde(default)]
    buckets: Vec<BucketEntry>,
}

#[derive(Debug, Deserialize)]
struct BucketEntry {
    #[serde(default)]
    name: String,
    key: String,
}

#[derive(Debug, Serialize)]
struct CreateBucketRequest<'a> {
    name: &'a str,
}

/// Response from `POST /buckets`
#[derive(Debug, Deserialize)]
struct CreateBucketResponse {
    root: Option<RootResponse>,
}

// ============================================================================
// BucketClient
// ============================================================================

/// HTTP client for bucket store gateway calls
///
/// Wraps `reqwest::Client` with the gateway base URL. Calls take the
/// [`Session`] explicitly, so one client serves any number of sessions.
#[derive(Debug, Clone)]
pub struct BucketClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for API requests
    base_url: Url,
}

impl BucketClient {
    /// Creates a client for the gateway at `base_url`
    ///
    /// # Arguments
    /// * `base_url` - Gateway URL; a path prefix is kept
    /// * `timeout` - Upper bound for connecting and for each read; a long
    ///   transfer that keeps making progress is not cut off
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidEndpoint`] if the URL can't carry a path.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| StoreError::InvalidEndpoint(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(StoreError::InvalidEndpoint(base_url.to_string()));
        }

        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Creates a client with the default request timeout (useful for testing)
    pub fn with_base_url(base_url: &str) -> Result<Self, StoreError> {
        Self::new(base_url, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    /// Builds an endpoint URL by appending percent-encoded path segments
    ///
    /// An empty final segment produces a trailing slash.
    pub fn url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::InvalidEndpoint(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Creates an unauthenticated request builder
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Creates a request builder carrying the session token and thread
    pub fn authorized(&self, method: Method, url: Url, session: &Session) -> RequestBuilder {
        self.request(method, url)
            .bearer_auth(&session.token)
            .header(THREAD_HEADER, session.thread.as_str())
    }

    /// Sends a request, classifying any non-success status
    pub(crate) async fn send(request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "Gateway returned error status");
        Err(StoreError::from_status(status, &body))
    }

    /// Decodes a JSON response body
    pub(crate) async fn json<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::InvalidResponse(e.to_string()))
    }

    // ========================================================================
    // Bucket endpoints
    // ========================================================================

    /// Lists the buckets in the session's thread, in gateway order
    ///
    /// Makes `GET /buckets`.
    pub async fn list_buckets(&self, session: &Session) -> Result<Vec<BucketInfo>, StoreError> {
        debug!("Listing buckets");
        let url = self.url(&["buckets"])?;
        let response = Self::send(self.authorized(Method::GET, url, session)).await?;
        let listing: ListBucketsResponse = Self::json(response).await?;

        listing
            .buckets
            .into_iter()
            .map(|entry| {
                let key = BucketKey::new(entry.key)
                    .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
                Ok(BucketInfo {
                    name: entry.name,
                    key,
                })
            })
            .collect()
    }

    /// Creates a bucket and returns its key
    ///
    /// Makes `POST /buckets` with `{name}`.
    ///
    /// # Returns
    /// `None` when the gateway answers without a root, meaning the bucket
    /// was not created.
    pub async fn create_bucket(
        &self,
        session: &Session,
        name: &BucketName,
    ) -> Result<Option<BucketKey>, StoreError> {
        debug!(name = %name, "Creating bucket");
        let url = self.url(&["buckets"])?;
        let request = self
            .authorized(Method::POST, url, session)
            .json(&CreateBucketRequest {
                name: name.as_str(),
            });
        let response = Self::send(request).await?;
        let created: CreateBucketResponse = Self::json(response).await?;

        created
            .root
            .and_then(|root| root.key)
            .filter(|key| !key.trim().is_empty())
            .map(BucketKey::new)
            .transpose()
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))
    }

    /// Removes a bucket and everything in it
    ///
    /// Makes `DELETE /buckets/{key}`.
    pub async fn remove_bucket(&self, session: &Session, key: &BucketKey) -> Result<(), StoreError> {
        debug!(bucket = %key, "Removing bucket");
        let url = self.url(&["buckets", key.as_str()])?;
        Self::send(self.authorized(Method::DELETE, url, session)).await?;
        Ok(())
    }
}
