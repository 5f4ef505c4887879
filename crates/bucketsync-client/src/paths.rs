//! Path operations inside a bucket
//!
//! Provides functions for working with the contents of one bucket:
//! - [`list_path`] - Lists one directory and reports the bucket root
//! - [`push_path`] - Streams a file's chunks to a path
//! - [`remove_path`] - Removes a file or a whole directory
//!
//! Paths map onto `/buckets/{key}/path/{segments...}`; the bucket root is
//! `/buckets/{key}/path/`.

use bucketsync_core::domain::{BucketKey, BucketPath, RootToken};
use bucketsync_core::ports::{PathItem, PathListing, PushContent, Session};
use futures_util::stream;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Body, Method};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::client::{BucketClient, RootResponse};
use crate::StoreError;

/// Header carrying the root a push expects the bucket to be at
pub const ROOT_HEADER: &str = "X-Bucket-Root";

// ============================================================================
// Gateway response types
// ============================================================================

/// Response from `GET /buckets/{key}/path/{path}`
#[derive(Debug, Deserialize)]
struct ListPathResponse {
    root: Option<RootResponse>,
    item: Option<ListedItem>,
}

/// The listed directory
#[derive(Debug, Deserialize)]
struct ListedItem {
    #[serde(default)]
    items: Vec<ListedEntry>,
}

/// One child of the listed directory
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListedEntry {
    name: String,
    #[serde(default)]
    is_dir: bool,
}

/// Response from `PUT /buckets/{key}/path/{path}`
#[derive(Debug, Deserialize)]
struct PushPathResponse {
    root: Option<RootResponse>,
}

fn path_url(
    client: &BucketClient,
    key: &BucketKey,
    path: Option<&BucketPath>,
) -> Result<Url, StoreError> {
    let mut segments = vec!["buckets", key.as_str(), "path"];
    match path {
        Some(path) => segments.extend(path.segments()),
        None => segments.push(""),
    }
    client.url(&segments)
}

/// Lists the direct children of a directory
///
/// # Arguments
/// * `path` - Directory to list, `None` for the bucket root
///
/// # Returns
/// The children in gateway order together with the bucket's current root.
pub async fn list_path(
    client: &BucketClient,
    session: &Session,
    key: &BucketKey,
    path: Option<&BucketPath>,
) -> Result<PathListing, StoreError> {
    let url = path_url(client, key, path)?;
    debug!(bucket = %key, path = url.path(), "Listing path");

    let response = BucketClient::send(client.authorized(Method::GET, url, session)).await?;
    let listing: ListPathResponse = BucketClient::json(response).await?;

    let items = listing
        .item
        .map(|item| item.items)
        .unwrap_or_default()
        .into_iter()
        .map(|entry| PathItem {
            name: entry.name,
            is_dir: entry.is_dir,
        })
        .collect();

    Ok(PathListing {
        root: RootResponse::into_token(listing.root)?,
        items,
    })
}

/// Uploads a file as a streamed body of its chunks
///
/// When `precondition` is set it is sent in [`ROOT_HEADER`] and the gateway
/// rejects the write with a conflict if the bucket has moved on.
///
/// # Returns
/// The bucket root after the write, if the gateway reported one
pub async fn push_path(
    client: &BucketClient,
    session: &Session,
    key: &BucketKey,
    content: PushContent,
    precondition: Option<&RootToken>,
) -> Result<Option<RootToken>, StoreError> {
    let url = path_url(client, key, Some(&content.path))?;
    debug!(
        bucket = %key,
        path = %content.path,
        bytes = content.total_len(),
        chunks = content.chunks.len(),
        "Pushing path"
    );

    let chunks = stream::iter(content.chunks.into_iter().map(Ok::<_, std::io::Error>));
    let mut request = client
        .authorized(Method::PUT, url, session)
        .header(CONTENT_TYPE, "application/octet-stream")
        .body(Body::wrap_stream(chunks));
    if let Some(root) = precondition {
        request = request.header(ROOT_HEADER, root.as_str());
    }

    let response = BucketClient::send(request).await?;
    let pushed: PushPathResponse = BucketClient::json(response).await?;
    RootResponse::into_token(pushed.root)
}

/// Removes a file, or a directory with everything below it
pub async fn remove_path(
    client: &BucketClient,
    session: &Session,
    key: &BucketKey,
    path: &BucketPath,
) -> Result<(), StoreError> {
    let url = path_url(client, key, Some(path))?;
    debug!(bucket = %key, path = %path, "Removing path");
    BucketClient::send(client.authorized(Method::DELETE, url, session)).await?;
    Ok(())
}
