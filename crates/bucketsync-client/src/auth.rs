//! Session establishment
//!
//! A run authenticates once. Either the caller supplies a session token
//! that is used as-is, or an API key/secret pair is exchanged for a fresh
//! token through `POST /auth/session`.

use anyhow::{Context, Result};
use bucketsync_core::domain::ThreadId;
use bucketsync_core::ports::{Credentials, Session};
use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client::BucketClient;
use crate::StoreError;

/// Lifetime requested for derived sessions, in seconds
pub const SESSION_LIFETIME_SECS: i64 = 30 * 60;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionRequest<'a> {
    key: &'a str,
    secret: &'a str,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    token: String,
}

/// Wraps a caller-supplied session token
///
/// The expiry of a supplied token is unknown, so none is recorded.
pub fn reuse_session(token: &str, thread: &ThreadId) -> Session {
    Session {
        token: token.to_string(),
        thread: thread.clone(),
        expires_at: None,
    }
}

/// Exchanges an API key/secret pair for a session token
///
/// # Arguments
/// * `client` - Gateway client
/// * `key` - API key
/// * `secret` - API secret
/// * `thread` - Thread the session will address
///
/// # Returns
/// A session valid for [`SESSION_LIFETIME_SECS`]
pub async fn derive_session(
    client: &BucketClient,
    key: &str,
    secret: &str,
    thread: &ThreadId,
) -> Result<Session, StoreError> {
    let expires_at = Utc::now() + Duration::seconds(SESSION_LIFETIME_SECS);
    let url = client.url(&["auth", "session"])?;
    let request = client.request(Method::POST, url).json(&SessionRequest {
        key,
        secret,
        expires_at,
    });

    let response = BucketClient::send(request).await?;
    let body: SessionResponse = BucketClient::json(response).await?;
    if body.token.trim().is_empty() {
        return Err(StoreError::InvalidResponse(
            "Session response carried an empty token".to_string(),
        ));
    }

    debug!(expires_at = %expires_at, "Derived session token");
    Ok(Session {
        token: body.token,
        thread: thread.clone(),
        expires_at: Some(expires_at),
    })
}

/// Establishes the session for a run
///
/// A non-blank supplied session token wins; otherwise the key/secret pair
/// is exchanged.
pub async fn establish(
    client: &BucketClient,
    credentials: &Credentials,
    thread: &ThreadId,
) -> Result<Session> {
    if let Some(token) = credentials.reusable_session() {
        info!("Using supplied session token");
        return Ok(reuse_session(token, thread));
    }

    info!("Deriving session from API key");
    derive_session(client, &credentials.key, &credentials.secret, thread)
        .await
        .context("Failed to establish session")
}
