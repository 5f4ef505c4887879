//! bucketsync client - HTTP adapter for the bucket store
//!
//! Provides an async client for the store's HTTP gateway:
//! - Session establishment from an API key/secret pair
//! - Bucket listing, creation and removal
//! - Path listing, streamed chunk uploads and path removal
//!
//! ## Modules
//!
//! - [`auth`] - Session establishment
//! - [`client`] - HTTP client, request construction and bucket endpoints
//! - [`paths`] - Path-level operations inside a bucket
//! - [`provider`] - [`IBucketStore`](bucketsync_core::ports::IBucketStore) implementation

pub mod auth;
pub mod client;
pub mod paths;
pub mod provider;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when communicating with the bucket store gateway
#[derive(Debug, Error)]
pub enum StoreError {
    /// Credentials or session token were rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The session may not access the requested thread or bucket
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested bucket or path does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The bucket root moved since the precondition was read
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A server-side error occurred (5xx)
    #[error("Server error: {0}")]
    ServerError(String),

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The gateway URL can't be used as a request base
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl StoreError {
    /// Classifies a non-success status, keeping the response body as the message
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            status.to_string()
        } else {
            format!("{status}: {}", body.trim())
        };

        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => Self::Conflict(message),
            s if s.is_server_error() => Self::ServerError(message),
            _ => Self::InvalidResponse(message),
        }
    }
}
