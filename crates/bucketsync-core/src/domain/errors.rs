//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! mostly validation failures raised while constructing newtypes.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid bucket path format or content
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Invalid bucket key
    #[error("Invalid bucket key: {0}")]
    InvalidBucketKey(String),

    /// Invalid bucket name
    #[error("Invalid bucket name: {0}")]
    InvalidBucketName(String),

    /// Invalid consistency token
    #[error("Invalid root token: {0}")]
    InvalidRootToken(String),

    /// Invalid thread identifier
    #[error("Invalid thread ID: {0}")]
    InvalidThreadId(String),
}
