//! Domain types
//!
//! This module contains the core value types for bucketsync:
//! - Newtypes for validated remote paths, bucket keys/names and consistency tokens
//! - Domain-specific error types

pub mod errors;
pub mod newtypes;

// Re-export commonly used types
pub use errors::DomainError;
pub use newtypes::*;
