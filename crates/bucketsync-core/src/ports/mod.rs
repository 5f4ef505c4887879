//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the sync engine
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IBucketStore`] - Remote bucket store operations (session, buckets, paths)
//! - [`ILocalFileSystem`] - Local file enumeration and reads

pub mod bucket_store;
pub mod local_filesystem;

pub use bucket_store::{
    BucketInfo, Credentials, IBucketStore, PathItem, PathListing, PushContent, Session,
    SEED_FILE_NAME,
};
pub use local_filesystem::ILocalFileSystem;
