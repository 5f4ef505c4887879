//! bucketsync core - Domain types, ports and configuration
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain types** - `BucketPath`, `BucketKey`, `BucketName`, `RootToken`, `ThreadId`
//! - **Port definitions** - Traits for adapters: `IBucketStore`, `ILocalFileSystem`
//! - **Configuration** - Typed `Config` with YAML loading, validation and a builder
//!
//! # Architecture
//!
//! The domain module contains pure value types with no I/O.
//! Ports define trait interfaces that adapter crates implement
//! (`bucketsync-client` for the remote store, `bucketsync-sync` for the
//! local filesystem). The sync engine drives both through these ports.

pub mod config;
pub mod domain;
pub mod ports;
