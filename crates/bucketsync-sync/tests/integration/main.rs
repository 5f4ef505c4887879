//! Integration tests for the sync engine against an in-memory bucket store

mod common;
mod test_orphan_properties;
