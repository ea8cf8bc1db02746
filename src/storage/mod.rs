//! Object storage module
//!
//! Wraps `object_store` so the pipeline can read and write against S3,
//! R2, GCS, Azure or the local filesystem through one type.
//!
//! # Overview
//!
//! - `StorageLocation` - a store plus a base prefix, parsed from a URL
//! - `GlobPattern` - shell-style matching over object keys

mod glob;
mod location;

pub use glob::GlobPattern;
pub use location::StorageLocation;
