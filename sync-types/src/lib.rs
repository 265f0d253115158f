//! # sync-types
//!
//! Manifest and fingerprint types for bucket-sync chunk-based file
//! synchronization.
//!
//! This crate provides the foundational types used across all bucket-sync
//! crates:
//! - [`ChunkHash`] - BLAKE3 content fingerprint of a chunk
//! - [`ChunkManifest`], [`ChunkEntry`] - ordered record of a chunked file
//! - [`layout`] - naming rules for chunk directories, artifacts, and keys
//! - [`ManifestError`] - error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod hash;
pub mod layout;
mod manifest;

pub use error::ManifestError;
pub use hash::ChunkHash;
pub use manifest::{ChunkEntry, ChunkManifest};
