//! Error types for sync-engine.
//!
//! Local chunk problems arrive as [`ChunkError`], store problems as
//! [`StoreError`], both via `#[from]`. The variants defined here cover
//! remote-state inconsistencies a pull can observe: a manifest that is
//! absent or unreadable, and chunks the manifest names but the store
//! cannot produce intact. All of them abort before anything destructive
//! happens on the local side.

use sync_chunker::ChunkError;
use sync_store::StoreError;
use sync_types::ManifestError;
use thiserror::Error;

/// Errors from push, pull, and the other engine operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Local chunk state operation failed.
    #[error("chunk error: {0}")]
    Chunk(#[from] ChunkError),

    /// Object store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The store has no manifest under the expected key.
    #[error("no manifest at {key} in bucket {bucket}; was the file pushed?")]
    RemoteManifestMissing {
        /// Bucket that was queried.
        bucket: String,
        /// Expected manifest key.
        key: String,
    },

    /// The store returned a manifest that does not parse.
    #[error("remote manifest {key} is malformed: {source}")]
    RemoteManifestMalformed {
        /// Key of the malformed manifest object.
        key: String,
        /// Parse or validation failure.
        #[source]
        source: ManifestError,
    },

    /// The remote manifest names a chunk the store does not have.
    #[error("chunk {key} is missing from bucket {bucket} but its manifest lists it")]
    MissingRemoteChunk {
        /// Bucket that was queried.
        bucket: String,
        /// Key of the missing chunk.
        key: String,
    },

    /// A fetched chunk's bytes do not match the manifest fingerprint.
    #[error("fetched chunk {key} is corrupt: expected {expected}, got {actual}")]
    ChunkCorrupt {
        /// Key of the corrupt chunk.
        key: String,
        /// Expected hash (hex-encoded).
        expected: String,
        /// Actual hash of the fetched bytes (hex-encoded).
        actual: String,
    },

    /// A transfer task could not be driven to completion.
    #[error("sync task failed: {0}")]
    Task(String),
}
