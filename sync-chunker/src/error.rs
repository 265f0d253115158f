//! Error types for sync-chunker.

use std::path::PathBuf;
use sync_types::ManifestError;
use thiserror::Error;

/// Errors that can occur while splitting, verifying, or reassembling chunks.
#[derive(Error, Debug)]
pub enum ChunkError {
    /// Source file does not exist or is not readable.
    #[error("source file not found: {0}")]
    SourceNotFound(PathBuf),

    /// The path has no usable UTF-8 file name to derive chunk names from.
    #[error("path has no usable file name: {0}")]
    InvalidPath(PathBuf),

    /// Chunk size would make splitting meaningless.
    #[error("chunk size must be positive, got {0}")]
    InvalidChunkSize(u64),

    /// Filesystem operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest serialization or validation failed.
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// A chunk directory exists but holds no readable manifest.
    #[error("chunk directory {dir} has no readable manifest; discard it with cleanup and re-chunk")]
    ManifestMissing {
        /// The chunk directory that was found.
        dir: PathBuf,
    },

    /// No chunk state exists for the file.
    #[error("no chunk state for {0}; chunk the file first")]
    NotChunked(PathBuf),

    /// A chunk artifact named by the manifest is missing on disk.
    #[error("chunk artifact missing: {chunk}")]
    MissingArtifact {
        /// Manifest identifier of the missing chunk.
        chunk: String,
    },

    /// Hash verification failed.
    #[error("hash mismatch for {chunk}: expected {expected}, got {actual}")]
    HashMismatch {
        /// Manifest identifier of the corrupt chunk.
        chunk: String,
        /// Expected hash (hex-encoded).
        expected: String,
        /// Actual hash (hex-encoded).
        actual: String,
    },
}
