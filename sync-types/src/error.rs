//! Error types for bucket-sync manifests.

use thiserror::Error;

/// Errors raised while building, parsing, or validating a chunk manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// JSON serialization failed
    #[error("manifest serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Content did not parse or validate as a manifest
    #[error("malformed manifest: {0}")]
    Malformed(String),

    /// A fingerprint was not valid hex of the right length
    #[error("invalid chunk hash: {0}")]
    InvalidHash(String),
}
