//! Chunk manifest model.
//!
//! The manifest is the durable record of one source file's chunked
//! representation. Entry order is byte order: concatenating the artifacts
//! named by `chunks` in sequence reproduces the original file exactly, so
//! the order must survive every serialization round trip untouched.

use serde::{Deserialize, Serialize};

use crate::error::ManifestError;
use crate::hash::ChunkHash;

/// One chunk of a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkEntry {
    /// Identifier of the chunk artifact, always `<chunkDir>/<artifactName>`.
    ///
    /// Relative to the source file's parent directory on the local side and
    /// used verbatim as the object-store key on the remote side, so the same
    /// manifest is valid in both places without rewriting.
    pub chunk: String,

    /// Fingerprint of the chunk's bytes when the entry was created.
    pub hash: ChunkHash,
}

/// Ordered description of one source file's chunked representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkManifest {
    /// Nominal chunk size in bytes; the final chunk may be smaller.
    pub chunk_size: u64,

    /// Chunk entries in file-byte order.
    pub chunks: Vec<ChunkEntry>,
}

impl ChunkManifest {
    /// Create an empty manifest for the given chunk size.
    pub fn new(chunk_size: u64) -> Self {
        Self {
            chunk_size,
            chunks: Vec::new(),
        }
    }

    /// Number of chunks recorded in this manifest.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Serialize to the canonical on-disk/on-store form.
    ///
    /// Pretty-printed JSON with stable field order (`chunkSize`, then
    /// `chunks`), so manifests diff cleanly between runs.
    pub fn to_json(&self) -> Result<String, ManifestError> {
        serde_json::to_string_pretty(self).map_err(ManifestError::Serialize)
    }

    /// Parse and validate a manifest from its serialized form.
    ///
    /// Rejects missing fields, wrong types, a zero chunk size, and empty
    /// chunk identifiers. An empty `chunks` list is legal (empty source
    /// file).
    pub fn from_json(s: &str) -> Result<Self, ManifestError> {
        let manifest: Self =
            serde_json::from_str(s).map_err(|e| ManifestError::Malformed(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Check structural invariants beyond what serde enforces.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.chunk_size == 0 {
            return Err(ManifestError::Malformed(
                "chunkSize must be positive".to_string(),
            ));
        }
        for (i, entry) in self.chunks.iter().enumerate() {
            if entry.chunk.is_empty() {
                return Err(ManifestError::Malformed(format!(
                    "chunk entry {i} has an empty identifier"
                )));
            }
        }
        Ok(())
    }
}
