//! Chunk fingerprinting and manifest building.

use std::path::Path;

use tokio::fs;
use tracing::debug;

use sync_types::{ChunkEntry, ChunkHash, ChunkManifest};

use crate::error::ChunkError;
use crate::location::ChunkLocation;

/// Fingerprint a chunk artifact's current bytes.
pub async fn fingerprint_file(path: &Path) -> Result<ChunkHash, ChunkError> {
    let bytes = fs::read(path).await?;
    Ok(ChunkHash::from_data(&bytes))
}

/// Build a manifest for already-split artifacts.
///
/// Hashes every artifact in `chunk_ids` and records entries in exactly that
/// order; input order is file-byte order and must survive into the manifest.
/// Fails without side effects if any artifact is missing or unreadable; the
/// caller must not treat the split as complete in that case.
pub async fn build_manifest(
    loc: &ChunkLocation,
    chunk_ids: Vec<String>,
    chunk_size: u64,
) -> Result<ChunkManifest, ChunkError> {
    let mut manifest = ChunkManifest::new(chunk_size);
    for chunk in chunk_ids {
        let path = loc.artifact_path(&chunk);
        let hash = match fingerprint_file(&path).await {
            Ok(hash) => hash,
            Err(ChunkError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ChunkError::MissingArtifact { chunk })
            }
            Err(e) => return Err(e),
        };
        manifest.chunks.push(ChunkEntry { chunk, hash });
    }
    debug!(
        file = %loc.file.display(),
        chunks = manifest.chunk_count(),
        "manifest built"
    );
    Ok(manifest)
}
