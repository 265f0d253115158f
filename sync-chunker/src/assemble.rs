//! Hash verification and in-order reassembly.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use sync_types::{ChunkEntry, ChunkHash, ChunkManifest};

use crate::error::ChunkError;
use crate::location::ChunkLocation;

/// Verify every manifest entry against its artifact's current bytes.
///
/// Fails on the first missing or corrupted artifact. Runs before any
/// destructive step: push calls it before uploading anything, pull before
/// reusing staged artifacts.
pub async fn verify_chunks(
    loc: &ChunkLocation,
    manifest: &ChunkManifest,
) -> Result<(), ChunkError> {
    for entry in &manifest.chunks {
        verify_entry(loc, entry).await?;
    }
    debug!(
        file = %loc.file.display(),
        chunks = manifest.chunk_count(),
        "all chunks verified"
    );
    Ok(())
}

/// Verify a single manifest entry against its artifact on disk.
pub async fn verify_entry(loc: &ChunkLocation, entry: &ChunkEntry) -> Result<(), ChunkError> {
    let bytes = read_artifact(loc, entry).await?;
    let actual = ChunkHash::from_data(&bytes);
    if actual != entry.hash {
        return Err(ChunkError::HashMismatch {
            chunk: entry.chunk.clone(),
            expected: entry.hash.to_hex(),
            actual: actual.to_hex(),
        });
    }
    Ok(())
}

/// Reassemble the manifest's chunks, strictly in entry order, into `dest`.
///
/// Appends to a staging file next to `dest` and renames into place only
/// after every chunk is in, so a failed merge never leaves a partial
/// destination behind. Returns the number of bytes written.
pub async fn merge_chunks(
    loc: &ChunkLocation,
    manifest: &ChunkManifest,
    dest: &Path,
) -> Result<u64, ChunkError> {
    let staging = staging_path(dest);
    match merge_into(loc, manifest, &staging).await {
        Ok(total) => {
            fs::rename(&staging, dest).await?;
            debug!(
                dest = %dest.display(),
                chunks = manifest.chunk_count(),
                bytes = total,
                "reassembly complete"
            );
            Ok(total)
        }
        Err(e) => {
            let _ = fs::remove_file(&staging).await;
            Err(e)
        }
    }
}

async fn merge_into(
    loc: &ChunkLocation,
    manifest: &ChunkManifest,
    staging: &Path,
) -> Result<u64, ChunkError> {
    let mut out = fs::File::create(staging).await?;
    let mut total = 0u64;
    for entry in &manifest.chunks {
        let bytes = read_artifact(loc, entry).await?;
        out.write_all(&bytes).await?;
        total += bytes.len() as u64;
    }
    out.flush().await?;
    Ok(total)
}

async fn read_artifact(loc: &ChunkLocation, entry: &ChunkEntry) -> Result<Vec<u8>, ChunkError> {
    match fs::read(loc.artifact_path(&entry.chunk)).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ChunkError::MissingArtifact {
            chunk: entry.chunk.clone(),
        }),
        Err(e) => Err(e.into()),
    }
}

fn staging_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    dest.with_file_name(name)
}
