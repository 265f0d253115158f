//! Manifest persistence: save, load, and the resume check.

use tokio::fs;
use tracing::debug;

use sync_types::{layout, ChunkManifest};

use crate::error::ChunkError;
use crate::location::ChunkLocation;

/// Save the manifest into its chunk directory.
///
/// Returns the serialized text so callers can reuse the exact bytes; push
/// uploads the same form that was written to disk.
pub async fn save_manifest(
    loc: &ChunkLocation,
    manifest: &ChunkManifest,
) -> Result<String, ChunkError> {
    let json = manifest.to_json()?;
    let path = loc.manifest_path();
    fs::write(&path, &json).await?;
    debug!(
        path = %path.display(),
        chunks = manifest.chunk_count(),
        "manifest saved"
    );
    Ok(json)
}

/// Load and validate the manifest from the file's chunk directory.
pub async fn load_manifest(loc: &ChunkLocation) -> Result<ChunkManifest, ChunkError> {
    let path = loc.manifest_path();
    let raw = match fs::read_to_string(&path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ChunkError::ManifestMissing {
                dir: loc.dir.clone(),
            })
        }
        Err(e) => return Err(e.into()),
    };
    Ok(ChunkManifest::from_json(&raw)?)
}

/// The resume check: load existing chunk state for a file, if any.
///
/// Returns `Ok(None)` when no chunk directory exists (or something other
/// than a directory occupies its name), so the caller splits fresh. A
/// directory that does exist must hold a readable manifest; anything else
/// is an error rather than a silent re-split, because resuming must never
/// mask half-destroyed state.
pub async fn find_existing(loc: &ChunkLocation) -> Result<Option<ChunkManifest>, ChunkError> {
    if !layout::is_chunk_dir_name(&loc.dir_name) {
        return Ok(None);
    }
    match fs::metadata(&loc.dir).await {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Ok(None),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let manifest = load_manifest(loc).await?;
    debug!(
        dir = %loc.dir.display(),
        chunks = manifest.chunk_count(),
        "resuming from existing chunk state"
    );
    Ok(Some(manifest))
}
