//! Naming rules for chunk directories, artifacts, and object-store keys.
//!
//! These are pure functions shared by the chunker (local paths) and the sync
//! engine (remote keys). Keeping them in one place is what lets a manifest
//! entry double as both a relative path and a store key.

/// Suffix appended to a source file name to form its chunk directory name.
pub const CHUNK_DIR_SUFFIX: &str = "_chunks";

/// File name of the manifest inside a chunk directory.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Chunk directory name for a source file: `<fileName>_chunks`.
pub fn chunk_dir_name(file_name: &str) -> String {
    format!("{file_name}{CHUNK_DIR_SUFFIX}")
}

/// Whether a directory name follows the chunk-directory naming convention.
///
/// Only directories that pass this check are ever resumed from or removed,
/// so a stray directory can never be mistaken for chunk state.
pub fn is_chunk_dir_name(name: &str) -> bool {
    name.len() > CHUNK_DIR_SUFFIX.len() && name.ends_with(CHUNK_DIR_SUFFIX)
}

/// Manifest path/key inside a chunk directory: `<chunkDir>/manifest.json`.
pub fn manifest_key(chunk_dir: &str) -> String {
    format!("{chunk_dir}/{MANIFEST_FILE_NAME}")
}

/// Artifact name for the chunk at `index` (0-based, file-byte order).
///
/// The zero-padded index keeps lexicographic order equal to byte order for
/// up to a million chunks.
pub fn artifact_name(file_name: &str, index: usize) -> String {
    format!("{file_name}.{index:06}")
}

/// Chunk identifier as recorded in the manifest: `<chunkDir>/<artifact>`.
pub fn chunk_id(chunk_dir: &str, artifact: &str) -> String {
    format!("{chunk_dir}/{artifact}")
}
