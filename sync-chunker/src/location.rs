//! Path resolution for a source file's chunk state.

use std::path::{Path, PathBuf};

use sync_types::layout;

use crate::error::ChunkError;

/// Resolved locations for one source file's chunk state.
///
/// Chunk identifiers in a manifest are relative (`<chunkDir>/<artifact>`);
/// this type anchors them to the directory the source file lives in, and is
/// the single place that mapping happens.
#[derive(Debug, Clone)]
pub struct ChunkLocation {
    /// Path of the source file as given by the caller.
    pub file: PathBuf,
    /// Source file name (UTF-8).
    pub file_name: String,
    /// Chunk directory name, `<fileName>_chunks`.
    pub dir_name: String,
    /// Directory the source file lives in; chunk identifiers resolve
    /// against this.
    pub root: PathBuf,
    /// On-disk path of the chunk directory.
    pub dir: PathBuf,
}

impl ChunkLocation {
    /// Resolve chunk locations for a source file path.
    ///
    /// Fails if the path has no UTF-8 file name component (the name ends up
    /// inside the JSON manifest and in object-store keys, so it must be
    /// valid UTF-8).
    pub fn for_file(file: &Path) -> Result<Self, ChunkError> {
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ChunkError::InvalidPath(file.to_path_buf()))?
            .to_string();
        let root = file
            .parent()
            .ok_or_else(|| ChunkError::InvalidPath(file.to_path_buf()))?
            .to_path_buf();
        let dir_name = layout::chunk_dir_name(&file_name);
        let dir = root.join(&dir_name);
        Ok(Self {
            file: file.to_path_buf(),
            file_name,
            dir_name,
            root,
            dir,
        })
    }

    /// On-disk path of the artifact behind a manifest chunk identifier.
    pub fn artifact_path(&self, chunk_id: &str) -> PathBuf {
        self.root.join(chunk_id)
    }

    /// On-disk path of the manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(layout::MANIFEST_FILE_NAME)
    }

    /// Object-store key of the manifest.
    pub fn manifest_key(&self) -> String {
        layout::manifest_key(&self.dir_name)
    }
}
