//! Chunk splitting: effective size policy and the artifact writer.

use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::debug;

use sync_types::layout;

use crate::error::ChunkError;
use crate::location::ChunkLocation;

/// Compute the chunk size actually used for a split.
///
/// With `auto_size` on, the requested size is capped at the file size (a
/// small file becomes a single chunk) and then floored at `min_chunk_size`.
/// The floor wins when the two bounds conflict: a file smaller than the
/// minimum still yields exactly one short chunk, because splitting stops at
/// end of file. With `auto_size` off the requested size is used verbatim.
pub fn effective_chunk_size(
    requested: u64,
    file_size: u64,
    min_chunk_size: u64,
    auto_size: bool,
) -> u64 {
    if auto_size {
        requested.min(file_size).max(min_chunk_size)
    } else {
        requested
    }
}

/// Split the file into `chunk_size`-byte artifacts under its chunk
/// directory.
///
/// Creates the directory and writes `<fileName>.<index>` artifacts in
/// file-byte order; the final artifact may be shorter. Returns the ordered
/// chunk identifiers. No manifest is written here, so an interrupted split
/// leaves a directory that later runs refuse to resume from instead of a
/// manifest naming chunks that were never produced.
pub async fn split_file(loc: &ChunkLocation, chunk_size: u64) -> Result<Vec<String>, ChunkError> {
    if chunk_size == 0 {
        return Err(ChunkError::InvalidChunkSize(chunk_size));
    }

    let mut source = match fs::File::open(&loc.file).await {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ChunkError::SourceNotFound(loc.file.clone()))
        }
        Err(e) => return Err(e.into()),
    };

    fs::create_dir_all(&loc.dir).await?;

    let mut ids = Vec::new();
    let mut buf = vec![0u8; chunk_size as usize];
    let mut index = 0usize;
    loop {
        let read = read_full(&mut source, &mut buf).await?;
        if read == 0 {
            break;
        }
        let artifact = layout::artifact_name(&loc.file_name, index);
        fs::write(loc.dir.join(&artifact), &buf[..read]).await?;
        ids.push(layout::chunk_id(&loc.dir_name, &artifact));
        index += 1;
        if read < buf.len() {
            break;
        }
    }

    debug!(
        file = %loc.file.display(),
        chunks = ids.len(),
        chunk_size,
        "split complete"
    );
    Ok(ids)
}

/// Remove the file's chunk directory and everything in it.
///
/// Only directories following the chunk naming convention are touched.
/// Returns whether anything was removed.
pub async fn remove_chunk_dir(loc: &ChunkLocation) -> Result<bool, ChunkError> {
    if !layout::is_chunk_dir_name(&loc.dir_name) {
        return Ok(false);
    }
    match fs::metadata(&loc.dir).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    }
    fs::remove_dir_all(&loc.dir).await?;
    debug!(dir = %loc.dir.display(), "chunk directory removed");
    Ok(true)
}

/// Read until the buffer is full or the file ends.
async fn read_full(file: &mut fs::File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
