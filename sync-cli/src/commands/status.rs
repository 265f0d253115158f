//! Report the local chunk state of a file.

use anyhow::{Context, Result};
use std::path::Path;

use sync_engine::SyncEngine;
use sync_store::ObjectStore;

/// Run the status command.
pub async fn run<S: ObjectStore + 'static>(engine: &SyncEngine<S>, file: &Path) -> Result<()> {
    let status = engine
        .status(file)
        .await
        .with_context(|| format!("failed to read status of {}", file.display()))?;

    println!("{}: {}", file.display(), status.state);

    if let (Some(chunks), Some(chunk_size)) = (status.chunks, status.chunk_size) {
        println!();
        println!("  Chunks:     {}", chunks);
        println!("  Chunk size: {} bytes", chunk_size);
    }

    Ok(())
}
