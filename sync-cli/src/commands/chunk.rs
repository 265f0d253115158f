//! Split a file into chunks and write its manifest.

use anyhow::{Context, Result};
use std::path::Path;

use sync_engine::SyncEngine;
use sync_store::ObjectStore;

/// Run the chunk command.
pub async fn run<S: ObjectStore + 'static>(engine: &SyncEngine<S>, file: &Path) -> Result<()> {
    let report = engine
        .chunk(file)
        .await
        .with_context(|| format!("failed to chunk {}", file.display()))?;

    if report.resumed {
        println!("Resumed existing chunk state for {}", file.display());
    } else {
        println!("Chunked {}", file.display());
    }
    println!();
    println!("  Chunks:     {}", report.chunks);
    println!("  Chunk size: {} bytes", report.chunk_size);

    Ok(())
}
