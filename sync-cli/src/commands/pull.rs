//! Download a file from a bucket and reassemble it.

use anyhow::{Context, Result};
use std::path::Path;

use sync_engine::SyncEngine;
use sync_store::ObjectStore;

/// Run the pull command.
pub async fn run<S: ObjectStore + 'static>(
    engine: &SyncEngine<S>,
    file: &Path,
    bucket: &str,
    cleanup: bool,
) -> Result<()> {
    let report = engine
        .pull(file, bucket)
        .await
        .with_context(|| format!("failed to pull {}", file.display()))?;

    println!("Pull complete: {} is {}", file.display(), report.state);
    println!();
    println!("  Chunks:  {}", report.chunks);
    println!("  Fetched: {}", report.fetched);
    println!("  Cached:  {}", report.cached);
    println!("  Bytes:   {}", report.bytes_written);

    if cleanup && engine.cleanup(file).await? {
        println!();
        println!("Local chunk state removed.");
    }

    Ok(())
}
