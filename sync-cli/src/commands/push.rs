//! Upload a file's chunks and manifest to a bucket.

use anyhow::{Context, Result};
use std::path::Path;

use sync_engine::SyncEngine;
use sync_store::ObjectStore;

/// Run the push command.
pub async fn run<S: ObjectStore + 'static>(
    engine: &SyncEngine<S>,
    file: &Path,
    bucket: &str,
    cleanup: bool,
) -> Result<()> {
    let report = engine
        .push(file, bucket)
        .await
        .with_context(|| format!("failed to push {}", file.display()))?;

    println!("Push complete: {} is {}", file.display(), report.state);
    println!();
    println!("  Chunks:   {}", report.chunks);
    println!("  Uploaded: {}", report.uploaded);
    println!("  Skipped:  {}", report.skipped);
    println!("  Bytes:    {}", report.bytes_uploaded);
    println!("  Manifest: {}", report.manifest_key);

    if cleanup && engine.cleanup(file).await? {
        println!();
        println!("Local chunk state removed.");
    }

    Ok(())
}
