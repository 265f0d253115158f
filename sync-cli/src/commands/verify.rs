//! Check every local chunk artifact against its manifest hash.

use anyhow::{Context, Result};
use std::path::Path;

use sync_engine::SyncEngine;
use sync_store::ObjectStore;

/// Run the verify command.
pub async fn run<S: ObjectStore + 'static>(engine: &SyncEngine<S>, file: &Path) -> Result<()> {
    let chunks = engine
        .verify(file)
        .await
        .with_context(|| format!("verification failed for {}", file.display()))?;

    println!("All {} chunks intact for {}", chunks, file.display());

    Ok(())
}
