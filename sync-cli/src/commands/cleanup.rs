//! Remove the local chunk directory for a file.

use anyhow::{Context, Result};
use std::path::Path;

use sync_engine::SyncEngine;
use sync_store::ObjectStore;

/// Run the cleanup command.
pub async fn run<S: ObjectStore + 'static>(engine: &SyncEngine<S>, file: &Path) -> Result<()> {
    let removed = engine
        .cleanup(file)
        .await
        .with_context(|| format!("failed to clean up {}", file.display()))?;

    if removed {
        println!("Removed chunk state for {}", file.display());
    } else {
        println!("No chunk state for {}", file.display());
    }

    Ok(())
}
