//! Console progress output.

use std::path::Path;

use sync_engine::SyncObserver;

/// Prints a progress line for every chunk the engine touches.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver;

impl SyncObserver for ConsoleObserver {
    fn on_split_start(&self, file_name: &str, chunk_size: u64) {
        println!("Splitting {file_name} into {chunk_size}-byte chunks...");
    }

    fn on_split_done(&self, file_name: &str, chunks: usize) {
        println!("  {chunks} chunks written for {file_name}");
    }

    fn on_chunk_skipped(&self, chunk: &str) {
        println!("  skipped  {chunk}");
    }

    fn on_chunk_uploaded(&self, chunk: &str) {
        println!("  uploaded {chunk}");
    }

    fn on_chunk_fetched(&self, chunk: &str) {
        println!("  fetched  {chunk}");
    }

    fn on_manifest_uploaded(&self, key: &str) {
        println!("  uploaded {key}");
    }

    fn on_reassembly_done(&self, dest: &Path) {
        println!("Reassembled {}", dest.display());
    }
}
