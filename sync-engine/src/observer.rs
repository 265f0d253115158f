//! Progress reporting hooks.

use std::path::Path;

/// Observer for sync progress events.
///
/// All methods are fire-and-forget with no-op defaults: implementations
/// report progress but never influence control flow. Chunk-level events may
/// be invoked from concurrent transfer tasks, hence `Send + Sync`.
pub trait SyncObserver: Send + Sync {
    /// A source file is about to be split into `chunk_size`-byte chunks.
    fn on_split_start(&self, _file_name: &str, _chunk_size: u64) {}

    /// Splitting finished with `chunks` artifacts on disk.
    fn on_split_done(&self, _file_name: &str, _chunks: usize) {}

    /// A chunk transfer was skipped because the other side already has it.
    fn on_chunk_skipped(&self, _chunk: &str) {}

    /// A chunk was uploaded to the store.
    fn on_chunk_uploaded(&self, _chunk: &str) {}

    /// A chunk was fetched from the store and staged locally.
    fn on_chunk_fetched(&self, _chunk: &str) {}

    /// The manifest object was uploaded; the push is complete.
    fn on_manifest_uploaded(&self, _key: &str) {}

    /// The destination file was reassembled; the pull is complete.
    fn on_reassembly_done(&self, _dest: &Path) {}
}

/// The default observer: ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SyncObserver for NoopObserver {}
