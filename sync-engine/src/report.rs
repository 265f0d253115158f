//! Per-file sync state and operation reports.

use std::fmt;

/// Lifecycle state of a file with respect to the store.
///
/// `Unchunked → Chunked → Reconciled`, with a resume edge that skips
/// straight to `Chunked` when a valid chunk directory already exists.
/// `Reconciled` is reached when a push or pull run completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No chunk state exists for the file.
    Unchunked,
    /// Chunk artifacts and a manifest exist locally.
    Chunked,
    /// Local chunk state and the store agree.
    Reconciled,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncState::Unchunked => "unchunked",
            SyncState::Chunked => "chunked",
            SyncState::Reconciled => "reconciled",
        };
        write!(f, "{s}")
    }
}

/// Result of a chunk run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkReport {
    /// State after the run (always [`SyncState::Chunked`]).
    pub state: SyncState,
    /// Number of chunks in the manifest.
    pub chunks: usize,
    /// Effective chunk size the manifest was built with.
    pub chunk_size: u64,
    /// Whether existing chunk state was reused instead of re-splitting.
    pub resumed: bool,
}

/// Result of a push run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushReport {
    /// State after the run (always [`SyncState::Reconciled`]).
    pub state: SyncState,
    /// Number of chunks in the manifest.
    pub chunks: usize,
    /// Chunks actually uploaded.
    pub uploaded: usize,
    /// Chunks skipped because the store already had them.
    pub skipped: usize,
    /// Total bytes uploaded, excluding the manifest object.
    pub bytes_uploaded: u64,
    /// Key the manifest object was uploaded under.
    pub manifest_key: String,
}

/// Result of a pull run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullReport {
    /// State after the run (always [`SyncState::Reconciled`]).
    pub state: SyncState,
    /// Number of chunks in the remote manifest.
    pub chunks: usize,
    /// Chunks fetched from the store.
    pub fetched: usize,
    /// Chunks reused from local staged artifacts.
    pub cached: usize,
    /// Total bytes fetched, excluding the manifest object.
    pub bytes_fetched: u64,
    /// Bytes written to the reassembled destination file.
    pub bytes_written: u64,
}

/// Local chunk state of a file, as reported by `status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    /// [`SyncState::Unchunked`] or [`SyncState::Chunked`]; whether the
    /// store also agrees is not knowable locally.
    pub state: SyncState,
    /// Chunk count, when chunked.
    pub chunks: Option<usize>,
    /// Manifest chunk size, when chunked.
    pub chunk_size: Option<u64>,
}
