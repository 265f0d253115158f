//! Engine configuration.

/// Default requested chunk size: 8 MiB.
pub const DEFAULT_CHUNK_SIZE: u64 = 8 * 1024 * 1024;

/// Default floor for the effective chunk size.
pub const DEFAULT_MIN_CHUNK_SIZE: u64 = 4096;

/// Default cap on concurrent store operations.
pub const DEFAULT_MAX_CONNECTIONS: usize = 100;

/// Configuration for a [`SyncEngine`](crate::SyncEngine).
///
/// Passed explicitly at construction; the engine reads no environment and
/// keeps no process-wide state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Requested chunk size in bytes.
    pub chunk_size: u64,
    /// Adapt the chunk size to the file: cap at the file size, floor at
    /// [`min_chunk_size`](Self::min_chunk_size). Off means the requested
    /// size is used verbatim.
    pub auto_size: bool,
    /// Floor for the effective chunk size when `auto_size` is on.
    pub min_chunk_size: u64,
    /// Cap on concurrent store operations during push and pull.
    pub max_connections: usize,
    /// Verify remotely existing chunks by content hash during push instead
    /// of trusting key presence. Downloads every existing chunk, so off by
    /// default.
    pub verify_remote: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            auto_size: true,
            min_chunk_size: DEFAULT_MIN_CHUNK_SIZE,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            verify_remote: false,
        }
    }
}

impl SyncConfig {
    /// Create a configuration with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the requested chunk size.
    pub fn with_chunk_size(mut self, bytes: u64) -> Self {
        self.chunk_size = bytes;
        self
    }

    /// Enable or disable adaptive chunk sizing.
    pub fn with_auto_size(mut self, auto_size: bool) -> Self {
        self.auto_size = auto_size;
        self
    }

    /// Set the effective chunk size floor.
    pub fn with_min_chunk_size(mut self, bytes: u64) -> Self {
        self.min_chunk_size = bytes;
        self
    }

    /// Set the cap on concurrent store operations.
    pub fn with_max_connections(mut self, connections: usize) -> Self {
        self.max_connections = connections;
        self
    }

    /// Enable or disable remote content verification during push.
    pub fn with_verify_remote(mut self, verify: bool) -> Self {
        self.verify_remote = verify;
        self
    }
}
