//! # sync-store
//!
//! Object store abstraction for bucket-sync.
//!
//! The sync engine talks to remote storage only through the [`ObjectStore`]
//! trait: per-key existence checks, gets, puts, and deletes. There are no
//! listing or range semantics; reconciliation is driven entirely by the
//! manifest, so key addressing is all the engine needs.
//!
//! # Design
//!
//! - `get` maps an absent key to `Ok(None)` and `delete` of an absent key
//!   succeeds, so callers treat both as reconciliation signals, not errors.
//! - Implementations must tolerate bounded concurrent use from one run;
//!   every operation is independent and stateless with respect to others.
//!
//! Shipped backends:
//! - [`MemoryStore`]: shared-state test double with call counters, an
//!   ordered put log, and one-shot failure injection
//! - [`FsStore`]: directory tree acting as local buckets, atomic writes
//! - [`SlowStore`]: wrapper injecting seeded latency, for concurrency tests

#![warn(missing_docs)]
#![warn(clippy::all)]

mod fs;
mod memory;
mod slow;

pub use fs::FsStore;
pub use memory::{MemoryStore, OpCounts};
pub use slow::SlowStore;

use async_trait::async_trait;
use thiserror::Error;

/// Object store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying storage I/O failed.
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend rejected or failed the operation.
    #[error("store backend error: {0}")]
    Backend(String),

    /// The key cannot address an object in this store.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The bucket name cannot address a bucket in this store.
    #[error("invalid bucket: {0}")]
    InvalidBucket(String),
}

/// Object store operations the sync engine needs.
///
/// All operations are per-key and bucket-scoped. Implementations are shared
/// across the chunk tasks of a run behind an `Arc`, so they must be usable
/// concurrently.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Whether an object exists at `key`.
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, StoreError>;

    /// Fetch an object's bytes, or `None` if the key is absent.
    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Store an object, replacing any existing content at `key`.
    async fn put(&self, bucket: &str, key: &str, data: &[u8]) -> Result<(), StoreError>;

    /// Delete an object; an absent key is not an error.
    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError>;
}
