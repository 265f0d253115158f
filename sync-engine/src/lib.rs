//! # sync-engine
//!
//! The reconciliation engine for bucket-sync: moves chunked files between
//! the local filesystem and an [`ObjectStore`](sync_store::ObjectStore).
//!
//! # Architecture
//!
//! ```text
//! caller → SyncEngine → sync-chunker (local chunk state)
//!              ↓
//!         ObjectStore (bucket of chunk + manifest objects)
//! ```
//!
//! Per file, the engine walks `Unchunked → Chunked → Reconciled`. Push
//! uploads only chunks the store is missing and writes the manifest last;
//! pull stages and verifies every chunk before the destination file is
//! touched. Per-chunk transfers run concurrently, bounded by
//! [`SyncConfig::max_connections`].
//!
//! # Example
//!
//! ```rust,ignore
//! use bucket_sync_engine::{SyncConfig, SyncEngine};
//! use bucket_sync_store::FsStore;
//!
//! # async fn example() -> Result<(), bucket_sync_engine::SyncError> {
//! let store = FsStore::new("/var/lib/bucket-sync");
//! let engine = SyncEngine::new(store, SyncConfig::default());
//!
//! engine.push("data.bin".as_ref(), "backups").await?;
//! engine.cleanup("data.bin".as_ref()).await?;
//!
//! // Elsewhere, restore it:
//! engine.pull("data.bin".as_ref(), "backups").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod engine;
mod error;
mod observer;
mod report;

pub use config::{
    SyncConfig, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_CONNECTIONS, DEFAULT_MIN_CHUNK_SIZE,
};
pub use engine::SyncEngine;
pub use error::SyncError;
pub use observer::{NoopObserver, SyncObserver};
pub use report::{ChunkReport, FileStatus, PullReport, PushReport, SyncState};
