//! # bucket-sync
//!
//! Command-line interface for chunk-based file synchronization against a
//! directory-backed object store.
//!
//! ## Commands
//!
//! - `chunk`: Split a file into chunks and write its manifest
//! - `push`: Upload missing chunks and the manifest to a bucket
//! - `pull`: Download and reassemble a file from a bucket
//! - `verify`: Check local chunk state against its manifest
//! - `status`: Show a file's local chunk state
//! - `cleanup`: Discard a file's local chunk state
//!
//! ## Example
//!
//! ```bash
//! # Push a large file into the "backups" bucket
//! bucket-sync push video.mp4 backups --cleanup
//!
//! # Restore it elsewhere
//! bucket-sync pull video.mp4 backups
//!
//! # Inspect and discard local chunk state
//! bucket-sync status video.mp4
//! bucket-sync verify video.mp4
//! bucket-sync cleanup video.mp4
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use sync_engine::{SyncConfig, SyncEngine};
use sync_store::FsStore;

mod commands;
mod observer;

use commands::{chunk, cleanup, pull, push, status, verify};
use observer::ConsoleObserver;

/// Chunk-based file synchronization against an object store.
#[derive(Parser, Debug)]
#[command(name = "bucket-sync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Root directory of the object store
    #[arg(long, global = true, default_value = ".bucket-sync-store")]
    store_root: PathBuf,

    /// Cap on concurrent store operations
    #[arg(long, global = true)]
    connections: Option<usize>,

    /// Floor for the effective chunk size in bytes
    #[arg(long, global = true)]
    min_chunk_size: Option<u64>,

    /// Log engine internals at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split a file into chunks and write its manifest
    Chunk {
        /// File to chunk
        file: PathBuf,

        /// Requested chunk size in bytes
        #[arg(long)]
        chunk_size: Option<u64>,

        /// Use the requested chunk size verbatim instead of adapting it
        #[arg(long)]
        no_auto_size: bool,
    },

    /// Upload a file's chunks and manifest to a bucket
    Push {
        /// File to push
        file: PathBuf,

        /// Destination bucket
        bucket: String,

        /// Requested chunk size in bytes
        #[arg(long)]
        chunk_size: Option<u64>,

        /// Use the requested chunk size verbatim instead of adapting it
        #[arg(long)]
        no_auto_size: bool,

        /// Re-check remotely existing chunks by content hash
        #[arg(long)]
        verify_remote: bool,

        /// Remove local chunk state after a successful push
        #[arg(long)]
        cleanup: bool,
    },

    /// Download a file from a bucket and reassemble it
    Pull {
        /// Destination file (its name selects the remote objects)
        file: PathBuf,

        /// Source bucket
        bucket: String,

        /// Remove local chunk state after a successful pull
        #[arg(long)]
        cleanup: bool,
    },

    /// Verify local chunk state against its manifest
    Verify {
        /// Chunked file to verify
        file: PathBuf,
    },

    /// Show a file's local chunk state
    Status {
        /// File to inspect
        file: PathBuf,
    },

    /// Discard a file's local chunk state
    Cleanup {
        /// File whose chunk state to remove
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(if cli.verbose { "debug" } else { "warn" });

    let mut config = SyncConfig::default();
    if let Some(connections) = cli.connections {
        config = config.with_max_connections(connections);
    }
    if let Some(bytes) = cli.min_chunk_size {
        config = config.with_min_chunk_size(bytes);
    }
    let store = FsStore::new(&cli.store_root);

    match cli.command {
        Commands::Chunk {
            file,
            chunk_size,
            no_auto_size,
        } => {
            let engine = build_engine(store, sizing(config, chunk_size, no_auto_size));
            chunk::run(&engine, &file).await
        }
        Commands::Push {
            file,
            bucket,
            chunk_size,
            no_auto_size,
            verify_remote,
            cleanup,
        } => {
            let config = sizing(config, chunk_size, no_auto_size).with_verify_remote(verify_remote);
            let engine = build_engine(store, config);
            push::run(&engine, &file, &bucket, cleanup).await
        }
        Commands::Pull {
            file,
            bucket,
            cleanup,
        } => {
            let engine = build_engine(store, config);
            pull::run(&engine, &file, &bucket, cleanup).await
        }
        Commands::Verify { file } => verify::run(&build_engine(store, config), &file).await,
        Commands::Status { file } => status::run(&build_engine(store, config), &file).await,
        Commands::Cleanup { file } => cleanup::run(&build_engine(store, config), &file).await,
    }
}

fn sizing(config: SyncConfig, chunk_size: Option<u64>, no_auto_size: bool) -> SyncConfig {
    let mut config = config;
    if let Some(bytes) = chunk_size {
        config = config.with_chunk_size(bytes);
    }
    if no_auto_size {
        config = config.with_auto_size(false);
    }
    config
}

fn build_engine(store: FsStore, config: SyncConfig) -> SyncEngine<FsStore> {
    SyncEngine::new(store, config).with_observer(Arc::new(ConsoleObserver))
}

/// Initialize logging.
///
/// Respects `RUST_LOG` if set, otherwise uses the given level.
fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
