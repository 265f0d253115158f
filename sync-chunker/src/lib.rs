//! # sync-chunker
//!
//! Local chunk mechanics for bucket-sync: splitting a source file into
//! fixed-size artifacts, fingerprinting them, persisting the manifest, and
//! reassembling the original file.
//!
//! ## Chunk state layout
//!
//! ```text
//! data.bin                      ← source file
//! data.bin_chunks/              ← chunk directory (the `_chunks` suffix is
//!     data.bin.000000               what marks it as chunk state)
//!     data.bin.000001
//!     data.bin.000002
//!     manifest.json             ← ordered entries {chunk, hash}
//! ```
//!
//! The manifest is written only after every artifact exists, and a chunk
//! directory without a readable manifest is refused rather than silently
//! re-split. Everything in this crate is local-only; reconciling chunk state
//! against an object store happens in `sync-engine`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use bucket_sync_chunker::{
//!     build_manifest, merge_chunks, save_manifest, split_file, ChunkLocation,
//! };
//!
//! # async fn example() -> Result<(), bucket_sync_chunker::ChunkError> {
//! let loc = ChunkLocation::for_file("data.bin".as_ref())?;
//! let ids = split_file(&loc, 4096).await?;
//! let manifest = build_manifest(&loc, ids, 4096).await?;
//! save_manifest(&loc, &manifest).await?;
//!
//! // Later: byte-exact reassembly in manifest order.
//! merge_chunks(&loc, &manifest, "restored.bin".as_ref()).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod assemble;
mod error;
mod fingerprint;
mod location;
mod manifest;
mod split;

pub use assemble::{merge_chunks, verify_chunks, verify_entry};
pub use error::ChunkError;
pub use fingerprint::{build_manifest, fingerprint_file};
pub use location::ChunkLocation;
pub use manifest::{find_existing, load_manifest, save_manifest};
pub use split::{effective_chunk_size, remove_chunk_dir, split_file};
