//! The sync engine: reconciling local chunk state with an object store.

use std::path::Path;
use std::sync::Arc;

use tokio::fs;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use sync_chunker::{
    build_manifest, effective_chunk_size, find_existing, merge_chunks, remove_chunk_dir,
    save_manifest, split_file, verify_chunks, ChunkError, ChunkLocation,
};
use sync_store::ObjectStore;
use sync_types::{ChunkHash, ChunkManifest, ManifestError};

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::observer::{NoopObserver, SyncObserver};
use crate::report::{ChunkReport, FileStatus, PullReport, PushReport, SyncState};

/// Reconciles chunked files against an object store.
///
/// One engine serves any number of files against one store; each operation
/// is a self-contained run. Per-chunk transfers within a run are spawned
/// concurrently and bounded by [`SyncConfig::max_connections`].
pub struct SyncEngine<S> {
    store: Arc<S>,
    config: SyncConfig,
    observer: Arc<dyn SyncObserver>,
}

impl<S: ObjectStore + 'static> SyncEngine<S> {
    /// Create an engine over a store with the given configuration.
    pub fn new(store: S, config: SyncConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Install a progress observer.
    pub fn with_observer(mut self, observer: Arc<dyn SyncObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The engine's configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ensure the file is chunked, splitting it if no chunk state exists.
    ///
    /// Resuming from an existing chunk directory does not re-split or
    /// re-hash; the report says which path was taken.
    pub async fn chunk(&self, file: &Path) -> Result<ChunkReport, SyncError> {
        let (_, manifest, resumed) = self.ensure_chunked(file).await?;
        Ok(ChunkReport {
            state: SyncState::Chunked,
            chunks: manifest.chunk_count(),
            chunk_size: manifest.chunk_size,
            resumed,
        })
    }

    /// Push the file's chunks and manifest into a bucket.
    ///
    /// Chunks the file if needed, verifies every artifact against the
    /// manifest before any upload, transfers chunks the store does not
    /// already have, and uploads the manifest strictly last. If any chunk
    /// transfer fails the manifest is not uploaded, so a remote manifest
    /// always points at retrievable chunks.
    pub async fn push(&self, file: &Path, bucket: &str) -> Result<PushReport, SyncError> {
        let (loc, manifest, _) = self.ensure_chunked(file).await?;
        verify_chunks(&loc, &manifest).await?;

        let limiter = Arc::new(Semaphore::new(self.config.max_connections.max(1)));
        let mut tasks = JoinSet::new();
        for entry in &manifest.chunks {
            let store = Arc::clone(&self.store);
            let observer = Arc::clone(&self.observer);
            let limiter = Arc::clone(&limiter);
            let bucket = bucket.to_string();
            let key = entry.chunk.clone();
            let hash = entry.hash;
            let artifact = loc.artifact_path(&entry.chunk);
            let verify_remote = self.config.verify_remote;
            tasks.spawn(async move {
                let _permit = limiter
                    .acquire_owned()
                    .await
                    .map_err(|_| SyncError::Task("connection limiter closed".to_string()))?;
                push_chunk(
                    store.as_ref(),
                    observer.as_ref(),
                    &bucket,
                    &key,
                    hash,
                    &artifact,
                    verify_remote,
                )
                .await
            });
        }

        let mut uploaded = 0usize;
        let mut skipped = 0usize;
        let mut bytes_uploaded = 0u64;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(PushOutcome::Uploaded(bytes))) => {
                    uploaded += 1;
                    bytes_uploaded += bytes;
                }
                Ok(Ok(PushOutcome::Skipped)) => skipped += 1,
                Ok(Err(e)) => {
                    abort_rest(&mut tasks).await;
                    return Err(e);
                }
                Err(e) => {
                    abort_rest(&mut tasks).await;
                    return Err(SyncError::Task(e.to_string()));
                }
            }
        }

        let json = manifest.to_json().map_err(ChunkError::from)?;
        let manifest_key = loc.manifest_key();
        self.store.put(bucket, &manifest_key, json.as_bytes()).await?;
        self.observer.on_manifest_uploaded(&manifest_key);

        info!(
            file = %loc.file.display(),
            bucket,
            chunks = manifest.chunk_count(),
            uploaded,
            skipped,
            bytes = bytes_uploaded,
            "push complete"
        );
        Ok(PushReport {
            state: SyncState::Reconciled,
            chunks: manifest.chunk_count(),
            uploaded,
            skipped,
            bytes_uploaded,
            manifest_key,
        })
    }

    /// Pull the file from a bucket and reassemble it at `file`.
    ///
    /// Fetches the remote manifest, stages every chunk into the local chunk
    /// directory (reusing staged artifacts whose hash already matches,
    /// verifying everything fetched), then reassembles in manifest order via
    /// an atomic rename. A pull that fails partway leaves no destination
    /// file; staged artifacts are kept so a retry fetches less.
    pub async fn pull(&self, file: &Path, bucket: &str) -> Result<PullReport, SyncError> {
        let loc = ChunkLocation::for_file(file)?;
        let manifest_key = loc.manifest_key();
        let raw = self
            .store
            .get(bucket, &manifest_key)
            .await?
            .ok_or_else(|| SyncError::RemoteManifestMissing {
                bucket: bucket.to_string(),
                key: manifest_key.clone(),
            })?;
        let text = String::from_utf8(raw).map_err(|e| SyncError::RemoteManifestMalformed {
            key: manifest_key.clone(),
            source: ManifestError::Malformed(e.to_string()),
        })?;
        let manifest =
            ChunkManifest::from_json(&text).map_err(|e| SyncError::RemoteManifestMalformed {
                key: manifest_key.clone(),
                source: e,
            })?;

        fs::create_dir_all(&loc.dir).await.map_err(ChunkError::from)?;

        let limiter = Arc::new(Semaphore::new(self.config.max_connections.max(1)));
        let mut tasks = JoinSet::new();
        for entry in &manifest.chunks {
            let store = Arc::clone(&self.store);
            let observer = Arc::clone(&self.observer);
            let limiter = Arc::clone(&limiter);
            let bucket = bucket.to_string();
            let key = entry.chunk.clone();
            let hash = entry.hash;
            let artifact = loc.artifact_path(&entry.chunk);
            tasks.spawn(async move {
                let _permit = limiter
                    .acquire_owned()
                    .await
                    .map_err(|_| SyncError::Task("connection limiter closed".to_string()))?;
                stage_chunk(store.as_ref(), observer.as_ref(), &bucket, &key, hash, &artifact)
                    .await
            });
        }

        let mut fetched = 0usize;
        let mut cached = 0usize;
        let mut bytes_fetched = 0u64;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(PullOutcome::Fetched(bytes))) => {
                    fetched += 1;
                    bytes_fetched += bytes;
                }
                Ok(Ok(PullOutcome::Cached)) => cached += 1,
                Ok(Err(e)) => {
                    abort_rest(&mut tasks).await;
                    return Err(e);
                }
                Err(e) => {
                    abort_rest(&mut tasks).await;
                    return Err(SyncError::Task(e.to_string()));
                }
            }
        }

        // Every chunk is staged and verified; record the manifest locally so
        // the chunk directory is valid chunk state, then reassemble.
        save_manifest(&loc, &manifest).await?;
        let bytes_written = merge_chunks(&loc, &manifest, &loc.file).await?;
        self.observer.on_reassembly_done(&loc.file);

        info!(
            file = %loc.file.display(),
            bucket,
            chunks = manifest.chunk_count(),
            fetched,
            cached,
            bytes = bytes_fetched,
            "pull complete"
        );
        Ok(PullReport {
            state: SyncState::Reconciled,
            chunks: manifest.chunk_count(),
            fetched,
            cached,
            bytes_fetched,
            bytes_written,
        })
    }

    /// Verify the file's local chunk state; returns the number of chunks
    /// checked.
    pub async fn verify(&self, file: &Path) -> Result<usize, SyncError> {
        let loc = ChunkLocation::for_file(file)?;
        let manifest = find_existing(&loc)
            .await?
            .ok_or_else(|| ChunkError::NotChunked(loc.file.clone()))?;
        verify_chunks(&loc, &manifest).await?;
        Ok(manifest.chunk_count())
    }

    /// Report the file's local chunk state without touching the store.
    pub async fn status(&self, file: &Path) -> Result<FileStatus, SyncError> {
        let loc = ChunkLocation::for_file(file)?;
        Ok(match find_existing(&loc).await? {
            Some(manifest) => FileStatus {
                state: SyncState::Chunked,
                chunks: Some(manifest.chunk_count()),
                chunk_size: Some(manifest.chunk_size),
            },
            None => FileStatus {
                state: SyncState::Unchunked,
                chunks: None,
                chunk_size: None,
            },
        })
    }

    /// Discard the file's local chunk state.
    ///
    /// Returns whether anything was removed. A removal failure is logged
    /// and reported as nothing removed rather than failing the run.
    pub async fn cleanup(&self, file: &Path) -> Result<bool, SyncError> {
        let loc = ChunkLocation::for_file(file)?;
        match remove_chunk_dir(&loc).await {
            Ok(removed) => Ok(removed),
            Err(e) => {
                warn!(dir = %loc.dir.display(), error = %e, "cleanup failed");
                Ok(false)
            }
        }
    }

    async fn ensure_chunked(
        &self,
        file: &Path,
    ) -> Result<(ChunkLocation, ChunkManifest, bool), SyncError> {
        let loc = ChunkLocation::for_file(file)?;
        if let Some(manifest) = find_existing(&loc).await? {
            return Ok((loc, manifest, true));
        }

        let meta = match fs::metadata(&loc.file).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ChunkError::SourceNotFound(loc.file.clone()).into())
            }
            Err(e) => return Err(ChunkError::Io(e).into()),
        };
        let chunk_size = effective_chunk_size(
            self.config.chunk_size,
            meta.len(),
            self.config.min_chunk_size,
            self.config.auto_size,
        );
        debug!(
            file = %loc.file.display(),
            size = meta.len(),
            chunk_size,
            "splitting"
        );

        self.observer.on_split_start(&loc.file_name, chunk_size);
        let ids = split_file(&loc, chunk_size).await?;
        let manifest = build_manifest(&loc, ids, chunk_size).await?;
        save_manifest(&loc, &manifest).await?;
        self.observer.on_split_done(&loc.file_name, manifest.chunk_count());
        Ok((loc, manifest, false))
    }
}

enum PushOutcome {
    Uploaded(u64),
    Skipped,
}

enum PullOutcome {
    Fetched(u64),
    Cached,
}

async fn push_chunk<S: ObjectStore>(
    store: &S,
    observer: &dyn SyncObserver,
    bucket: &str,
    key: &str,
    hash: ChunkHash,
    artifact: &Path,
    verify_remote: bool,
) -> Result<PushOutcome, SyncError> {
    if store.exists(bucket, key).await? {
        if !verify_remote {
            observer.on_chunk_skipped(key);
            return Ok(PushOutcome::Skipped);
        }
        match store.get(bucket, key).await? {
            Some(bytes) if ChunkHash::from_data(&bytes) == hash => {
                observer.on_chunk_skipped(key);
                return Ok(PushOutcome::Skipped);
            }
            _ => warn!(key, "remote chunk does not match local hash, re-uploading"),
        }
    }

    let data = match fs::read(artifact).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ChunkError::MissingArtifact {
                chunk: key.to_string(),
            }
            .into())
        }
        Err(e) => return Err(ChunkError::Io(e).into()),
    };
    store.put(bucket, key, &data).await?;
    observer.on_chunk_uploaded(key);
    debug!(key, bytes = data.len(), "chunk uploaded");
    Ok(PushOutcome::Uploaded(data.len() as u64))
}

async fn stage_chunk<S: ObjectStore>(
    store: &S,
    observer: &dyn SyncObserver,
    bucket: &str,
    key: &str,
    hash: ChunkHash,
    artifact: &Path,
) -> Result<PullOutcome, SyncError> {
    match fs::read(artifact).await {
        Ok(bytes) if ChunkHash::from_data(&bytes) == hash => {
            observer.on_chunk_skipped(key);
            return Ok(PullOutcome::Cached);
        }
        // Stale or partial artifact: fetch a fresh copy over it.
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(ChunkError::Io(e).into()),
    }

    let bytes = store
        .get(bucket, key)
        .await?
        .ok_or_else(|| SyncError::MissingRemoteChunk {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })?;
    let actual = ChunkHash::from_data(&bytes);
    if actual != hash {
        return Err(SyncError::ChunkCorrupt {
            key: key.to_string(),
            expected: hash.to_hex(),
            actual: actual.to_hex(),
        });
    }
    write_artifact(artifact, &bytes).await.map_err(ChunkError::from)?;
    observer.on_chunk_fetched(key);
    debug!(key, bytes = bytes.len(), "chunk staged");
    Ok(PullOutcome::Fetched(bytes.len() as u64))
}

/// Stage an artifact atomically: write beside it, rename into place.
async fn write_artifact(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    let tmp = path.with_file_name(name);
    if let Err(e) = fs::write(&tmp, data).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e);
    }
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e);
    }
    Ok(())
}

async fn abort_rest<T: 'static>(tasks: &mut JoinSet<T>) {
    tasks.abort_all();
    while tasks.join_next().await.is_some() {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use sync_store::{MemoryStore, SlowStore};
    use tempfile::tempdir;

    const BUCKET: &str = "backups";

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    async fn source_file(dir: &Path, name: &str, len: usize) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, pattern(len)).await.unwrap();
        path
    }

    fn hundred_byte_chunks() -> SyncConfig {
        SyncConfig::new().with_chunk_size(100).with_auto_size(false)
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    impl RecordingObserver {
        fn record(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        fn count(&self, prefix: &str) -> usize {
            self.events()
                .iter()
                .filter(|e| e.starts_with(prefix))
                .count()
        }
    }

    impl SyncObserver for RecordingObserver {
        fn on_split_start(&self, file_name: &str, chunk_size: u64) {
            self.record(format!("split-start {file_name} {chunk_size}"));
        }
        fn on_split_done(&self, file_name: &str, chunks: usize) {
            self.record(format!("split-done {file_name} {chunks}"));
        }
        fn on_chunk_skipped(&self, chunk: &str) {
            self.record(format!("skipped {chunk}"));
        }
        fn on_chunk_uploaded(&self, chunk: &str) {
            self.record(format!("uploaded {chunk}"));
        }
        fn on_chunk_fetched(&self, chunk: &str) {
            self.record(format!("fetched {chunk}"));
        }
        fn on_manifest_uploaded(&self, key: &str) {
            self.record(format!("manifest-uploaded {key}"));
        }
        fn on_reassembly_done(&self, dest: &Path) {
            self.record(format!("reassembled {}", dest.display()));
        }
    }

    // ==== Chunking ====

    #[tokio::test]
    async fn chunk_builds_manifest_and_artifacts() {
        let dir = tempdir().unwrap();
        let file = source_file(dir.path(), "data.bin", 1000).await;
        let engine = SyncEngine::new(MemoryStore::new(), hundred_byte_chunks());

        let report = engine.chunk(&file).await.unwrap();
        assert_eq!(report.state, SyncState::Chunked);
        assert_eq!(report.chunks, 10);
        assert_eq!(report.chunk_size, 100);
        assert!(!report.resumed);

        let chunk_dir = dir.path().join("data.bin_chunks");
        assert!(chunk_dir.join("manifest.json").is_file());
        assert!(chunk_dir.join("data.bin.000009").is_file());
    }

    #[tokio::test]
    async fn chunk_twice_resumes_without_resplitting() {
        let dir = tempdir().unwrap();
        let file = source_file(dir.path(), "data.bin", 1000).await;
        let obs = Arc::new(RecordingObserver::default());
        let engine =
            SyncEngine::new(MemoryStore::new(), hundred_byte_chunks()).with_observer(obs.clone());

        let first = engine.chunk(&file).await.unwrap();
        let manifest_path = dir.path().join("data.bin_chunks/manifest.json");
        let artifact_path = dir.path().join("data.bin_chunks/data.bin.000000");
        let manifest_before = fs::read_to_string(&manifest_path).await.unwrap();
        let mtime_before = fs::metadata(&artifact_path).await.unwrap().modified().unwrap();

        let second = engine.chunk(&file).await.unwrap();

        assert!(!first.resumed);
        assert!(second.resumed);
        assert_eq!(second.chunks, first.chunks);
        // One split only: the second run loaded the existing manifest.
        assert_eq!(obs.count("split-start"), 1);
        assert_eq!(
            fs::read_to_string(&manifest_path).await.unwrap(),
            manifest_before
        );
        let mtime_after = fs::metadata(&artifact_path).await.unwrap().modified().unwrap();
        assert_eq!(mtime_after, mtime_before);
    }

    #[tokio::test]
    async fn chunk_clamps_size_for_small_files() {
        let dir = tempdir().unwrap();
        let file = source_file(dir.path(), "small.bin", 1000).await;
        let engine = SyncEngine::new(MemoryStore::new(), SyncConfig::new().with_chunk_size(8000));

        let report = engine.chunk(&file).await.unwrap();
        assert_eq!(report.chunk_size, 4096);
        assert_eq!(report.chunks, 1);
        let artifact = dir.path().join("small.bin_chunks/small.bin.000000");
        assert_eq!(fs::read(&artifact).await.unwrap(), pattern(1000));
    }

    #[tokio::test]
    async fn chunk_raises_tiny_requests_to_minimum() {
        let dir = tempdir().unwrap();
        let file = source_file(dir.path(), "large.bin", 10_000).await;
        let engine = SyncEngine::new(MemoryStore::new(), SyncConfig::new().with_chunk_size(1000));

        let report = engine.chunk(&file).await.unwrap();
        assert_eq!(report.chunk_size, 4096);
        assert_eq!(report.chunks, 3);
    }

    // ==== Push ====

    #[tokio::test]
    async fn push_uploads_all_chunks_then_manifest_last() {
        let dir = tempdir().unwrap();
        let file = source_file(dir.path(), "data.bin", 1000).await;
        let store = MemoryStore::new();
        let engine = SyncEngine::new(store.clone(), hundred_byte_chunks());

        let report = engine.push(&file, BUCKET).await.unwrap();
        assert_eq!(report.state, SyncState::Reconciled);
        assert_eq!(report.chunks, 10);
        assert_eq!(report.uploaded, 10);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.bytes_uploaded, 1000);
        assert_eq!(report.manifest_key, "data.bin_chunks/manifest.json");

        assert_eq!(store.len(), 11);
        assert!(store.contains(BUCKET, "data.bin_chunks/data.bin.000000"));
        assert!(store.contains(BUCKET, "data.bin_chunks/data.bin.000009"));
        let log = store.put_log();
        assert_eq!(log.len(), 11);
        assert_eq!(log.last().unwrap(), "data.bin_chunks/manifest.json");
    }

    #[tokio::test]
    async fn second_push_skips_all_chunks() {
        let dir = tempdir().unwrap();
        let file = source_file(dir.path(), "data.bin", 1000).await;
        let store = MemoryStore::new();
        let engine = SyncEngine::new(store.clone(), hundred_byte_chunks());

        engine.push(&file, BUCKET).await.unwrap();
        let puts_after_first = store.counts().puts;

        let report = engine.push(&file, BUCKET).await.unwrap();
        assert_eq!(report.uploaded, 0);
        assert_eq!(report.skipped, 10);
        assert_eq!(report.bytes_uploaded, 0);
        // Only the manifest is written again.
        assert_eq!(store.counts().puts, puts_after_first + 1);
    }

    #[tokio::test]
    async fn failed_chunk_upload_leaves_no_manifest() {
        let dir = tempdir().unwrap();
        let file = source_file(dir.path(), "data.bin", 1000).await;
        let store = MemoryStore::new();
        let engine = SyncEngine::new(store.clone(), hundred_byte_chunks());

        store.fail_next_put("bucket unavailable");
        let err = engine.push(&file, BUCKET).await.unwrap_err();
        assert!(matches!(err, SyncError::Store(_)));

        assert!(!store.contains(BUCKET, "data.bin_chunks/manifest.json"));
        assert!(!store
            .put_log()
            .iter()
            .any(|key| key == "data.bin_chunks/manifest.json"));
    }

    #[tokio::test]
    async fn corrupt_local_chunk_blocks_push_before_any_upload() {
        let dir = tempdir().unwrap();
        let file = source_file(dir.path(), "data.bin", 1000).await;
        let store = MemoryStore::new();
        let engine = SyncEngine::new(store.clone(), hundred_byte_chunks());

        engine.chunk(&file).await.unwrap();
        fs::write(dir.path().join("data.bin_chunks/data.bin.000004"), b"junk")
            .await
            .unwrap();

        let err = engine.push(&file, BUCKET).await.unwrap_err();
        assert!(matches!(
            err,
            SyncError::Chunk(ChunkError::HashMismatch { .. })
        ));
        assert_eq!(store.counts().puts, 0);
    }

    #[tokio::test]
    async fn tampered_remote_chunk_is_kept_when_trusting_keys() {
        let dir = tempdir().unwrap();
        let file = source_file(dir.path(), "data.bin", 1000).await;
        let store = MemoryStore::new();
        let engine = SyncEngine::new(store.clone(), hundred_byte_chunks());

        engine.push(&file, BUCKET).await.unwrap();
        store.insert(BUCKET, "data.bin_chunks/data.bin.000002", b"garbage");

        let report = engine.push(&file, BUCKET).await.unwrap();
        assert_eq!(report.skipped, 10);
        assert_eq!(
            store.object(BUCKET, "data.bin_chunks/data.bin.000002").unwrap(),
            b"garbage"
        );
    }

    #[tokio::test]
    async fn verify_remote_reuploads_tampered_chunk() {
        let dir = tempdir().unwrap();
        let file = source_file(dir.path(), "data.bin", 1000).await;
        let store = MemoryStore::new();
        let engine = SyncEngine::new(
            store.clone(),
            hundred_byte_chunks().with_verify_remote(true),
        );

        engine.push(&file, BUCKET).await.unwrap();
        store.insert(BUCKET, "data.bin_chunks/data.bin.000002", b"garbage");

        let report = engine.push(&file, BUCKET).await.unwrap();
        assert_eq!(report.uploaded, 1);
        assert_eq!(report.skipped, 9);
        assert_eq!(
            store.object(BUCKET, "data.bin_chunks/data.bin.000002").unwrap(),
            pattern(1000)[200..300].to_vec()
        );
    }

    #[tokio::test]
    async fn observer_sees_push_lifecycle() {
        let dir = tempdir().unwrap();
        let file = source_file(dir.path(), "data.bin", 1000).await;
        let obs = Arc::new(RecordingObserver::default());
        let engine =
            SyncEngine::new(MemoryStore::new(), hundred_byte_chunks()).with_observer(obs.clone());

        engine.push(&file, BUCKET).await.unwrap();

        let events = obs.events();
        assert!(events[0].starts_with("split-start data.bin"));
        assert_eq!(obs.count("uploaded"), 10);
        assert_eq!(obs.count("manifest-uploaded"), 1);
        assert_eq!(events.last().unwrap(), "manifest-uploaded data.bin_chunks/manifest.json");
    }

    // ==== Pull ====

    #[tokio::test]
    async fn pull_reassembles_byte_exact() {
        let src_dir = tempdir().unwrap();
        let dst_dir = tempdir().unwrap();
        let file = source_file(src_dir.path(), "data.bin", 1000).await;
        let store = MemoryStore::new();
        let pusher = SyncEngine::new(store.clone(), hundred_byte_chunks());
        pusher.push(&file, BUCKET).await.unwrap();

        let dest = dst_dir.path().join("data.bin");
        let puller = SyncEngine::new(store.clone(), hundred_byte_chunks());
        let report = puller.pull(&dest, BUCKET).await.unwrap();

        assert_eq!(report.state, SyncState::Reconciled);
        assert_eq!(report.chunks, 10);
        assert_eq!(report.fetched, 10);
        assert_eq!(report.cached, 0);
        assert_eq!(report.bytes_fetched, 1000);
        assert_eq!(report.bytes_written, 1000);
        assert_eq!(fs::read(&dest).await.unwrap(), pattern(1000));
        // The staged state is valid local chunk state.
        assert!(dst_dir.path().join("data.bin_chunks/manifest.json").is_file());
    }

    #[tokio::test]
    async fn second_pull_reuses_staged_chunks() {
        let src_dir = tempdir().unwrap();
        let dst_dir = tempdir().unwrap();
        let file = source_file(src_dir.path(), "data.bin", 1000).await;
        let store = MemoryStore::new();
        SyncEngine::new(store.clone(), hundred_byte_chunks())
            .push(&file, BUCKET)
            .await
            .unwrap();

        let dest = dst_dir.path().join("data.bin");
        let puller = SyncEngine::new(store.clone(), hundred_byte_chunks());
        puller.pull(&dest, BUCKET).await.unwrap();
        let gets_after_first = store.counts().gets;

        let report = puller.pull(&dest, BUCKET).await.unwrap();
        assert_eq!(report.fetched, 0);
        assert_eq!(report.cached, 10);
        // Only the manifest is fetched again.
        assert_eq!(store.counts().gets, gets_after_first + 1);
        assert_eq!(fs::read(&dest).await.unwrap(), pattern(1000));
    }

    #[tokio::test]
    async fn pull_without_remote_manifest_fails() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("data.bin");
        let engine = SyncEngine::new(MemoryStore::new(), hundred_byte_chunks());

        let err = engine.pull(&dest, BUCKET).await.unwrap_err();
        assert!(matches!(err, SyncError::RemoteManifestMissing { .. }));
        assert!(!dest.exists());
        assert!(!dir.path().join("data.bin_chunks").exists());
    }

    #[tokio::test]
    async fn pull_rejects_malformed_remote_manifest() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("data.bin");
        let store = MemoryStore::new();
        store.insert(BUCKET, "data.bin_chunks/manifest.json", b"{ not json");
        let engine = SyncEngine::new(store, hundred_byte_chunks());

        let err = engine.pull(&dest, BUCKET).await.unwrap_err();
        assert!(matches!(err, SyncError::RemoteManifestMalformed { .. }));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn pull_with_missing_chunk_leaves_no_destination() {
        let src_dir = tempdir().unwrap();
        let dst_dir = tempdir().unwrap();
        let file = source_file(src_dir.path(), "data.bin", 1000).await;
        let store = MemoryStore::new();
        SyncEngine::new(store.clone(), hundred_byte_chunks())
            .push(&file, BUCKET)
            .await
            .unwrap();
        store
            .delete(BUCKET, "data.bin_chunks/data.bin.000003")
            .await
            .unwrap();

        let dest = dst_dir.path().join("data.bin");
        let engine = SyncEngine::new(store.clone(), hundred_byte_chunks());
        let err = engine.pull(&dest, BUCKET).await.unwrap_err();
        assert!(matches!(err, SyncError::MissingRemoteChunk { .. }));
        assert!(!dest.exists());
        assert!(!dst_dir.path().join("data.bin.partial").exists());
    }

    #[tokio::test]
    async fn pull_with_corrupt_chunk_leaves_no_destination() {
        let src_dir = tempdir().unwrap();
        let dst_dir = tempdir().unwrap();
        let file = source_file(src_dir.path(), "data.bin", 1000).await;
        let store = MemoryStore::new();
        SyncEngine::new(store.clone(), hundred_byte_chunks())
            .push(&file, BUCKET)
            .await
            .unwrap();
        store.insert(BUCKET, "data.bin_chunks/data.bin.000007", b"garbage");

        let dest = dst_dir.path().join("data.bin");
        let engine = SyncEngine::new(store.clone(), hundred_byte_chunks());
        let err = engine.pull(&dest, BUCKET).await.unwrap_err();
        assert!(matches!(err, SyncError::ChunkCorrupt { .. }));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn out_of_order_fetches_reassemble_in_manifest_order() {
        let src_dir = tempdir().unwrap();
        let dst_dir = tempdir().unwrap();
        let file = source_file(src_dir.path(), "data.bin", 1000).await;
        let store = MemoryStore::new();
        SyncEngine::new(store.clone(), hundred_byte_chunks())
            .push(&file, BUCKET)
            .await
            .unwrap();

        let slow = SlowStore::new(Arc::new(store.clone())).latency(1, 20).seed(11);
        let engine = SyncEngine::new(slow, hundred_byte_chunks().with_max_connections(4));
        let dest = dst_dir.path().join("data.bin");
        engine.pull(&dest, BUCKET).await.unwrap();
        assert_eq!(fs::read(&dest).await.unwrap(), pattern(1000));
    }

    #[tokio::test]
    async fn transfers_respect_connection_limit() {
        let dir = tempdir().unwrap();
        let file = source_file(dir.path(), "data.bin", 1000).await;
        let store = MemoryStore::new();
        let slow = SlowStore::new(Arc::new(store.clone())).latency(10, 20).seed(3);
        let engine = SyncEngine::new(slow, hundred_byte_chunks().with_max_connections(2));

        engine.push(&file, BUCKET).await.unwrap();
        assert_eq!(engine.store().peak_in_flight(), 2);
    }

    // ==== Lifecycle ====

    #[tokio::test]
    async fn empty_file_round_trips() {
        let src_dir = tempdir().unwrap();
        let dst_dir = tempdir().unwrap();
        let file = source_file(src_dir.path(), "empty.bin", 0).await;
        let store = MemoryStore::new();
        let engine = SyncEngine::new(store.clone(), hundred_byte_chunks());

        let push = engine.push(&file, BUCKET).await.unwrap();
        assert_eq!(push.chunks, 0);
        assert_eq!(push.uploaded, 0);
        assert_eq!(store.counts().puts, 1);

        let dest = dst_dir.path().join("empty.bin");
        let pull = engine.pull(&dest, BUCKET).await.unwrap();
        assert_eq!(pull.chunks, 0);
        assert_eq!(pull.bytes_written, 0);
        assert_eq!(fs::read(&dest).await.unwrap(), Vec::<u8>::new());
    }

    #[tokio::test]
    async fn status_reflects_lifecycle() {
        let dir = tempdir().unwrap();
        let file = source_file(dir.path(), "data.bin", 1000).await;
        let engine = SyncEngine::new(MemoryStore::new(), hundred_byte_chunks());

        let status = engine.status(&file).await.unwrap();
        assert_eq!(status.state, SyncState::Unchunked);
        assert_eq!(status.chunks, None);

        engine.chunk(&file).await.unwrap();
        let status = engine.status(&file).await.unwrap();
        assert_eq!(status.state, SyncState::Chunked);
        assert_eq!(status.chunks, Some(10));
        assert_eq!(status.chunk_size, Some(100));

        let report = engine.push(&file, BUCKET).await.unwrap();
        assert_eq!(report.state, SyncState::Reconciled);
    }

    #[tokio::test]
    async fn verify_counts_intact_chunks() {
        let dir = tempdir().unwrap();
        let file = source_file(dir.path(), "data.bin", 1000).await;
        let engine = SyncEngine::new(MemoryStore::new(), hundred_byte_chunks());

        engine.chunk(&file).await.unwrap();
        assert_eq!(engine.verify(&file).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn verify_detects_tampering_and_requires_state() {
        let dir = tempdir().unwrap();
        let file = source_file(dir.path(), "data.bin", 1000).await;
        let engine = SyncEngine::new(MemoryStore::new(), hundred_byte_chunks());

        let err = engine.verify(&file).await.unwrap_err();
        assert!(matches!(err, SyncError::Chunk(ChunkError::NotChunked(_))));

        engine.chunk(&file).await.unwrap();
        fs::write(dir.path().join("data.bin_chunks/data.bin.000000"), b"junk")
            .await
            .unwrap();
        let err = engine.verify(&file).await.unwrap_err();
        assert!(matches!(
            err,
            SyncError::Chunk(ChunkError::HashMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn cleanup_removes_chunk_state_once() {
        let dir = tempdir().unwrap();
        let file = source_file(dir.path(), "data.bin", 1000).await;
        let engine = SyncEngine::new(MemoryStore::new(), hundred_byte_chunks());

        engine.chunk(&file).await.unwrap();
        assert!(engine.cleanup(&file).await.unwrap());
        assert!(!dir.path().join("data.bin_chunks").exists());
        assert!(!engine.cleanup(&file).await.unwrap());
    }

    #[tokio::test]
    async fn push_cleanup_pull_restores_from_store_alone() {
        let dir = tempdir().unwrap();
        let file = source_file(dir.path(), "data.bin", 1000).await;
        let store = MemoryStore::new();
        let engine = SyncEngine::new(store.clone(), hundred_byte_chunks());

        engine.push(&file, BUCKET).await.unwrap();
        engine.cleanup(&file).await.unwrap();
        fs::remove_file(&file).await.unwrap();

        let report = engine.pull(&file, BUCKET).await.unwrap();
        assert_eq!(report.fetched, 10);
        assert_eq!(fs::read(&file).await.unwrap(), pattern(1000));
    }
}
