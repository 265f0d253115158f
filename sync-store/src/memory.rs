//! In-memory object store for testing.
//!
//! Captures an ordered put log and per-operation counters, and supports
//! one-shot failure injection for exercising abort paths.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{ObjectStore, StoreError};

/// Cumulative per-operation call counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OpCounts {
    /// Number of `exists` calls.
    pub exists: u64,
    /// Number of `get` calls.
    pub gets: u64,
    /// Number of `put` calls.
    pub puts: u64,
    /// Number of `delete` calls.
    pub deletes: u64,
}

/// In-memory object store.
///
/// Counts every operation, records put keys in completion order, and can be
/// told to fail the next call of each kind. Cloning shares state so a test
/// keeps a handle while the engine owns another.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    objects: HashMap<(String, String), Vec<u8>>,
    put_log: Vec<String>,
    counts: OpCounts,
    fail_next_exists: Option<String>,
    fail_next_get: Option<String>,
    fail_next_put: Option<String>,
    fail_next_delete: Option<String>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object directly, bypassing counters and the put log.
    pub fn insert(&self, bucket: &str, key: &str, data: &[u8]) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .objects
            .insert((bucket.to_string(), key.to_string()), data.to_vec());
    }

    /// Whether an object is present, bypassing counters.
    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        let inner = self.inner.lock().unwrap();
        inner
            .objects
            .contains_key(&(bucket.to_string(), key.to_string()))
    }

    /// Raw object bytes, bypassing counters.
    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        let inner = self.inner.lock().unwrap();
        inner
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Number of stored objects across all buckets.
    pub fn len(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.objects.len()
    }

    /// Whether the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys put so far, in completion order.
    pub fn put_log(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner.put_log.clone()
    }

    /// Cumulative operation counts.
    pub fn counts(&self) -> OpCounts {
        let inner = self.inner.lock().unwrap();
        inner.counts
    }

    /// Cause the next `exists()` to fail with the given error.
    pub fn fail_next_exists(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_exists = Some(error.to_string());
    }

    /// Cause the next `get()` to fail with the given error.
    pub fn fail_next_get(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_get = Some(error.to_string());
    }

    /// Cause the next `put()` to fail with the given error.
    pub fn fail_next_put(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_put = Some(error.to_string());
    }

    /// Cause the next `delete()` to fail with the given error.
    pub fn fail_next_delete(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_delete = Some(error.to_string());
    }

    /// Clear all state (objects, log, counters, injected failures).
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        *inner = MemoryStoreInner::default();
    }
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.counts.exists += 1;

        if let Some(error) = inner.fail_next_exists.take() {
            return Err(StoreError::Backend(error));
        }

        Ok(inner
            .objects
            .contains_key(&(bucket.to_string(), key.to_string())))
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.counts.gets += 1;

        if let Some(error) = inner.fail_next_get.take() {
            return Err(StoreError::Backend(error));
        }

        Ok(inner
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned())
    }

    async fn put(&self, bucket: &str, key: &str, data: &[u8]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.counts.puts += 1;

        if let Some(error) = inner.fail_next_put.take() {
            return Err(StoreError::Backend(error));
        }

        inner
            .objects
            .insert((bucket.to_string(), key.to_string()), data.to_vec());
        inner.put_log.push(key.to_string());
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.counts.deletes += 1;

        if let Some(error) = inner.fail_next_delete.take() {
            return Err(StoreError::Backend(error));
        }

        inner
            .objects
            .remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }
}
