//! An [`ObjectStore`] wrapper that injects artificial latency.
//!
//! `SlowStore` wraps any `Arc<dyn ObjectStore>` and sleeps a seeded-random
//! duration before each operation, while tracking the peak number of
//! in-flight operations. Out-of-order completion and connection-pool bounds
//! never show up against an instant in-memory store, so concurrency tests
//! wrap their store in one of these.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{ObjectStore, StoreError};

/// Latency-injecting wrapper around another store.
pub struct SlowStore {
    inner: Arc<dyn ObjectStore>,
    latency_ms: (u64, u64),
    rng: Mutex<StdRng>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl SlowStore {
    /// Wrap an existing store with zero latency (pass-through) by default.
    pub fn new(inner: Arc<dyn ObjectStore>) -> Self {
        Self {
            inner,
            latency_ms: (0, 0),
            rng: Mutex::new(StdRng::seed_from_u64(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set the per-operation latency range in milliseconds (uniform random).
    pub fn latency(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.latency_ms = (min_ms, max_ms);
        self
    }

    /// Set the RNG seed for reproducible delays.
    pub fn seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    /// Highest number of operations that were ever in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn enter(&self) -> InFlight {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        InFlight {
            counter: Arc::clone(&self.in_flight),
        }
    }

    async fn delay(&self) {
        let (min, max) = self.latency_ms;
        if max == 0 {
            return;
        }
        let ms = if min >= max {
            min
        } else {
            self.rng.lock().unwrap().gen_range(min..=max)
        };
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

struct InFlight {
    counter: Arc<AtomicUsize>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for SlowStore {
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, StoreError> {
        let _guard = self.enter();
        self.delay().await;
        self.inner.exists(bucket, key).await
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let _guard = self.enter();
        self.delay().await;
        self.inner.get(bucket, key).await
    }

    async fn put(&self, bucket: &str, key: &str, data: &[u8]) -> Result<(), StoreError> {
        let _guard = self.enter();
        self.delay().await;
        self.inner.put(bucket, key, data).await
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        let _guard = self.enter();
        self.delay().await;
        self.inner.delete(bucket, key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[tokio::test]
    async fn passes_operations_through() {
        let memory = MemoryStore::new();
        let slow = SlowStore::new(Arc::new(memory.clone()));

        slow.put("b", "key", b"payload").await.unwrap();
        assert_eq!(slow.get("b", "key").await.unwrap(), Some(b"payload".to_vec()));
        assert!(slow.exists("b", "key").await.unwrap());
        slow.delete("b", "key").await.unwrap();
        assert!(memory.is_empty());
    }

    #[tokio::test]
    async fn tracks_peak_in_flight() {
        let slow = Arc::new(
            SlowStore::new(Arc::new(MemoryStore::new()))
                .latency(20, 20)
                .seed(7),
        );

        let mut handles = Vec::new();
        for i in 0..4 {
            let store = Arc::clone(&slow);
            handles.push(tokio::spawn(async move {
                store.put("b", &format!("key-{i}"), b"x").await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(slow.peak_in_flight(), 4);
    }

    #[tokio::test]
    async fn zero_latency_is_instant() {
        let slow = SlowStore::new(Arc::new(MemoryStore::new()));
        slow.put("b", "k", b"x").await.unwrap();
        assert!(slow.exists("b", "k").await.unwrap());
    }
}
