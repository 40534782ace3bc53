//! In-memory store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Entries, MapStore, StoreError, StoreResult};

/// Map store kept in process memory.
///
/// Clones share state, so a test can keep one clone to inspect what the
/// engine saved. Every successful save is also appended to a history.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<Entries>>,
    history: Arc<Mutex<Vec<Entries>>>,
    fail_saves: Arc<AtomicBool>,
    fail_loads: Arc<AtomicBool>,
    save_delay: Option<Duration>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `entries`.
    pub fn with_entries(entries: Entries) -> Self {
        Self {
            entries: Arc::new(Mutex::new(entries)),
            ..Self::default()
        }
    }

    /// Make every save take at least `delay`.
    pub fn with_save_delay(mut self, delay: Duration) -> Self {
        self.save_delay = Some(delay);
        self
    }

    /// Make subsequent saves fail (or succeed again).
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent loads fail (or succeed again).
    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Currently stored map.
    pub async fn entries(&self) -> Entries {
        self.entries.lock().await.clone()
    }

    /// Every successfully saved map, oldest first.
    pub async fn history(&self) -> Vec<Entries> {
        self.history.lock().await.clone()
    }

    /// Highest number of saves that were ever running at the same time.
    pub fn max_concurrent_saves(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MapStore for MemoryStore {
    async fn save(&self, entries: &Entries) -> StoreResult<()> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        if let Some(delay) = self.save_delay {
            tokio::time::sleep(delay).await;
        }

        let result = if self.fail_saves.load(Ordering::SeqCst) {
            Err(StoreError::Backend("save rejected".to_string()))
        } else {
            *self.entries.lock().await = entries.clone();
            self.history.lock().await.push(entries.clone());
            Ok(())
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn load(&self) -> StoreResult<Entries> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("load rejected".to_string()));
        }
        Ok(self.entries.lock().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_save_and_load() {
        let store = MemoryStore::new();
        let mut entries = Entries::new();
        entries.insert("/a/".to_string(), json!([]));

        store.save(&entries).await.unwrap();
        assert_eq!(store.load().await.unwrap(), entries);
        assert_eq!(store.history().await.len(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStore::new();
        let observer = store.clone();

        let mut entries = Entries::new();
        entries.insert("/a/".to_string(), json!([]));
        store.save(&entries).await.unwrap();

        assert_eq!(observer.entries().await, entries);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = MemoryStore::new();

        store.set_fail_saves(true);
        assert!(store.save(&Entries::new()).await.is_err());
        assert!(store.history().await.is_empty());

        store.set_fail_loads(true);
        assert!(matches!(store.load().await, Err(StoreError::Backend(_))));
    }
}
