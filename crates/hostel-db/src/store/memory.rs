//! In-memory unit store for tests and throwaway ledgers.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use hostel_core::UnitRecord;
use tokio::sync::Mutex;
use tracing::warn;

use super::UnitStore;
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Default)]
struct Inner {
    records: Mutex<Option<Vec<UnitRecord>>>,
    fail_next_save: AtomicBool,
    saves: AtomicUsize,
}

/// Unit store that keeps the last saved set in memory.
///
/// Clones share the same contents, so a test can keep a handle while the
/// ledger owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Creates an empty (unprovisioned) store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `records`.
    pub fn with_records(records: Vec<UnitRecord>) -> Self {
        MemoryStore {
            inner: Arc::new(Inner {
                records: Mutex::new(Some(records)),
                ..Inner::default()
            }),
        }
    }

    /// Makes the next `save` fail with `StoreError::Internal`.
    pub fn fail_next_save(&self) {
        self.inner.fail_next_save.store(true, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.inner.saves.load(Ordering::SeqCst)
    }

    /// Copy of what is currently stored.
    pub async fn snapshot(&self) -> Option<Vec<UnitRecord>> {
        self.inner.records.lock().await.clone()
    }
}

#[async_trait]
impl UnitStore for MemoryStore {
    async fn load(&self) -> StoreResult<Option<Vec<UnitRecord>>> {
        Ok(self.inner.records.lock().await.clone())
    }

    async fn save(&self, records: &[UnitRecord]) -> StoreResult<()> {
        if self.inner.fail_next_save.swap(false, Ordering::SeqCst) {
            warn!("Injected save failure");
            return Err(StoreError::Internal("injected save failure".to_string()));
        }

        *self.inner.records.lock().await = Some(records.to_vec());
        self.inner.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
