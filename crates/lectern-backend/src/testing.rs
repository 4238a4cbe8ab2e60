//! Store doubles for unit tests.

use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;

use crate::store::{MemoryStore, PersistentStore, StoreError};

/// In-memory store that records every write and can be switched into a
/// failing mode for reads, writes or both.
#[derive(Debug, Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The wrapped store; writes through it are not recorded.
    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Attempted writes in call order, as `"set <key>"` or `"remove <key>"`.
    /// Failed attempts are included.
    pub fn writes(&self) -> Vec<String> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        Ok(())
    }

    fn record_write(&self, operation: &str, key: &str) -> Result<(), StoreError> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(format!("{operation} {key}"));
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PersistentStore for RecordingStore {
    async fn get_string(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check_read()?;
        self.inner.get_string(key).await
    }

    async fn get_int(&self, key: &str) -> Result<Option<i64>, StoreError> {
        self.check_read()?;
        self.inner.get_int(key).await
    }

    async fn get_double(&self, key: &str) -> Result<Option<f64>, StoreError> {
        self.check_read()?;
        self.inner.get_double(key).await
    }

    async fn set_string(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.record_write("set", key)?;
        self.inner.set_string(key, value).await
    }

    async fn set_int(&self, key: &str, value: i64) -> Result<(), StoreError> {
        self.record_write("set", key)?;
        self.inner.set_int(key, value).await
    }

    async fn set_double(&self, key: &str, value: f64) -> Result<(), StoreError> {
        self.record_write("set", key)?;
        self.inner.set_double(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.record_write("remove", key)?;
        self.inner.remove(key).await
    }
}
