//! Asynchronous key-value persistence.
//!
//! [`PersistentStore`] is pure I/O: it reports absence as `Ok(None)` and any
//! backend problem as a [`StoreError`]. Substituting defaults is the
//! repository's job, not the store's.

mod memory;
mod toml_file;

use async_trait::async_trait;

pub use self::memory::MemoryStore;
pub use self::toml_file::TomlFileStore;

/// Errors that can occur while reading or writing a persistent store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An I/O error occurred while reading or writing the backing file.
    #[error("failed to access store: {0}")]
    IoError(#[from] std::io::Error),
    /// The backing file contains invalid TOML.
    #[error("failed to deserialize store: {0}")]
    DeserializeError(#[from] toml::de::Error),
    /// Failed to serialize the stored entries back to TOML.
    #[error("failed to serialize store: {0}")]
    SerializeError(#[from] toml::ser::Error),
    /// The key exists but holds a different primitive type.
    #[error("key {key:?} does not hold {expected} value")]
    TypeMismatch {
        key: String,
        expected: &'static str,
    },
    /// The backend cannot serve requests at the moment.
    #[error("store is unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous key-value store over string, integer and floating point
/// primitives.
///
/// Implementations must tolerate repeated and concurrent calls from the same
/// process. Concurrent access from several processes is not required.
#[async_trait]
pub trait PersistentStore: Send + Sync {
    async fn get_string(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn get_int(&self, key: &str) -> Result<Option<i64>, StoreError>;
    async fn get_double(&self, key: &str) -> Result<Option<f64>, StoreError>;

    async fn set_string(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn set_int(&self, key: &str, value: i64) -> Result<(), StoreError>;
    async fn set_double(&self, key: &str, value: f64) -> Result<(), StoreError>;

    /// Deletes the key. Removing a key that does not exist succeeds.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Typed lookups over a TOML table, shared by the in-memory and file
/// backends.
pub(crate) mod table {
    use toml::{Table, Value};

    use super::StoreError;

    fn mismatch(key: &str, expected: &'static str) -> StoreError {
        StoreError::TypeMismatch {
            key: key.to_string(),
            expected,
        }
    }

    pub fn string(table: &Table, key: &str) -> Result<Option<String>, StoreError> {
        match table.get(key) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.clone())),
            Some(_) => Err(mismatch(key, "a string")),
        }
    }

    pub fn int(table: &Table, key: &str) -> Result<Option<i64>, StoreError> {
        match table.get(key) {
            None => Ok(None),
            Some(Value::Integer(value)) => Ok(Some(*value)),
            Some(_) => Err(mismatch(key, "an integer")),
        }
    }

    pub fn double(table: &Table, key: &str) -> Result<Option<f64>, StoreError> {
        match table.get(key) {
            None => Ok(None),
            Some(Value::Float(value)) => Ok(Some(*value)),
            // hand-edited files often write `24` rather than `24.0`
            Some(Value::Integer(value)) => Ok(Some(*value as f64)),
            Some(_) => Err(mismatch(key, "a number")),
        }
    }
}
