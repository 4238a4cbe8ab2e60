use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use toml::{Table, Value};

use super::{PersistentStore, StoreError, table};

/// Process-local store. Nothing survives a restart; useful for tests and for
/// sessions where no writable directory exists.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given entries.
    pub fn with_entries(entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            entries: RwLock::new(entries.into_iter().collect()),
        }
    }

    /// Returns a copy of every stored entry.
    pub async fn entries(&self) -> HashMap<String, Value> {
        self.entries
            .read()
            .await
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    async fn insert(&self, key: &str, value: Value) {
        self.entries.write().await.insert(key.to_string(), value);
    }
}

#[async_trait]
impl PersistentStore for MemoryStore {
    async fn get_string(&self, key: &str) -> Result<Option<String>, StoreError> {
        table::string(&*self.entries.read().await, key)
    }

    async fn get_int(&self, key: &str) -> Result<Option<i64>, StoreError> {
        table::int(&*self.entries.read().await, key)
    }

    async fn get_double(&self, key: &str) -> Result<Option<f64>, StoreError> {
        table::double(&*self.entries.read().await, key)
    }

    async fn set_string(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.insert(key, Value::String(value.to_string())).await;
        Ok(())
    }

    async fn set_int(&self, key: &str, value: i64) -> Result<(), StoreError> {
        self.insert(key, Value::Integer(value)).await;
        Ok(())
    }

    async fn set_double(&self, key: &str, value: f64) -> Result<(), StoreError> {
        self.insert(key, Value::Float(value)).await;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use toml::Value;

    use super::MemoryStore;
    use crate::store::{PersistentStore, StoreError};

    #[tokio::test]
    async fn absent_keys_read_as_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get_string("book").await.unwrap(), None);
        assert_eq!(store.get_int("chapter").await.unwrap(), None);
        assert_eq!(store.get_double("textSize").await.unwrap(), None);
    }

    #[tokio::test]
    async fn remove_makes_a_key_absent_again() {
        let store = MemoryStore::new();
        store.set_int("verse", 7).await.unwrap();
        assert_eq!(store.get_int("verse").await.unwrap(), Some(7));

        store.remove("verse").await.unwrap();
        store.remove("verse").await.unwrap();
        assert_eq!(store.get_int("verse").await.unwrap(), None);
    }

    #[tokio::test]
    async fn reading_the_wrong_type_is_an_error() {
        let store = MemoryStore::with_entries([("chapter".to_string(), Value::from("three"))]);
        let error = store.get_int("chapter").await.unwrap_err();
        assert!(matches!(error, StoreError::TypeMismatch { ref key, .. } if key == "chapter"));
    }

    #[tokio::test]
    async fn integers_read_as_doubles() {
        let store = MemoryStore::with_entries([("textSize".to_string(), Value::Integer(30))]);
        assert_eq!(store.get_double("textSize").await.unwrap(), Some(30.0));
    }
}
