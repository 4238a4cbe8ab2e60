use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::{
    fs::{OpenOptions, create_dir_all, read_to_string},
    io::AsyncWriteExt,
    sync::Mutex,
};
use toml::{Table, Value};

use super::{PersistentStore, StoreError, table};

/// Store backed by a single TOML file holding one entry per key.
///
/// The file is read once when the store is opened and rewritten in full on
/// every change. Writes are serialized, so concurrent changes never
/// interleave on disk; the cached table only moves forward once the file
/// write succeeded.
#[derive(Debug)]
pub struct TomlFileStore {
    path: PathBuf,
    entries: Mutex<Table>,
}

impl TomlFileStore {
    /// Opens the store at `path`. A missing file is an empty store; it is
    /// created on the first write.
    ///
    /// A file that cannot be read or parsed also opens as an empty store, so
    /// every read falls back to its default. The file is left untouched until
    /// the first successful write replaces it.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        log::info!("Opening settings store at {path:?}");

        let entries = match read_table(&path).await {
            Ok(entries) => entries,
            Err(error) => {
                log::warn!("Ignoring unusable settings store at {path:?}: {error}");
                Table::new()
            }
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn update(&self, change: impl FnOnce(&mut Table)) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        change(&mut next);
        write_table(&self.path, &next).await?;
        *entries = next;
        Ok(())
    }
}

async fn read_table(path: &Path) -> Result<Table, StoreError> {
    match read_to_string(path).await {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(Table::new()),
        Err(error) => Err(error.into()),
    }
}

/// Serializes `entries` to pretty-printed TOML and replaces the file at
/// `path` with it.
async fn write_table(path: &Path, entries: &Table) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent).await?;
    }

    let contents = toml::to_string_pretty(entries)?;
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .await?;
    file.write_all(contents.as_bytes()).await?;
    file.sync_all().await?;

    Ok(())
}

#[async_trait]
impl PersistentStore for TomlFileStore {
    async fn get_string(&self, key: &str) -> Result<Option<String>, StoreError> {
        table::string(&*self.entries.lock().await, key)
    }

    async fn get_int(&self, key: &str) -> Result<Option<i64>, StoreError> {
        table::int(&*self.entries.lock().await, key)
    }

    async fn get_double(&self, key: &str) -> Result<Option<f64>, StoreError> {
        table::double(&*self.entries.lock().await, key)
    }

    async fn set_string(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.insert(key.to_string(), Value::String(value.to_string()));
        })
        .await
    }

    async fn set_int(&self, key: &str, value: i64) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.insert(key.to_string(), Value::Integer(value));
        })
        .await
    }

    async fn set_double(&self, key: &str, value: f64) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.insert(key.to_string(), Value::Float(value));
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.remove(key);
        })
        .await
    }
}
