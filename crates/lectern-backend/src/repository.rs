//! Typed settings accessors over a [`PersistentStore`].
//!
//! Reads never fail: a missing key, an undecodable value or a store error
//! all resolve to the documented default for that setting. Writes report
//! failures as [`PersistenceError`] so the caller can decide whether to
//! retry or warn.

use std::sync::Arc;

use lectern_bridge::{DEFAULT_TEXT_SIZE, ResourceId, Settings, TextStyle, ThemeMode};

use crate::store::{PersistentStore, StoreError};

/// Store keys, one per persisted setting. These names are a stable contract
/// with previously written data.
pub mod keys {
    pub const THEME_MODE: &str = "themeMode";
    pub const TEXT_STYLE: &str = "textStyle";
    pub const TEXT_SIZE: &str = "textSize";
    pub const RESOURCE: &str = "resource";
    pub const BOOK: &str = "book";
    pub const CHAPTER: &str = "chapter";
    pub const VERSE: &str = "verse";
}

/// A write was requested but not durably applied.
#[derive(Debug, thiserror::Error)]
#[error("failed to persist {key:?}: {source}")]
pub struct PersistenceError {
    /// Store key of the setting that failed to persist.
    pub key: &'static str,
    #[source]
    pub source: StoreError,
}

/// Reads and writes individual settings, translating between domain values
/// and store primitives.
#[derive(Clone)]
pub struct SettingsRepository {
    store: Arc<dyn PersistentStore>,
}

impl SettingsRepository {
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        Self { store }
    }

    /// Reads every setting. Individual reads fall back to their defaults
    /// independently.
    pub async fn read_settings(&self) -> Settings {
        let (theme_mode, text_style, text_size, resource, book, chapter, verse) = tokio::join!(
            self.read_theme_mode(),
            self.read_text_style(),
            self.read_text_size(),
            self.read_resource(),
            self.read_book_name(),
            self.read_chapter(),
            self.read_verse(),
        );

        Settings {
            theme_mode,
            text_style,
            text_size,
            resource,
            book,
            chapter,
            verse,
        }
    }

    pub async fn read_theme_mode(&self) -> ThemeMode {
        absorb(keys::THEME_MODE, self.store.get_string(keys::THEME_MODE).await)
            .map(|value| ThemeMode::parse(&value))
            .unwrap_or_default()
    }

    pub async fn read_text_style(&self) -> TextStyle {
        absorb(keys::TEXT_STYLE, self.store.get_string(keys::TEXT_STYLE).await)
            .and_then(|value| {
                let style = TextStyle::parse(&value);
                if style.is_none() {
                    log::warn!("Unknown text style {value:?}, using the default style");
                }
                style
            })
            .unwrap_or_default()
    }

    pub async fn read_text_size(&self) -> f64 {
        absorb(keys::TEXT_SIZE, self.store.get_double(keys::TEXT_SIZE).await)
            .unwrap_or(DEFAULT_TEXT_SIZE)
    }

    pub async fn read_resource(&self) -> Option<ResourceId> {
        absorb(keys::RESOURCE, self.store.get_string(keys::RESOURCE).await).map(ResourceId::from)
    }

    pub async fn read_book_name(&self) -> Option<String> {
        absorb(keys::BOOK, self.store.get_string(keys::BOOK).await)
    }

    pub async fn read_chapter(&self) -> Option<u32> {
        self.read_number(keys::CHAPTER).await
    }

    pub async fn read_verse(&self) -> Option<u32> {
        self.read_number(keys::VERSE).await
    }

    async fn read_number(&self, key: &'static str) -> Option<u32> {
        let value = absorb(key, self.store.get_int(key).await)?;
        match u32::try_from(value) {
            Ok(number) => Some(number),
            Err(_) => {
                log::warn!("Stored {key:?} value {value} is out of range, ignoring it");
                None
            }
        }
    }

    pub async fn write_theme_mode(&self, mode: ThemeMode) -> Result<(), PersistenceError> {
        let result = self.store.set_string(keys::THEME_MODE, mode.as_str()).await;
        report(keys::THEME_MODE, result)
    }

    pub async fn write_text_style(&self, style: TextStyle) -> Result<(), PersistenceError> {
        let result = self.store.set_string(keys::TEXT_STYLE, style.as_str()).await;
        report(keys::TEXT_STYLE, result)
    }

    pub async fn write_text_size(&self, size: f64) -> Result<(), PersistenceError> {
        let result = self.store.set_double(keys::TEXT_SIZE, size).await;
        report(keys::TEXT_SIZE, result)
    }

    /// Writes the resource, or removes the key when `resource` is `None`.
    pub async fn write_resource(&self, resource: Option<&ResourceId>) -> Result<(), PersistenceError> {
        let result = match resource {
            Some(resource) => self.store.set_string(keys::RESOURCE, resource.as_str()).await,
            None => self.store.remove(keys::RESOURCE).await,
        };
        report(keys::RESOURCE, result)
    }

    /// Writes the book name, or removes the key when `name` is `None`.
    pub async fn write_book_name(&self, name: Option<&str>) -> Result<(), PersistenceError> {
        let result = match name {
            Some(name) => self.store.set_string(keys::BOOK, name).await,
            None => self.store.remove(keys::BOOK).await,
        };
        report(keys::BOOK, result)
    }

    pub async fn write_chapter(&self, chapter: Option<u32>) -> Result<(), PersistenceError> {
        self.write_number(keys::CHAPTER, chapter).await
    }

    pub async fn write_verse(&self, verse: Option<u32>) -> Result<(), PersistenceError> {
        self.write_number(keys::VERSE, verse).await
    }

    async fn write_number(&self, key: &'static str, value: Option<u32>) -> Result<(), PersistenceError> {
        let result = match value {
            Some(value) => self.store.set_int(key, i64::from(value)).await,
            None => self.store.remove(key).await,
        };
        report(key, result)
    }
}

/// Turns a read result into a plain option, logging and discarding store
/// errors.
fn absorb<T>(key: &str, result: Result<Option<T>, StoreError>) -> Option<T> {
    result.unwrap_or_else(|error| {
        log::warn!("Failed to read {key:?}, using the default: {error}");
        None
    })
}

fn report(key: &'static str, result: Result<(), StoreError>) -> Result<(), PersistenceError> {
    result.map_err(|source| PersistenceError { key, source })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lectern_bridge::{ResourceId, Settings, TextStyle, ThemeMode};
    use rstest::rstest;
    use toml::Value;

    use super::{SettingsRepository, keys};
    use crate::store::{MemoryStore, PersistentStore};
    use crate::testing::RecordingStore;

    fn repository_over(store: Arc<dyn PersistentStore>) -> SettingsRepository {
        SettingsRepository::new(store)
    }

    #[tokio::test]
    async fn empty_store_reads_as_defaults() {
        let repository = repository_over(Arc::new(MemoryStore::new()));
        assert_eq!(repository.read_settings().await, Settings::default());
    }

    #[tokio::test]
    async fn failing_store_reads_as_defaults() {
        let store = Arc::new(RecordingStore::new());
        store.inner().set_string(keys::THEME_MODE, "dark").await.unwrap();
        store.inner().set_int(keys::CHAPTER, 4).await.unwrap();
        store.fail_reads(true);

        let repository = repository_over(store);
        assert_eq!(repository.read_theme_mode().await, ThemeMode::System);
        assert_eq!(repository.read_text_size().await, 24.0);
        assert_eq!(repository.read_text_style().await, TextStyle::default());
        assert_eq!(repository.read_chapter().await, None);
    }

    #[rstest]
    #[case(Value::from("dark"), ThemeMode::Dark)]
    #[case(Value::from("light"), ThemeMode::Light)]
    #[case(Value::from("system"), ThemeMode::System)]
    #[case(Value::from("midnight"), ThemeMode::System)]
    #[case(Value::Integer(1), ThemeMode::System)]
    #[tokio::test]
    async fn decodes_theme_mode(#[case] stored: Value, #[case] expected: ThemeMode) {
        let store = MemoryStore::with_entries([(keys::THEME_MODE.to_string(), stored)]);
        let repository = repository_over(Arc::new(store));
        assert_eq!(repository.read_theme_mode().await, expected);
    }

    #[tokio::test]
    async fn unknown_text_style_reads_as_default() {
        let store = MemoryStore::with_entries([(keys::TEXT_STYLE.to_string(), Value::from("papyrus"))]);
        let repository = repository_over(Arc::new(store));
        assert_eq!(repository.read_text_style().await, TextStyle::Literata);
    }

    #[tokio::test]
    async fn styles_and_modes_round_trip_through_the_store() {
        let repository = repository_over(Arc::new(MemoryStore::new()));

        for style in TextStyle::ALL {
            repository.write_text_style(style).await.unwrap();
            assert_eq!(repository.read_text_style().await, style);
        }
        for mode in ThemeMode::ALL {
            repository.write_theme_mode(mode).await.unwrap();
            assert_eq!(repository.read_theme_mode().await, mode);
        }
    }

    #[tokio::test]
    async fn clearing_an_optional_setting_removes_its_key() {
        let store = Arc::new(MemoryStore::new());
        let repository = repository_over(store.clone());

        repository.write_resource(Some(&ResourceId::new("KJV"))).await.unwrap();
        repository.write_book_name(Some("Genesis")).await.unwrap();
        repository.write_chapter(Some(3)).await.unwrap();
        repository.write_verse(Some(14)).await.unwrap();
        assert_eq!(store.entries().await.len(), 4);

        repository.write_resource(None).await.unwrap();
        repository.write_book_name(None).await.unwrap();
        repository.write_chapter(None).await.unwrap();
        repository.write_verse(None).await.unwrap();
        assert!(store.entries().await.is_empty());

        assert_eq!(repository.read_resource().await, None);
        assert_eq!(repository.read_book_name().await, None);
        assert_eq!(repository.read_chapter().await, None);
        assert_eq!(repository.read_verse().await, None);
    }

    #[tokio::test]
    async fn negative_numbers_read_as_absent() {
        let store = MemoryStore::with_entries([(keys::VERSE.to_string(), Value::Integer(-2))]);
        let repository = repository_over(Arc::new(store));
        assert_eq!(repository.read_verse().await, None);
    }

    #[tokio::test]
    async fn failed_write_names_the_key() {
        let store = Arc::new(RecordingStore::new());
        store.fail_writes(true);
        let repository = repository_over(store);

        let error = repository.write_text_size(30.0).await.unwrap_err();
        assert_eq!(error.key, keys::TEXT_SIZE);
        assert!(error.to_string().contains("textSize"));

        let error = repository.write_verse(None).await.unwrap_err();
        assert_eq!(error.key, keys::VERSE);
    }
}
