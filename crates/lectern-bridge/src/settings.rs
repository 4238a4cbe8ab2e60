use serde::{Deserialize, Serialize};

use crate::{Location, ResourceId, TextStyle, ThemeMode};

/// Persisted reading preferences and position.
///
/// This is the part of the controller's snapshot that is written through to
/// the key-value store, one key per field. Absent optional fields are valid
/// persisted state and mean "no selection".
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    /// Color scheme preference.
    pub theme_mode: ThemeMode,
    /// Typeface used for scripture text.
    pub text_style: TextStyle,
    /// Text size in points. Bounds are left to the presentation layer.
    pub text_size: f64,
    /// Active translation or edition, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceId>,
    /// Current book. `None` means nothing is selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,
    /// Current chapter, meaningful only when a book is selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<u32>,
    /// Current verse, meaningful only when a chapter is selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verse: Option<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme_mode: ThemeMode::default(),
            text_style: TextStyle::default(),
            text_size: crate::DEFAULT_TEXT_SIZE,
            resource: None,
            book: None,
            chapter: None,
            verse: None,
        }
    }
}

impl Settings {
    /// The reading location derived from book, chapter and verse. Exists
    /// only when a book is selected.
    pub fn path(&self) -> Option<Location> {
        Location::from_parts(self.book.as_deref(), self.chapter, self.verse)
    }
}

#[cfg(test)]
mod tests {
    use super::Settings;
    use crate::{Location, ResourceId, TextStyle, ThemeMode};

    #[test]
    fn defaults_match_a_fresh_install() {
        let settings = Settings::default();
        assert_eq!(settings.theme_mode, ThemeMode::System);
        assert_eq!(settings.text_style, TextStyle::Literata);
        assert_eq!(settings.text_size, 24.0);
        assert_eq!(settings.resource, None);
        assert_eq!(settings.path(), None);
    }

    #[test]
    fn serializes_without_absent_fields() {
        let settings = Settings {
            theme_mode: ThemeMode::Dark,
            resource: Some(ResourceId::new("KJV")),
            book: Some("John".to_string()),
            chapter: Some(3),
            ..Settings::default()
        };

        let contents = toml::to_string(&settings).expect("settings serialize");
        assert!(contents.contains("theme_mode = \"dark\""));
        assert!(contents.contains("resource = \"KJV\""));
        assert!(!contents.contains("verse"));
        assert_eq!(
            settings.path(),
            Some(Location::book("John").with_chapter(3))
        );
    }
}
