use serde::{Deserialize, Serialize};

/// Typeface used to render scripture text.
///
/// This is a closed set: styles are never constructed at runtime, and
/// [`TextStyle::ALL`] is the table used to decode persisted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextStyle {
    /// Screen-oriented book serif. Default value.
    #[default]
    Literata,
    Gentium,
    NotoSerif,
    SourceSans,
    /// Weighted letterforms intended for readers with dyslexia.
    OpenDyslexic,
    Monospace,
}

impl TextStyle {
    /// Every supported style, in presentation order.
    pub const ALL: [TextStyle; 6] = [
        TextStyle::Literata,
        TextStyle::Gentium,
        TextStyle::NotoSerif,
        TextStyle::SourceSans,
        TextStyle::OpenDyslexic,
        TextStyle::Monospace,
    ];

    /// Returns the canonical string stored for this style.
    pub fn as_str(&self) -> &'static str {
        match self {
            TextStyle::Literata => "literata",
            TextStyle::Gentium => "gentium",
            TextStyle::NotoSerif => "noto-serif",
            TextStyle::SourceSans => "source-sans",
            TextStyle::OpenDyslexic => "open-dyslexic",
            TextStyle::Monospace => "monospace",
        }
    }

    /// Human-readable name for settings screens.
    pub fn display_name(&self) -> &'static str {
        match self {
            TextStyle::Literata => "Literata",
            TextStyle::Gentium => "Gentium Plus",
            TextStyle::NotoSerif => "Noto Serif",
            TextStyle::SourceSans => "Source Sans",
            TextStyle::OpenDyslexic => "OpenDyslexic",
            TextStyle::Monospace => "Monospace",
        }
    }

    /// Looks up a style by its canonical string. Returns `None` when no
    /// supported style matches.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.as_str() == value)
    }
}

impl std::fmt::Display for TextStyle {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::TextStyle;

    #[test]
    fn every_style_survives_its_own_encoding() {
        for style in TextStyle::ALL {
            assert_eq!(TextStyle::parse(style.as_str()), Some(style));
        }
    }

    #[test]
    fn unknown_names_do_not_match() {
        assert_eq!(TextStyle::parse("comic-sans"), None);
        assert_eq!(TextStyle::parse("Literata"), None);
        assert_eq!(TextStyle::parse(""), None);
    }

    #[test]
    fn canonical_names_are_unique() {
        let mut names: Vec<_> = TextStyle::ALL.iter().map(TextStyle::as_str).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), TextStyle::ALL.len());
    }
}
