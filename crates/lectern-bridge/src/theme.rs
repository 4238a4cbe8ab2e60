use serde::{Deserialize, Serialize};

/// Color scheme preference of the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Dark background with light text.
    Dark,
    /// Light background with dark text.
    Light,
    /// Follow the operating system preference. Default value.
    #[default]
    System,
}

impl ThemeMode {
    /// All theme modes, in the order they are usually presented.
    pub const ALL: [ThemeMode; 3] = [ThemeMode::Dark, ThemeMode::Light, ThemeMode::System];

    /// Returns the stable string stored for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Dark => "dark",
            ThemeMode::Light => "light",
            ThemeMode::System => "system",
        }
    }

    /// Decodes a stored string. Anything that is not one of the three known
    /// names falls back to [`ThemeMode::System`].
    pub fn parse(value: &str) -> Self {
        match value {
            "dark" => ThemeMode::Dark,
            "light" => ThemeMode::Light,
            _ => ThemeMode::System,
        }
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::ThemeMode;

    #[rstest]
    #[case("dark", ThemeMode::Dark)]
    #[case("light", ThemeMode::Light)]
    #[case("system", ThemeMode::System)]
    #[case("", ThemeMode::System)]
    #[case("Dark", ThemeMode::System)]
    #[case("sepia", ThemeMode::System)]
    fn parses_stored_names(#[case] stored: &str, #[case] expected: ThemeMode) {
        assert_eq!(ThemeMode::parse(stored), expected);
    }

    #[test]
    fn every_mode_survives_its_own_encoding() {
        for mode in ThemeMode::ALL {
            assert_eq!(ThemeMode::parse(mode.as_str()), mode);
        }
    }
}
