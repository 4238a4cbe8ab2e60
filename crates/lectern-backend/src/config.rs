use std::path::PathBuf;

use directories::ProjectDirs;

/// Errors raised while locating the application's files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The platform reported no home directory to place settings under.
    #[error("no home directory available for settings and content")]
    NoHomeDirectory,
}

/// Locations of the files the application reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    /// TOML file holding one entry per persisted setting.
    pub settings_file: PathBuf,
    /// Directory holding the bible, commentary and appendices content.
    pub content_dir: PathBuf,
}

impl StoragePaths {
    /// Resolves the paths inside the user's configuration and data
    /// directories.
    pub fn resolve() -> Result<Self, ConfigError> {
        match ProjectDirs::from("org", "lectern", "lectern") {
            Some(dirs) => Ok(Self::within(dirs.config_dir(), dirs.data_dir())),
            None => Err(ConfigError::NoHomeDirectory),
        }
    }

    /// Builds the paths relative to explicit configuration and data
    /// directories.
    pub fn within(config_dir: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            settings_file: config_dir.into().join("settings.toml"),
            content_dir: data_dir.into().join("content"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::StoragePaths;

    #[test]
    fn places_files_under_the_given_directories() {
        let paths = StoragePaths::within("/cfg", "/data");
        assert_eq!(paths.settings_file, Path::new("/cfg/settings.toml"));
        assert_eq!(paths.content_dir, Path::new("/data/content"));
    }
}
