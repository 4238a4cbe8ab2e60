//! Large content resources loaded after startup.
//!
//! The controller treats bible text, commentary and appendices as opaque
//! values: it starts their loads, stores whatever comes back and never looks
//! inside.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Identifies one of the three content resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Bible,
    Commentary,
    Appendices,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Bible => "bible",
            ContentKind::Commentary => "commentary",
            ContentKind::Appendices => "appendices",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Errors that can occur while loading a content resource.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Failed to read the resource from disk.
    #[error("failed to read {kind} content: {source}")]
    Io {
        kind: ContentKind,
        #[source]
        source: std::io::Error,
    },
    /// The resource exists but cannot be used.
    #[error("{kind} content is unavailable: {reason}")]
    Unavailable { kind: ContentKind, reason: String },
}

/// Source of the three content resources.
///
/// Each load either yields a fully constructed value or fails. Loads run
/// concurrently with each other and with settings mutations.
#[async_trait]
pub trait ContentLibrary: Send + Sync + 'static {
    type Bible: Send + Sync + 'static;
    type Commentary: Send + Sync + 'static;
    type Appendices: Send + Sync + 'static;

    async fn load_bible(&self) -> Result<Self::Bible, ContentError>;
    async fn load_commentary(&self) -> Result<Self::Commentary, ContentError>;
    async fn load_appendices(&self) -> Result<Self::Appendices, ContentError>;
}

/// Reads each resource as text from `<root>/<kind>.txt`.
#[derive(Debug, Clone)]
pub struct DirectoryLibrary {
    root: PathBuf,
}

impl DirectoryLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read(&self, kind: ContentKind) -> Result<String, ContentError> {
        let path = self.root.join(format!("{kind}.txt"));
        log::debug!("Loading {kind} content from {path:?}");

        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ContentError::Io { kind, source })?;
        if contents.trim().is_empty() {
            return Err(ContentError::Unavailable {
                kind,
                reason: format!("{path:?} is empty"),
            });
        }

        Ok(contents)
    }
}

#[async_trait]
impl ContentLibrary for DirectoryLibrary {
    type Bible = String;
    type Commentary = String;
    type Appendices = String;

    async fn load_bible(&self) -> Result<String, ContentError> {
        self.read(ContentKind::Bible).await
    }

    async fn load_commentary(&self) -> Result<String, ContentError> {
        self.read(ContentKind::Commentary).await
    }

    async fn load_appendices(&self) -> Result<String, ContentError> {
        self.read(ContentKind::Appendices).await
    }
}

#[cfg(test)]
mod tests {
    use super::{ContentError, ContentKind, ContentLibrary, DirectoryLibrary};

    #[tokio::test]
    async fn reads_each_resource_from_its_own_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bible.txt"), "In the beginning").unwrap();
        std::fs::write(dir.path().join("commentary.txt"), "Notes").unwrap();

        let library = DirectoryLibrary::new(dir.path());
        assert_eq!(library.load_bible().await.unwrap(), "In the beginning");
        assert_eq!(library.load_commentary().await.unwrap(), "Notes");

        let error = library.load_appendices().await.unwrap_err();
        assert!(matches!(
            error,
            ContentError::Io {
                kind: ContentKind::Appendices,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn empty_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bible.txt"), "  \n").unwrap();

        let error = DirectoryLibrary::new(dir.path()).load_bible().await.unwrap_err();
        assert!(matches!(error, ContentError::Unavailable { kind: ContentKind::Bible, .. }));
    }
}
