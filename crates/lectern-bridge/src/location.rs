use serde::{Deserialize, Serialize};

/// A reading position: a book, optionally narrowed to a chapter, optionally
/// narrowed further to a verse.
///
/// The constructors make a verse without a chapter unrepresentable, and a
/// location always has a book. "No selection" is expressed as
/// `Option<Location>::None` by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Location {
    book: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chapter: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    verse: Option<u32>,
}

impl Location {
    /// A location pointing at a whole book.
    pub fn book(name: impl Into<String>) -> Self {
        Self {
            book: name.into(),
            chapter: None,
            verse: None,
        }
    }

    /// Narrows the location to a chapter. Any verse is dropped, since it
    /// belonged to the previous chapter.
    pub fn with_chapter(mut self, chapter: u32) -> Self {
        self.chapter = Some(chapter);
        self.verse = None;
        self
    }

    /// Narrows the location to a verse. Returns `None` when there is no
    /// chapter to attach the verse to.
    pub fn with_verse(mut self, verse: u32) -> Option<Self> {
        if self.chapter.is_none() {
            return None;
        }
        self.verse = Some(verse);
        Some(self)
    }

    /// Builds a location out of independently stored fields. A verse with no
    /// chapter is discarded; a missing book means there is no location.
    pub fn from_parts(book: Option<&str>, chapter: Option<u32>, verse: Option<u32>) -> Option<Self> {
        let location = Self::book(book?);
        let Some(chapter) = chapter else {
            return Some(location);
        };

        let location = location.with_chapter(chapter);
        match verse {
            Some(verse) => location.with_verse(verse),
            None => Some(location),
        }
    }

    pub fn book_name(&self) -> &str {
        &self.book
    }

    pub fn chapter(&self) -> Option<u32> {
        self.chapter
    }

    pub fn verse(&self) -> Option<u32> {
        self.verse
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.chapter, self.verse) {
            (Some(chapter), Some(verse)) => write!(formatter, "{} {chapter}:{verse}", self.book),
            (Some(chapter), None) => write!(formatter, "{} {chapter}", self.book),
            _ => formatter.write_str(&self.book),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Location;

    #[test]
    fn verse_requires_a_chapter() {
        assert_eq!(Location::book("Genesis").with_verse(3), None);

        let location = Location::book("Genesis")
            .with_chapter(1)
            .with_verse(3)
            .expect("chapter is present");
        assert_eq!(location.chapter(), Some(1));
        assert_eq!(location.verse(), Some(3));
    }

    #[test]
    fn changing_chapter_clears_verse() {
        let location = Location::book("Exodus")
            .with_chapter(2)
            .with_verse(5)
            .expect("chapter is present")
            .with_chapter(4);
        assert_eq!(location.chapter(), Some(4));
        assert_eq!(location.verse(), None);
    }

    #[test]
    fn from_parts_follows_the_dependency_chain() {
        assert_eq!(Location::from_parts(None, Some(1), Some(2)), None);
        assert_eq!(
            Location::from_parts(Some("Ruth"), None, Some(2)),
            Some(Location::book("Ruth"))
        );
        assert_eq!(
            Location::from_parts(Some("Ruth"), Some(1), Some(2)).map(|l| l.to_string()),
            Some("Ruth 1:2".to_string())
        );
    }
}
