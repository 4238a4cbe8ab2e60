//! Settings changes given on the command line as `key=value` pairs.

use std::str::FromStr;

use lectern_backend::{Pending, StateController, content::ContentLibrary};
use lectern_bridge::{Location, ResourceId, TextStyle, ThemeMode};

/// Errors that can occur while parsing a command line argument.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    /// The argument is not of the form `key=value`.
    #[error("expected key=value, got {0:?}")]
    MissingValue(String),
    /// The key does not name a known setting.
    #[error("unknown setting {0:?}")]
    UnknownKey(String),
    /// The value cannot be used for the given key.
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// A single requested change to the reading state.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Theme(ThemeMode),
    Style(TextStyle),
    Larger,
    Smaller,
    ResetSize,
    Resource(Option<ResourceId>),
    Book(Option<String>),
    Chapter(Option<u32>),
    Verse(Option<u32>),
    /// Jump to a location in one step (`go=1 John 3:16`), or clear it.
    Go(Option<Location>),
}

impl Command {
    /// Applies the change and returns the persistence it started.
    pub fn apply<L: ContentLibrary>(&self, controller: &StateController<L>) -> Pending {
        match self {
            Command::Theme(mode) => controller.update_theme_mode(Some(*mode)),
            Command::Style(style) => controller.update_text_style(Some(*style)),
            Command::Larger => controller.increase_text_size(),
            Command::Smaller => controller.decrease_text_size(),
            Command::ResetSize => {
                // reset is memory-only; the zero step notifies and persists it
                controller.reset_text_size();
                controller.increase_text_size_by(0.0)
            }
            Command::Resource(resource) => controller.update_resource(resource.clone()),
            Command::Book(book) => controller.update_book_name(book.as_deref()),
            Command::Chapter(chapter) => controller.update_chapter(*chapter),
            Command::Verse(verse) => controller.update_verse(*verse),
            Command::Go(location) => controller.update_location(location.clone()),
        }
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(argument: &str) -> Result<Self, Self::Err> {
        let Some((key, value)) = argument.split_once('=') else {
            return Err(CommandError::MissingValue(argument.to_string()));
        };
        let value = value.trim();

        match key.trim() {
            "theme" => ThemeMode::ALL
                .into_iter()
                .find(|mode| mode.as_str() == value)
                .map(Command::Theme)
                .ok_or_else(|| invalid("theme", value)),
            "style" => TextStyle::parse(value)
                .map(Command::Style)
                .ok_or_else(|| invalid("style", value)),
            "size" => match value {
                "larger" => Ok(Command::Larger),
                "smaller" => Ok(Command::Smaller),
                "reset" => Ok(Command::ResetSize),
                _ => Err(invalid("size", value)),
            },
            "resource" => Ok(Command::Resource(non_empty(value).map(ResourceId::from))),
            "book" => Ok(Command::Book(non_empty(value).map(str::to_owned))),
            "chapter" => parse_number("chapter", value).map(Command::Chapter),
            "verse" => parse_number("verse", value).map(Command::Verse),
            "go" => match non_empty(value) {
                Some(reference) => parse_location(reference)
                    .map(|location| Command::Go(Some(location)))
                    .ok_or_else(|| invalid("go", value)),
                None => Ok(Command::Go(None)),
            },
            other => Err(CommandError::UnknownKey(other.to_string())),
        }
    }
}

fn invalid(key: &'static str, value: &str) -> CommandError {
    CommandError::InvalidValue {
        key,
        value: value.to_string(),
    }
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

/// An empty value clears the setting.
fn parse_number(key: &'static str, value: &str) -> Result<Option<u32>, CommandError> {
    match non_empty(value) {
        Some(number) => number.parse().map(Some).map_err(|_| invalid(key, value)),
        None => Ok(None),
    }
}

/// Parses `Book`, `Book Chapter` or `Book Chapter:Verse`. Book names may
/// contain spaces and digits ("1 John"), so the reference is split at the
/// last space only.
fn parse_location(reference: &str) -> Option<Location> {
    let Some((book, tail)) = reference.rsplit_once(' ') else {
        return Some(Location::book(reference));
    };
    if !tail.starts_with(|c: char| c.is_ascii_digit()) {
        return Some(Location::book(reference));
    }

    let book = book.trim();
    if book.is_empty() {
        return None;
    }
    match tail.split_once(':') {
        Some((chapter, verse)) => Location::book(book)
            .with_chapter(chapter.parse().ok()?)
            .with_verse(verse.parse().ok()?),
        None => Some(Location::book(book).with_chapter(tail.parse().ok()?)),
    }
}
