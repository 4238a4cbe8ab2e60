//! Value types shared between the reading state controller and its consumers.
//!
//! This crate defines the vocabulary both sides agree on: display
//! preferences (theme, text style, text size), the active content resource
//! and the reading location. It carries no I/O and no async machinery, so a
//! UI layer can depend on it without pulling in the backend runtime.
//!
//! Every type here has a stable primitive encoding (see the `as_str` and
//! `parse` helpers) which the backend uses when talking to its key-value
//! store.

pub mod location;
pub mod resource;
pub mod settings;
pub mod text_style;
pub mod theme;

pub use crate::location::Location;
pub use crate::resource::ResourceId;
pub use crate::settings::Settings;
pub use crate::text_style::TextStyle;
pub use crate::theme::ThemeMode;

/// Text size used when nothing was persisted, and the value restored by a
/// text size reset.
pub const DEFAULT_TEXT_SIZE: f64 = 24.0;

/// Amount by which a single increase or decrease step changes the text size.
pub const DEFAULT_TEXT_SIZE_STEP: f64 = 2.0;
