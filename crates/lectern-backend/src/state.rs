use std::sync::Arc;

use lectern_bridge::Settings;

use crate::content::ContentLibrary;

/// The complete in-memory state owned by the controller: persisted settings
/// plus the content resources loaded after startup.
///
/// Only the controller mutates it. Consumers see copies through the
/// controller's getters.
pub struct Snapshot<L: ContentLibrary> {
    /// Settings mirrored to the persistent store.
    pub settings: Settings,
    /// Whether the settings have been read from the store at least once.
    pub loaded: bool,
    pub bible: Option<Arc<L::Bible>>,
    pub commentary: Option<Arc<L::Commentary>>,
    pub appendices: Option<Arc<L::Appendices>>,
}

impl<L: ContentLibrary> Default for Snapshot<L> {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            loaded: false,
            bible: None,
            commentary: None,
            appendices: None,
        }
    }
}

impl<L: ContentLibrary> Snapshot<L> {
    /// True once all three content resources are present.
    pub fn content_ready(&self) -> bool {
        self.bible.is_some() && self.commentary.is_some() && self.appendices.is_some()
    }
}

/// Lock-guarded [`Snapshot`]. A synchronous lock is used so that getters
/// stay callable from observer callbacks; it is never held across an await
/// point or while observers run.
pub type SharedSnapshot<L> = std::sync::RwLock<Snapshot<L>>;
