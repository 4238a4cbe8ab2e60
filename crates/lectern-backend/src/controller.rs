//! The observable reading state.
//!
//! [`StateController`] holds the authoritative snapshot of the reader's
//! settings and loaded content. Every mutation follows the same sequence:
//! update memory, notify observers, then persist in the background. The
//! snapshot lock is released before observers run, and persistence is
//! spawned only after they return, so an observer always sees the new value
//! and never a value that is already on disk but not yet in memory.

use std::{
    future::Future,
    sync::{
        Arc, Mutex, PoisonError, RwLockReadGuard, RwLockWriteGuard,
        atomic::{AtomicU64, Ordering},
    },
};

use lectern_bridge::{
    DEFAULT_TEXT_SIZE, DEFAULT_TEXT_SIZE_STEP, Location, ResourceId, Settings, TextStyle,
    ThemeMode,
};
use tokio::{
    runtime::Handle,
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};

use crate::{
    content::{ContentError, ContentKind, ContentLibrary},
    observer::{ObserverId, ObserverRegistry},
    repository::{PersistenceError, SettingsRepository},
    state::{SharedSnapshot, Snapshot},
};

/// Failures of work the controller runs in the background.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// A setting changed in memory but could not be written to the store.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    /// A content resource failed to load and stays absent.
    #[error(transparent)]
    Content(#[from] ContentError),
    /// A background task panicked or was cancelled by runtime shutdown.
    #[error("background task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Error as delivered to the error channel and to [`Pending::wait`]. Shared,
/// since the same failure goes to both.
pub type ReportedError = Arc<ControllerError>;

/// How far the controller has come since construction. There is no way back
/// to an earlier phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// [`StateController::load`] has not completed yet; getters return
    /// defaults.
    Uninitialized,
    /// Settings are loaded; some content resources are still absent.
    Loaded,
    /// Settings and all three content resources are present.
    ContentReady,
}

/// Background work started by a controller operation.
///
/// Dropping it leaves the work running. Awaiting [`Pending::wait`] lets the
/// caller find out whether it succeeded; failures are reported to the error
/// channel either way.
#[derive(Debug, Default)]
pub struct Pending {
    tasks: Vec<JoinHandle<Result<(), ReportedError>>>,
}

impl Pending {
    fn from_task(task: JoinHandle<Result<(), ReportedError>>) -> Self {
        Self { tasks: vec![task] }
    }

    fn merge(&mut self, other: Pending) {
        self.tasks.extend(other.tasks);
    }

    /// True when the operation started no background work, e.g. an update
    /// to the value that was already current.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of background tasks started.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Waits for every task and returns the first failure, if any.
    pub async fn wait(self) -> Result<(), ReportedError> {
        let mut first_error = None;
        for task in self.tasks {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(error) => Err(Arc::new(ControllerError::from(error))),
            };
            if let Err(error) = outcome {
                first_error.get_or_insert(error);
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Observable, write-through owner of the reading state.
pub struct StateController<L: ContentLibrary> {
    snapshot: SharedSnapshot<L>,
    repository: Arc<SettingsRepository>,
    library: Arc<L>,
    observers: ObserverRegistry,
    /// Incremented by every `load`; content from an older load is dropped.
    generation: AtomicU64,
    runtime: Handle,
    errors_tx: UnboundedSender<ReportedError>,
    errors_rx: Mutex<Option<UnboundedReceiver<ReportedError>>>,
}

impl<L: ContentLibrary> StateController<L> {
    /// Creates a controller in the [`Phase::Uninitialized`] phase. Background
    /// persistence and content loads are spawned on `runtime`.
    pub fn new(repository: Arc<SettingsRepository>, library: L, runtime: Handle) -> Self {
        let (errors_tx, errors_rx) = mpsc::unbounded_channel();
        Self {
            snapshot: std::sync::RwLock::new(Snapshot::default()),
            repository,
            library: Arc::new(library),
            observers: ObserverRegistry::new(),
            generation: AtomicU64::new(0),
            runtime,
            errors_tx,
            errors_rx: Mutex::new(Some(errors_rx)),
        }
    }

    /// Registers an observer, called after every change.
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> ObserverId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Takes the receiving end of the error channel. Only the first call
    /// returns it.
    pub fn subscribe_errors(&self) -> Option<UnboundedReceiver<ReportedError>> {
        self.errors_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Reads every setting from the repository, publishes them with a single
    /// notification, then starts the three content loads.
    ///
    /// Each content resource is stored and notified on its own when its load
    /// finishes. The returned [`Pending`] covers those loads. If another
    /// `load` starts before this one finishes, the older one's results are
    /// discarded.
    pub async fn load(self: &Arc<Self>) -> Pending {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let settings = self.repository.read_settings().await;

        let applied = self.mutate(|snapshot| {
            if !self.is_current(generation) {
                return false;
            }
            snapshot.settings = settings;
            snapshot.loaded = true;
            true
        });
        if !applied {
            log::debug!("Discarding settings from superseded load {generation}");
            return Pending::default();
        }

        log::info!(
            "Loaded settings: theme {}, style {}, size {}, location {:?}",
            self.theme_mode(),
            self.text_style().as_str(),
            self.text_size(),
            self.path().map(|location| location.to_string()),
        );
        self.observers.notify();

        let mut pending = Pending::default();
        pending.merge(self.spawn_content(
            generation,
            ContentKind::Bible,
            |library| async move { library.load_bible().await },
            |snapshot, bible| snapshot.bible = Some(Arc::new(bible)),
        ));
        pending.merge(self.spawn_content(
            generation,
            ContentKind::Commentary,
            |library| async move { library.load_commentary().await },
            |snapshot, commentary| snapshot.commentary = Some(Arc::new(commentary)),
        ));
        pending.merge(self.spawn_content(
            generation,
            ContentKind::Appendices,
            |library| async move { library.load_appendices().await },
            |snapshot, appendices| snapshot.appendices = Some(Arc::new(appendices)),
        ));
        pending
    }

    pub fn update_theme_mode(&self, mode: Option<ThemeMode>) -> Pending {
        let Some(mode) = mode else {
            return Pending::default();
        };
        if !self.mutate(|snapshot| replace(&mut snapshot.settings.theme_mode, mode)) {
            return Pending::default();
        }

        log::debug!("Theme mode changed to {mode}");
        self.observers.notify();
        self.persist(move |repository| async move { repository.write_theme_mode(mode).await })
    }

    pub fn update_text_style(&self, style: Option<TextStyle>) -> Pending {
        let Some(style) = style else {
            return Pending::default();
        };
        if !self.mutate(|snapshot| replace(&mut snapshot.settings.text_style, style)) {
            return Pending::default();
        }

        log::debug!("Text style changed to {}", style.as_str());
        self.observers.notify();
        self.persist(move |repository| async move { repository.write_text_style(style).await })
    }

    /// Grows the text by [`DEFAULT_TEXT_SIZE_STEP`].
    pub fn increase_text_size(&self) -> Pending {
        self.adjust_text_size(DEFAULT_TEXT_SIZE_STEP)
    }

    pub fn increase_text_size_by(&self, amount: f64) -> Pending {
        self.adjust_text_size(amount)
    }

    /// Shrinks the text by [`DEFAULT_TEXT_SIZE_STEP`].
    pub fn decrease_text_size(&self) -> Pending {
        self.adjust_text_size(-DEFAULT_TEXT_SIZE_STEP)
    }

    pub fn decrease_text_size_by(&self, amount: f64) -> Pending {
        self.adjust_text_size(-amount)
    }

    /// Puts the text size back to [`DEFAULT_TEXT_SIZE`] in memory only.
    ///
    /// Unlike the increase and decrease operations this neither notifies
    /// observers nor persists; a caller that wants either has to follow up
    /// with an explicit size update.
    pub fn reset_text_size(&self) {
        self.mutate(|snapshot| snapshot.settings.text_size = DEFAULT_TEXT_SIZE);
        log::debug!("Text size reset to {DEFAULT_TEXT_SIZE}");
    }

    fn adjust_text_size(&self, delta: f64) -> Pending {
        let size = self.mutate(|snapshot| {
            snapshot.settings.text_size += delta;
            snapshot.settings.text_size
        });

        log::debug!("Text size changed to {size}");
        self.observers.notify();
        self.persist(move |repository| async move { repository.write_text_size(size).await })
    }

    /// Selects a content resource. Clearing it also clears book, chapter and
    /// verse, each with its own notification and persistence, before the
    /// resource change itself is notified.
    pub fn update_resource(&self, resource: Option<ResourceId>) -> Pending {
        if !self.mutate(|snapshot| replace(&mut snapshot.settings.resource, resource.clone())) {
            return Pending::default();
        }

        log::debug!("Resource changed to {resource:?}");
        let mut pending = Pending::default();
        if resource.is_none() {
            pending.merge(self.update_book_name(None));
        }

        self.observers.notify();
        pending.merge(self.persist(move |repository| async move {
            repository.write_resource(resource.as_ref()).await
        }));
        pending
    }

    /// Selects a book. Clearing it also clears chapter and verse.
    pub fn update_book_name(&self, name: Option<&str>) -> Pending {
        let name = name.map(str::to_owned);
        if !self.mutate(|snapshot| replace(&mut snapshot.settings.book, name.clone())) {
            return Pending::default();
        }

        log::debug!("Book changed to {name:?}");
        let mut pending = Pending::default();
        if name.is_none() {
            pending.merge(self.update_chapter(None));
            pending.merge(self.update_verse(None));
        }

        self.observers.notify();
        pending.merge(self.persist(move |repository| async move {
            repository.write_book_name(name.as_deref()).await
        }));
        pending
    }

    /// Selects a chapter. Clearing it also clears the verse.
    pub fn update_chapter(&self, chapter: Option<u32>) -> Pending {
        if !self.mutate(|snapshot| replace(&mut snapshot.settings.chapter, chapter)) {
            return Pending::default();
        }

        log::debug!("Chapter changed to {chapter:?}");
        let mut pending = Pending::default();
        if chapter.is_none() {
            pending.merge(self.update_verse(None));
        }

        self.observers.notify();
        pending.merge(
            self.persist(move |repository| async move { repository.write_chapter(chapter).await }),
        );
        pending
    }

    pub fn update_verse(&self, verse: Option<u32>) -> Pending {
        if !self.mutate(|snapshot| replace(&mut snapshot.settings.verse, verse)) {
            return Pending::default();
        }

        log::debug!("Verse changed to {verse:?}");
        self.observers.notify();
        self.persist(move |repository| async move { repository.write_verse(verse).await })
    }

    /// Replaces book, chapter and verse in one step, with a single
    /// notification. Only keys whose value changed are persisted.
    pub fn update_location(&self, location: Option<Location>) -> Pending {
        let (book, chapter, verse) = match &location {
            Some(location) => (
                Some(location.book_name().to_string()),
                location.chapter(),
                location.verse(),
            ),
            None => (None, None, None),
        };

        let [book_changed, chapter_changed, verse_changed] = self.mutate(|snapshot| {
            let settings = &mut snapshot.settings;
            [
                replace(&mut settings.book, book.clone()),
                replace(&mut settings.chapter, chapter),
                replace(&mut settings.verse, verse),
            ]
        });
        if !(book_changed || chapter_changed || verse_changed) {
            return Pending::default();
        }

        log::debug!("Location changed to {:?}", location.map(|location| location.to_string()));
        self.observers.notify();

        let mut pending = Pending::default();
        if book_changed {
            pending.merge(self.persist(move |repository| async move {
                repository.write_book_name(book.as_deref()).await
            }));
        }
        if chapter_changed {
            pending.merge(self.persist(move |repository| async move {
                repository.write_chapter(chapter).await
            }));
        }
        if verse_changed {
            pending.merge(
                self.persist(move |repository| async move { repository.write_verse(verse).await }),
            );
        }
        pending
    }

    pub fn phase(&self) -> Phase {
        let snapshot = self.read();
        if !snapshot.loaded {
            Phase::Uninitialized
        } else if snapshot.content_ready() {
            Phase::ContentReady
        } else {
            Phase::Loaded
        }
    }

    /// Copy of all persisted settings.
    pub fn settings(&self) -> Settings {
        self.read().settings.clone()
    }

    pub fn theme_mode(&self) -> ThemeMode {
        self.read().settings.theme_mode
    }

    pub fn text_style(&self) -> TextStyle {
        self.read().settings.text_style
    }

    pub fn text_size(&self) -> f64 {
        self.read().settings.text_size
    }

    pub fn resource(&self) -> Option<ResourceId> {
        self.read().settings.resource.clone()
    }

    pub fn book_name(&self) -> Option<String> {
        self.read().settings.book.clone()
    }

    pub fn chapter(&self) -> Option<u32> {
        self.read().settings.chapter
    }

    pub fn verse(&self) -> Option<u32> {
        self.read().settings.verse
    }

    /// Current location, derived from book, chapter and verse.
    pub fn path(&self) -> Option<Location> {
        self.read().settings.path()
    }

    pub fn bible(&self) -> Option<Arc<L::Bible>> {
        self.read().bible.clone()
    }

    pub fn commentary(&self) -> Option<Arc<L::Commentary>> {
        self.read().commentary.clone()
    }

    pub fn appendices(&self) -> Option<Arc<L::Appendices>> {
        self.read().appendices.clone()
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn read(&self) -> RwLockReadGuard<'_, Snapshot<L>> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `change` under the write lock. The lock is released on return,
    /// before any notification.
    fn mutate<R>(&self, change: impl FnOnce(&mut Snapshot<L>) -> R) -> R {
        let mut snapshot: RwLockWriteGuard<'_, Snapshot<L>> =
            self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        change(&mut *snapshot)
    }

    fn persist<F, Fut>(&self, write: F) -> Pending
    where
        F: FnOnce(Arc<SettingsRepository>) -> Fut,
        Fut: Future<Output = Result<(), PersistenceError>> + Send + 'static,
    {
        let write = write(Arc::clone(&self.repository));
        let errors = self.errors_tx.clone();
        Pending::from_task(self.runtime.spawn(async move {
            write.await.map_err(|error| report(&errors, error.into()))
        }))
    }

    fn spawn_content<T, F, Fut, A>(
        self: &Arc<Self>,
        generation: u64,
        kind: ContentKind,
        load: F,
        apply: A,
    ) -> Pending
    where
        T: Send + 'static,
        F: FnOnce(Arc<L>) -> Fut,
        Fut: Future<Output = Result<T, ContentError>> + Send + 'static,
        A: FnOnce(&mut Snapshot<L>, T) + Send + 'static,
    {
        let load = load(Arc::clone(&self.library));
        let controller = Arc::clone(self);
        Pending::from_task(self.runtime.spawn(async move {
            match load.await {
                Ok(content) => {
                    controller.apply_content(generation, kind, |snapshot| apply(snapshot, content));
                    Ok(())
                }
                Err(error) => Err(report(&controller.errors_tx, error.into())),
            }
        }))
    }

    fn apply_content(&self, generation: u64, kind: ContentKind, apply: impl FnOnce(&mut Snapshot<L>)) {
        let applied = self.mutate(|snapshot| {
            let current = self.is_current(generation);
            if current {
                apply(snapshot);
            }
            current
        });

        if applied {
            log::info!("The {kind} content is ready");
            self.observers.notify();
        } else {
            log::debug!("Discarding {kind} content from superseded load {generation}");
        }
    }
}

/// Stores `value` in `slot` unless they are already equal. Returns whether
/// anything changed.
fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

fn report(errors: &UnboundedSender<ReportedError>, error: ControllerError) -> ReportedError {
    log::warn!("{error}");
    let error = Arc::new(error);
    // a closed channel only means nobody listens; the caller still gets it
    let _ = errors.send(Arc::clone(&error));
    error
}
