//! Payload-less change broadcast.
//!
//! Observers are plain callbacks. A notification carries no data: an
//! observer reacts by reading whatever it needs from the controller's
//! getters.

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicU64, Ordering},
};

type Callback = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by [`ObserverRegistry::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Ordered list of registered observers.
#[derive(Default)]
pub struct ObserverRegistry {
    next_id: AtomicU64,
    observers: Mutex<Vec<(ObserverId, Callback)>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` to run on every subsequent notification.
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers().push((id, Arc::new(callback)));
        id
    }

    /// Removes an observer. Returns `false` when `id` was not registered.
    ///
    /// Safe to call from inside a callback; the removed observer is skipped
    /// for the rest of the pass in progress.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.observers();
        let before = observers.len();
        observers.retain(|(observer_id, _)| *observer_id != id);
        observers.len() != before
    }

    /// Invokes every observer synchronously, in registration order.
    pub fn notify(&self) {
        // iterate over a copy so callbacks can (un)subscribe without deadlocking
        let pass: Vec<(ObserverId, Callback)> = self.observers().clone();
        for (id, callback) in pass {
            if self.is_subscribed(id) {
                callback();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.observers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers().is_empty()
    }

    fn is_subscribed(&self, id: ObserverId) -> bool {
        self.observers()
            .iter()
            .any(|(observer_id, _)| *observer_id == id)
    }

    fn observers(&self) -> MutexGuard<'_, Vec<(ObserverId, Callback)>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ObserverRegistry")
            .field("observers", &self.len())
            .finish()
    }
}
