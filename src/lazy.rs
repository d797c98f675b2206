use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// Lazily initialized slot holding a single shared value.
///
/// The slot starts empty, is filled exactly once by the first caller of
/// [`Lazy::get_or_init`], and is never replaced afterwards. Every caller
/// gets a clone of the same `Arc`, so all of them share one value.
pub struct Lazy<T> {
    // Published with Release only after the slot is written. Once a thread
    // reads true here, the write lock can no longer be contended.
    ready: AtomicBool,
    slot: RwLock<Option<Arc<T>>>,
}

impl<T> Lazy<T> {
    #[must_use]
    pub const fn new() -> Self {
        Lazy {
            ready: AtomicBool::new(false),
            slot: RwLock::new(None),
        }
    }

    /// Returns the held value, running `init` to create it if the slot is
    /// still empty.
    ///
    /// Exactly one `init` call ever runs, no matter how many threads race
    /// into the cold path; the losers block on the write lock, re-check
    /// and return the winner's value.
    pub fn get_or_init<F: FnOnce() -> T>(&self, init: F) -> Arc<T> {
        if self.ready.load(Ordering::Acquire) {
            if let Some(value) = self.slot.read().unwrap().as_ref() {
                return value.clone();
            }
        }

        let mut slot = self.slot.write().unwrap();
        // Another thread may have initialized while this one waited.
        if let Some(value) = slot.as_ref() {
            return value.clone();
        }
        let value = Arc::new(init());
        *slot = Some(value.clone());
        self.ready.store(true, Ordering::Release);
        value
    }

    /// Non-initializing read of the slot.
    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.read().unwrap().clone()
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}
