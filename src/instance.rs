use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lazy::Lazy;

// The one process-wide slot. Only reachable through `get`.
static HOLDER: Lazy<SharedInstance> = Lazy::new();

// Counts constructions, not accesses. Stays at 1 for the lifetime of a
// correct process.
static CONSTRUCTIONS: AtomicUsize = AtomicUsize::new(0);

/// The single logical value shared by the whole process.
///
/// Identity is the observable property; the `id` stamp makes it observable
/// across the durable form. There is no public constructor, so the only
/// way to reach a live `SharedInstance` is [`get`].
#[derive(Debug, Serialize, Deserialize)]
pub struct SharedInstance {
    id: Uuid,
}

impl SharedInstance {
    fn create() -> Self {
        CONSTRUCTIONS.fetch_add(1, Ordering::Release);
        SharedInstance { id: Uuid::new_v4() }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }
}

/// Returns the process's shared instance, constructing it on first call.
///
/// Safe under concurrent first access: exactly one construction happens
/// and every caller gets the same instance. Warm calls never touch the
/// exclusive section.
pub fn get() -> Arc<SharedInstance> {
    HOLDER.get_or_init(|| {
        debug!("constructing the process shared instance");
        SharedInstance::create()
    })
}

/// Number of times a `SharedInstance` has ever been constructed in this
/// process. Reads 1 after any call to [`get`].
#[must_use]
pub fn construction_count() -> usize {
    CONSTRUCTIONS.load(Ordering::Relaxed)
}

#[test]
fn test_get_returns_identical_instance() {
    let one = get();
    let two = get();
    assert!(Arc::ptr_eq(&one, &two));
    assert_eq!(one.id(), two.id());
}

#[test]
fn test_single_construction() {
    get();
    assert_eq!(construction_count(), 1);
}
