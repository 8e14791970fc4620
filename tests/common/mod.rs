//! Common test infrastructure
//!
//! Fixtures shared by the integration tests: a manager wired to an
//! in-memory store, a deterministic id generator and track builders.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sheet_manager::{IdGenerator, MemoryStore, MusicItem, SheetManager, SubscriptionId};

/// Id generator producing "sheet-1", "sheet-2", ... so tests can assert
/// on generated ids.
#[derive(Default)]
pub struct SequentialIdGenerator {
    counter: AtomicUsize,
}

impl IdGenerator for SequentialIdGenerator {
    fn new_id(&self) -> String {
        format!("sheet-{}", self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// A manager over a fresh in-memory store, with deterministic sheet ids.
/// Returns the store too so tests can inspect persisted state.
pub fn test_manager() -> (Arc<MemoryStore>, SheetManager) {
    let store = Arc::new(MemoryStore::new());
    let manager =
        SheetManager::with_id_generator(store.clone(), Arc::new(SequentialIdGenerator::default()));
    (store, manager)
}

/// Track with artwork `"<id>.png"`.
pub fn track(id: &str) -> MusicItem {
    MusicItem {
        platform: "test-platform".to_string(),
        id: id.to_string(),
        title: format!("Track {id}"),
        artist: "Test Artist".to_string(),
        album: None,
        artwork: Some(format!("{id}.png")),
    }
}

/// Track without artwork.
pub fn track_without_artwork(id: &str) -> MusicItem {
    MusicItem {
        artwork: None,
        ..track(id)
    }
}

/// Counts notifications received from a manager's subscription hub.
pub struct NotificationCounter {
    count: Arc<AtomicUsize>,
}

impl NotificationCounter {
    pub fn subscribed_to(manager: &SheetManager) -> (Self, SubscriptionId) {
        let count = Arc::new(AtomicUsize::new(0));
        let clone = count.clone();
        let handle = manager.subscribe(move || {
            clone.fetch_add(1, Ordering::SeqCst);
        });
        (Self { count }, handle)
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}
