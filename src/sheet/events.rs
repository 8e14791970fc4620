//! Change notification fan-out.
//!
//! Mutation operations broadcast a payload-free notification after their
//! store writes and in-memory commits complete; a listener that cares
//! about content re-pulls a projection from the manager.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tracing::debug;

/// Handle identifying one registered listener. Unsubscribing with it
/// removes exactly that listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn() + Send + Sync>;

/// Registry of sheet change listeners.
///
/// Listeners are invoked synchronously, in registration order. Every
/// `subscribe` call yields a distinct handle, so registering the same
/// closure twice yields two notifications per broadcast.
#[derive(Default)]
pub struct SheetSubscriptions {
    listeners: Mutex<BTreeMap<u64, Listener>>,
    next_id: AtomicU64,
}

impl SheetSubscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap()
            .insert(id, Box::new(listener));
        SubscriptionId(id)
    }

    /// Remove the listener registered under `id`. Unknown handles are
    /// ignored, so double-unsubscribe is harmless.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.lock().unwrap().remove(&id.0);
    }

    /// Invoke every live listener once.
    pub fn notify_all(&self) {
        let listeners = self.listeners.lock().unwrap();
        debug!("Notifying {} sheet listeners", listeners.len());
        for listener in listeners.values() {
            listener();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let clone = count.clone();
        (count, move || {
            clone.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_notify_reaches_every_listener_once() {
        let subs = SheetSubscriptions::new();
        let (a, cb_a) = counter();
        let (b, cb_b) = counter();
        subs.subscribe(cb_a);
        subs.subscribe(cb_b);

        subs.notify_all();
        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_removes_exactly_one_listener() {
        let subs = SheetSubscriptions::new();
        let (a, cb_a) = counter();
        let (b, cb_b) = counter();
        let handle_a = subs.subscribe(cb_a);
        subs.subscribe(cb_b);

        subs.unsubscribe(handle_a);
        subs.notify_all();

        assert_eq!(a.load(Ordering::SeqCst), 0);
        assert_eq!(b.load(Ordering::SeqCst), 1);
        assert_eq!(subs.listener_count(), 1);
    }

    #[test]
    fn test_unsubscribe_unknown_handle_is_ignored() {
        let subs = SheetSubscriptions::new();
        let (_, cb) = counter();
        let handle = subs.subscribe(cb);
        subs.unsubscribe(handle);
        subs.unsubscribe(handle);
        assert_eq!(subs.listener_count(), 0);
    }

    #[test]
    fn test_listeners_fire_in_registration_order() {
        let subs = SheetSubscriptions::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let order = order.clone();
            subs.subscribe(move || order.lock().unwrap().push(tag));
        }

        subs.notify_all();
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }
}
