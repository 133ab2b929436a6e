//! Listener registry with revocable subscription handles

use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use super::{EventKind, StoreEvent};

type Handler = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

struct Listener {
    id: u64,
    kind: EventKind,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    listeners: RwLock<Vec<Listener>>,
}

impl Registry {
    fn remove(&self, id: u64) {
        if let Ok(mut listeners) = self.listeners.write() {
            listeners.retain(|l| l.id != id);
        }
    }
}

/// Set of listeners, dispatched synchronously in registration order
#[derive(Default)]
pub struct Subscribers {
    registry: Arc<Registry>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events of `kind`
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut listeners) = self.registry.listeners.write() {
            listeners.push(Listener {
                id,
                kind,
                handler: Arc::new(handler),
            });
        }
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Invoke every matching listener before returning
    ///
    /// Handlers run without the registry lock held, so they may subscribe,
    /// unsubscribe or call back into the store.
    pub fn dispatch(&self, event: &StoreEvent) {
        let handlers: Vec<Handler> = match self.registry.listeners.read() {
            Ok(listeners) => listeners
                .iter()
                .filter(|l| l.kind.accepts(event))
                .map(|l| Arc::clone(&l.handler))
                .collect(),
            Err(_) => return,
        };

        debug!("Dispatching {:?} to {} listener(s)", event.kind(), handlers.len());
        for handler in handlers {
            handler(event);
        }
    }

    /// Number of live listeners
    pub fn len(&self) -> usize {
        self.registry.listeners.read().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle for a registered listener
///
/// The listener stays registered while the handle is alive. Dropping the
/// handle or calling [`Subscription::unsubscribe`] removes it;
/// [`Subscription::detach`] keeps it for the lifetime of the store.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    /// Remove the listener now
    pub fn unsubscribe(self) {
        // Drop does the work
    }

    /// Keep the listener registered without holding the handle
    pub fn detach(mut self) {
        self.registry = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageId;
    use std::sync::Mutex;

    fn deleted(id: i64) -> StoreEvent {
        StoreEvent::Deleted { id: MessageId::new(id) }
    }

    #[test]
    fn test_dispatch_in_registration_order() {
        let subs = Subscribers::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let a = {
            let seen = Arc::clone(&seen);
            subs.subscribe(EventKind::Any, move |_| seen.lock().unwrap().push("a"))
        };
        let b = {
            let seen = Arc::clone(&seen);
            subs.subscribe(EventKind::Deleted, move |_| seen.lock().unwrap().push("b"))
        };

        subs.dispatch(&deleted(1));
        assert_eq!(*seen.lock().unwrap(), vec!["a", "b"]);
        drop((a, b));
    }

    #[test]
    fn test_drop_unsubscribes() {
        let subs = Subscribers::new();
        let count = Arc::new(AtomicU64::new(0));

        let sub = {
            let count = Arc::clone(&count);
            subs.subscribe(EventKind::Deleted, move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };
        subs.dispatch(&deleted(1));
        sub.unsubscribe();
        subs.dispatch(&deleted(2));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(subs.is_empty());
    }

    #[test]
    fn test_detach_keeps_listener() {
        let subs = Subscribers::new();
        let count = Arc::new(AtomicU64::new(0));

        {
            let count = Arc::clone(&count);
            subs.subscribe(EventKind::Any, move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            })
            .detach();
        }
        subs.dispatch(&deleted(1));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(subs.len(), 1);
    }

    #[test]
    fn test_handler_may_subscribe_during_dispatch() {
        let subs = Arc::new(Subscribers::new());
        let inner = Arc::new(Mutex::new(Vec::new()));

        let outer = {
            let handle = Arc::clone(&subs);
            let inner = Arc::clone(&inner);
            subs.subscribe(EventKind::Any, move |_| {
                let sub = handle.subscribe(EventKind::Any, |_| {});
                inner.lock().unwrap().push(sub);
            })
        };

        subs.dispatch(&deleted(1));
        assert_eq!(subs.len(), 2);
        drop(outer);
    }
}
