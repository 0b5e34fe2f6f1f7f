//! A small synchronous listener registry shared by event-emitting surfaces and
//! the auth bridge's session-change notifications.

use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub struct ListenerRegistry<E> {
    listeners: Mutex<Vec<(ListenerId, Listener<E>)>>,
}

impl<E> ListenerRegistry<E> {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn add(&self, listener: Listener<E>) -> ListenerId {
        let id = ListenerId::new();
        self.lock().push((id, listener));
        id
    }

    /// Returns false when the id was never registered or already removed.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Invokes every listener in registration order. The lock is released
    /// before dispatch so a listener may add or remove listeners.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Listener<E>> = self
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in snapshot {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(ListenerId, Listener<E>)>> {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<E> Default for ListenerRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for ListenerRegistry<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_emit_reaches_registered_listeners() {
        let registry: ListenerRegistry<u32> = ListenerRegistry::new();
        let total = Arc::new(AtomicUsize::new(0));

        let sink = Arc::clone(&total);
        let id = registry.add(Arc::new(move |value: &u32| {
            sink.fetch_add(*value as usize, Ordering::SeqCst);
        }));

        registry.emit(&5);
        registry.emit(&7);
        assert_eq!(total.load(Ordering::SeqCst), 12);

        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        registry.emit(&100);
        assert_eq!(total.load(Ordering::SeqCst), 12);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_listener_can_deregister_during_emit() {
        let registry: Arc<ListenerRegistry<()>> = Arc::new(ListenerRegistry::new());
        let slot: Arc<Mutex<Option<ListenerId>>> = Arc::new(Mutex::new(None));

        let inner_registry = Arc::clone(&registry);
        let inner_slot = Arc::clone(&slot);
        let id = registry.add(Arc::new(move |_: &()| {
            if let Some(id) = inner_slot.lock().unwrap().take() {
                inner_registry.remove(id);
            }
        }));
        *slot.lock().unwrap() = Some(id);

        registry.emit(&());
        assert_eq!(registry.len(), 0);
    }
}
