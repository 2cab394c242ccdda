//! Explicit state-change notification contract.
//!
//! A component owns an [`EventHub`] and emits events through it. Listeners
//! subscribe and receive a [`Subscription`] that unsubscribes when dropped.
//! The hub only keeps a `Weak` reference to each listener: whoever wires the
//! UI to the core owns the listener's lifetime, and a listener that has gone
//! away is skipped silently.

use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Receives events from an [`EventHub`].
///
/// Delivery is best-effort and happens on the emitting task; implementations
/// should hand work off rather than block.
pub trait EventListener<E>: Send + Sync {
    fn on_event(&self, event: &E);
}

struct Registry<E> {
    next_id: u64,
    listeners: Vec<(u64, Weak<dyn EventListener<E>>)>,
}

/// Fan-out point for one event type.
pub struct EventHub<E> {
    registry: Arc<Mutex<Registry<E>>>,
}

impl<E> Clone for EventHub<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<E: 'static> Default for EventHub<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> EventHub<E> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Register `listener`. The hub does not keep it alive.
    pub fn subscribe<L>(&self, listener: &Arc<L>) -> Subscription
    where
        L: EventListener<E> + 'static,
    {
        let weak: Weak<L> = Arc::downgrade(listener);
        let weak: Weak<dyn EventListener<E>> = weak;

        let id = {
            let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.push((id, weak));
            id
        };

        let registry = Arc::downgrade(&self.registry);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
                    registry.listeners.retain(|(entry_id, _)| *entry_id != id);
                }
            })),
        }
    }

    /// Deliver `event` to every live listener. Dead listeners are pruned.
    pub fn emit(&self, event: &E) {
        // Snapshot under the lock, call outside it so listeners may re-enter the hub.
        let live: Vec<Arc<dyn EventListener<E>>> = {
            let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            let before = registry.listeners.len();
            registry
                .listeners
                .retain(|(_, listener)| listener.strong_count() > 0);
            let pruned = before - registry.listeners.len();
            if pruned > 0 {
                #[cfg(feature = "tracing")]
                tracing::debug!(pruned, "dropped listeners that went away");
            }
            registry
                .listeners
                .iter()
                .filter_map(|(_, listener)| listener.upgrade())
                .collect()
        };

        for listener in live {
            listener.on_event(event);
        }
    }

    /// Number of listeners that are still alive.
    pub fn listener_count(&self) -> usize {
        let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        registry
            .listeners
            .iter()
            .filter(|(_, listener)| listener.strong_count() > 0)
            .count()
    }
}

/// Handle returned by [`EventHub::subscribe`]. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }

    /// Keep the listener registered for as long as it stays alive.
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
