//! Synchronous, ordered multicast of events to subscribers.
//!
//! ## Usage
//!
//! Hold an [`EventBus`] inside the type that produces events and call
//! [`EventBus::emit`] after every mutation. Listeners run immediately, in
//! subscription order, on the emitting thread. There is no buffering or
//! replay: a listener added later never sees earlier events.
//!
//! ```
//! use std::sync::{
//!     Arc,
//!     atomic::{AtomicUsize, Ordering},
//! };
//!
//! use planar_ui::EventBus;
//!
//! let seen = Arc::new(AtomicUsize::new(0));
//! let mut bus = EventBus::<usize>::new();
//!
//! bus.emit(&1); // nobody listening yet
//!
//! let counter = seen.clone();
//! let id = bus.subscribe(move |value| {
//!     counter.fetch_add(*value, Ordering::SeqCst);
//! });
//! bus.emit(&2);
//! assert_eq!(seen.load(Ordering::SeqCst), 2);
//!
//! assert!(bus.unsubscribe(id));
//! bus.emit(&3);
//! assert_eq!(seen.load(Ordering::SeqCst), 2);
//! ```
use std::{fmt, sync::Arc};

/// Listener callback type.
pub type Listener<E> = dyn Fn(&E) + Send + Sync;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// An ordered list of listeners for events of type `E`.
pub struct EventBus<E> {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Arc<Listener<E>>)>,
}

impl<E> EventBus<E> {
    /// Creates a bus without listeners.
    pub fn new() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    /// Adds a listener. It receives every event emitted from now on.
    pub fn subscribe(&mut self, listener: impl Fn(&E) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        before != self.listeners.len()
    }

    /// Delivers `event` to every listener in subscription order.
    pub fn emit(&self, event: &E) {
        for (_, listener) in &self.listeners {
            listener(event);
        }
    }

    /// Number of listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether nobody is listening.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
