//! Listener registry and synchronous event dispatch.

use crossbeam_channel::{bounded, Sender};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

use super::types::{EventKind, ListenerId, LogEvent, Subscription};

/// Callback invoked synchronously for each matching event.
pub type Callback<T> = Arc<dyn Fn(&LogEvent<T>) + Send + Sync>;

enum Sink<T> {
    Callback(Callback<T>),
    Channel(Sender<LogEvent<T>>),
}

impl<T> Clone for Sink<T> {
    fn clone(&self) -> Self {
        match self {
            Sink::Callback(callback) => Sink::Callback(Arc::clone(callback)),
            Sink::Channel(sender) => Sink::Channel(sender.clone()),
        }
    }
}

/// Internal listener state.
struct Listener<T> {
    id: ListenerId,
    /// None = every kind.
    filter: Option<EventKind>,
    sink: Sink<T>,
}

impl<T> Listener<T> {
    fn wants(&self, kind: EventKind) -> bool {
        self.filter.map_or(true, |filter| filter == kind)
    }
}

/// Keeps listeners in registration order and delivers events to them.
pub struct SubscriptionManager<T> {
    listeners: RwLock<Vec<Listener<T>>>,
    /// Counter for generating listener IDs.
    next_id: AtomicU64,
}

impl<T> SubscriptionManager<T> {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn register(&self, filter: Option<EventKind>, sink: Sink<T>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.listeners.write().push(Listener { id, filter, sink });
        id
    }

    /// Register a callback for one event kind, or for all kinds if `filter`
    /// is None.
    pub fn on<F>(&self, filter: Option<EventKind>, callback: F) -> ListenerId
    where
        F: Fn(&LogEvent<T>) + Send + Sync + 'static,
    {
        self.register(filter, Sink::Callback(Arc::new(callback)))
    }

    /// Register a bounded channel. A subscriber whose buffer is full when an
    /// event arrives is dropped.
    pub fn subscribe(&self, filter: Option<EventKind>, buffer_size: usize) -> Subscription<T> {
        let (sender, receiver) = bounded(buffer_size.max(1));
        let id = self.register(filter, Sink::Channel(sender));
        Subscription { id, receiver }
    }

    /// Remove a listener or subscription. Returns false if it was not
    /// registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|listener| listener.id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl<T: Clone> SubscriptionManager<T> {
    /// Deliver `event` to every matching listener, in registration order.
    ///
    /// The registry lock is released before callbacks run, so a callback may
    /// register or remove listeners; such changes apply from the next event.
    pub fn emit(&self, event: &LogEvent<T>) {
        let kind = event.kind();
        let sinks: Vec<(ListenerId, Sink<T>)> = self
            .listeners
            .read()
            .iter()
            .filter(|listener| listener.wants(kind))
            .map(|listener| (listener.id, listener.sink.clone()))
            .collect();

        let mut to_remove = Vec::new();
        for (id, sink) in sinks {
            match sink {
                Sink::Callback(callback) => callback(event),
                Sink::Channel(sender) => {
                    if sender.try_send(event.clone()).is_err() {
                        to_remove.push(id);
                    }
                }
            }
        }

        // Remove dropped subscriptions
        if !to_remove.is_empty() {
            warn!(count = to_remove.len(), event = %kind, "Dropping lagging or disconnected subscribers");
            self.listeners
                .write()
                .retain(|listener| !to_remove.contains(&listener.id));
        }
    }
}

impl<T> Default for SubscriptionManager<T> {
    fn default() -> Self {
        Self::new()
    }
}
