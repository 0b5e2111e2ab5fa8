//! Positionally-addressable log of applied transforms.

use crate::error::{LogError, Result};
use crate::snapshot::Snapshot;
use crate::subscriptions::{EventKind, ListenerId, LogEvent, Subscription, SubscriptionManager};
use crate::types::{LogConfig, TransformId};
use parking_lot::{ReentrantMutex, RwLock};
use std::fmt;
use tracing::{debug, trace};

use super::position::Operation;

/// An append-ordered log of transform identifiers.
///
/// The log holds one immutable [`Snapshot`] at a time. Each mutation builds a
/// new snapshot, swaps it in, then notifies listeners with the snapshot it
/// replaced. Queries read the snapshot once and work on that copy, so they
/// never observe a half-applied mutation.
///
/// Mutations are serialized by a reentrant lock that is held while listeners
/// run. A listener may therefore mutate the same log from its callback; the
/// nested event is delivered before the outer call returns. Listeners
/// registered after the mutating one receive the nested event before the
/// outer one, so the `previous` snapshots they see are not in mutation order.
pub struct TransformLog<T = TransformId> {
    config: LogConfig,
    /// Current snapshot.
    current: RwLock<Snapshot<T>>,
    /// Held across read-compute-swap-emit.
    mutation: ReentrantMutex<()>,
    subscriptions: SubscriptionManager<T>,
}

impl<T> TransformLog<T> {
    /// Create an empty log with default config.
    pub fn new() -> Self {
        Self::from_snapshot(Snapshot::empty(), LogConfig::default())
    }

    /// Create an empty log with custom config.
    pub fn with_config(config: LogConfig) -> Self {
        Self::from_snapshot(Snapshot::empty(), config)
    }

    /// Create a log whose first snapshot is `snapshot`, adopted as is.
    pub fn from_snapshot(snapshot: Snapshot<T>, config: LogConfig) -> Self {
        Self {
            config,
            current: RwLock::new(snapshot),
            mutation: ReentrantMutex::new(()),
            subscriptions: SubscriptionManager::new(),
        }
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// The current snapshot.
    pub fn data(&self) -> Snapshot<T> {
        self.current.read().clone()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.read().is_empty()
    }

    // --- Notifications ---

    /// Register a callback for one kind of event.
    pub fn on<F>(&self, kind: EventKind, callback: F) -> ListenerId
    where
        F: Fn(&LogEvent<T>) + Send + Sync + 'static,
    {
        self.subscriptions.on(Some(kind), callback)
    }

    /// Register a callback for every kind of event.
    pub fn on_any<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&LogEvent<T>) + Send + Sync + 'static,
    {
        self.subscriptions.on(None, callback)
    }

    /// Remove a callback or subscription.
    pub fn off(&self, id: ListenerId) -> bool {
        self.subscriptions.remove(id)
    }

    /// Subscribe through a bounded channel (capacity from
    /// `LogConfig::subscription_buffer`). None = every kind.
    pub fn subscribe(&self, filter: Option<EventKind>) -> Subscription<T> {
        self.subscriptions
            .subscribe(filter, self.config.subscription_buffer)
    }

    /// Remove a subscription. Its channel disconnects once drained.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.subscriptions.remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.subscriptions.listener_count()
    }
}

impl<T> TransformLog<T>
where
    T: Clone + PartialEq + fmt::Debug,
{
    /// The entries, oldest first.
    pub fn entries(&self) -> Vec<T> {
        self.data().to_vec()
    }

    /// The most recent entry, or None if the log is empty.
    pub fn head(&self) -> Option<T> {
        self.data().last()
    }

    pub fn contains(&self, id: &T) -> bool {
        self.data().contains(id)
    }

    /// Zero-based position of the first occurrence of `id`.
    pub fn index_of(&self, id: &T) -> Option<usize> {
        self.data().position(id)
    }

    /// Entries strictly before `index(id) + relative_position`.
    ///
    /// `relative_position` may only be zero or negative.
    pub fn before(&self, id: &T, relative_position: isize) -> Result<Vec<T>, T> {
        let snapshot = self.data();
        let index = locate(&snapshot, id)?;
        let target = Operation::Before.resolve::<T>(index, relative_position, snapshot.len())?;

        trace!(log = %self.config.name, ?id, relative_position, target, "before");
        Ok(snapshot.slice(..target as usize).to_vec())
    }

    /// Entries strictly after `index(id) + relative_position`.
    pub fn after(&self, id: &T, relative_position: isize) -> Result<Vec<T>, T> {
        let snapshot = self.data();
        let index = locate(&snapshot, id)?;
        let target = Operation::After.resolve::<T>(index, relative_position, snapshot.len())?;

        trace!(log = %self.config.name, ?id, relative_position, target, "after");
        Ok(snapshot.slice((target + 1) as usize..).to_vec())
    }

    // --- Mutations ---

    /// Append `id` to the log. Duplicates are accepted.
    pub fn append(&self, id: T) {
        let _guard = self.mutation.lock();
        let previous = self.data();
        let next = previous.push(id.clone());

        debug!(log = %self.config.name, ?id, len = next.len(), "Appended transform");
        self.swap(next);
        self.subscriptions.emit(&LogEvent::Append { id, previous });
    }

    /// Discard every entry before `index(id) + relative_position`.
    ///
    /// A target one past the last entry empties the log.
    pub fn truncate(&self, id: &T, relative_position: isize) -> Result<(), T> {
        let _guard = self.mutation.lock();
        let previous = self.data();
        let index = locate(&previous, id)?;
        let target = Operation::Truncate.resolve::<T>(index, relative_position, previous.len())?;
        let next = previous.slice(target as usize..);

        debug!(
            log = %self.config.name,
            ?id,
            relative_position,
            removed = previous.len() - next.len(),
            len = next.len(),
            "Truncated log"
        );
        self.swap(next);
        self.subscriptions.emit(&LogEvent::Truncate {
            id: id.clone(),
            relative_position,
            previous,
        });
        Ok(())
    }

    /// Discard every entry after `index(id) + relative_position`.
    ///
    /// A target of -1 empties the log; rolling back to the head changes
    /// nothing but still emits an event.
    pub fn rollback(&self, id: &T, relative_position: isize) -> Result<(), T> {
        let _guard = self.mutation.lock();
        let previous = self.data();
        let index = locate(&previous, id)?;
        let target = Operation::Rollback.resolve::<T>(index, relative_position, previous.len())?;
        let next = previous.slice(..(target + 1) as usize);

        debug!(
            log = %self.config.name,
            ?id,
            relative_position,
            removed = previous.len() - next.len(),
            len = next.len(),
            "Rolled back log"
        );
        self.swap(next);
        self.subscriptions.emit(&LogEvent::Rollback {
            id: id.clone(),
            relative_position,
            previous,
        });
        Ok(())
    }

    /// Discard every entry. Emits even if the log was already empty.
    pub fn clear(&self) {
        let _guard = self.mutation.lock();
        let previous = self.data();

        debug!(log = %self.config.name, removed = previous.len(), "Cleared log");
        self.swap(Snapshot::empty());
        self.subscriptions.emit(&LogEvent::Clear { previous });
    }

    fn swap(&self, next: Snapshot<T>) {
        *self.current.write() = next;
    }
}

/// Position of the first occurrence of `id`, or `UnknownEntry`.
fn locate<T: Clone + PartialEq>(snapshot: &Snapshot<T>, id: &T) -> Result<usize, T> {
    snapshot
        .position(id)
        .ok_or_else(|| LogError::UnknownEntry(id.clone()))
}

impl<T> Default for TransformLog<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Snapshot<T>> for TransformLog<T> {
    fn from(snapshot: Snapshot<T>) -> Self {
        Self::from_snapshot(snapshot, LogConfig::default())
    }
}

impl<T> From<Vec<T>> for TransformLog<T> {
    fn from(entries: Vec<T>) -> Self {
        Self::from(Snapshot::from(entries))
    }
}

impl<T> FromIterator<T> for TransformLog<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Snapshot<T>>())
    }
}

impl<T> fmt::Debug for TransformLog<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformLog")
            .field("name", &self.config.name)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
