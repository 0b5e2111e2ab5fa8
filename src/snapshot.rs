//! Immutable, structurally shared snapshots of log entries.
//!
//! A snapshot is a `start..end` view over an append-only arena. Narrowing a
//! snapshot (truncate, rollback) never touches the arena. Appending to the
//! snapshot that ends at the arena's tail extends the arena in place; any
//! other append forks a fresh arena holding only the live range. Views that
//! were handed out earlier keep their ranges, so they never change.

use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Bound, RangeBounds};
use std::sync::Arc;

/// Append-only backing storage shared by snapshots.
struct Arena<T> {
    entries: RwLock<Vec<T>>,
}

/// An ordered, immutable sequence of entries.
///
/// Cloning is O(1) and shares storage.
pub struct Snapshot<T> {
    arena: Arc<Arena<T>>,
    start: usize,
    end: usize,
}

impl<T> Snapshot<T> {
    /// A snapshot with no entries.
    pub fn empty() -> Self {
        Self::from_vec(Vec::new())
    }

    fn from_vec(entries: Vec<T>) -> Self {
        let end = entries.len();
        Self {
            arena: Arc::new(Arena {
                entries: RwLock::new(entries),
            }),
            start: 0,
            end,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True if both snapshots are the same view of the same storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.arena, &other.arena) && self.start == other.start && self.end == other.end
    }

    /// True if both snapshots are views over the same arena.
    #[cfg(test)]
    pub(crate) fn shares_storage(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.arena, &other.arena)
    }

    /// Run `f` over the live entries. `f` must not append to a snapshot of
    /// the same arena.
    pub(crate) fn with_slice<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        let entries = self.arena.entries.read();
        f(&entries[self.start..self.end])
    }

    /// Zero-based index of the first entry equal to `entry`.
    pub fn position(&self, entry: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.with_slice(|live| live.iter().position(|e| e == entry))
    }

    pub fn contains(&self, entry: &T) -> bool
    where
        T: PartialEq,
    {
        self.position(entry).is_some()
    }

    /// A view of a sub-range, sharing storage with `self`.
    ///
    /// # Panics
    ///
    /// Panics if the range is inverted or extends past `len()`.
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Self {
        let len = self.len();
        let from = match range.start_bound() {
            Bound::Included(&n) => n,
            Bound::Excluded(&n) => n + 1,
            Bound::Unbounded => 0,
        };
        let to = match range.end_bound() {
            Bound::Included(&n) => n + 1,
            Bound::Excluded(&n) => n,
            Bound::Unbounded => len,
        };
        assert!(
            from <= to && to <= len,
            "slice {from}..{to} out of bounds for snapshot of length {len}"
        );

        Self {
            arena: Arc::clone(&self.arena),
            start: self.start + from,
            end: self.start + to,
        }
    }
}

impl<T: Clone> Snapshot<T> {
    pub fn get(&self, index: usize) -> Option<T> {
        self.with_slice(|live| live.get(index).cloned())
    }

    pub fn first(&self) -> Option<T> {
        self.with_slice(|live| live.first().cloned())
    }

    pub fn last(&self) -> Option<T> {
        self.with_slice(|live| live.last().cloned())
    }

    /// Materialize the entries as a plain vector.
    pub fn to_vec(&self) -> Vec<T> {
        self.with_slice(|live| live.to_vec())
    }

    pub fn iter(&self) -> std::vec::IntoIter<T> {
        self.to_vec().into_iter()
    }

    /// A new snapshot with `entry` appended. `self` is left unchanged.
    pub fn push(&self, entry: T) -> Self {
        // Extend in place only while the dead prefix is no larger than the
        // live range; otherwise fork so truncated entries can be freed.
        if self.start <= self.len() {
            let mut entries = self.arena.entries.write();
            if entries.len() == self.end {
                entries.push(entry);
                return Self {
                    arena: Arc::clone(&self.arena),
                    start: self.start,
                    end: self.end + 1,
                };
            }
        }

        let mut entries = Vec::with_capacity(self.len() + 1);
        self.with_slice(|live| entries.extend_from_slice(live));
        entries.push(entry);
        Self::from_vec(entries)
    }
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            arena: Arc::clone(&self.arena),
            start: self.start,
            end: self.end,
        }
    }
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> From<Vec<T>> for Snapshot<T> {
    fn from(entries: Vec<T>) -> Self {
        Self::from_vec(entries)
    }
}

impl<T> FromIterator<T> for Snapshot<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<'a, T: Clone> IntoIterator for &'a Snapshot<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone + PartialEq> PartialEq for Snapshot<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if self.len() != other.len() {
            return false;
        }
        // Never hold two arena locks at once.
        let ours = self.to_vec();
        other.with_slice(|theirs| ours.as_slice() == theirs)
    }
}

impl<T: Clone + Eq> Eq for Snapshot<T> {}

impl<T: fmt::Debug> fmt::Debug for Snapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_slice(|live| f.debug_list().entries(live.iter()).finish())
    }
}

impl<T: Serialize> Serialize for Snapshot<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.with_slice(|live| serializer.collect_seq(live))
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Snapshot<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(Self::from_vec)
    }
}
