//! Event and subscription types for log notifications.

use crate::error::ParseEventKindError;
use crate::snapshot::Snapshot;
use crate::types::TransformId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of structural change an event reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Append,
    Truncate,
    Rollback,
    Clear,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Append,
        EventKind::Truncate,
        EventKind::Rollback,
        EventKind::Clear,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Append => "append",
            EventKind::Truncate => "truncate",
            EventKind::Rollback => "rollback",
            EventKind::Clear => "clear",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ParseEventKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseEventKindError(s.to_string()))
    }
}

/// Events emitted after every successful mutation.
///
/// `previous` is the snapshot as it was before the mutation. It stays valid
/// and unchanged for as long as a listener holds on to it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEvent<T = TransformId> {
    /// An entry was appended.
    Append { id: T, previous: Snapshot<T> },

    /// Entries before the target position were discarded.
    Truncate {
        id: T,
        relative_position: isize,
        previous: Snapshot<T>,
    },

    /// Entries after the target position were discarded.
    Rollback {
        id: T,
        relative_position: isize,
        previous: Snapshot<T>,
    },

    /// All entries were discarded.
    Clear { previous: Snapshot<T> },
}

impl<T> LogEvent<T> {
    pub fn kind(&self) -> EventKind {
        match self {
            LogEvent::Append { .. } => EventKind::Append,
            LogEvent::Truncate { .. } => EventKind::Truncate,
            LogEvent::Rollback { .. } => EventKind::Rollback,
            LogEvent::Clear { .. } => EventKind::Clear,
        }
    }

    /// The snapshot the log held before this mutation.
    pub fn previous(&self) -> &Snapshot<T> {
        match self {
            LogEvent::Append { previous, .. }
            | LogEvent::Truncate { previous, .. }
            | LogEvent::Rollback { previous, .. }
            | LogEvent::Clear { previous } => previous,
        }
    }

    /// The entry named by the mutation, if any.
    pub fn id(&self) -> Option<&T> {
        match self {
            LogEvent::Append { id, .. }
            | LogEvent::Truncate { id, .. }
            | LogEvent::Rollback { id, .. } => Some(id),
            LogEvent::Clear { .. } => None,
        }
    }
}

/// Unique identifier for a registered listener or subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Channel-backed subscription to log events.
pub struct Subscription<T = TransformId> {
    pub id: ListenerId,
    /// Channel to receive events. Disconnects once the subscription is
    /// removed from the log.
    pub receiver: crossbeam_channel::Receiver<LogEvent<T>>,
}

impl<T> Subscription<T> {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<LogEvent<T>, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<LogEvent<T>, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<LogEvent<T>, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Take every event currently buffered.
    pub fn drain(&self) -> Vec<LogEvent<T>> {
        self.receiver.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_names_round_trip() {
        for kind in EventKind::ALL {
            assert_eq!(kind.as_str().parse::<EventKind>(), Ok(kind));
        }
        assert_eq!(
            "reset".parse::<EventKind>(),
            Err(ParseEventKindError("reset".to_string()))
        );
    }

    #[test]
    fn test_event_accessors() {
        let previous = Snapshot::from(vec![TransformId::from("a")]);
        let event = LogEvent::Truncate {
            id: TransformId::from("a"),
            relative_position: 1,
            previous: previous.clone(),
        };

        assert_eq!(event.kind(), EventKind::Truncate);
        assert!(event.previous().ptr_eq(&previous));
        assert_eq!(event.id(), Some(&TransformId::from("a")));

        let clear: LogEvent = LogEvent::Clear { previous };
        assert_eq!(clear.id(), None);
    }

    #[test]
    fn test_event_serializes_tagged() {
        let event = LogEvent::Rollback {
            id: TransformId::from("b"),
            relative_position: -1,
            previous: Snapshot::from(vec![TransformId::from("a"), TransformId::from("b")]),
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "rollback",
                "id": "b",
                "relative_position": -1,
                "previous": ["a", "b"]
            })
        );
    }
}
