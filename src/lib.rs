//! # Transform Log
//!
//! An append-ordered, positionally-addressable log of applied transforms for
//! a synchronization engine.
//!
//! ## Core Concepts
//!
//! - **Entries**: Opaque transform identifiers, compared by equality only
//! - **Snapshots**: Immutable, structurally shared views of the log
//! - **Positions**: Queries and pruning relative to a logged transform
//! - **Events**: Every mutation reports the snapshot it replaced
//!
//! ## Example
//!
//! ```ignore
//! use transform_log::{EventKind, TransformId, TransformLog};
//!
//! let log = TransformLog::new();
//! log.on(EventKind::Rollback, |event| {
//!     println!("rolled back from {} entries", event.previous().len());
//! });
//!
//! log.append(TransformId::from("a"));
//! log.append(TransformId::from("b"));
//! log.append(TransformId::from("c"));
//!
//! assert_eq!(log.before(&"c".into(), -1)?, vec!["a".into()]);
//! log.rollback(&"b".into(), 0)?;
//! assert_eq!(log.head(), Some("b".into()));
//! ```

pub mod error;
pub mod log;
pub mod snapshot;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use error::{ConfigError, LogError, ParseEventKindError, Result};
pub use log::{Operation, TransformLog};
pub use snapshot::Snapshot;
pub use subscriptions::{
    Callback, EventKind, ListenerId, LogEvent, Subscription, SubscriptionManager,
};
pub use types::{LogConfig, TransformId};
