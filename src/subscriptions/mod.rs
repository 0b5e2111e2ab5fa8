//! Notifications for structural changes to a log.
//!
//! Every successful `append`, `truncate`, `rollback` and `clear` emits one
//! [`LogEvent`] carrying the snapshot the log held before the change.
//! Listeners come in two forms:
//! - Callbacks, invoked synchronously on the mutating thread
//! - Channel subscriptions with bounded buffers and slow-subscriber dropping
//!
//! # Example
//!
//! ```ignore
//! let log = TransformLog::new();
//!
//! log.on(EventKind::Truncate, |event| {
//!     println!("truncated, {} entries before", event.previous().len());
//! });
//!
//! let subscription = log.subscribe(Some(EventKind::Append));
//! log.append("a".into());
//! let event = subscription.recv()?;
//! ```

mod manager;
mod types;

pub use manager::{Callback, SubscriptionManager};
pub use types::{EventKind, ListenerId, LogEvent, Subscription};
