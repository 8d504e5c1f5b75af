//! Listener system for list change notifications.
//!
//! This module provides:
//! - The `ListListener` callback contract (closures qualify)
//! - Identity-keyed `ListenerHandle`s and the copy-on-write `ListenerRegistry`
//! - Ready-made listeners: channel forwarding and `tracing` logging
//!
//! # Example
//!
//! ```ignore
//! let list = ObservableList::named("tasks");
//!
//! let sub = list.subscribe(None);
//! list.push("write docs".to_string())?;
//!
//! let notification = sub.recv()?;
//! assert!(notification.is_addition());
//! ```

mod registry;
mod types;

pub use registry::ListenerRegistry;
pub use types::{
    ChannelListener, ListListener, ListenerHandle, ListenerId, Observable, Subscription,
    TracingListener,
};
