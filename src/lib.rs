//! # Observable List
//!
//! A thread-safe ordered list that broadcasts structural changes to
//! registered listeners.
//!
//! ## Core Concepts
//!
//! - **ObservableList**: Ordered storage behind a reader/writer lock
//! - **ChangeNotification**: Kind, delta, and a frozen copy of the result
//! - **Listeners**: Identity-keyed handles in a copy-on-write registry
//!
//! A notification fires exactly once for each operation that changed the
//! list's membership, after the writer lock is released. Listeners may read
//! the list from inside their callback.
//!
//! ## Example
//!
//! ```ignore
//! use observable_list::{ChangeNotification, ListenerHandle, ObservableList};
//!
//! let list = ObservableList::named("fruits");
//!
//! list.register(&ListenerHandle::from_fn(|n: &ChangeNotification<String>| {
//!     println!("{}", n);
//!     Ok(())
//! }));
//!
//! list.push("apple".to_string())?;
//! list.extend(vec!["kiwi".to_string(), "fig".to_string()])?;
//! list.remove_item(&"apple".to_string())?;
//! ```

pub mod error;
pub mod list;
pub mod listeners;
pub mod notification;
pub mod types;

// Re-exports
pub use error::{ListError, ListenerError, Result};
pub use list::ObservableList;
pub use listeners::{
    ChannelListener, ListListener, ListenerHandle, ListenerId, ListenerRegistry, Observable,
    Subscription, TracingListener,
};
pub use notification::ChangeNotification;
pub use types::*;
