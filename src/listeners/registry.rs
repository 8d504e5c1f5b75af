//! Listener registry for broadcasting list notifications.

use crate::error::ListenerError;
use crate::notification::ChangeNotification;
use parking_lot::RwLock;
use std::sync::Arc;

use super::types::{ListenerHandle, ListenerId};

/// Concurrency-safe set of listener handles.
///
/// Membership is copy-on-write: a dispatch clones the current `Arc` and
/// iterates it without holding the registry lock, so registrations and
/// removals never wait for a running dispatch and never disturb it.
/// Dispatch visits listeners in registration order.
pub struct ListenerRegistry<T> {
    listeners: RwLock<Arc<Vec<ListenerHandle<T>>>>,
}

impl<T> ListenerRegistry<T> {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Add a listener. Re-adding a registered handle is a no-op.
    pub fn register(&self, handle: &ListenerHandle<T>) -> bool {
        let mut listeners = self.listeners.write();
        if listeners.iter().any(|h| h == handle) {
            return false;
        }

        let mut next = Vec::with_capacity(listeners.len() + 1);
        next.extend(listeners.iter().cloned());
        next.push(handle.clone());
        *listeners = Arc::new(next);

        tracing::debug!(listener = ?handle.id(), count = listeners.len(), "listener registered");
        true
    }

    /// Remove a listener. Absent handles are ignored.
    pub fn unregister(&self, handle: &ListenerHandle<T>) -> bool {
        let mut listeners = self.listeners.write();
        if !listeners.iter().any(|h| h == handle) {
            return false;
        }

        let next: Vec<_> = listeners.iter().filter(|h| *h != handle).cloned().collect();
        *listeners = Arc::new(next);

        tracing::debug!(listener = ?handle.id(), count = listeners.len(), "listener unregistered");
        true
    }

    pub fn contains(&self, handle: &ListenerHandle<T>) -> bool {
        self.listeners.read().iter().any(|h| h == handle)
    }

    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }

    /// Point-in-time view of the membership.
    pub fn snapshot(&self) -> Arc<Vec<ListenerHandle<T>>> {
        Arc::clone(&self.listeners.read())
    }

    /// Deliver a notification to every listener in the current snapshot.
    ///
    /// Listeners reporting [`ListenerError::Disconnected`] are dropped from
    /// the registry and dispatch continues past them. Any other failure stops
    /// the dispatch and is returned.
    pub fn notify_all(&self, notification: &ChangeNotification<T>) -> Result<(), ListenerError> {
        let listeners = self.snapshot();
        tracing::trace!(
            listeners = listeners.len(),
            kind = %notification.kind(),
            "dispatching notification"
        );

        let mut disconnected = Vec::new();
        let mut outcome = Ok(());
        for (visited, handle) in listeners.iter().enumerate() {
            match handle.notify(notification) {
                Ok(()) => {}
                Err(ListenerError::Disconnected) => disconnected.push(handle.id()),
                Err(e) => {
                    tracing::warn!(
                        listener = ?handle.id(),
                        skipped = listeners.len() - visited - 1,
                        error = %e,
                        "listener failed, dispatch aborted"
                    );
                    outcome = Err(e);
                    break;
                }
            }
        }

        if !disconnected.is_empty() {
            self.prune(&disconnected);
        }
        outcome
    }

    /// Remove disconnected listeners by identity.
    fn prune(&self, ids: &[ListenerId]) {
        let mut listeners = self.listeners.write();
        let next: Vec<_> = listeners
            .iter()
            .filter(|h| !ids.contains(&h.id()))
            .cloned()
            .collect();
        let removed = listeners.len() - next.len();
        *listeners = Arc::new(next);

        tracing::debug!(removed, count = listeners.len(), "pruned disconnected listeners");
    }
}

impl<T> Default for ListenerRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
