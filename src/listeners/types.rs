//! Listener contract, subscription handles and ready-made listeners.

use crate::error::ListenerError;
use crate::notification::ChangeNotification;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::fmt;
use std::sync::Arc;

/// Callback invoked synchronously on the mutating thread after each
/// committed change.
///
/// The list's element lock is already released when this runs, so the
/// callback may call read-only operations on the same list. Calling a
/// mutating operation on the same list from inside the callback is not
/// supported.
///
/// Returning an error aborts the current dispatch: listeners not yet
/// visited are skipped and the error is returned to the mutating caller.
/// [`ListenerError::Disconnected`] is the exception: the listener is
/// unregistered and dispatch moves on.
pub trait ListListener<T>: Send + Sync {
    fn on_list_change(&self, notification: &ChangeNotification<T>) -> Result<(), ListenerError>;
}

impl<T, F> ListListener<T> for F
where
    F: Fn(&ChangeNotification<T>) -> Result<(), ListenerError> + Send + Sync,
{
    fn on_list_change(&self, notification: &ChangeNotification<T>) -> Result<(), ListenerError> {
        self(notification)
    }
}

/// Types that accept listener registrations and broadcast notifications.
pub trait Observable<T> {
    /// Register a listener. Returns false if it was already registered.
    fn register(&self, listener: &ListenerHandle<T>) -> bool;

    /// Unregister a listener. Returns false if it was not registered.
    fn unregister(&self, listener: &ListenerHandle<T>) -> bool;

    /// Deliver a notification to every registered listener.
    fn notify_all(&self, notification: &ChangeNotification<T>) -> Result<(), ListenerError>;
}

/// Identity of a listener registration, derived from the handle's allocation.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

impl fmt::Debug for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListenerId({:#x})", self.0)
    }
}

/// Shared handle to a listener.
///
/// Clones refer to the same subscription. Two handles built from separate
/// listener values are distinct even if the listeners behave identically.
pub struct ListenerHandle<T> {
    listener: Arc<dyn ListListener<T>>,
}

impl<T: 'static> ListenerHandle<T> {
    pub fn new<L>(listener: L) -> Self
    where
        L: ListListener<T> + 'static,
    {
        Self {
            listener: Arc::new(listener),
        }
    }

    /// Wrap a closure. Gives the compiler the callback signature up front.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&ChangeNotification<T>) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        Self::new(f)
    }

    pub fn from_arc(listener: Arc<dyn ListListener<T>>) -> Self {
        Self { listener }
    }
}

impl<T> ListenerHandle<T> {
    pub fn id(&self) -> ListenerId {
        ListenerId(Arc::as_ptr(&self.listener) as *const () as usize)
    }

    pub(crate) fn notify(&self, notification: &ChangeNotification<T>) -> Result<(), ListenerError> {
        self.listener.on_list_change(notification)
    }
}

impl<T> Clone for ListenerHandle<T> {
    fn clone(&self) -> Self {
        Self {
            listener: Arc::clone(&self.listener),
        }
    }
}

impl<T> PartialEq for ListenerHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<T> Eq for ListenerHandle<T> {}

impl<T> fmt::Debug for ListenerHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ListenerHandle").field(&self.id()).finish()
    }
}

/// Listener that forwards every notification into a channel.
pub struct ChannelListener<T> {
    sender: Sender<ChangeNotification<T>>,
}

impl<T> ChannelListener<T> {
    /// Create a listener and its receiving end.
    ///
    /// `buffer` of `None` means unbounded. With a bounded buffer, a full
    /// channel makes the listener fail with [`ListenerError::Full`].
    pub fn channel(buffer: Option<usize>) -> (Self, Receiver<ChangeNotification<T>>) {
        let (sender, receiver) = match buffer {
            Some(size) => bounded(size),
            None => unbounded(),
        };
        (Self { sender }, receiver)
    }
}

impl<T: Clone + Send + Sync> ListListener<T> for ChannelListener<T> {
    fn on_list_change(&self, notification: &ChangeNotification<T>) -> Result<(), ListenerError> {
        self.sender.try_send(notification.clone())?;
        Ok(())
    }
}

/// Registered channel listener plus its receiver.
pub struct Subscription<T> {
    handle: ListenerHandle<T>,
    receiver: Receiver<ChangeNotification<T>>,
}

impl<T: Clone + Send + Sync + 'static> Subscription<T> {
    pub(crate) fn new(buffer: Option<usize>) -> Self {
        let (listener, receiver) = ChannelListener::channel(buffer);
        Self {
            handle: ListenerHandle::new(listener),
            receiver,
        }
    }
}

impl<T> Subscription<T> {
    /// Handle to pass to `unregister`.
    pub fn handle(&self) -> &ListenerHandle<T> {
        &self.handle
    }

    /// Receive the next notification (blocking).
    pub fn recv(&self) -> Result<ChangeNotification<T>, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a notification (non-blocking).
    pub fn try_recv(&self) -> Result<ChangeNotification<T>, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<ChangeNotification<T>, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain everything currently buffered.
    pub fn drain(&self) -> Vec<ChangeNotification<T>> {
        self.receiver.try_iter().collect()
    }
}

/// Listener that logs every notification through `tracing`.
#[derive(Clone, Debug)]
pub struct TracingListener {
    label: String,
}

impl TracingListener {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<T: fmt::Debug> ListListener<T> for TracingListener {
    fn on_list_change(&self, notification: &ChangeNotification<T>) -> Result<(), ListenerError> {
        tracing::info!(
            listener = %self.label,
            kind = %notification.kind(),
            changed = ?notification.changed_elements(),
            resulting = ?notification.resulting_snapshot(),
            "list changed"
        );
        Ok(())
    }
}
