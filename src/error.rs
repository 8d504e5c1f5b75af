//! Error types for list operations.

use thiserror::Error;

/// Main error type for list operations.
#[derive(Debug, Error)]
pub enum ListError {
    /// A position or range bound fell outside the list.
    #[error("Index out of range: {index} (len is {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// A listener failed while a committed change was being dispatched.
    ///
    /// The mutation itself has already been applied; listeners that had not
    /// been visited yet did not receive the notification.
    #[error("Listener failed: {0}")]
    Listener(#[from] ListenerError),
}

/// Failure reported by a listener callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerError {
    /// The receiving end is gone. The registry unregisters the listener.
    #[error("receiver disconnected")]
    Disconnected,

    #[error("receiver buffer is full")]
    Full,

    #[error("{0}")]
    Failed(String),
}

impl ListenerError {
    /// Build an arbitrary callback failure.
    pub fn failed(message: impl Into<String>) -> Self {
        ListenerError::Failed(message.into())
    }
}

impl<T> From<crossbeam_channel::TrySendError<T>> for ListenerError {
    fn from(e: crossbeam_channel::TrySendError<T>) -> Self {
        match e {
            crossbeam_channel::TrySendError::Full(_) => ListenerError::Full,
            crossbeam_channel::TrySendError::Disconnected(_) => ListenerError::Disconnected,
        }
    }
}

/// Result type for list operations.
pub type Result<T> = std::result::Result<T, ListError>;
