//! Change notifications delivered to list listeners.

use crate::types::{ChangeKind, ListSnapshot};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One structural change to a list.
///
/// Carries the kind of change, the affected elements, and a frozen copy of
/// the list contents right after the change. Notifications are immutable
/// once built; listeners may keep them as long as they like.
///
/// Equality and hashing are structural over all three fields.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangeNotification<T> {
    kind: ChangeKind,
    changed_elements: ListSnapshot<T>,
    resulting_snapshot: ListSnapshot<T>,
}

impl<T> ChangeNotification<T> {
    /// Notification for elements added to a list.
    pub fn for_addition(
        changed_elements: impl Into<ListSnapshot<T>>,
        resulting_snapshot: impl Into<ListSnapshot<T>>,
    ) -> Self {
        Self {
            kind: ChangeKind::Added,
            changed_elements: changed_elements.into(),
            resulting_snapshot: resulting_snapshot.into(),
        }
    }

    /// Notification for elements removed from a list.
    pub fn for_removal(
        changed_elements: impl Into<ListSnapshot<T>>,
        resulting_snapshot: impl Into<ListSnapshot<T>>,
    ) -> Self {
        Self {
            kind: ChangeKind::Removed,
            changed_elements: changed_elements.into(),
            resulting_snapshot: resulting_snapshot.into(),
        }
    }

    pub(crate) fn new(
        kind: ChangeKind,
        changed_elements: ListSnapshot<T>,
        resulting_snapshot: ListSnapshot<T>,
    ) -> Self {
        Self {
            kind,
            changed_elements,
            resulting_snapshot,
        }
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    pub fn is_addition(&self) -> bool {
        self.kind == ChangeKind::Added
    }

    pub fn is_removal(&self) -> bool {
        self.kind == ChangeKind::Removed
    }

    /// Elements added or removed, in list order (or input order for bulk adds).
    pub fn changed_elements(&self) -> &[T] {
        &self.changed_elements
    }

    /// Full list contents immediately after the change.
    pub fn resulting_snapshot(&self) -> &ListSnapshot<T> {
        &self.resulting_snapshot
    }
}

impl<T: fmt::Debug> fmt::Display for ChangeNotification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Changed List Notification. {} elements: {:?}. Resulting list: {:?}",
            self.kind, self.changed_elements, self.resulting_snapshot
        )
    }
}
