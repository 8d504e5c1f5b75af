//! Core types for observable lists.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Kind of structural change carried by a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "Added"),
            ChangeKind::Removed => write!(f, "Removed"),
        }
    }
}

/// Frozen copy of a list's contents at one point in time.
///
/// Clones share the same backing storage; nothing can mutate it after
/// construction, so a snapshot handed to a listener stays valid forever.
#[derive(PartialEq, Eq, Hash)]
pub struct ListSnapshot<T>(Arc<[T]>);

impl<T> Clone for ListSnapshot<T> {
    fn clone(&self) -> Self {
        ListSnapshot(Arc::clone(&self.0))
    }
}

impl<T> ListSnapshot<T> {
    /// An empty snapshot.
    pub fn empty() -> Self {
        ListSnapshot(Arc::from(Vec::new()))
    }

    /// Copy the given elements into a new snapshot.
    pub fn from_slice(items: &[T]) -> Self
    where
        T: Clone,
    {
        ListSnapshot(Arc::from(items))
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.0.to_vec()
    }

    /// Whether two snapshots share the same backing storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Deref for ListSnapshot<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T> From<Vec<T>> for ListSnapshot<T> {
    fn from(items: Vec<T>) -> Self {
        ListSnapshot(Arc::from(items))
    }
}

impl<T> Default for ListSnapshot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a, T> IntoIterator for &'a ListSnapshot<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T: PartialEq> PartialEq<[T]> for ListSnapshot<T> {
    fn eq(&self, other: &[T]) -> bool {
        *self.0 == *other
    }
}

impl<T: PartialEq> PartialEq<Vec<T>> for ListSnapshot<T> {
    fn eq(&self, other: &Vec<T>) -> bool {
        *self.0 == other[..]
    }
}

impl<T: PartialEq, const N: usize> PartialEq<[T; N]> for ListSnapshot<T> {
    fn eq(&self, other: &[T; N]) -> bool {
        *self.0 == other[..]
    }
}

impl<T: fmt::Debug> fmt::Debug for ListSnapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl<T: Serialize> Serialize for ListSnapshot<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ListSnapshot<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(ListSnapshot::from)
    }
}

/// List configuration.
#[derive(Clone, Debug, Default)]
pub struct ListConfig {
    /// Display label, used in `Display` output and log events.
    pub name: Option<String>,

    /// Capacity reserved up front.
    pub initial_capacity: usize,
}

impl ListConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}
