//! The observable list: lock-guarded ordered storage plus change dispatch.

use crate::error::{ListError, ListenerError, Result};
use crate::listeners::{ListenerHandle, ListenerRegistry, Observable, Subscription};
use crate::notification::ChangeNotification;
use crate::types::{ChangeKind, ListConfig, ListSnapshot};
use parking_lot::RwLock;
use std::fmt;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A thread-safe ordered list that notifies listeners of structural changes.
///
/// Every operation that adds or removes elements takes the writer lock,
/// applies the change, captures the delta and a frozen copy of the
/// resulting contents, releases the lock, and only then dispatches one
/// [`ChangeNotification`] to the registered listeners. Operations that find
/// nothing to do return `Ok(false)` and notify no one.
///
/// Replacing elements in place ([`set`](Self::set),
/// [`replace_all`](Self::replace_all)) and capacity management take the
/// writer lock but are not observed.
///
/// Mutations are totally ordered by lock acquisition. Dispatch happens
/// outside the lock, so two threads committing concurrently may deliver
/// their notifications in the opposite order; compare resulting snapshots
/// when commit order matters.
///
/// Listeners run on the mutating thread and may call read-only operations
/// on this list. Mutating this list from inside a listener is unsupported.
pub struct ObservableList<T> {
    /// Display label.
    name: Option<String>,

    /// Element storage.
    items: RwLock<Vec<T>>,

    /// Length as of the last committed mutation. Read without locking by
    /// `clear`'s fast path.
    len_hint: AtomicUsize,

    listeners: ListenerRegistry<T>,
}

impl<T> ObservableList<T> {
    /// Create an empty, unnamed list.
    pub fn new() -> Self {
        Self::with_config(ListConfig::default())
    }

    /// Create an empty list with a display label.
    pub fn named(name: impl Into<String>) -> Self {
        Self::with_config(ListConfig::named(name))
    }

    pub fn with_config(config: ListConfig) -> Self {
        Self {
            name: config.name,
            items: RwLock::new(Vec::with_capacity(config.initial_capacity)),
            len_hint: AtomicUsize::new(0),
            listeners: ListenerRegistry::new(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    // --- Listeners ---

    /// Register a listener. Registering the same handle twice is a no-op.
    pub fn register(&self, listener: &ListenerHandle<T>) -> bool {
        self.listeners.register(listener)
    }

    /// Unregister a listener. Returns false if it was not registered.
    pub fn unregister(&self, listener: &ListenerHandle<T>) -> bool {
        self.listeners.unregister(listener)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn listeners(&self) -> &ListenerRegistry<T> {
        &self.listeners
    }

    // --- Read Operations ---

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Run `f` against the current contents under shared access.
    ///
    /// `f` must not mutate this list.
    pub fn read<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(self.items.read().as_slice())
    }

    // --- Unobserved Mutations ---

    /// Reserve capacity for at least `additional` more elements.
    pub fn reserve(&self, additional: usize) {
        self.items.write().reserve(additional);
    }

    pub fn shrink_to_fit(&self) {
        self.items.write().shrink_to_fit();
    }

    /// Transform every element in place. Not observed.
    pub fn replace_all(&self, f: impl FnMut(&mut T)) {
        self.items.write().iter_mut().for_each(f);
    }
}

impl<T: Clone> ObservableList<T> {
    /// Register a channel-backed listener and return its receiving end.
    ///
    /// `buffer` of `None` means unbounded. A full bounded buffer fails the
    /// dispatch with [`ListenerError::Full`].
    pub fn subscribe(&self, buffer: Option<usize>) -> Subscription<T>
    where
        T: Send + Sync + 'static,
    {
        let subscription = Subscription::new(buffer);
        self.listeners.register(subscription.handle());
        subscription
    }

    // --- Observed Mutations ---

    /// Append an element.
    pub fn push(&self, value: T) -> Result<()> {
        self.commit_with("push", |items| {
            items.push(value.clone());
            Ok(((), Some((ChangeKind::Added, vec![value]))))
        })
    }

    /// Insert an element at `index`, shifting later elements right.
    pub fn insert(&self, index: usize, value: T) -> Result<()> {
        self.commit_with("insert", |items| {
            check_position(index, items.len())?;
            items.insert(index, value.clone());
            Ok(((), Some((ChangeKind::Added, vec![value]))))
        })
    }

    /// Append every element of `values`, keeping their order.
    ///
    /// Returns `Ok(false)` and notifies no one when `values` is empty.
    pub fn extend(&self, values: impl IntoIterator<Item = T>) -> Result<bool> {
        let added: Vec<T> = values.into_iter().collect();
        if added.is_empty() {
            return Ok(false);
        }

        self.commit("extend", |items| {
            items.extend(added.iter().cloned());
            Ok(Some((ChangeKind::Added, added)))
        })
    }

    /// Insert every element of `values` at `index`, keeping their order.
    ///
    /// The index is validated even when `values` is empty.
    pub fn insert_all(&self, index: usize, values: impl IntoIterator<Item = T>) -> Result<bool> {
        let added: Vec<T> = values.into_iter().collect();

        self.commit("insert_all", |items| {
            check_position(index, items.len())?;
            if added.is_empty() {
                return Ok(None);
            }
            let tail = items.split_off(index);
            items.extend(added.iter().cloned());
            items.extend(tail);
            Ok(Some((ChangeKind::Added, added)))
        })
    }

    /// Remove and return the element at `index`.
    pub fn remove(&self, index: usize) -> Result<T> {
        self.commit_with("remove", |items| {
            check_index(index, items.len())?;
            let value = items.remove(index);
            Ok((value.clone(), Some((ChangeKind::Removed, vec![value]))))
        })
    }

    /// Remove every element matching `pred`.
    ///
    /// `pred` runs under the writer lock and must not touch this list.
    pub fn remove_where(&self, mut pred: impl FnMut(&T) -> bool) -> Result<bool> {
        self.commit("remove_where", |items| {
            let hits = items.iter().map(&mut pred).collect();
            Ok(take_flagged(items, hits).map(|removed| (ChangeKind::Removed, removed)))
        })
    }

    /// Remove the elements in `range`.
    ///
    /// An empty range is a no-op and notifies no one.
    pub fn remove_range(&self, range: Range<usize>) -> Result<bool> {
        self.commit("remove_range", |items| {
            let len = items.len();
            if range.start > range.end {
                return Err(ListError::IndexOutOfRange {
                    index: range.start,
                    len,
                });
            }
            if range.end > len {
                return Err(ListError::IndexOutOfRange {
                    index: range.end,
                    len,
                });
            }
            if range.is_empty() {
                return Ok(None);
            }
            let removed: Vec<T> = items.drain(range.clone()).collect();
            Ok(Some((ChangeKind::Removed, removed)))
        })
    }

    /// Remove everything.
    ///
    /// An already-empty list returns immediately without taking any lock.
    /// That check races with concurrent inserts: a `clear` that overlaps a
    /// `push` may do nothing even though the list is non-empty afterwards.
    pub fn clear(&self) -> Result<bool> {
        if self.len_hint.load(Ordering::Acquire) == 0 {
            return Ok(false);
        }

        self.commit("clear", |items| {
            if items.is_empty() {
                return Ok(None);
            }
            let removed: Vec<T> = items.drain(..).collect();
            Ok(Some((ChangeKind::Removed, removed)))
        })
    }

    /// Replace the element at `index`, returning the old one. Not observed.
    pub fn set(&self, index: usize, value: T) -> Result<T> {
        let mut items = self.items.write();
        check_index(index, items.len())?;
        Ok(std::mem::replace(&mut items[index], value))
    }

    // --- Read Operations ---

    pub fn get(&self, index: usize) -> Result<T> {
        let items = self.items.read();
        check_index(index, items.len())?;
        Ok(items[index].clone())
    }

    pub fn first(&self) -> Option<T> {
        self.items.read().first().cloned()
    }

    pub fn last(&self) -> Option<T> {
        self.items.read().last().cloned()
    }

    /// Copy of the elements in `range`.
    pub fn sub_list(&self, range: Range<usize>) -> Result<Vec<T>> {
        let items = self.items.read();
        let len = items.len();
        if range.start > range.end {
            return Err(ListError::IndexOutOfRange {
                index: range.start,
                len,
            });
        }
        items
            .get(range.clone())
            .map(<[T]>::to_vec)
            .ok_or(ListError::IndexOutOfRange {
                index: range.end,
                len,
            })
    }

    /// Frozen copy of the full contents.
    pub fn snapshot(&self) -> ListSnapshot<T> {
        ListSnapshot::from_slice(&self.items.read())
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.items.read().clone()
    }

    /// Iterate over a copy of the contents taken now.
    pub fn iter(&self) -> std::vec::IntoIter<T> {
        self.to_vec().into_iter()
    }

    // --- Internal ---

    /// Apply `mutate` under the writer lock and dispatch the resulting change.
    ///
    /// `mutate` returns the change kind and delta, or `None` when it left
    /// the list untouched. Returns whether a change was committed.
    fn commit<F>(&self, operation: &'static str, mutate: F) -> Result<bool>
    where
        F: FnOnce(&mut Vec<T>) -> Result<Option<(ChangeKind, Vec<T>)>>,
    {
        self.commit_with(operation, |items| {
            let change = mutate(items)?;
            Ok((change.is_some(), change))
        })
    }

    /// Like [`commit`](Self::commit), but `mutate` also yields a value
    /// handed back to the caller once dispatch succeeds.
    ///
    /// The resulting snapshot is captured before the lock is released;
    /// dispatch runs after.
    fn commit_with<R, F>(&self, operation: &'static str, mutate: F) -> Result<R>
    where
        F: FnOnce(&mut Vec<T>) -> Result<(R, Option<(ChangeKind, Vec<T>)>)>,
    {
        let (outcome, notification) = {
            let mut items = self.items.write();
            let (outcome, change) = mutate(&mut *items)?;
            let Some((kind, changed)) = change else {
                return Ok(outcome);
            };
            self.len_hint.store(items.len(), Ordering::Release);

            tracing::debug!(
                list = self.label(),
                operation,
                kind = %kind,
                changed = changed.len(),
                len = items.len(),
                "list mutated"
            );

            let notification = ChangeNotification::new(
                kind,
                ListSnapshot::from(changed),
                ListSnapshot::from_slice(&items),
            );
            (outcome, notification)
        };

        self.listeners.notify_all(&notification)?;
        Ok(outcome)
    }
}

impl<T: Clone + PartialEq> ObservableList<T> {
    /// Remove the first element equal to `value`.
    pub fn remove_item(&self, value: &T) -> Result<bool> {
        self.commit("remove_item", |items| {
            let Some(index) = items.iter().position(|e| e == value) else {
                return Ok(None);
            };
            let removed = items.remove(index);
            Ok(Some((ChangeKind::Removed, vec![removed])))
        })
    }

    /// Remove every element that occurs in `values`.
    ///
    /// The notification lists the removed elements in list order.
    pub fn remove_all(&self, values: &[T]) -> Result<bool> {
        self.commit("remove_all", |items| {
            let hits = items.iter().map(|e| values.contains(e)).collect();
            Ok(take_flagged(items, hits).map(|removed| (ChangeKind::Removed, removed)))
        })
    }

    /// Remove every element that does not occur in `values`.
    pub fn retain_only(&self, values: &[T]) -> Result<bool> {
        self.commit("retain_only", |items| {
            let hits = items.iter().map(|e| !values.contains(e)).collect();
            Ok(take_flagged(items, hits).map(|removed| (ChangeKind::Removed, removed)))
        })
    }

    pub fn contains(&self, value: &T) -> bool {
        self.items.read().contains(value)
    }

    pub fn index_of(&self, value: &T) -> Option<usize> {
        self.items.read().iter().position(|e| e == value)
    }

    pub fn last_index_of(&self, value: &T) -> Option<usize> {
        self.items.read().iter().rposition(|e| e == value)
    }
}

impl<T: Clone> Observable<T> for ObservableList<T> {
    fn register(&self, listener: &ListenerHandle<T>) -> bool {
        self.listeners.register(listener)
    }

    fn unregister(&self, listener: &ListenerHandle<T>) -> bool {
        self.listeners.unregister(listener)
    }

    fn notify_all(&self, notification: &ChangeNotification<T>) -> std::result::Result<(), ListenerError> {
        self.listeners.notify_all(notification)
    }
}

impl<T> Default for ObservableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Display for ObservableList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items = self.items.read();
        match &self.name {
            Some(name) => write!(f, "{} - {:?}", name, *items),
            None => write!(f, "{:?}", *items),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableList")
            .field("name", &self.name)
            .field("items", &*self.items.read())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Valid insertion positions are `0..=len`.
fn check_position(index: usize, len: usize) -> Result<()> {
    if index > len {
        return Err(ListError::IndexOutOfRange { index, len });
    }
    Ok(())
}

/// Valid element positions are `0..len`.
fn check_index(index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(ListError::IndexOutOfRange { index, len });
    }
    Ok(())
}

/// Move the flagged elements out of `items`, preserving order on both sides.
///
/// Flags are computed up front so a panicking predicate leaves `items`
/// intact. Returns `None` when nothing was flagged.
fn take_flagged<T>(items: &mut Vec<T>, hits: Vec<bool>) -> Option<Vec<T>> {
    if !hits.iter().any(|hit| *hit) {
        return None;
    }

    let mut removed = Vec::new();
    let mut kept = Vec::with_capacity(items.len());
    for (item, hit) in std::mem::take(items).into_iter().zip(hits) {
        if hit {
            removed.push(item);
        } else {
            kept.push(item);
        }
    }
    *items = kept;
    Some(removed)
}
