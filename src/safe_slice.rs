//! SafeSlice: an ordered sequence behind a single mutex.
//!
//! Every operation, reads included, takes the same exclusive lock so an
//! index is always checked against the length it is applied to.
//!
//! Out-of-range indices never fail:
//! - `get`, `pop`, `pop_front`, `find`, `find_last` fall back to `T::default()`.
//! - `set` and `remove_at` do nothing.
//! - `insert` and `insert_many` append instead.
//!
//! `swap` is the one exception and panics like `<[T]>::swap`.
//!
//! Closures passed to `map`, `filter`, `sort_by`, ... run with the lock
//! held and must not call back into the same slice. Debug builds panic on
//! that; release builds deadlock.

use crate::lock_order::InstanceId;
use crate::reentrancy::{DebugReentrancy, ReentrancyGuard};
use core::cmp::Ordering;
use core::fmt;
use core::ops::{Deref, DerefMut};
use parking_lot::{Mutex, MutexGuard};

/// Thread-safe, index-addressable sequence.
pub struct SafeSlice<T> {
    pub(crate) id: InstanceId,
    reentrancy: DebugReentrancy,
    slice: Mutex<Vec<T>>,
}

/// Held lock on a slice's storage.
pub(crate) struct Locked<'a, T> {
    // Declared first so the holder mark is cleared before the mutex unlocks.
    _entered: ReentrancyGuard<'a>,
    data: MutexGuard<'a, Vec<T>>,
}

impl<'a, T> Deref for Locked<'a, T> {
    type Target = Vec<T>;
    fn deref(&self) -> &Vec<T> {
        &self.data
    }
}

impl<'a, T> DerefMut for Locked<'a, T> {
    fn deref_mut(&mut self) -> &mut Vec<T> {
        &mut self.data
    }
}

impl<T> SafeSlice<T> {
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    fn from_vec(v: Vec<T>) -> Self {
        Self {
            id: InstanceId::next(),
            reentrancy: DebugReentrancy::new(),
            slice: Mutex::new(v),
        }
    }

    pub(crate) fn lock(&self) -> Locked<'_, T> {
        self.reentrancy.check();
        let data = self.slice.lock();
        Locked {
            _entered: self.reentrancy.enter(),
            data,
        }
    }

    pub fn append(&self, x: T) {
        self.lock().push(x);
    }

    /// Same as [`SafeSlice::append`].
    pub fn push(&self, x: T) {
        self.lock().push(x);
    }

    pub fn push_front(&self, x: T) {
        self.lock().insert(0, x);
    }

    /// Replace the element at `i`; no-op when `i` is out of range.
    pub fn set(&self, i: usize, x: T) {
        let mut v = self.lock();
        let len = v.len();
        match v.get_mut(i) {
            Some(slot) => *slot = x,
            None => tracing::trace!(index = i, len, "set out of range ignored"),
        }
    }

    /// Insert `x` before index `i`, or append it when `i >= len`.
    pub fn insert(&self, i: usize, x: T) {
        let mut v = self.lock();
        if i >= v.len() {
            tracing::trace!(index = i, len = v.len(), "insert out of range, appending");
            v.push(x);
        } else {
            v.insert(i, x);
        }
    }

    /// Insert every element of `xs` before index `i`, keeping their order,
    /// or append them when `i >= len`.
    pub fn insert_many<I: IntoIterator<Item = T>>(&self, i: usize, xs: I) {
        let mut v = self.lock();
        if i >= v.len() {
            tracing::trace!(index = i, len = v.len(), "insert_many out of range, appending");
            v.extend(xs);
        } else {
            v.splice(i..i, xs);
        }
    }

    /// Remove the last element, or return `T::default()` when empty.
    pub fn pop(&self) -> T
    where
        T: Default,
    {
        self.lock().pop().unwrap_or_else(|| {
            tracing::trace!("pop on empty slice");
            T::default()
        })
    }

    /// Remove the first element, or return `T::default()` when empty.
    pub fn pop_front(&self) -> T
    where
        T: Default,
    {
        let mut v = self.lock();
        if v.is_empty() {
            tracing::trace!("pop_front on empty slice");
            return T::default();
        }
        v.remove(0)
    }

    /// Remove the element at `i`; no-op when `i` is out of range.
    pub fn remove_at(&self, i: usize) {
        let mut v = self.lock();
        if i < v.len() {
            v.remove(i);
        } else {
            tracing::trace!(index = i, len = v.len(), "remove_at out of range ignored");
        }
    }

    /// Remove every element matching `pred`; survivors keep their order.
    pub fn remove_if<F>(&self, mut pred: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.lock().retain(|e| !pred(e));
    }

    /// Exchange the elements at `i` and `j`.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is out of range.
    pub fn swap(&self, i: usize, j: usize) {
        self.lock().swap(i, j);
    }

    pub fn reverse(&self) {
        self.lock().reverse();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// New slice holding `f` applied to every element.
    pub fn map<F>(&self, mut f: F) -> SafeSlice<T>
    where
        F: FnMut(&T) -> T,
    {
        let v = self.lock();
        SafeSlice::from_vec(v.iter().map(|e| f(e)).collect())
    }

    /// Replace every element in place with `f` applied to it.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&T) -> T,
    {
        let mut v = self.lock();
        for e in v.iter_mut() {
            let next = f(e);
            *e = next;
        }
    }

    /// True when `pred` holds for every element (and for an empty slice).
    pub fn all<F>(&self, mut pred: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.lock().iter().all(|e| pred(e))
    }

    pub fn any<F>(&self, mut pred: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.lock().iter().any(|e| pred(e))
    }

    pub fn find_index<F>(&self, mut pred: F) -> Option<usize>
    where
        F: FnMut(&T) -> bool,
    {
        self.lock().iter().position(|e| pred(e))
    }

    pub fn find_last_index<F>(&self, mut pred: F) -> Option<usize>
    where
        F: FnMut(&T) -> bool,
    {
        self.lock().iter().rposition(|e| pred(e))
    }

    /// Sort in place with a strict "less than" predicate.
    ///
    /// The sort is stable: elements neither less nor greater than each
    /// other keep their relative order.
    pub fn sort_by<F>(&self, mut less: F)
    where
        F: FnMut(&T, &T) -> bool,
    {
        self.lock().sort_by(|a, b| {
            if less(a, b) {
                Ordering::Less
            } else if less(b, a) {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        });
    }
}

impl<T: Clone> SafeSlice<T> {
    pub fn from_slice(items: &[T]) -> Self {
        Self::from_vec(items.to_vec())
    }

    /// Copy of the element at `i`, or `None` when out of range.
    pub fn try_get(&self, i: usize) -> Option<T> {
        self.lock().get(i).cloned()
    }

    /// Copy of the element at `i`, or `T::default()` when out of range.
    pub fn get(&self, i: usize) -> T
    where
        T: Default,
    {
        let v = self.lock();
        match v.get(i) {
            Some(e) => e.clone(),
            None => {
                tracing::trace!(index = i, len = v.len(), "get out of range, returning default");
                T::default()
            }
        }
    }

    /// Snapshot of the elements.
    pub fn export(&self) -> Vec<T> {
        self.lock().clone()
    }

    /// Snapshot of the elements; never a view of the live storage.
    pub fn values(&self) -> Vec<T> {
        self.export()
    }

    /// New slice with the elements matching `pred`, in order.
    pub fn filter<F>(&self, mut pred: F) -> SafeSlice<T>
    where
        F: FnMut(&T) -> bool,
    {
        let v = self.lock();
        SafeSlice::from_vec(v.iter().filter(|e| pred(e)).cloned().collect())
    }

    /// Left fold seeded with the first element; `T::default()` when empty.
    pub fn reduce<F>(&self, f: F) -> T
    where
        T: Default,
        F: FnMut(T, &T) -> T,
    {
        let v = self.lock();
        let mut it = v.iter();
        match it.next() {
            Some(first) => it.fold(first.clone(), f),
            None => T::default(),
        }
    }

    /// First element matching `pred`, or `T::default()`.
    pub fn find<F>(&self, mut pred: F) -> T
    where
        T: Default,
        F: FnMut(&T) -> bool,
    {
        self.lock()
            .iter()
            .find(|e| pred(e))
            .cloned()
            .unwrap_or_default()
    }

    /// Last element matching `pred`, or `T::default()`.
    pub fn find_last<F>(&self, mut pred: F) -> T
    where
        T: Default,
        F: FnMut(&T) -> bool,
    {
        self.lock()
            .iter()
            .rev()
            .find(|e| pred(e))
            .cloned()
            .unwrap_or_default()
    }

    /// Partition into `(matching, not_matching)`, both in original order.
    pub fn split_by_filter<F>(&self, mut pred: F) -> (SafeSlice<T>, SafeSlice<T>)
    where
        F: FnMut(&T) -> bool,
    {
        let v = self.lock();
        let (matched, unmatched): (Vec<T>, Vec<T>) = v.iter().cloned().partition(|e| pred(e));
        (SafeSlice::from_vec(matched), SafeSlice::from_vec(unmatched))
    }

    /// Split into `[0, i)` and `[i, len)`; `i` past the end leaves the
    /// right side empty.
    pub fn split_at_index(&self, i: usize) -> (SafeSlice<T>, SafeSlice<T>) {
        let v = self.lock();
        let (left, right) = v.split_at(i.min(v.len()));
        (
            SafeSlice::from_vec(left.to_vec()),
            SafeSlice::from_vec(right.to_vec()),
        )
    }
}

impl<T> Default for SafeSlice<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for SafeSlice<T> {
    /// Independent copy with its own lock and identity.
    fn clone(&self) -> Self {
        Self::from_vec(self.export())
    }
}

impl<T> From<Vec<T>> for SafeSlice<T> {
    fn from(v: Vec<T>) -> Self {
        Self::from_vec(v)
    }
}

impl<T> FromIterator<T> for SafeSlice<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T: fmt::Debug> fmt::Debug for SafeSlice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.lock().iter()).finish()
    }
}
