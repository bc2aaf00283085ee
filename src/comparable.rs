//! SafeSliceComparable: a `SafeSlice` whose elements support equality.
//!
//! Derefs to `SafeSlice<T>`, so every slice operation is available, and
//! adds value-based membership, removal and structural comparison.

use crate::lock_order::lock_both;
use crate::safe_slice::SafeSlice;
use core::borrow::Borrow;
use core::fmt;
use core::ops::Deref;

/// Thread-safe sequence of comparable elements.
pub struct SafeSliceComparable<T> {
    inner: SafeSlice<T>,
}

impl<T> SafeSliceComparable<T> {
    pub fn new() -> Self {
        Self {
            inner: SafeSlice::new(),
        }
    }

    pub fn as_safe_slice(&self) -> &SafeSlice<T> {
        &self.inner
    }

    pub fn into_safe_slice(self) -> SafeSlice<T> {
        self.inner
    }

    /// Compare element-wise against `other` with `eq`; lengths must match.
    pub fn equal_func<F>(&self, other: &[T], eq: F) -> bool
    where
        F: FnMut(&T, &T) -> bool,
    {
        let v = self.inner.lock();
        same_with(&v, other, eq)
    }

    /// Compare element-wise against another slice with `eq`, holding both
    /// locks for the duration of the comparison.
    pub fn equal_safe_slice_func<F>(&self, other: &SafeSlice<T>, eq: F) -> bool
    where
        F: FnMut(&T, &T) -> bool,
    {
        let both = lock_both((self.inner.id, &self.inner), (other.id, other), |s| {
            s.lock()
        });
        let (a, b) = both.sides();
        same_with(a, b, eq)
    }
}

fn same_with<T, F>(a: &[T], b: &[T], mut eq: F) -> bool
where
    F: FnMut(&T, &T) -> bool,
{
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| eq(x, y))
}

impl<T: PartialEq> SafeSliceComparable<T> {
    pub fn contains(&self, x: &T) -> bool {
        self.inner.lock().contains(x)
    }

    /// Remove the first element equal to `x`, if any.
    pub fn remove(&self, x: &T) {
        let mut v = self.inner.lock();
        if let Some(i) = v.iter().position(|e| e == x) {
            v.remove(i);
        }
    }

    /// Remove every element equal to `x`.
    pub fn remove_all(&self, x: &T) {
        self.inner.lock().retain(|e| e != x);
    }

    /// Same length and equal elements at every index as `other`.
    pub fn equal(&self, other: &SafeSlice<T>) -> bool {
        self.equal_safe_slice_func(other, |a, b| a == b)
    }

    pub fn equal_slice(&self, other: &[T]) -> bool {
        self.equal_func(other, |a, b| a == b)
    }

    /// Compare against a sequence of values without collecting it first.
    pub fn equal_values<I>(&self, values: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        let v = self.inner.lock();
        let mut it = values.into_iter();
        for e in v.iter() {
            match it.next() {
                Some(x) if x.borrow() == e => {}
                _ => return false,
            }
        }
        it.next().is_none()
    }
}

impl<T> Deref for SafeSliceComparable<T> {
    type Target = SafeSlice<T>;
    fn deref(&self) -> &SafeSlice<T> {
        &self.inner
    }
}

impl<T> Default for SafeSliceComparable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for SafeSliceComparable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> From<SafeSlice<T>> for SafeSliceComparable<T> {
    fn from(inner: SafeSlice<T>) -> Self {
        Self { inner }
    }
}

impl<T> From<Vec<T>> for SafeSliceComparable<T> {
    fn from(v: Vec<T>) -> Self {
        Self {
            inner: SafeSlice::from(v),
        }
    }
}

impl<T> FromIterator<T> for SafeSliceComparable<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SafeSliceComparable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}
