//! SafeSet: a hash set behind a reader/writer lock, with set algebra.
//!
//! Binary operations (`union`, `is_subset_of`, ...) read both operands
//! under their locks at once. The locks are taken in instance-id order
//! (see `lock_order`), never in argument order, and a set combined with
//! itself is locked a single time.

use crate::lock_order::{lock_both, Both, InstanceId};
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::HashSet;
use parking_lot::{RwLock, RwLockReadGuard};
use std::collections::hash_map::RandomState;

/// Thread-safe set of unique elements.
pub struct SafeSet<T, S = RandomState> {
    id: InstanceId,
    items: RwLock<HashSet<T, S>>,
}

impl<T> SafeSet<T>
where
    T: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    /// Set holding each distinct element of `values`.
    pub fn from_values<I: IntoIterator<Item = T>>(values: I) -> Self {
        values.into_iter().collect()
    }
}

impl<T> Default for SafeSet<T>
where
    T: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> SafeSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher + Clone + Default,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::from_storage(HashSet::with_hasher(hasher))
    }

    fn from_storage(items: HashSet<T, S>) -> Self {
        Self {
            id: InstanceId::next(),
            items: RwLock::new(items),
        }
    }

    fn read_with<'a>(
        &'a self,
        other: &'a Self,
    ) -> Both<RwLockReadGuard<'a, HashSet<T, S>>> {
        lock_both((self.id, &self.items), (other.id, &other.items), |l| {
            l.read()
        })
    }

    /// Idempotent insert.
    pub fn add(&self, item: T) {
        self.items.write().insert(item);
    }

    /// Insert `item`; returns true when it was already present.
    pub fn add_with_check(&self, item: T) -> bool {
        !self.items.write().insert(item)
    }

    pub fn remove(&self, item: &T) {
        self.items.write().remove(item);
    }

    pub fn contains(&self, item: &T) -> bool {
        self.items.read().contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn clear(&self) {
        let mut items = self.items.write();
        let hasher = items.hasher().clone();
        *items = HashSet::with_hasher(hasher);
    }

    /// Snapshot of the elements in unspecified order.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.read().iter().cloned().collect()
    }

    /// Elements in `self`, `other`, or both.
    pub fn union(&self, other: &Self) -> Self
    where
        T: Clone,
    {
        let both = self.read_with(other);
        let (a, b) = both.sides();
        let mut out = HashSet::with_capacity_and_hasher(a.len().max(b.len()), a.hasher().clone());
        out.extend(a.union(b).cloned());
        Self::from_storage(out)
    }

    /// Elements in both `self` and `other`.
    pub fn intersection(&self, other: &Self) -> Self
    where
        T: Clone,
    {
        let both = self.read_with(other);
        let (a, b) = both.sides();
        let mut out = HashSet::with_hasher(a.hasher().clone());
        out.extend(a.intersection(b).cloned());
        Self::from_storage(out)
    }

    /// Elements of `self` that are not in `other`.
    pub fn difference(&self, other: &Self) -> Self
    where
        T: Clone,
    {
        let both = self.read_with(other);
        let (a, b) = both.sides();
        let mut out = HashSet::with_hasher(a.hasher().clone());
        out.extend(a.difference(b).cloned());
        Self::from_storage(out)
    }

    /// Elements in exactly one of `self` and `other`.
    pub fn symmetric_difference(&self, other: &Self) -> Self
    where
        T: Clone,
    {
        let both = self.read_with(other);
        let (a, b) = both.sides();
        let mut out = HashSet::with_hasher(a.hasher().clone());
        out.extend(a.symmetric_difference(b).cloned());
        Self::from_storage(out)
    }

    /// True when every element of `self` is in `other`; vacuously true for
    /// an empty `self`.
    pub fn is_subset_of(&self, other: &Self) -> bool {
        let both = self.read_with(other);
        let (a, b) = both.sides();
        a.is_subset(b)
    }

    pub fn is_superset_of(&self, other: &Self) -> bool {
        let both = self.read_with(other);
        let (a, b) = both.sides();
        a.is_superset(b)
    }

    /// Same elements on both sides, checked under one acquisition of both
    /// locks.
    pub fn equal(&self, other: &Self) -> bool {
        let both = self.read_with(other);
        let (a, b) = both.sides();
        a.len() == b.len() && a.is_subset(b)
    }
}

impl<T, S> PartialEq for SafeSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher + Clone + Default,
{
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl<T, S> Eq for SafeSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher + Clone + Default,
{
}

impl<T, S> Clone for SafeSet<T, S>
where
    T: Clone,
    S: Clone,
{
    /// Deep copy with its own lock and identity.
    fn clone(&self) -> Self {
        Self {
            id: InstanceId::next(),
            items: RwLock::new(self.items.read().clone()),
        }
    }
}

impl<T, S> FromIterator<T> for SafeSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher + Clone + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut items = HashSet::with_hasher(S::default());
        items.extend(iter);
        Self::from_storage(items)
    }
}

impl<T, S> Extend<T> for SafeSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.get_mut().extend(iter);
    }
}

impl<T, S> fmt::Debug for SafeSet<T, S>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.items.read().iter()).finish()
    }
}

/// `{e1, e2, e3}` in unspecified order.
impl<T, S> fmt::Display for SafeSet<T, S>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items = self.items.read();
        f.write_str("{")?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", item)?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_with_check_reports_prior_presence() {
        let s = SafeSet::new();
        assert!(!s.add_with_check(7));
        assert!(s.add_with_check(7));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn operations_against_self() {
        let a = SafeSet::from_values([1, 2, 3]);
        assert!(a.is_subset_of(&a));
        assert!(a.equal(&a));
        assert_eq!(a.union(&a).len(), 3);
        assert!(a.difference(&a).is_empty());
        assert!(a.symmetric_difference(&a).is_empty());
    }

    #[test]
    fn clone_gets_a_fresh_identity() {
        let a = SafeSet::from_values(["x", "y"]);
        let b = a.clone();
        assert_ne!(a.id, b.id);
        assert!(a == b);
        b.add("z");
        assert!(!a.contains(&"z"));
    }

    #[test]
    fn display_formats_braces_and_separators() {
        let s: SafeSet<i32> = SafeSet::new();
        assert_eq!(s.to_string(), "{}");
        s.add(1);
        assert_eq!(s.to_string(), "{1}");
        s.add(2);
        let text = s.to_string();
        assert!(text == "{1, 2}" || text == "{2, 1}", "got {}", text);
    }
}
