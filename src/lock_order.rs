//! Instance identity and canonical lock ordering for two-container operations.
//!
//! Every container draws a process-unique `InstanceId` at construction.
//! Operations that need the locks of two containers acquire them in
//! ascending id order, whatever order the caller passed them in, so
//! `a.union(&b)` and `b.union(&a)` racing on two threads cannot deadlock.
//! When both operands are the same instance the lock is taken once.

use core::cmp::Ordering;
use core::ops::Deref;
use core::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of one container instance. Clones of a container get
/// fresh ids; the id never changes for the lifetime of an instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct InstanceId(u64);

impl InstanceId {
    pub(crate) fn next() -> Self {
        InstanceId(NEXT_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

/// Guards for the two operands of a binary operation.
pub(crate) enum Both<G> {
    /// Both operands are one instance, held through a single guard.
    Same(G),
    /// Distinct instances, stored as (left operand, right operand).
    Pair(G, G),
}

impl<G: Deref> Both<G> {
    /// Borrow the guarded data as `(left, right)` in call-argument order.
    pub(crate) fn sides(&self) -> (&G::Target, &G::Target) {
        match self {
            Both::Same(g) => (&**g, &**g),
            Both::Pair(l, r) => (&**l, &**r),
        }
    }
}

/// Lock `left` and `right` with `lock`, lowest id first.
pub(crate) fn lock_both<'a, L: ?Sized, G>(
    left: (InstanceId, &'a L),
    right: (InstanceId, &'a L),
    lock: impl Fn(&'a L) -> G,
) -> Both<G> {
    match left.0.cmp(&right.0) {
        Ordering::Equal => Both::Same(lock(left.1)),
        Ordering::Less => {
            let l = lock(left.1);
            let r = lock(right.1);
            Both::Pair(l, r)
        }
        Ordering::Greater => {
            let r = lock(right.1);
            let l = lock(left.1);
            Both::Pair(l, r)
        }
    }
}
