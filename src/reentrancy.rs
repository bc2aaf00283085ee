//! Debug-only reentrancy detector for lock-holding callbacks.
//!
//! `SafeSlice` runs caller closures (map, filter, sort comparators, ...)
//! while its mutex is held. A closure that calls back into the same slice
//! would block on that mutex forever. In debug builds the tracker records
//! which thread holds the lock and panics on a nested entry from that
//! thread instead of deadlocking. In release builds this compiles to a
//! zero-cost no-op.

#[cfg(not(debug_assertions))]
use core::marker::PhantomData;
#[cfg(debug_assertions)]
use core::sync::atomic::{AtomicU64, Ordering};

#[cfg(debug_assertions)]
fn current_thread_token() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    std::thread_local! {
        static TOKEN: u64 = NEXT.fetch_add(1, Ordering::Relaxed);
    }
    TOKEN.with(|t| *t)
}

/// Per-instance reentrancy tracker. Call `check` before blocking on the
/// lock and `enter` once it is held.
#[derive(Debug)]
pub(crate) struct DebugReentrancy {
    // Token of the thread holding the lock, 0 when free.
    #[cfg(debug_assertions)]
    holder: AtomicU64,
}

impl DebugReentrancy {
    /// Const so it can be a field default.
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            holder: AtomicU64::new(0),
        }
    }

    /// Panics in debug builds if the calling thread already holds the lock.
    #[inline]
    pub(crate) fn check(&self) {
        #[cfg(debug_assertions)]
        {
            // Only this thread ever stores its own token, so a relaxed load
            // cannot observe it spuriously.
            assert!(
                self.holder.load(Ordering::Relaxed) != current_thread_token(),
                "reentrancy detected: callback re-entered the container it was called from"
            );
        }
    }

    /// Mark the lock as held by the calling thread until the guard drops.
    #[inline]
    pub(crate) fn enter(&self) -> ReentrancyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            self.holder.store(current_thread_token(), Ordering::Relaxed);
            ReentrancyGuard { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            ReentrancyGuard { _z: PhantomData }
        }
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard returned by `DebugReentrancy::enter`. Must be dropped before
/// the lock it shadows is released.
pub(crate) struct ReentrancyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl<'a> Drop for ReentrancyGuard<'a> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            self.owner.holder.store(0, Ordering::Relaxed);
        }
    }
}
