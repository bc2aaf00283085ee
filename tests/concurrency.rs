// Multi-thread stress tests.
//
// Each test shares one container across threads through an Arc, releases
// the workers together with a Barrier, joins them, then checks that the
// final contents equal the net effect of every operation (no lost
// updates, no torn state).
use safe_collections::{SafeMap, SafeSet, SafeSlice, SafeSliceComparable};
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;
const OPS: usize = 1_000;

// Test: concurrent add/remove on a shared set.
// Assumes: each thread owns a disjoint key range.
// Verifies: adds all land; removing every odd key leaves exactly the evens.
#[test]
fn set_add_remove_net_effect() {
    let set = Arc::new(SafeSet::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            let set = Arc::clone(&set);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let base = t * OPS;
                for i in base..base + OPS {
                    set.add(i);
                }
                for i in (base..base + OPS).filter(|i| i % 2 == 1) {
                    set.remove(&i);
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    assert_eq!(set.len(), THREADS * OPS / 2);
    assert!(set.to_vec().iter().all(|i| i % 2 == 0));
}

// Test: shared keys hammered by every thread.
// Verifies: add_with_check reports "new" exactly once per element overall.
#[test]
fn set_add_with_check_is_atomic() {
    let set = Arc::new(SafeSet::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let set = Arc::clone(&set);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..OPS).filter(|i| !set.add_with_check(*i)).count()
            })
        })
        .collect();
    let fresh: usize = workers.into_iter().map(|w| w.join().unwrap()).sum();

    assert_eq!(fresh, OPS);
    assert_eq!(set.len(), OPS);
}

// Test: opposite-order binary operations.
// Verifies: a.union(b) racing b.union(a) (and the other set operations)
// completes instead of deadlocking while writers also hold the locks.
#[test]
fn set_binary_operations_in_opposite_orders() {
    let a = Arc::new(SafeSet::from_values(0..100));
    let b = Arc::new(SafeSet::from_values(50..150));
    let barrier = Arc::new(Barrier::new(4));

    let workers: Vec<_> = (0..4)
        .map(|t| {
            let (x, y) = if t % 2 == 0 {
                (Arc::clone(&a), Arc::clone(&b))
            } else {
                (Arc::clone(&b), Arc::clone(&a))
            };
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..OPS {
                    assert_eq!(x.union(&y).len(), 150);
                    assert_eq!(x.intersection(&y).len(), 50);
                    assert!(!x.is_subset_of(&y));
                    // Re-add a shared element: takes the write lock, contents unchanged.
                    x.add(50 + i % 50);
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }
}

#[test]
fn map_set_nx_single_winner() {
    let map = Arc::new(SafeMap::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            let map = Arc::clone(&map);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..OPS).filter(|k| map.set_nx(*k, t)).count()
            })
        })
        .collect();
    let won: usize = workers.into_iter().map(|w| w.join().unwrap()).sum();

    assert_eq!(won, OPS);
    assert_eq!(map.len(), OPS);
}

#[test]
fn slice_concurrent_push_and_insert() {
    let slice = Arc::new(SafeSlice::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            let slice = Arc::clone(&slice);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..OPS {
                    slice.push(t * OPS + i);
                    if i % 4 == 0 {
                        slice.insert(0, usize::MAX);
                    }
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    let extra = THREADS * OPS / 4;
    assert_eq!(slice.len(), THREADS * OPS + extra);
    slice.remove_if(|x| *x == usize::MAX);
    let mut values = slice.export();
    values.sort_unstable();
    assert_eq!(values, (0..THREADS * OPS).collect::<Vec<_>>());
}

// Test: opposite-order slice equality checks.
// Verifies: equality against each other from two threads does not deadlock.
#[test]
fn slice_equal_in_opposite_orders() {
    let a = Arc::new(SafeSliceComparable::from((0..64).collect::<Vec<i32>>()));
    let b = Arc::new(SafeSliceComparable::from((0..64).collect::<Vec<i32>>()));
    let barrier = Arc::new(Barrier::new(2));

    let workers: Vec<_> = (0..2)
        .map(|t| {
            let (x, y) = if t == 0 {
                (Arc::clone(&a), Arc::clone(&b))
            } else {
                (Arc::clone(&b), Arc::clone(&a))
            };
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..OPS {
                    assert!(x.equal(y.as_safe_slice()));
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }
}
