use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use safe_collections::{SafeMap, SafeSet, SafeSlice};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn bench_map_set(c: &mut Criterion) {
    c.bench_function("safe_map_set_10k", |b| {
        b.iter_batched(
            SafeMap::<String, u64>::new,
            |m| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    m.set(key(x), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_map_get_hit(c: &mut Criterion) {
    c.bench_function("safe_map_get_hit", |b| {
        let m = SafeMap::new();
        let keys: Vec<_> = lcg(7).take(20_000).map(key).collect();
        for (i, k) in keys.iter().enumerate() {
            m.set(k.clone(), i as u64);
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(m.get(k));
        })
    });
}

fn bench_map_get_contended(c: &mut Criterion) {
    c.bench_function("safe_map_get_4_readers", |b| {
        let m = Arc::new(SafeMap::new());
        let keys: Vec<_> = lcg(13).take(1_000).map(key).collect();
        for (i, k) in keys.iter().enumerate() {
            m.set(k.clone(), i as u64);
        }
        let keys = Arc::new(keys);
        b.iter(|| {
            let readers: Vec<_> = (0..4)
                .map(|_| {
                    let m = Arc::clone(&m);
                    let keys = Arc::clone(&keys);
                    thread::spawn(move || {
                        for k in keys.iter() {
                            black_box(m.get(k));
                        }
                    })
                })
                .collect();
            for r in readers {
                r.join().unwrap();
            }
        })
    });
}

fn bench_set_union(c: &mut Criterion) {
    c.bench_function("safe_set_union_10k", |b| {
        let a = SafeSet::from_values(lcg(3).take(10_000));
        let s = SafeSet::from_values(lcg(5).take(10_000));
        b.iter(|| black_box(a.union(&s)))
    });
}

fn bench_slice_push_filter(c: &mut Criterion) {
    c.bench_function("safe_slice_push_then_filter_10k", |b| {
        b.iter_batched(
            SafeSlice::<u64>::new,
            |s| {
                for x in lcg(9).take(10_000) {
                    s.push(x);
                }
                black_box(s.filter(|x| x % 3 == 0))
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_slice_sort(c: &mut Criterion) {
    c.bench_function("safe_slice_sort_by_10k", |b| {
        let data: Vec<u64> = lcg(17).take(10_000).collect();
        b.iter_batched(
            || SafeSlice::from(data.clone()),
            |s| {
                s.sort_by(|a, b| a < b);
                black_box(s)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_map_set, bench_map_get_hit, bench_map_get_contended, bench_set_union, bench_slice_push_filter, bench_slice_sort
}
criterion_main!(benches);
