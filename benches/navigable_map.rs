use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Included};

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use ordkit::map::navigable::NavigableMap;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

fn shuffled(n: u64) -> Vec<u64> {
    let mut keys: Vec<u64> = (0..n).collect();
    keys.shuffle(&mut StdRng::seed_from_u64(7));
    keys
}

fn bench_insert(c: &mut Criterion) {
    let keys = shuffled(4096);
    let mut group = c.benchmark_group("sorted_insert");
    group.bench_function("navigable_map", |b| {
        b.iter(|| {
            let mut map = NavigableMap::new();
            for &k in &keys {
                map.insert(k, k).unwrap();
            }
            std::hint::black_box(map.len())
        })
    });
    group.bench_function("btree_map", |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &k in &keys {
                map.insert(k, k);
            }
            std::hint::black_box(map.len())
        })
    });
    group.finish();
}

fn bench_floor_ceiling(c: &mut Criterion) {
    let map: NavigableMap<u64, u64> = (0..4096u64).map(|k| (k * 2, k)).collect();
    c.bench_function("navigable_floor_ceiling", |b| {
        b.iter(|| {
            for probe in (0..8192u64).step_by(3) {
                let _ = std::hint::black_box(map.floor_key(&probe));
                let _ = std::hint::black_box(map.ceiling_key(&probe));
            }
        })
    });
}

fn bench_range_scan(c: &mut Criterion) {
    let map: NavigableMap<u64, u64> = (0..4096u64).map(|k| (k, k)).collect();
    c.bench_function("navigable_range_scan", |b| {
        b.iter(|| {
            let sum: u64 = map
                .range(Included(&1000), Excluded(&3000))
                .unwrap()
                .map(|(_, v)| *v)
                .sum();
            std::hint::black_box(sum)
        })
    });
}

fn bench_pop_first(c: &mut Criterion) {
    c.bench_function("navigable_pop_first", |b| {
        b.iter_batched(
            || (0..1024u64).map(|k| (k, k)).collect::<NavigableMap<_, _>>(),
            |mut map| {
                while let Some(entry) = map.pop_first() {
                    std::hint::black_box(entry);
                }
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_insert,
    bench_floor_ceiling,
    bench_range_scan,
    bench_pop_first
);
criterion_main!(benches);
