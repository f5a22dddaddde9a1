use std::collections::HashMap;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use ordkit::map::ordered_hash_map::OrderedHashMap;
use ordkit::policy::MaxEntries;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn filled(access_order: bool) -> OrderedHashMap<u64, u64> {
    let mut map = OrderedHashMap::with_access_order(1024, access_order);
    for i in 0..1024u64 {
        map.insert(i, i).unwrap();
    }
    map
}

fn bench_insert_get(c: &mut Criterion) {
    c.bench_function("ohm_insert_get", |b| {
        b.iter_batched(
            || filled(false),
            |mut map| {
                for i in 0..1024u64 {
                    map.insert(std::hint::black_box(i + 10_000), i).unwrap();
                    let _ = std::hint::black_box(map.get(&std::hint::black_box(i)));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_access_order_get(c: &mut Criterion) {
    c.bench_function("ohm_access_order_get", |b| {
        b.iter_batched(
            || filled(true),
            |mut map| {
                for i in (0..1024u64).rev() {
                    let _ = std::hint::black_box(map.get(&std::hint::black_box(i)));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_lru_churn(c: &mut Criterion) {
    c.bench_function("ohm_lru_churn", |b| {
        b.iter_batched(
            || {
                let mut map = OrderedHashMap::builder()
                    .access_order(true)
                    .eviction(MaxEntries::new(1024))
                    .build();
                for i in 0..1024u64 {
                    map.insert(i, i).unwrap();
                }
                map
            },
            |mut map| {
                for i in 0..4096u64 {
                    map.insert(std::hint::black_box(10_000 + i), i).unwrap();
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_random_mix_vs_std(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let keys: Vec<u64> = (0..8192).map(|_| rng.random_range(0..2048)).collect();

    let mut group = c.benchmark_group("random_mix");
    group.bench_function("ordered_hash_map", |b| {
        b.iter(|| {
            let mut map = OrderedHashMap::new();
            for (i, &k) in keys.iter().enumerate() {
                if i % 3 == 0 {
                    map.remove(&k);
                } else {
                    map.insert(k, i).unwrap();
                }
            }
            std::hint::black_box(map.len())
        })
    });
    group.bench_function("std_hash_map", |b| {
        b.iter(|| {
            let mut map = HashMap::new();
            for (i, &k) in keys.iter().enumerate() {
                if i % 3 == 0 {
                    map.remove(&k);
                } else {
                    map.insert(k, i);
                }
            }
            std::hint::black_box(map.len())
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_insert_get,
    bench_access_order_get,
    bench_lru_churn,
    bench_random_mix_vs_std
);
criterion_main!(benches);
