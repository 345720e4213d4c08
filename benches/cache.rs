//! BoundedCache operation benchmarks.
//!
//! Run with: `cargo bench --bench cache`

use std::hint::black_box;
use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use hotpath::builder::CacheBuilder;
use hotpath::cache::BoundedCache;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CAPACITY: usize = 16_384;
const OPS: u64 = 100_000;

fn filled(capacity: usize) -> BoundedCache<u64, u64> {
    let mut cache = BoundedCache::new(capacity).unwrap();
    for i in 0..capacity as u64 {
        cache.set(i, i);
    }
    cache
}

// ============================================================================
// Point operations
// ============================================================================

fn bench_get_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_get_hit");
    group.throughput(Throughput::Elements(OPS));
    group.bench_function("lru", |b| {
        b.iter_custom(|iters| {
            let mut cache = filled(CAPACITY);
            let start = Instant::now();
            for _ in 0..iters {
                for i in 0..OPS {
                    black_box(cache.get(&(i % CAPACITY as u64)));
                }
            }
            start.elapsed()
        })
    });
    group.finish();
}

fn bench_set_evicting(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_set_evicting");
    group.throughput(Throughput::Elements(OPS));
    group.bench_function("lru", |b| {
        b.iter_batched(
            || filled(CAPACITY),
            |mut cache| {
                for i in 0..OPS {
                    cache.set(CAPACITY as u64 + i, i);
                }
                cache
            },
            BatchSize::SmallInput,
        )
    });
    group.bench_function("lru_with_budget", |b| {
        b.iter_batched(
            || {
                CacheBuilder::new(CAPACITY)
                    .max_memory(CAPACITY * 8)
                    .size_calculator(|_: &u64, v: &Vec<u8>| v.len())
                    .build()
                    .unwrap()
            },
            |mut cache| {
                for i in 0..OPS {
                    cache.set(i, vec![0u8; (i % 32) as usize]);
                }
                cache
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

// ============================================================================
// Mixed workload
// ============================================================================

fn bench_zipf_like_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_mixed");
    group.throughput(Throughput::Elements(OPS));
    group.bench_function("80_20_get_set", |b| {
        b.iter_batched(
            || {
                let mut rng = StdRng::seed_from_u64(42);
                let keys: Vec<u64> = (0..OPS)
                    .map(|_| {
                        if rng.gen_bool(0.8) {
                            rng.gen_range(0..CAPACITY as u64 / 5)
                        } else {
                            rng.gen_range(0..CAPACITY as u64 * 4)
                        }
                    })
                    .collect();
                (filled(CAPACITY), keys)
            },
            |(mut cache, keys)| {
                for key in keys {
                    if cache.get(&key).is_none() {
                        cache.set(key, key);
                    }
                }
                black_box(cache.hit_rate())
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

// ============================================================================
// Maintenance
// ============================================================================

fn bench_prune(c: &mut Criterion) {
    c.bench_function("cache_prune_half_expired", |b| {
        b.iter_batched(
            || {
                let clock = hotpath::clock::ManualClock::new(0);
                let mut cache = CacheBuilder::new(CAPACITY)
                    .ttl(Duration::from_millis(100))
                    .clock(clock.clone())
                    .build()
                    .unwrap();
                for i in 0..CAPACITY as u64 {
                    if i == CAPACITY as u64 / 2 {
                        clock.advance(Duration::from_millis(50));
                    }
                    cache.set(i, i);
                }
                clock.advance(Duration::from_millis(60));
                cache
            },
            |mut cache| black_box(cache.prune()),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_get_hit,
    bench_set_evicting,
    bench_zipf_like_mix,
    bench_prune
);
criterion_main!(benches);
