use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use flightcache_core::{Cache, FifoCache, LruCache, TtlFifoCache};
use std::hint::black_box;
use std::thread;
use std::time::Duration;

fn bench_insert_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_sequential");

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("FIFO", size), size, |b, &size| {
            b.iter(|| {
                let cache: FifoCache<usize, usize, ()> = FifoCache::new(size);
                for i in 0..size {
                    cache.add(i, black_box(i));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("LRU", size), size, |b, &size| {
            b.iter(|| {
                let cache: LruCache<usize, usize, ()> = LruCache::new(size);
                for i in 0..size {
                    cache.add(i, black_box(i));
                }
            });
        });
    }

    group.finish();
}

fn bench_get_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_sequential");

    for size in [10, 100, 1000].iter() {
        let fifo: FifoCache<usize, usize, ()> = FifoCache::new(*size);
        let lru: LruCache<usize, usize, ()> = LruCache::new(*size);
        for i in 0..*size {
            fifo.add(i, i);
            lru.add(i, i);
        }

        group.bench_with_input(BenchmarkId::new("FIFO", size), size, |b, &size| {
            b.iter(|| {
                for i in 0..size {
                    black_box(fifo.get(&i));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("LRU", size), size, |b, &size| {
            b.iter(|| {
                for i in 0..size {
                    black_box(lru.get(&i));
                }
            });
        });
    }

    group.finish();
}

fn bench_random_workload(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_get_or_add");
    const CAPACITY: usize = 256;
    const KEY_SPACE: usize = 1024;

    group.bench_function("FIFO", |b| {
        let cache: FifoCache<usize, usize, ()> = FifoCache::new(CAPACITY);
        let mut rng = fastrand::Rng::with_seed(7);
        b.iter(|| {
            let key = rng.usize(..KEY_SPACE);
            black_box(cache.get_or_add(key, move || Ok(key * 2)))
        });
    });

    group.bench_function("LRU", |b| {
        let cache: LruCache<usize, usize, ()> = LruCache::new(CAPACITY);
        let mut rng = fastrand::Rng::with_seed(7);
        b.iter(|| {
            let key = rng.usize(..KEY_SPACE);
            black_box(cache.get_or_add(key, move || Ok(key * 2)))
        });
    });

    group.finish();
}

fn bench_concurrent_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_reads");

    for num_threads in [2, 4, 8].iter() {
        let fifo: FifoCache<usize, usize, ()> = FifoCache::new(1000);
        let lru: LruCache<usize, usize, ()> = LruCache::new(1000);
        for i in 0..1000 {
            fifo.add(i, i);
            lru.add(i, i);
        }

        group.bench_with_input(
            BenchmarkId::new("FIFO", num_threads),
            num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    let handles: Vec<_> = (0..num_threads)
                        .map(|_| {
                            let cache = fifo.clone();
                            thread::spawn(move || {
                                for i in 0..100 {
                                    black_box(cache.get(&i));
                                }
                            })
                        })
                        .collect();
                    for handle in handles {
                        let _ = handle.join();
                    }
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("LRU", num_threads),
            num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    let handles: Vec<_> = (0..num_threads)
                        .map(|_| {
                            let cache = lru.clone();
                            thread::spawn(move || {
                                for i in 0..100 {
                                    black_box(cache.get(&i));
                                }
                            })
                        })
                        .collect();
                    for handle in handles {
                        let _ = handle.join();
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_ttl_expiry_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("ttl_expiry_sweep");

    for size in [100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("FIFO", size), size, |b, &size| {
            b.iter(|| {
                let cache: TtlFifoCache<usize, usize, ()> =
                    TtlFifoCache::new(size, Duration::ZERO);
                for i in 0..size {
                    cache.add(i, i);
                }
                black_box(cache.remove_expired())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_sequential,
    bench_get_sequential,
    bench_random_workload,
    bench_concurrent_reads,
    bench_ttl_expiry_sweep
);
criterion_main!(benches);
