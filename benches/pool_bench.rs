use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ownpool::{DropValue, SyncQueue, WorkerPool};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const ITEMS: u64 = 1_000;

fn bench_fire_and_forget(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_fire_and_forget_1k");
    for workers in [1usize, 4, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &w| {
            let pool = WorkerPool::new(w);
            let sum = Arc::new(AtomicU64::new(0));
            b.iter(|| {
                for i in 0..ITEMS {
                    pool.submit_fire_and_forget(
                        |(s, i): &mut (Arc<AtomicU64>, u64)| {
                            s.fetch_add(*i, Ordering::Relaxed);
                        },
                        (Arc::clone(&sum), i),
                        DropValue,
                    )
                    .unwrap();
                }
                pool.wait();
            });
            black_box(sum.load(Ordering::Relaxed));
            pool.shutdown();
        });
    }
    group.finish();
}

fn bench_futures(c: &mut Criterion) {
    c.bench_function("pool_futures_1k_4_workers", |b| {
        let pool = WorkerPool::new(4);
        b.iter(|| {
            let handles: Vec<_> = (0..ITEMS)
                .map(|i| pool.submit_future(|n: &mut u64| *n * 2, i, DropValue).unwrap())
                .collect();
            pool.wait_futures(&handles);
            let total: u64 = handles.into_iter().filter_map(|h| pool.get(h)).sum();
            black_box(total)
        });
    });
}

fn bench_sync_queue_handoff(c: &mut Criterion) {
    c.bench_function("sync_queue_handoff_1k", |b| {
        b.iter(|| {
            let q = Arc::new(SyncQueue::new());
            let consumer = {
                let q = Arc::clone(&q);
                thread::spawn(move || {
                    let mut n = 0u64;
                    while n < ITEMS {
                        if let Some(v) = q.wait_dequeue() {
                            black_box(v);
                            n += 1;
                        }
                    }
                })
            };
            for i in 0..ITEMS {
                q.enqueue(i).unwrap();
            }
            consumer.join().unwrap();
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(30)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_fire_and_forget, bench_futures, bench_sync_queue_handoff
}
criterion_main!(benches);
