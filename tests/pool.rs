use ownpool::{DropValue, PoolConfig, WorkerPool};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Barrier, Mutex};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn count_to(workers: usize, k: usize) -> usize {
    let pool = WorkerPool::new(workers);
    let counter = Arc::new(Mutex::new(0usize));
    for _ in 0..k {
        pool.submit_fire_and_forget(
            |c: &mut Arc<Mutex<usize>>| *c.lock().unwrap() += 1,
            Arc::clone(&counter),
            DropValue,
        )
        .expect("unbounded pool accepts work");
    }
    pool.wait();
    let total = *counter.lock().unwrap();
    pool.shutdown();
    total
}

#[test]
fn fire_and_forget_counter_for_each_pool_size() {
    init_logging();
    for workers in [1, 4, 16] {
        assert_eq!(count_to(workers, 1000), 1000, "pool of {workers}");
    }
}

#[test]
fn two_workers_five_items_each_index_once() {
    init_logging();
    let pool = WorkerPool::new(2);
    let seen = Arc::new(Mutex::new(Vec::new()));
    for i in 0..5usize {
        let seen = Arc::clone(&seen);
        pool.submit_fire_and_forget(
            move |idx: &mut usize| seen.lock().unwrap().push(*idx),
            i,
            DropValue,
        )
        .unwrap();
    }
    pool.wait();
    let mut got = seen.lock().unwrap().clone();
    got.sort_unstable();
    assert_eq!(got, vec![0, 1, 2, 3, 4]);
}

#[test]
fn future_get_returns_op_value() {
    init_logging();
    let pool = WorkerPool::new(4);
    let h = pool
        .submit_future(|n: &mut u64| (1..=*n).product::<u64>(), 10, DropValue)
        .unwrap();
    assert_eq!(pool.get(h), Some(3_628_800));
}

#[test]
fn wait_futures_returns_after_all_complete() {
    init_logging();
    let pool = WorkerPool::new(3);
    let handles: Vec<_> = (0..20u32)
        .map(|i| pool.submit_future(move |_: &mut ()| i * i, (), DropValue).unwrap())
        .collect();
    pool.wait_futures(&handles);
    assert!(handles.iter().all(|h| h.is_completed()));
    let results: Vec<_> = handles.into_iter().map(|h| pool.get(h)).collect();
    assert_eq!(
        results,
        (0..20u32).map(|i| Some(i * i)).collect::<Vec<_>>()
    );
}

#[test]
fn wait_future_does_not_consume() {
    init_logging();
    let pool = WorkerPool::new(1);
    let h = pool.spawn(|| "done").unwrap();
    pool.wait_future(&h);
    pool.wait_future(&h);
    assert!(h.is_completed());
    assert_eq!(pool.get(h), Some("done"));
}

#[test]
fn wait_covers_queued_and_running_items() {
    init_logging();
    let pool = WorkerPool::new(2);
    let finished = Arc::new(AtomicUsize::new(0));
    for _ in 0..50 {
        let finished = Arc::clone(&finished);
        pool.execute(move || {
            std::thread::yield_now();
            finished.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }
    pool.wait();
    assert_eq!(finished.load(Ordering::SeqCst), 50);
    assert_eq!(pool.outstanding(), 0);
    assert_eq!(pool.pending(), 0);
}

#[test]
fn shutdown_discards_queued_items_running_cleanup_once() {
    init_logging();
    const WORKERS: usize = 2;
    const QUEUED: usize = 8;

    let pool = WorkerPool::new(WORKERS);
    // Park every worker inside an item so later submissions stay queued.
    let parked = Arc::new(Barrier::new(WORKERS + 1));
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let release_rx = Arc::new(Mutex::new(release_rx));
    for _ in 0..WORKERS {
        let parked = Arc::clone(&parked);
        let release_rx = Arc::clone(&release_rx);
        pool.execute(move || {
            parked.wait();
            release_rx.lock().unwrap().recv().unwrap();
        })
        .unwrap();
    }
    parked.wait();
    assert_eq!(pool.busy_workers(), WORKERS);

    // The last queued item's cleanup runs while shutdown drains the queue;
    // only then are the parked workers let go.
    let executed = Arc::new(AtomicUsize::new(0));
    let cleaned = Arc::new(AtomicUsize::new(0));
    for _ in 0..QUEUED {
        let executed = Arc::clone(&executed);
        let cleaned = Arc::clone(&cleaned);
        let release_tx = release_tx.clone();
        pool.submit_fire_and_forget(
            move |_: &mut ()| {
                executed.fetch_add(1, Ordering::SeqCst);
            },
            (),
            move |_: ()| {
                if cleaned.fetch_add(1, Ordering::SeqCst) + 1 == QUEUED {
                    for _ in 0..WORKERS {
                        release_tx.send(()).unwrap();
                    }
                }
            },
        )
        .unwrap();
    }
    drop(release_tx);
    assert_eq!(pool.pending(), QUEUED);

    pool.shutdown();

    assert_eq!(executed.load(Ordering::SeqCst), 0);
    assert_eq!(cleaned.load(Ordering::SeqCst), QUEUED);
}

#[test]
fn future_queued_at_shutdown_is_cleaned_and_never_run() {
    init_logging();
    let pool = WorkerPool::new(1);
    let parked = Arc::new(Barrier::new(2));
    let (release_tx, release_rx) = mpsc::channel::<()>();
    {
        let parked = Arc::clone(&parked);
        pool.execute(move || {
            parked.wait();
            release_rx.recv().unwrap();
        })
        .unwrap();
    }
    parked.wait();

    let executed = Arc::new(AtomicUsize::new(0));
    let cleaned = Arc::new(AtomicUsize::new(0));
    let handle = {
        let executed = Arc::clone(&executed);
        let cleaned = Arc::clone(&cleaned);
        pool.submit_future(
            move |n: &mut u32| {
                executed.fetch_add(1, Ordering::SeqCst);
                *n
            },
            5,
            move |_: u32| {
                cleaned.fetch_add(1, Ordering::SeqCst);
                release_tx.send(()).unwrap();
            },
        )
        .unwrap()
    };
    assert_eq!(pool.pending(), 1);
    assert!(!handle.is_completed());

    pool.shutdown();

    assert_eq!(executed.load(Ordering::SeqCst), 0);
    assert_eq!(cleaned.load(Ordering::SeqCst), 1);
    assert!(handle.is_completed());
    assert_eq!(handle.get(), None);
}

#[test]
fn future_from_one_pool_is_awaited_through_another() {
    init_logging();
    let producer = WorkerPool::new(1);
    let consumer = WorkerPool::new(1);
    let (go_tx, go_rx) = mpsc::channel::<u32>();
    let handle = producer
        .submit_future(
            move |base: &mut u32| *base + go_rx.recv().unwrap(),
            40,
            DropValue,
        )
        .unwrap();

    // The result arrives only after the consumer is already waiting.
    let sender = std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(20));
        go_tx.send(2).unwrap();
    });
    consumer.wait_future(&handle);
    consumer.wait_futures(std::slice::from_ref(&handle));
    sender.join().unwrap();

    producer.shutdown();
    assert_eq!(consumer.get(handle), Some(42));
    consumer.shutdown();
}

#[test]
fn config_names_worker_threads() {
    init_logging();
    let pool = WorkerPool::with_config(PoolConfig {
        workers: 2,
        thread_name: "named".to_string(),
        ..PoolConfig::default()
    });
    let h = pool
        .spawn(|| std::thread::current().name().map(str::to_string))
        .unwrap();
    let name = pool.get(h).flatten().expect("worker threads are named");
    assert!(name.starts_with("named-"), "{name}");
}
