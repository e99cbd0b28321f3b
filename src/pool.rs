//! WorkerPool: fixed set of threads draining one `SyncQueue` of work items.
//!
//! Item states: Queued -> Running -> Completed. Pool states: Active ->
//! Stopping -> Stopped.
//!
//! Counters live under one pool mutex:
//! - `live`: workers that have not yet left their loop. Registered before
//!   any thread is spawned so `shutdown` never races a starting worker.
//! - `working`: workers currently executing an item.
//! - `outstanding`: items submitted and not yet finished or discarded
//!   (queued + running). `wait` sleeps on `task_finished` until it is zero.
//!
//! Each future carries its own mutex and `settled` condition. The state
//! flips under that mutex and waiters test it under the same lock, so a
//! completion cannot slip between a waiter's check and its sleep. Waiting
//! on a future never touches the pool, and a handle can be waited on from
//! anywhere.
//!
//! Operations are opaque: the pool never interprets a result. An operation
//! that panics is contained to its item; the worker logs it and keeps going,
//! and a future whose operation panicked resolves to `None`. The argument of
//! a panicking operation is dropped without its cleanup.

use crate::array_list::ArrayList;
use crate::dispose::{Dispose, DropValue};
use crate::error::Result;
use crate::sync_queue::SyncQueue;
use core::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

/// Worker pool settings.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of worker threads. Zero is treated as one.
    pub workers: usize,
    /// Upper bound on queued items. Submissions past it are refused.
    /// `None` leaves the queue unbounded.
    pub queue_capacity: Option<usize>,
    /// Worker threads are named `"{thread_name}-{index}"`.
    pub thread_name: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: thread::available_parallelism().map_or(1, |n| n.get()),
            queue_capacity: None,
            thread_name: "ownpool-worker".to_string(),
        }
    }
}

/// A unit of work with its argument already bound. `run` executes it and
/// then releases the argument; `discard` only releases the argument.
trait Job: Send {
    fn run(self: Box<Self>);
    fn discard(self: Box<Self>);
}

type BoxedJob = Box<dyn Job>;

/// Queue dispose for items that never reach a worker.
struct DiscardJob;

impl Dispose<BoxedJob> for DiscardJob {
    fn dispose(&self, job: BoxedJob) {
        job.discard();
    }
}

/// Joins a worker thread when its handle leaves the pool's handle list.
struct JoinWorker;

impl Dispose<JoinHandle<()>> for JoinWorker {
    fn dispose(&self, handle: JoinHandle<()>) {
        let name = handle.thread().name().unwrap_or("<unnamed>").to_string();
        if handle.join().is_err() {
            log::error!("worker thread {name} terminated by panic");
        }
    }
}

struct Task<A, F, C> {
    op: F,
    arg: A,
    cleanup: C,
}

impl<A, F, C> Job for Task<A, F, C>
where
    A: Send,
    F: FnOnce(&mut A) + Send,
    C: Dispose<A> + Send,
{
    fn run(self: Box<Self>) {
        let Task {
            op,
            mut arg,
            cleanup,
        } = *self;
        op(&mut arg);
        cleanup.dispose(arg);
    }

    fn discard(self: Box<Self>) {
        let Task { arg, cleanup, .. } = *self;
        cleanup.dispose(arg);
    }
}

const PENDING: u8 = 0;
const READY: u8 = 1;
const ABANDONED: u8 = 2;

struct FutureSlot<R> {
    state: AtomicU8,
    result: Mutex<Option<R>>,
    settled: Condvar,
}

impl<R> FutureSlot<R> {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(PENDING),
            result: Mutex::new(None),
            settled: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<R>> {
        self.result.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fulfil(&self, value: R) {
        let mut result = self.lock();
        *result = Some(value);
        self.state.store(READY, Ordering::Release);
        self.settled.notify_all();
    }

    fn abandon(&self) {
        let _guard = self.lock();
        if self
            .state
            .compare_exchange(PENDING, ABANDONED, Ordering::Release, Ordering::Relaxed)
            .is_ok()
        {
            self.settled.notify_all();
        }
    }

    fn is_settled(&self) -> bool {
        self.state.load(Ordering::Acquire) != PENDING
    }

    fn wait(&self) -> MutexGuard<'_, Option<R>> {
        let mut result = self.lock();
        while !self.is_settled() {
            result = self
                .settled
                .wait(result)
                .unwrap_or_else(PoisonError::into_inner);
        }
        result
    }
}

/// Abandons the slot if dropped before a result was stored: the item was
/// discarded or its operation unwound.
struct Completion<R>(Arc<FutureSlot<R>>);

impl<R> Drop for Completion<R> {
    fn drop(&mut self) {
        self.0.abandon();
    }
}

struct FutureTask<A, R, F, C> {
    op: F,
    arg: A,
    cleanup: C,
    completion: Completion<R>,
}

impl<A, R, F, C> Job for FutureTask<A, R, F, C>
where
    A: Send,
    R: Send,
    F: FnOnce(&mut A) -> R + Send,
    C: Dispose<A> + Send,
{
    fn run(self: Box<Self>) {
        let FutureTask {
            op,
            mut arg,
            cleanup,
            completion,
        } = *self;
        let result = op(&mut arg);
        cleanup.dispose(arg);
        completion.0.fulfil(result);
    }

    fn discard(self: Box<Self>) {
        let FutureTask { arg, cleanup, .. } = *self;
        cleanup.dispose(arg);
    }
}

/// Handle to the result of a `submit_future` item.
///
/// Move-only; `get` consumes it and releases the shared slot. The handle
/// does not borrow the pool and stays valid after the pool is gone.
pub struct FutureHandle<R> {
    slot: Arc<FutureSlot<R>>,
}

impl<R> FutureHandle<R> {
    /// True once the item has finished, whether or not it produced a value.
    pub fn is_completed(&self) -> bool {
        self.slot.is_settled()
    }

    /// Block until the item has finished, or was discarded.
    pub fn wait(&self) {
        drop(self.slot.wait());
    }

    /// Wait for the item and take its result. `None` if the operation
    /// panicked or the item was discarded before running.
    pub fn get(self) -> Option<R> {
        self.slot.wait().take()
    }
}

impl<R> fmt::Debug for FutureHandle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FutureHandle")
            .field("completed", &self.is_completed())
            .finish()
    }
}

#[derive(Debug, Default)]
struct Counters {
    live: usize,
    working: usize,
    outstanding: usize,
    stopping: bool,
}

struct Shared {
    queue: SyncQueue<BoxedJob, DiscardJob>,
    counters: Mutex<Counters>,
    worker_died: Condvar,
    task_finished: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_finished<'a>(&self, guard: MutexGuard<'a, Counters>) -> MutexGuard<'a, Counters> {
        self.task_finished
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn worker_loop(shared: Arc<Shared>, index: usize) {
    while let Some(job) = shared.queue.wait_dequeue() {
        shared.lock().working += 1;
        log::trace!("worker {index}: running item");
        if panic::catch_unwind(AssertUnwindSafe(|| job.run())).is_err() {
            log::error!("worker {index}: operation panicked; item abandoned");
        }
        let mut c = shared.lock();
        c.working -= 1;
        c.outstanding -= 1;
        shared.task_finished.notify_all();
    }
    let mut c = shared.lock();
    c.live -= 1;
    shared.worker_died.notify_all();
    log::trace!("worker {index}: exiting");
}

pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: ArrayList<JoinHandle<()>, JoinWorker>,
}

impl WorkerPool {
    /// Start `workers` threads with an unbounded queue.
    ///
    /// # Panics
    /// If the OS refuses to spawn a thread.
    pub fn new(workers: usize) -> Self {
        Self::with_config(PoolConfig {
            workers,
            ..PoolConfig::default()
        })
    }

    /// # Panics
    /// If the OS refuses to spawn a thread.
    pub fn with_config(config: PoolConfig) -> Self {
        let n = config.workers.max(1);
        let queue = match config.queue_capacity {
            Some(max) => SyncQueue::bounded_with_dispose(max, DiscardJob),
            None => SyncQueue::with_dispose(DiscardJob),
        };
        let shared = Arc::new(Shared {
            queue,
            counters: Mutex::new(Counters {
                live: n,
                ..Counters::default()
            }),
            worker_died: Condvar::new(),
            task_finished: Condvar::new(),
        });

        let mut workers = ArrayList::fixed_with_dispose(n, JoinWorker);
        for index in 0..n {
            let shared = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name(format!("{}-{index}", config.thread_name))
                .spawn(move || worker_loop(shared, index))
                .expect("failed to spawn worker thread");
            workers
                .add(handle)
                .expect("handle list is sized to the worker count");
        }
        log::debug!(
            "worker pool started: {n} workers, queue capacity {:?}",
            config.queue_capacity
        );
        Self { shared, workers }
    }

    /// Number of worker threads the pool was started with.
    pub fn workers(&self) -> usize {
        self.workers.capacity()
    }
    pub fn live_workers(&self) -> usize {
        self.shared.lock().live
    }
    pub fn busy_workers(&self) -> usize {
        self.shared.lock().working
    }
    /// Items waiting in the queue (not yet picked up by a worker).
    pub fn pending(&self) -> usize {
        self.shared.queue.len()
    }
    /// Items queued or running.
    pub fn outstanding(&self) -> usize {
        self.shared.lock().outstanding
    }

    fn submit(&self, job: BoxedJob) -> Result<()> {
        self.shared.lock().outstanding += 1;
        if let Err(rejected) = self.shared.queue.enqueue(job) {
            self.shared.lock().outstanding -= 1;
            self.shared.task_finished.notify_all();
            let (error, job) = rejected.into_parts();
            job.discard();
            return Err(error);
        }
        Ok(())
    }

    /// Queue `op(&mut arg)` for execution; `cleanup` receives `arg` once the
    /// operation returns. Use `DropValue` when no cleanup is needed.
    ///
    /// On refusal (bounded queue full) `cleanup` has already run on `arg`.
    pub fn submit_fire_and_forget<A, F, C>(&self, op: F, arg: A, cleanup: C) -> Result<()>
    where
        A: Send + 'static,
        F: FnOnce(&mut A) + Send + 'static,
        C: Dispose<A> + Send + 'static,
    {
        self.submit(Box::new(Task { op, arg, cleanup }))
    }

    /// Like `submit_fire_and_forget`, but the operation's return value is
    /// published through the returned handle.
    pub fn submit_future<A, R, F, C>(
        &self,
        op: F,
        arg: A,
        cleanup: C,
    ) -> Result<FutureHandle<R>>
    where
        A: Send + 'static,
        R: Send + 'static,
        F: FnOnce(&mut A) -> R + Send + 'static,
        C: Dispose<A> + Send + 'static,
    {
        let slot = Arc::new(FutureSlot::new());
        self.submit(Box::new(FutureTask {
            op,
            arg,
            cleanup,
            completion: Completion(Arc::clone(&slot)),
        }))?;
        Ok(FutureHandle { slot })
    }

    /// Queue a closure with no argument.
    pub fn execute<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit_fire_and_forget(move |_: &mut ()| f(), (), DropValue)
    }

    /// Queue a closure with no argument and return a handle to its result.
    pub fn spawn<R, F>(&self, f: F) -> Result<FutureHandle<R>>
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        self.submit_future(move |_: &mut ()| f(), (), DropValue)
    }

    /// Block until every submitted item, queued or running, has finished.
    pub fn wait(&self) {
        let mut c = self.shared.lock();
        while c.outstanding > 0 {
            c = self.shared.wait_finished(c);
        }
    }

    /// Block until `handle`'s item has finished. Does not consume it.
    pub fn wait_future<R>(&self, handle: &FutureHandle<R>) {
        handle.wait();
    }

    /// Block until every handle's item has finished.
    pub fn wait_futures<R>(&self, handles: &[FutureHandle<R>]) {
        for h in handles {
            h.wait();
        }
    }

    /// Wait for the item and take its result, releasing the handle.
    /// `None` if the operation panicked.
    pub fn get<R>(&self, handle: FutureHandle<R>) -> Option<R> {
        handle.get()
    }

    /// Stop accepting work, discard queued items (their cleanup runs, their
    /// operation does not), wait for running items and join every worker.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        {
            let mut c = self.shared.lock();
            if c.stopping {
                return;
            }
            c.stopping = true;
        }
        log::debug!("worker pool stopping");
        let discarded = self.shared.queue.close();
        let mut c = self.shared.lock();
        c.outstanding -= discarded;
        while c.live > 0 {
            c = self
                .shared
                .worker_died
                .wait(c)
                .unwrap_or_else(PoisonError::into_inner);
        }
        drop(c);
        self.workers.clear();
        log::debug!("worker pool stopped; {discarded} queued items discarded");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.shared.lock();
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers.capacity())
            .field("live", &c.live)
            .field("working", &c.working)
            .field("outstanding", &c.outstanding)
            .field("stopping", &c.stopping)
            .finish()
    }
}
