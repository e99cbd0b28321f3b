//! SyncQueue: blocking FIFO shared between threads.
//!
//! State machine: Running -> Draining -> Closed.
//! - Running: `enqueue` pushes and wakes one sleeper; `wait_dequeue` sleeps
//!   on `item_available` while the queue is empty.
//! - Draining (`close`): the stop flag is set under the lock, every sleeper
//!   is woken, and the closing thread waits on `waiters_drained` until the
//!   blocked-consumer count reaches zero.
//! - Closed: items still queued are disposed; `enqueue` is refused and
//!   `wait_dequeue` returns `None` without sleeping.
//!
//! The stop flag is read only while holding the lock that sets it, and a
//! waiter checks it before every sleep, so a close can never be missed.
//!
//! The disposer lives outside the mutex. `close` and `clear` detach the
//! pending items under the lock and dispose them after releasing it, so a
//! disposer may call back into the same queue.

use crate::dispose::{Dispose, DropValue};
use crate::error::{Error, Rejected};
use crate::queue::Queue;
use core::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

struct State<T> {
    queue: Queue<T>,
    waiting: usize,
    stop: bool,
}

impl<T> State<T> {
    fn detach_all(&mut self) -> Vec<T> {
        core::iter::from_fn(|| self.queue.dequeue()).collect()
    }
}

pub struct SyncQueue<T, D: Dispose<T> = DropValue> {
    state: Mutex<State<T>>,
    item_available: Condvar,
    waiters_drained: Condvar,
    dispose: D,
}

impl<T> SyncQueue<T> {
    pub fn new() -> Self {
        Self::with_dispose(DropValue)
    }

    pub fn bounded(max_len: usize) -> Self {
        Self::bounded_with_dispose(max_len, DropValue)
    }
}

impl<T> Default for SyncQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, D: Dispose<T>> SyncQueue<T, D> {
    pub fn with_dispose(dispose: D) -> Self {
        Self::from_queue(Queue::new(), dispose)
    }

    pub fn bounded_with_dispose(max_len: usize, dispose: D) -> Self {
        Self::from_queue(Queue::bounded(max_len), dispose)
    }

    fn from_queue(queue: Queue<T>, dispose: D) -> Self {
        Self {
            state: Mutex::new(State {
                queue,
                waiting: 0,
                stop: false,
            }),
            item_available: Condvar::new(),
            waiters_drained: Condvar::new(),
            dispose,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Push without blocking. Refused when bounded and full, or once
    /// `close` has begun; the value is handed back in either case.
    pub fn enqueue(&self, value: T) -> Result<(), Rejected<T>> {
        let mut st = self.lock();
        if st.stop {
            return Err(Rejected::new(Error::Closed, value));
        }
        st.queue.enqueue(value)?;
        self.item_available.notify_one();
        Ok(())
    }

    /// Pop without blocking.
    pub fn dequeue(&self) -> Option<T> {
        self.lock().queue.dequeue()
    }

    /// Pop, sleeping while the queue is empty. Returns `None` only when the
    /// queue has been closed.
    pub fn wait_dequeue(&self) -> Option<T> {
        let mut st = self.lock();
        st.waiting += 1;
        loop {
            if st.stop {
                st.waiting -= 1;
                self.waiters_drained.notify_all();
                return None;
            }
            if let Some(value) = st.queue.dequeue() {
                st.waiting -= 1;
                return Some(value);
            }
            st = self
                .item_available
                .wait(st)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Stop the queue: wake and drain every blocked consumer, then dispose
    /// whatever is still queued. Returns the number of items disposed.
    /// Calling it again is a no-op.
    pub fn close(&self) -> usize {
        let mut st = self.lock();
        if st.stop {
            return 0;
        }
        st.stop = true;
        self.item_available.notify_all();
        while st.waiting > 0 {
            st = self
                .waiters_drained
                .wait(st)
                .unwrap_or_else(PoisonError::into_inner);
        }
        let pending = st.detach_all();
        drop(st);
        let discarded = self.dispose_all(pending);
        if discarded > 0 {
            log::warn!("sync queue closed with {discarded} pending items; disposing them");
        } else {
            log::debug!("sync queue closed");
        }
        discarded
    }

    /// Close and release the queue.
    pub fn dispose(self) -> usize {
        self.close()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().stop
    }
    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }
    /// Consumers currently inside `wait_dequeue`.
    pub fn waiting(&self) -> usize {
        self.lock().waiting
    }

    /// Dispose every queued item without closing.
    pub fn clear(&self) -> usize {
        let pending = self.lock().detach_all();
        self.dispose_all(pending)
    }

    fn dispose_all(&self, items: Vec<T>) -> usize {
        let n = items.len();
        for v in items {
            self.dispose.dispose(v);
        }
        n
    }
}

impl<T, D: Dispose<T>> Drop for SyncQueue<T, D> {
    fn drop(&mut self) {
        let st = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        while let Some(v) = st.queue.dequeue() {
            self.dispose.dispose(v);
        }
    }
}

impl<T, D: Dispose<T>> fmt::Debug for SyncQueue<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.lock();
        f.debug_struct("SyncQueue")
            .field("len", &st.queue.len())
            .field("waiting", &st.waiting)
            .field("stop", &st.stop)
            .finish()
    }
}
