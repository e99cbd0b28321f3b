//! ownpool: containers that own their elements, plus a fixed-size worker
//! pool with futures built on a blocking queue.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one ownership rule for every container (a stored value is
//!   disposed exactly once, when it leaves the container or the container
//!   is torn down) and a thread pool built from those same containers.
//! - Layers:
//!   - `ArrayList<T, D>`: indexed slots, growable or fixed capacity.
//!   - `LinkedList<T, D>`: singly-linked sequence in a slotmap arena.
//!   - `Queue<T, D>`: FIFO over `LinkedList`, optionally bounded.
//!   - `HashSet<T, S, D>`: separate chaining with a fixed `ArrayList` of
//!     `LinkedList` buckets that doubles past the load factor.
//!   - `Table<K, V, S, D>`: key/value entries stored in a `HashSet`.
//!   - `SyncQueue<T, D>`: `Queue` behind a mutex with blocking dequeue and
//!     a broadcast-then-drain close.
//!   - `WorkerPool`: worker threads draining a `SyncQueue` of boxed jobs;
//!     results come back through `FutureHandle`s.
//!
//! Ownership
//! - The disposal policy is a `Dispose<T>` value bound at construction.
//!   `DropValue` just drops; any `Fn(T)` closure works.
//! - Values that leave by `take`/`pop`/`dequeue` go back to the caller and
//!   are not disposed. Values refused by an insertion come back inside
//!   `Rejected<T>`; the container never disposes what it did not accept.
//! - Lookups never mutate and report absence with `Option`.
//!
//! Concurrency
//! - Containers are not synchronized; `SyncQueue` and `WorkerPool` each own
//!   one mutex and a pair of condition variables.
//! - Values cross threads only by moving through a `SyncQueue`.
//! - Shutdown is cooperative: a stop flag read under the lock that sets it,
//!   then waiting until every blocked thread has acknowledged.
//!
//! Notes and non-goals
//! - No lock-free structures, work stealing, priorities or timeouts.
//! - The pool never inspects results; failure is whatever `R` encodes.
//! - No logger is installed; the crate emits through `log`.

pub mod array_list;
pub mod dispose;
pub mod error;
pub mod hash_set;
mod hash_set_proptest;
pub mod linked_list;
pub mod pool;
pub mod queue;
pub mod sync_queue;
pub mod table;

// Public surface
pub use array_list::ArrayList;
pub use dispose::{Dispose, DropValue};
pub use error::{Error, Rejected, Result};
pub use hash_set::HashSet;
pub use linked_list::LinkedList;
pub use pool::{FutureHandle, PoolConfig, WorkerPool};
pub use queue::Queue;
pub use sync_queue::SyncQueue;
pub use table::{Entry, Table};
