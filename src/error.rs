//! Usage errors reported by containers, queues and the pool.

use core::fmt;
use thiserror::Error;

/// Why an operation was refused. The structure it was called on is left
/// unmodified.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
    /// A fixed container (or bounded queue) is full.
    #[error("container is at its fixed capacity of {capacity}")]
    CapacityExceeded { capacity: usize },
    /// Index addressed a slot outside the allocated capacity.
    #[error("index {index} is out of bounds for capacity {capacity}")]
    OutOfBounds { index: usize, capacity: usize },
    /// An equal value is already stored in the set.
    #[error("an equal value is already present")]
    Duplicate,
    /// `increase_capacity` was asked for a size that is not larger.
    #[error("requested capacity {requested} does not exceed current capacity {current}")]
    CapacityNotIncreased { current: usize, requested: usize },
    /// Only fixed arrays can be resized explicitly.
    #[error("explicit resize is only supported on fixed arrays")]
    NotFixed,
    /// The queue or pool has begun shutting down.
    #[error("queue is closed")]
    Closed,
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// A refused insertion. Carries the value back so ownership returns to the
/// caller instead of being disposed.
#[derive(Error)]
#[error("{error}")]
pub struct Rejected<T> {
    error: Error,
    value: T,
}

impl<T> Rejected<T> {
    pub(crate) fn new(error: Error, value: T) -> Self {
        Self { error, value }
    }

    pub fn error(&self) -> Error {
        self.error
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn into_parts(self) -> (Error, T) {
        (self.error, self.value)
    }
}

impl<T> fmt::Debug for Rejected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejected")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<T> From<Rejected<T>> for Error {
    fn from(r: Rejected<T>) -> Self {
        r.error
    }
}
