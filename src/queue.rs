//! Queue: FIFO over `LinkedList` with an optional length bound.

use crate::dispose::{Dispose, DropValue};
use crate::error::{Error, Rejected};
use crate::linked_list::{Iter, LinkedList};
use core::fmt;

pub struct Queue<T, D: Dispose<T> = DropValue> {
    list: LinkedList<T, D>,
    max_len: Option<usize>,
}

impl<T> Queue<T> {
    pub fn new() -> Self {
        Self::with_dispose(DropValue)
    }

    pub fn bounded(max_len: usize) -> Self {
        Self::bounded_with_dispose(max_len, DropValue)
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, D: Dispose<T>> Queue<T, D> {
    pub fn with_dispose(dispose: D) -> Self {
        Self {
            list: LinkedList::with_dispose(dispose),
            max_len: None,
        }
    }

    pub fn bounded_with_dispose(max_len: usize, dispose: D) -> Self {
        Self {
            list: LinkedList::with_dispose(dispose),
            max_len: Some(max_len),
        }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
    /// Maximum length, or `None` when unbounded.
    pub fn max_len(&self) -> Option<usize> {
        self.max_len
    }
    pub fn is_full(&self) -> bool {
        self.max_len.is_some_and(|max| self.list.len() >= max)
    }

    /// Append at the back. Fails without side effects when bounded and full.
    pub fn enqueue(&mut self, value: T) -> Result<(), Rejected<T>> {
        if let Some(capacity) = self.max_len.filter(|&max| self.list.len() >= max) {
            return Err(Rejected::new(Error::CapacityExceeded { capacity }, value));
        }
        self.list.push_back(value);
        Ok(())
    }

    pub fn dequeue(&mut self) -> Option<T> {
        self.list.pop_front()
    }

    pub fn peek(&self) -> Option<&T> {
        self.list.front()
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.list.iter()
    }

    /// Dispose every queued value in FIFO order. Returns how many there were.
    pub fn clear(&mut self) -> usize {
        let n = self.list.len();
        self.list.clear();
        n
    }
}

impl<T: fmt::Debug, D: Dispose<T>> fmt::Debug for Queue<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("items", &self.list)
            .field("max_len", &self.max_len)
            .finish()
    }
}
