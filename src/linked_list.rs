//! LinkedList: singly-linked sequence stored in a generational arena.
//!
//! Nodes live in a `SlotMap`; `head`, `tail` and every `next` link are slot
//! keys rather than pointers. `len() == 0` exactly when both `head` and
//! `tail` are `None`.
//!
//! Push at either end and pop at the front are O(1). Pop at the back and
//! removal by predicate walk the chain and are O(n).

use crate::dispose::{Dispose, DropValue};
use core::fmt;
use slotmap::{DefaultKey, SlotMap};

#[derive(Debug)]
struct Node<T> {
    value: T,
    next: Option<DefaultKey>,
}

pub struct LinkedList<T, D: Dispose<T> = DropValue> {
    nodes: SlotMap<DefaultKey, Node<T>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
    dispose: D,
}

impl<T> LinkedList<T> {
    pub fn new() -> Self {
        Self::with_dispose(DropValue)
    }
}

impl<T> Default for LinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, D: Dispose<T>> LinkedList<T, D> {
    pub fn with_dispose(dispose: D) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
            dispose,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn front(&self) -> Option<&T> {
        self.head.and_then(|k| self.nodes.get(k)).map(|n| &n.value)
    }

    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|k| self.nodes.get(k)).map(|n| &n.value)
    }

    pub fn push_front(&mut self, value: T) {
        let next = self.head;
        let k = self.nodes.insert(Node { value, next });
        self.head = Some(k);
        if self.tail.is_none() {
            self.tail = Some(k);
        }
    }

    pub fn push_back(&mut self, value: T) {
        let k = self.nodes.insert(Node { value, next: None });
        match self.tail.and_then(|t| self.nodes.get_mut(t)) {
            Some(tail) => tail.next = Some(k),
            None => self.head = Some(k),
        }
        self.tail = Some(k);
    }

    /// Detach the first value and hand it to the caller (not disposed).
    pub fn pop_front(&mut self) -> Option<T> {
        let k = self.head?;
        let node = self.nodes.remove(k)?;
        self.head = node.next;
        if self.head.is_none() {
            self.tail = None;
        }
        Some(node.value)
    }

    /// Detach the last value and hand it to the caller (not disposed).
    pub fn pop_back(&mut self) -> Option<T> {
        let tail = self.tail?;
        let prev = self.predecessor(|k| k == tail);
        self.unlink(prev, tail)
    }

    /// Pop the first value and dispose it.
    pub fn dispose_front(&mut self) -> bool {
        match self.pop_front() {
            Some(v) => {
                self.dispose.dispose(v);
                true
            }
            None => false,
        }
    }

    /// Pop the last value and dispose it.
    pub fn dispose_back(&mut self) -> bool {
        match self.pop_back() {
            Some(v) => {
                self.dispose.dispose(v);
                true
            }
            None => false,
        }
    }

    /// Detach the first value matching `pred` and hand it to the caller.
    pub fn take_if<P>(&mut self, mut pred: P) -> Option<T>
    where
        P: FnMut(&T) -> bool,
    {
        let mut prev = None;
        let mut cur = self.head;
        while let Some(k) = cur {
            let node = &self.nodes[k];
            if pred(&node.value) {
                return self.unlink(prev, k);
            }
            prev = Some(k);
            cur = node.next;
        }
        None
    }

    /// Remove and dispose the first value matching `pred`.
    pub fn remove_if<P>(&mut self, pred: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        match self.take_if(pred) {
            Some(v) => {
                self.dispose.dispose(v);
                true
            }
            None => false,
        }
    }

    pub fn remove_value(&mut self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.remove_if(|v| v == value)
    }

    pub fn find<P>(&self, mut pred: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().find(|&v| pred(v))
    }

    pub fn find_mut<P>(&mut self, mut pred: P) -> Option<&mut T>
    where
        P: FnMut(&T) -> bool,
    {
        let mut cur = self.head;
        while let Some(k) = cur {
            let node = &self.nodes[k];
            if pred(&node.value) {
                return self.nodes.get_mut(k).map(|n| &mut n.value);
            }
            cur = node.next;
        }
        None
    }

    pub fn every<P>(&self, pred: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().all(pred)
    }

    pub fn some<P>(&self, pred: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().any(pred)
    }

    pub fn for_each<F>(&self, f: F)
    where
        F: FnMut(&T),
    {
        self.iter().for_each(f)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: &self.nodes,
            cur: self.head,
        }
    }

    /// Dispose every value in order and leave the list empty.
    pub fn clear(&mut self) {
        while self.dispose_front() {}
    }

    fn predecessor<F>(&self, mut is_target: F) -> Option<DefaultKey>
    where
        F: FnMut(DefaultKey) -> bool,
    {
        let mut prev = None;
        let mut cur = self.head;
        while let Some(k) = cur {
            if is_target(k) {
                break;
            }
            prev = Some(k);
            cur = self.nodes[k].next;
        }
        prev
    }

    fn unlink(&mut self, prev: Option<DefaultKey>, k: DefaultKey) -> Option<T> {
        let node = self.nodes.remove(k)?;
        match prev {
            Some(p) => self.nodes[p].next = node.next,
            None => self.head = node.next,
        }
        if self.tail == Some(k) {
            self.tail = prev;
        }
        Some(node.value)
    }
}

impl<T, D: Dispose<T>> Drop for LinkedList<T, D> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: fmt::Debug, D: Dispose<T>> fmt::Debug for LinkedList<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Iterator over values from head to tail.
pub struct Iter<'a, T> {
    nodes: &'a SlotMap<DefaultKey, Node<T>>,
    cur: Option<DefaultKey>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.get(self.cur?)?;
        self.cur = node.next;
        Some(&node.value)
    }
}

impl<'a, T, D: Dispose<T>> IntoIterator for &'a LinkedList<T, D> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
