//! ArrayList: slot array with growable and fixed variants.
//!
//! Slots are addressed by index and may be empty. `len` counts occupied
//! slots, `capacity` counts allocated slots, and the write cursor is one
//! past the highest index ever written. `add` appends at the cursor.
//!
//! Growable arrays extend by `GROWTH_INCREMENT` slots when `add` reaches
//! the end; fixed arrays refuse instead and only grow through an explicit
//! `increase_capacity`.

use crate::dispose::{Dispose, DropValue};
use crate::error::{Error, Rejected, Result};
use core::fmt;

/// Initial capacity of `ArrayList::new`.
pub const DEFAULT_CAPACITY: usize = 10;

/// Number of slots a growable array adds on overflow.
pub const GROWTH_INCREMENT: usize = 10;

pub struct ArrayList<T, D: Dispose<T> = DropValue> {
    slots: Vec<Option<T>>,
    dispose: D,
    fixed: bool,
    initial_capacity: usize,
    cursor: usize,
    len: usize,
}

impl<T> ArrayList<T> {
    pub fn new() -> Self {
        Self::with_dispose(DropValue)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_dispose(capacity, DropValue)
    }

    pub fn fixed(capacity: usize) -> Self {
        Self::fixed_with_dispose(capacity, DropValue)
    }
}

impl<T> Default for ArrayList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, D: Dispose<T>> ArrayList<T, D> {
    pub fn with_dispose(dispose: D) -> Self {
        Self::build(false, DEFAULT_CAPACITY, dispose)
    }

    pub fn with_capacity_and_dispose(capacity: usize, dispose: D) -> Self {
        Self::build(false, capacity, dispose)
    }

    pub fn fixed_with_dispose(capacity: usize, dispose: D) -> Self {
        Self::build(true, capacity, dispose)
    }

    fn build(fixed: bool, capacity: usize, dispose: D) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            dispose,
            fixed,
            initial_capacity: capacity,
            cursor: 0,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }
    /// One past the highest index written so far.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Grow a fixed array to `new_capacity` slots. New slots are empty.
    pub fn increase_capacity(&mut self, new_capacity: usize) -> Result<()> {
        if !self.fixed {
            return Err(Error::NotFixed);
        }
        if new_capacity <= self.slots.len() {
            return Err(Error::CapacityNotIncreased {
                current: self.slots.len(),
                requested: new_capacity,
            });
        }
        self.slots.resize_with(new_capacity, || None);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// Append at the write cursor and return the index used.
    pub fn add(&mut self, value: T) -> core::result::Result<usize, Rejected<T>> {
        if self.cursor == self.slots.len() {
            if self.fixed {
                let capacity = self.slots.len();
                return Err(Rejected::new(Error::CapacityExceeded { capacity }, value));
            }
            let grown = self.slots.len() + GROWTH_INCREMENT;
            self.slots.resize_with(grown, || None);
        }
        let index = self.cursor;
        self.slots[index] = Some(value);
        self.cursor += 1;
        self.len += 1;
        Ok(index)
    }

    /// Store `value` at `index`, disposing whatever occupied the slot.
    pub fn set(&mut self, index: usize, value: T) -> core::result::Result<(), Rejected<T>> {
        let capacity = self.slots.len();
        let Some(slot) = self.slots.get_mut(index) else {
            return Err(Rejected::new(Error::OutOfBounds { index, capacity }, value));
        };
        match slot.replace(value) {
            Some(prior) => self.dispose.dispose(prior),
            None => self.len += 1,
        }
        self.cursor = self.cursor.max(index + 1);
        Ok(())
    }

    /// Remove the value at `index` and return it without disposing.
    /// Later slots shift down by one so relative order is kept.
    pub fn take(&mut self, index: usize) -> Option<T> {
        let value = self.slots.get_mut(index)?.take()?;
        self.slots.remove(index);
        self.slots.push(None);
        if index < self.cursor {
            self.cursor -= 1;
        }
        self.len -= 1;
        Some(value)
    }

    /// Remove and dispose the value at `index`. Returns false if the slot
    /// was empty or out of bounds.
    pub fn remove(&mut self, index: usize) -> bool {
        match self.take(index) {
            Some(value) => {
                self.dispose.dispose(value);
                true
            }
            None => false,
        }
    }

    /// Remove and dispose the first value matching `pred`.
    pub fn remove_if<P>(&mut self, pred: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        match self.find(pred) {
            Some(index) => self.remove(index),
            None => false,
        }
    }

    pub fn remove_value(&mut self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.remove_if(|v| v == value)
    }

    /// Index of the first occupied slot matching `pred`.
    pub fn find<P>(&self, mut pred: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(&mut pred))
    }

    pub fn find_item<P>(&self, pred: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.find(pred).and_then(|i| self.get(i))
    }

    /// True when `pred` holds for every occupied slot. Empty slots are
    /// never passed to `pred`.
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
            it: self.slots.iter(),
        }
    }

    /// Dispose every value and reset to the original capacity and kind.
    pub fn clear(&mut self) {
        self.dispose_all();
        self.slots.clear();
        self.slots.resize_with(self.initial_capacity, || None);
        self.cursor = 0;
    }

    fn dispose_all(&mut self) {
        for slot in self.slots.iter_mut() {
            if let Some(value) = slot.take() {
                self.dispose.dispose(value);
            }
        }
        self.len = 0;
    }
}

impl<T, D: Dispose<T>> Drop for ArrayList<T, D> {
    fn drop(&mut self) {
        self.dispose_all();
    }
}

impl<T: fmt::Debug, D: Dispose<T>> fmt::Debug for ArrayList<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Iterator over occupied slots in index order.
pub struct Iter<'a, T> {
    it: core::slice::Iter<'a, Option<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.find_map(Option::as_ref)
    }
}

impl<'a, T, D: Dispose<T>> IntoIterator for &'a ArrayList<T, D> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
