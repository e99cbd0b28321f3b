//! HashSet: separate-chaining set over a fixed bucket array.
//!
//! Layout
//! - `buckets` is a fixed `ArrayList` whose slots start empty; a slot gets
//!   its `LinkedList` the first time a value hashes into it.
//! - Each node stores the value's precomputed `u64` hash next to it.
//!   Rehashing and bucket scans compare stored hashes first and never call
//!   `T: Hash` again after insertion.
//!
//! Growth
//! - Before an insertion, if `(len + 1) / capacity` would exceed the load
//!   factor, every bucket is drained, the bucket array is doubled in place
//!   through `ArrayList::increase_capacity` (repeatedly, for very small load
//!   factors), and each value is re-placed by its stored hash.
//!   `len / capacity <= load_factor` holds after every successful `set`.
//!
//! Equality and hashing come from `T: Eq + Hash` and the `BuildHasher` `S`.
//! Custom equality is expressed on the stored type (see `Table`'s entries,
//! which compare by key only).

use crate::array_list::{self, ArrayList};
use crate::dispose::{Dispose, DropValue};
use crate::error::{Error, Rejected};
use crate::linked_list::{self, LinkedList};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// Bucket count of a freshly created set.
pub const DEFAULT_BUCKETS: usize = 10;

/// Load factor used by `HashSet::new` and `Table`.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

#[derive(Debug)]
struct Hashed<T> {
    hash: u64,
    value: T,
}

type Bucket<T> = LinkedList<Hashed<T>>;

pub struct HashSet<T, S = DefaultHashBuilder, D: Dispose<T> = DropValue> {
    buckets: ArrayList<Bucket<T>>,
    hasher: S,
    dispose: D,
    load_factor: f32,
    len: usize,
}

impl<T> HashSet<T>
where
    T: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_load_factor(DEFAULT_LOAD_FACTOR)
    }

    pub fn with_load_factor(load_factor: f32) -> Self {
        Self::with_hasher_and_dispose(load_factor, DefaultHashBuilder::default(), DropValue)
    }
}

impl<T> Default for HashSet<T>
where
    T: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S, D> HashSet<T, S, D>
where
    T: Eq + Hash,
    S: BuildHasher,
    D: Dispose<T>,
{
    /// Create a set with `DEFAULT_BUCKETS` buckets.
    ///
    /// A load factor that is not a positive finite number is replaced by
    /// `DEFAULT_LOAD_FACTOR`.
    pub fn with_hasher_and_dispose(load_factor: f32, hasher: S, dispose: D) -> Self {
        Self::with_buckets(DEFAULT_BUCKETS, load_factor, hasher, dispose)
    }

    /// Create a set with an explicit initial bucket count (at least one).
    pub fn with_buckets(buckets: usize, load_factor: f32, hasher: S, dispose: D) -> Self {
        let load_factor = if load_factor.is_finite() && load_factor > 0.0 {
            load_factor
        } else {
            log::warn!("load factor {load_factor} is not positive and finite; using {DEFAULT_LOAD_FACTOR}");
            DEFAULT_LOAD_FACTOR
        };
        Self {
            buckets: ArrayList::fixed(buckets.max(1)),
            hasher,
            dispose,
            load_factor,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.capacity()
    }
    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }
    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    pub(crate) fn hash_of<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    fn bucket_index(&self, hash: u64) -> usize {
        (hash % self.buckets.capacity() as u64) as usize
    }

    pub fn has<Q>(&self, q: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(q).is_some()
    }

    /// The stored member equal to `q`, if any.
    pub fn get<Q>(&self, q: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if self.len == 0 {
            return None;
        }
        self.find_hashed(self.hash_of(q), |v| v.borrow() == q)
    }

    /// Scan the bucket for `hash` with a caller-supplied equality.
    pub(crate) fn find_hashed<E>(&self, hash: u64, mut eq: E) -> Option<&T>
    where
        E: FnMut(&T) -> bool,
    {
        self.buckets
            .get(self.bucket_index(hash))?
            .find(|h| h.hash == hash && eq(&h.value))
            .map(|h| &h.value)
    }

    pub(crate) fn find_hashed_mut<E>(&mut self, hash: u64, mut eq: E) -> Option<&mut T>
    where
        E: FnMut(&T) -> bool,
    {
        let idx = self.bucket_index(hash);
        self.buckets
            .get_mut(idx)?
            .find_mut(|h| h.hash == hash && eq(&h.value))
            .map(|h| &mut h.value)
    }

    /// Insert `value` unless an equal member is present. Duplicates are
    /// refused and handed back; the set is unchanged.
    pub fn set(&mut self, value: T) -> Result<(), Rejected<T>> {
        let hash = self.hash_of(&value);
        if self.find_hashed(hash, |v| *v == value).is_some() {
            return Err(Rejected::new(Error::Duplicate, value));
        }
        let current = self.buckets.capacity();
        let mut target = current;
        while (self.len + 1) as f32 / target as f32 > self.load_factor {
            target *= 2;
        }
        if target > current {
            self.grow(target);
        }
        self.place(Hashed { hash, value });
        self.len += 1;
        Ok(())
    }

    /// Remove the member equal to `q` and dispose it. No-op when absent.
    pub fn remove<Q>(&mut self, q: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.take(q) {
            Some(v) => {
                self.dispose.dispose(v);
                true
            }
            None => false,
        }
    }

    /// Remove the member equal to `q` and hand it back without disposing.
    pub fn take<Q>(&mut self, q: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if self.len == 0 {
            return None;
        }
        let hash = self.hash_of(q);
        self.take_hashed(hash, |v| v.borrow() == q)
    }

    pub(crate) fn take_hashed<E>(&mut self, hash: u64, mut eq: E) -> Option<T>
    where
        E: FnMut(&T) -> bool,
    {
        let idx = self.bucket_index(hash);
        let taken = self
            .buckets
            .get_mut(idx)?
            .take_if(|h| h.hash == hash && eq(&h.value))?;
        self.len -= 1;
        Some(taken.value)
    }

    pub(crate) fn dispose_value(&self, value: T) {
        self.dispose.dispose(value);
    }

    /// First member matching `pred`, in bucket order then chain order.
    pub fn find<P>(&self, mut pred: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().find(|&v| pred(v))
    }

    pub fn for_each<F>(&self, f: F)
    where
        F: FnMut(&T),
    {
        self.iter().for_each(f)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            buckets: self.buckets.iter(),
            current: None,
        }
    }

    /// Dispose every member and shrink back to the initial bucket count.
    pub fn clear(&mut self) {
        self.dispose_all();
        self.buckets.clear();
    }

    fn grow(&mut self, target: usize) {
        let old = self.buckets.capacity();
        let mut drained = Vec::with_capacity(self.len);
        for i in 0..old {
            if let Some(bucket) = self.buckets.get_mut(i) {
                while let Some(h) = bucket.pop_front() {
                    drained.push(h);
                }
            }
        }
        self.buckets
            .increase_capacity(target)
            .expect("bucket array is fixed and the target exceeds it");
        log::trace!(
            "rehashing {} values from {} to {} buckets",
            drained.len(),
            old,
            target
        );
        for h in drained {
            self.place(h);
        }
    }

    fn place(&mut self, h: Hashed<T>) {
        let idx = self.bucket_index(h.hash);
        if self.buckets.get(idx).is_none() {
            let created = self.buckets.set(idx, LinkedList::new());
            debug_assert!(created.is_ok(), "bucket index is always below capacity");
        }
        self.buckets
            .get_mut(idx)
            .expect("bucket materialized above")
            .push_back(h);
    }
}

impl<T, S, D: Dispose<T>> HashSet<T, S, D> {
    fn dispose_all(&mut self) {
        let cap = self.buckets.capacity();
        for i in 0..cap {
            if let Some(bucket) = self.buckets.get_mut(i) {
                while let Some(h) = bucket.pop_front() {
                    self.dispose.dispose(h.value);
                }
            }
        }
        self.len = 0;
    }
}

impl<T, S, D: Dispose<T>> Drop for HashSet<T, S, D> {
    fn drop(&mut self) {
        self.dispose_all();
    }
}

impl<T: fmt::Debug, S, D: Dispose<T>> fmt::Debug for HashSet<T, S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let it = Iter {
            buckets: self.buckets.iter(),
            current: None,
        };
        f.debug_set().entries(it).finish()
    }
}

/// Iterator over members in bucket order, then chain order.
pub struct Iter<'a, T> {
    buckets: array_list::Iter<'a, Bucket<T>>,
    current: Option<linked_list::Iter<'a, Hashed<T>>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(h) = self.current.as_mut().and_then(|it| it.next()) {
                return Some(&h.value);
            }
            self.current = Some(self.buckets.next()?.iter());
        }
    }
}
