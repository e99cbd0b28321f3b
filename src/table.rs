//! Table: key/value map layered on `HashSet`.
//!
//! Each member of the underlying set is an `Entry` whose equality and hash
//! look at the key only, so the set's duplicate rule becomes "one entry per
//! key". Lookups hash the borrowed key directly and compare keys inside the
//! bucket; no placeholder entry is built.

use crate::dispose::{Dispose, DropValue};
use crate::error::Rejected;
use crate::hash_set::{self, HashSet, DEFAULT_LOAD_FACTOR};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash, Hasher};
use hashbrown::hash_map::DefaultHashBuilder;

/// A stored key/value pair. Compared and hashed by key only.
#[derive(Debug, Clone)]
pub struct Entry<K, V> {
    key: K,
    value: V,
}

impl<K, V> Entry<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }
    pub fn key(&self) -> &K {
        &self.key
    }
    pub fn value(&self) -> &V {
        &self.value
    }
    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }
    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K: PartialEq, V> PartialEq for Entry<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<K: Eq, V> Eq for Entry<K, V> {}

impl<K: Hash, V> Hash for Entry<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

pub struct Table<K, V, S = DefaultHashBuilder, D: Dispose<Entry<K, V>> = DropValue> {
    entries: HashSet<Entry<K, V>, S, D>,
}

impl<K, V> Table<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher_and_dispose(DefaultHashBuilder::default(), DropValue)
    }
}

impl<K, V> Default for Table<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S, D> Table<K, V, S, D>
where
    K: Eq + Hash,
    S: BuildHasher,
    D: Dispose<Entry<K, V>>,
{
    pub fn with_hasher_and_dispose(hasher: S, dispose: D) -> Self {
        Self {
            entries: HashSet::with_hasher_and_dispose(DEFAULT_LOAD_FACTOR, hasher, dispose),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(key).is_some()
    }

    /// The stored entry for `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if self.entries.is_empty() {
            return None;
        }
        let hash = self.entries.hash_of(key);
        self.entries
            .find_hashed(hash, |e| e.key.borrow() == key)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if self.entries.is_empty() {
            return None;
        }
        let hash = self.entries.hash_of(key);
        self.entries
            .find_hashed_mut(hash, |e| e.key.borrow() == key)
            .map(Entry::value_mut)
    }

    /// Insert a new key. An existing key is refused; the rejected entry is
    /// handed back and the stored one is untouched.
    pub fn set(&mut self, key: K, value: V) -> Result<(), Rejected<Entry<K, V>>> {
        self.set_entry(Entry::new(key, value))
    }

    pub fn set_entry(&mut self, entry: Entry<K, V>) -> Result<(), Rejected<Entry<K, V>>> {
        self.entries.set(entry)
    }

    /// Remove the entry for `key` and dispose it. No-op when absent.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.take(key) {
            Some(e) => {
                self.entries.dispose_value(e);
                true
            }
            None => false,
        }
    }

    /// Remove the entry for `key` and hand it back without disposing.
    pub fn take<Q>(&mut self, key: &Q) -> Option<Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if self.entries.is_empty() {
            return None;
        }
        let hash = self.entries.hash_of(key);
        self.entries
            .take_hashed(hash, |e| e.key.borrow() == key)
    }

    pub fn for_each<F>(&self, f: F)
    where
        F: FnMut(&Entry<K, V>),
    {
        self.entries.for_each(f)
    }

    pub fn iter(&self) -> hash_set::Iter<'_, Entry<K, V>> {
        self.entries.iter()
    }

    /// Dispose every entry and return to the initial bucket count.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K, V, S, D> fmt::Debug for Table<K, V, S, D>
where
    K: fmt::Debug + Eq + Hash,
    V: fmt::Debug,
    S: BuildHasher,
    D: Dispose<Entry<K, V>>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|e| (&e.key, &e.value)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::RefCell;

    /// Invariant: `get` returns the stored entry, key and value included.
    #[test]
    fn get_returns_stored_entry() {
        let mut t = Table::new();
        t.set("k1".to_string(), 10).unwrap();
        t.set("k2".to_string(), 20).unwrap();
        let e = t.get("k2").expect("present");
        assert_eq!(e.key(), "k2");
        assert_eq!(*e.value(), 20);
        assert!(t.get("k3").is_none());
        assert!(t.has("k1"));
        assert!(!t.has("nope"));
    }

    /// Invariant: equality is over keys only, so a second value for the
    /// same key is refused and the first one survives.
    #[test]
    fn same_key_rejected() {
        let mut t = Table::new();
        t.set(1u32, "first").unwrap();
        let err = t.set(1, "second").unwrap_err();
        assert_eq!(err.error(), Error::Duplicate);
        assert_eq!(err.into_value().into_parts(), (1, "second"));
        assert_eq!(t.get(&1).map(|e| *e.value()), Some("first"));
        assert_eq!(t.len(), 1);
    }

    /// Invariant: `get_mut` updates the value in place.
    #[test]
    fn get_mut_updates_value() {
        let mut t = Table::new();
        t.set("a", 1).unwrap();
        *t.get_mut("a").unwrap() += 41;
        assert_eq!(t.get("a").map(|e| *e.value()), Some(42));
        assert!(t.get_mut("b").is_none());
    }

    /// Invariant: `remove` disposes the whole entry; `take` hands it back.
    #[test]
    fn remove_and_take() {
        let disposed = RefCell::new(Vec::new());
        let mut t: Table<&str, u32, DefaultHashBuilder, _> = Table::with_hasher_and_dispose(
            DefaultHashBuilder::default(),
            |e: Entry<&'static str, u32>| disposed.borrow_mut().push(e.into_parts()),
        );
        t.set("x", 1).unwrap();
        t.set("y", 2).unwrap();
        assert!(t.remove("x"));
        assert!(!t.remove("x"));
        let taken = t.take("y").expect("present");
        assert_eq!(taken.into_parts(), ("y", 2));
        assert!(t.is_empty());
        assert_eq!(*disposed.borrow(), vec![("x", 1)]);
    }

    /// Invariant: growth past the default bucket count keeps every key.
    #[test]
    fn many_keys_survive_growth() {
        let mut t = Table::new();
        for i in 0..500u32 {
            t.set(i, i * 2).unwrap();
        }
        assert!(t.capacity() > hash_set::DEFAULT_BUCKETS);
        for i in 0..500u32 {
            assert_eq!(t.get(&i).map(|e| *e.value()), Some(i * 2));
        }
        let mut sum = 0;
        t.for_each(|e| sum += *e.value());
        assert_eq!(sum, (0..500).map(|i| i * 2).sum::<u32>());
        t.clear();
        assert!(t.is_empty());
        assert_eq!(t.capacity(), hash_set::DEFAULT_BUCKETS);
    }
}
