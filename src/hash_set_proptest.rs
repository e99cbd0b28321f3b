#![cfg(test)]

// Property tests for HashSet and Table, kept inside the crate next to the
// unit tests.

use crate::hash_set::HashSet;
use crate::table::Table;
use hashbrown::hash_map::DefaultHashBuilder;
use proptest::prelude::*;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hasher};
use std::rc::Rc;

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations so shrinking moves toward earlier keys.
#[derive(Clone, Debug)]
enum OpI {
    Set(usize),
    Remove(usize),
    Take(usize),
    Has(String),
    Iterate,
    Clear,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>, f32)> {
    let lf = prop_oneof![Just(0.25f32), Just(0.5), Just(0.75), Just(1.0), Just(3.0)];
    (proptest::collection::vec("[a-z]{0,4}", 1..=40), lf).prop_flat_map(|(pool, lf)| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let has_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => idx.clone().prop_map(OpI::Set),
            2 => idx.clone().prop_map(OpI::Remove),
            1 => idx.clone().prop_map(OpI::Take),
            2 => prop_oneof![has_pool, "[a-z]{0,4}"].prop_map(OpI::Has),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops, lf))
    })
}

// Property: state-machine equivalence against std::collections::HashMap
// used as a set.
// Invariants exercised across random operation sequences:
// - `len / capacity <= load_factor` after every successful `set`.
// - Duplicates are rejected, hand the value back, and leave `len` unchanged.
// - `has` agrees with the model for pooled and random keys.
// - `remove` disposes exactly the removed value; `take` and rejected values
//   are never disposed; `clear` disposes every member once.
// - `iter` yields each member exactly once.
proptest! {
    #![proptest_config(ProptestConfig { cases: 96, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops, lf) in arb_scenario()) {
        let disposed: Rc<RefCell<Vec<Key>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&disposed);
        let mut sut: HashSet<Key, DefaultHashBuilder, _> = HashSet::with_hasher_and_dispose(
            lf,
            DefaultHashBuilder::default(),
            move |k: Key| sink.borrow_mut().push(k),
        );
        let mut model: HashMap<Key, ()> = HashMap::new();
        let mut expected_disposed: Vec<Key> = Vec::new();

        for op in ops {
            match op {
                OpI::Set(i) => {
                    let k = key_from(&pool, i);
                    let already = model.contains_key(&k);
                    match sut.set(k.clone()) {
                        Ok(()) => {
                            prop_assert!(!already, "set must fail on duplicate");
                            model.insert(k, ());
                            let ratio = sut.len() as f32 / sut.capacity() as f32;
                            prop_assert!(ratio <= lf, "load {} exceeds {}", ratio, lf);
                        }
                        Err(rejected) => {
                            prop_assert!(already, "duplicate error only when present");
                            prop_assert_eq!(rejected.into_value(), k);
                        }
                    }
                }
                OpI::Remove(i) => {
                    let k = key_from(&pool, i);
                    let removed = sut.remove(k.0.as_str());
                    prop_assert_eq!(removed, model.remove(&k).is_some());
                    if removed {
                        expected_disposed.push(k);
                    }
                }
                OpI::Take(i) => {
                    let k = key_from(&pool, i);
                    let taken = sut.take(&k);
                    prop_assert_eq!(taken.is_some(), model.remove(&k).is_some());
                    if let Some(t) = taken {
                        prop_assert_eq!(t, k);
                    }
                }
                OpI::Has(s) => {
                    let has_model = model.keys().any(|k| k.0 == s);
                    prop_assert_eq!(sut.has(s.as_str()), has_model);
                }
                OpI::Iterate => {
                    let seen: Vec<Key> = sut.iter().cloned().collect();
                    let s_keys: BTreeSet<_> = seen.iter().cloned().collect();
                    prop_assert_eq!(seen.len(), s_keys.len(), "iter yields each member once");
                    let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                    prop_assert_eq!(s_keys, m_keys);
                }
                OpI::Clear => {
                    let mut members: Vec<Key> = model.drain().map(|(k, _)| k).collect();
                    sut.clear();
                    let tail: Vec<Key> = disposed.borrow()[expected_disposed.len()..].to_vec();
                    let mut sorted = tail.clone();
                    members.sort();
                    sorted.sort();
                    prop_assert_eq!(&sorted, &members);
                    expected_disposed.extend(tail);
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            prop_assert_eq!(&*disposed.borrow(), &expected_disposed);
        }
    }
}

// Collision variant using a constant hasher to stress equality resolution
// inside a single bucket, including across rehashes.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn prop_collisions_keep_membership(values in proptest::collection::vec(0u16..64, 1..80)) {
        let mut sut: HashSet<u16, ConstBuildHasher> =
            HashSet::with_hasher_and_dispose(0.75, ConstBuildHasher, crate::DropValue);
        let mut model = BTreeSet::new();
        for v in values {
            prop_assert_eq!(sut.set(v).is_ok(), model.insert(v));
        }
        for v in 0u16..64 {
            prop_assert_eq!(sut.has(&v), model.contains(&v));
        }
        let collected: BTreeSet<u16> = sut.iter().copied().collect();
        prop_assert_eq!(collected, model);
    }
}

// Table: the first value stored for a key is what `get` returns until the
// key is removed; refused sets keep the stored value.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_table_matches_map(ops in proptest::collection::vec((0u8..16, any::<i32>(), any::<bool>()), 1..100)) {
        let mut sut: Table<u8, i32> = Table::new();
        let mut model: HashMap<u8, i32> = HashMap::new();
        for (k, v, remove) in ops {
            if remove {
                prop_assert_eq!(sut.remove(&k), model.remove(&k).is_some());
            } else {
                let fresh = !model.contains_key(&k);
                prop_assert_eq!(sut.set(k, v).is_ok(), fresh);
                model.entry(k).or_insert(v);
            }
            for key in 0u8..16 {
                prop_assert_eq!(sut.get(&key).map(|e| *e.value()), model.get(&key).copied());
            }
        }
    }
}
