#![cfg(test)]

// Property tests for ChainedHashMap kept inside the crate so they can check
// bucket placement through private fields.

use crate::table::ChainedHashMap;
use crate::Config;
use core::hash::BuildHasher;
use proptest::prelude::*;
use std::collections::hash_map::RandomState;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::hash::Hasher;

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

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    GetOrDefault(usize, i32),
    Remove(usize),
    Find(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
    Clear,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::GetOrDefault(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Find),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn check_structure<S>(sut: &ChainedHashMap<Key, i32, S>) -> Result<(), TestCaseError>
where
    S: BuildHasher,
{
    // Every entry is reachable by lookup, and traversal visits len() entries once.
    let mut seen = BTreeSet::new();
    for (k, _) in sut.iter() {
        prop_assert!(seen.insert(k.clone()), "duplicate key in traversal");
        prop_assert!(sut.contains_key(k));
    }
    prop_assert_eq!(seen.len(), sut.len());
    prop_assert!(sut.bucket_count() >= 1);
    prop_assert!(sut.load_factor() < sut.max_load_factor());
    Ok(())
}

fn run_state_machine<S>(
    mut sut: ChainedHashMap<Key, i32, S>,
    pool: Vec<String>,
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    S: BuildHasher,
{
    let mut model: HashMap<Key, i32> = HashMap::new();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(&pool, i);
                let prev = sut.insert(k.clone(), v);
                prop_assert_eq!(prev, model.insert(k, v));
            }
            OpI::GetOrDefault(i, v) => {
                let k = key_from(&pool, i);
                let slot = sut.get_or_default(k.clone());
                let expected = model.entry(k).or_default();
                prop_assert_eq!(*slot, *expected);
                *slot = v;
                *expected = v;
            }
            OpI::Remove(i) => {
                let k = key_from(&pool, i);
                let before = sut.len();
                let removed = sut.remove(&k);
                prop_assert_eq!(removed, model.remove(&k));
                let expected_len = if removed.is_some() { before - 1 } else { before };
                prop_assert_eq!(sut.len(), expected_len);
                prop_assert!(!sut.contains_key(&k));
            }
            OpI::Find(i) => {
                let k = key_from(&pool, i);
                prop_assert_eq!(sut.find(&k).map(|(_, v)| *v), model.get(&k).copied());
            }
            OpI::Contains(s) => {
                let has = sut.contains_key(s.as_str());
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(has, has_model);
            }
            OpI::Mutate(i, d) => {
                let k = key_from(&pool, i);
                if let Some(vr) = sut.get_mut(&k) {
                    *vr = vr.saturating_add(d);
                    let mv = model.get_mut(&k).expect("model must hold a key the map holds");
                    *mv = mv.saturating_add(d);
                } else {
                    prop_assert!(!model.contains_key(&k));
                }
            }
            OpI::Iterate => {
                let s_pairs: BTreeMap<_, _> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                let m_pairs: BTreeMap<_, _> = model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(s_pairs, m_pairs);
            }
            OpI::Clear => {
                let buckets = sut.bucket_count();
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.bucket_count(), buckets);
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        check_structure(&sut)?;
    }
    Ok(())
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - Inserting an existing key overwrites and returns the old value (last write wins).
// - `get_or_default` inserts zero on miss and hands out a live reference.
// - `remove` returns the model's value and decrements len by exactly one.
// - `iter` yields each live pair exactly once and equals the model.
// - The load factor stays below the threshold after every operation.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let config = Config { initial_buckets: 2, max_load_factor: 0.8 };
        let sut = ChainedHashMap::with_config(config, RandomState::new()).unwrap();
        run_state_machine(sut, pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
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

// Property: Same state-machine invariants as above, under worst-case
// collision behavior (constant hasher). Every entry shares bucket 0, so this
// stresses chain scans, swap-removal and rehash of a single long chain.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = ChainedHashMap::with_buckets_and_hasher(1, ConstBuildHasher);
        run_state_machine(sut, pool, ops)?;
    }
}

// Property: any threshold and initial size keep the load factor below the
// threshold after each insert, and rehashing never loses or duplicates pairs.
proptest! {
    #[test]
    fn prop_growth_keeps_pairs(
        buckets in 1usize..16,
        lf in 0.05f32..4.0,
        keys in proptest::collection::vec(any::<u16>(), 0..200),
    ) {
        let config = Config { initial_buckets: buckets, max_load_factor: lf };
        let mut sut: ChainedHashMap<u16, usize> =
            ChainedHashMap::with_config(config, RandomState::new()).unwrap();
        let mut model = BTreeMap::new();
        for (i, k) in keys.into_iter().enumerate() {
            sut.insert(k, i);
            model.insert(k, i);
            prop_assert!(sut.load_factor() < lf);
        }
        let pairs: BTreeMap<u16, usize> = sut.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(pairs, model);
    }
}
