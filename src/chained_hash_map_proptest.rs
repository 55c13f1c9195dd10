#![cfg(test)]

// Property tests for ChainedHashMap kept inside the crate so the internal
// invariant checker (chain placement, len sync, load-factor bound) stays
// reachable without feature gates.

use crate::chained_hash_map::ChainedHashMap;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeSet, HashMap};
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

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    InsertIfAbsent(usize, i32),
    Remove(usize),
    RemoveExact(usize, i32),
    Replace(usize, i32),
    ReplaceExact(usize, i32, i32),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
    Snapshot,
    Clear,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::InsertIfAbsent(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::RemoveExact(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Replace(i, v)),
            2 => (idx.clone(), any::<i32>(), any::<i32>())
                .prop_map(|(i, old, new)| OpI::ReplaceExact(i, old, new)),
            2 => idx.clone().prop_map(OpI::Get),
            2 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Snapshot),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run_scenario<S>(sut: &mut ChainedHashMap<Key, i32, S>, pool: &[String], ops: Vec<OpI>) -> Result<(), TestCaseError>
where
    S: std::hash::BuildHasher + Clone + Default,
{
    let mut model: HashMap<Key, i32> = HashMap::new();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.insert(k.clone(), v), model.insert(k, v));
            }
            OpI::InsertIfAbsent(i, v) => {
                let k = key_from(pool, i);
                let existing = model.get(&k).copied();
                let got = sut.insert_if_absent(k.clone(), v).copied();
                prop_assert_eq!(got, existing);
                model.entry(k).or_insert(v);
            }
            OpI::Remove(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.remove(&k), model.remove(&k));
            }
            OpI::RemoveExact(i, expected) => {
                let k = key_from(pool, i);
                let matches = model.get(&k) == Some(&expected);
                prop_assert_eq!(sut.remove_exact(&k, &expected), matches);
                if matches {
                    model.remove(&k);
                }
            }
            OpI::Replace(i, v) => {
                let k = key_from(pool, i);
                let prev = if model.contains_key(&k) {
                    model.insert(k.clone(), v)
                } else {
                    None
                };
                prop_assert_eq!(sut.replace(&k, v), prev);
            }
            OpI::ReplaceExact(i, old, new) => {
                let k = key_from(pool, i);
                let matches = model.get(&k) == Some(&old);
                prop_assert_eq!(sut.replace_exact(&k, &old, new), matches);
                if matches {
                    model.insert(k, new);
                }
            }
            OpI::Get(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.get(&k), model.get(&k));
            }
            OpI::Contains(s) => {
                let has = sut.contains_key(s.as_str());
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(has, has_model);
            }
            OpI::Mutate(i, d) => {
                let k = key_from(pool, i);
                match (sut.get_mut(&k), model.get_mut(&k)) {
                    (Some(sv), Some(mv)) => {
                        *sv = sv.saturating_add(d);
                        *mv = mv.saturating_add(d);
                    }
                    (None, None) => {}
                    _ => prop_assert!(false, "get_mut presence diverged from model"),
                }
            }
            OpI::Iterate => {
                let s_keys: BTreeSet<_> = sut.iter().map(|(k, _)| k.clone()).collect();
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
            }
            OpI::Snapshot => {
                let mut s_entries = sut.entries();
                s_entries.sort();
                let mut m_entries: Vec<(Key, i32)> =
                    model.iter().map(|(k, &v)| (k.clone(), v)).collect();
                m_entries.sort();
                prop_assert_eq!(s_entries, m_entries);
            }
            OpI::Clear => {
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.bucket_count(), 10);
            }
        }

        // Post-conditions after each op: structural invariants hold and
        // size tracks the model.
        sut.check_invariants();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
    }

    // Final check: the surviving pairs are exactly the model's.
    let mut s_entries = sut.entries();
    s_entries.sort();
    let mut m_entries: Vec<(Key, i32)> = model.into_iter().collect();
    m_entries.sort();
    prop_assert_eq!(s_entries, m_entries);
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - insert/insert_if_absent/remove/replace return values match the model.
// - remove_exact/replace_exact fire iff the stored value equals the
//   expected one, and only then mutate state.
// - iter/entries yield each live entry exactly once, matching the model.
// - After every op: chain placement, len sync, and the load-factor bound.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: ChainedHashMap<Key, i32> = ChainedHashMap::new();
        run_scenario(&mut sut, &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress chain probing,
// relinking, and growth with every key in a single chain.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl std::hash::BuildHasher for ConstBuildHasher {
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
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let mut sut: ChainedHashMap<Key, i32, ConstBuildHasher> =
            ChainedHashMap::with_hasher(ConstBuildHasher);
        run_scenario(&mut sut, &pool, ops)?;
    }
}
