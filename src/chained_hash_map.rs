//! ChainedHashMap: separate-chaining table with load-factor growth.

use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::mem;
use std::collections::hash_map::RandomState;

/// Bucket count of a freshly constructed (or cleared) table.
const INITIAL_BUCKETS: usize = 10;

/// Entries-per-bucket ratio above which the bucket array doubles.
const MAX_LOAD_FACTOR: f64 = 0.7;

/// One chained entry. Each node is owned by its predecessor in the chain,
/// or by the bucket slot if it is the head. `hash` is computed once at
/// insertion; `K: Hash` is never invoked again for this entry (growth and
/// probing use the cached hash).
struct Node<K, V> {
    key: K,
    value: V,
    hash: u64,
    next: Option<Box<Node<K, V>>>,
}

/// A hash map resolving collisions by separate chaining.
///
/// Buckets start at 10 and double whenever the entry count exceeds 0.7 of
/// the bucket count; capacity never shrinks except through [`clear`], which
/// resets it to the initial 10. Keys are unique table-wide. Absence is
/// communicated with `Option`, never with a stored sentinel.
///
/// [`clear`]: ChainedHashMap::clear
pub struct ChainedHashMap<K, V, S = RandomState> {
    hasher: S,
    buckets: Vec<Option<Box<Node<K, V>>>>,
    len: usize,
}

impl<K, V> ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, V> Default for ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over `(&K, &V)` in unspecified order.
pub struct Iter<'a, K, V> {
    buckets: core::slice::Iter<'a, Option<Box<Node<K, V>>>>,
    node: Option<&'a Node<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.node {
                self.node = node.next.as_deref();
                return Some((&node.key, &node.value));
            }
            match self.buckets.next() {
                Some(slot) => self.node = slot.as_deref(),
                None => return None,
            }
        }
    }
}

/// Iterator over `(&K, &mut V)` in unspecified order. Keys stay immutable
/// post-insert; only values can be mutated through iteration.
pub struct IterMut<'a, K, V> {
    buckets: core::slice::IterMut<'a, Option<Box<Node<K, V>>>>,
    node: Option<&'a mut Node<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.node.take() {
                let Node { key, value, next, .. } = node;
                self.node = next.as_deref_mut();
                return Some((&*key, value));
            }
            match self.buckets.next() {
                Some(slot) => self.node = slot.as_deref_mut(),
                None => return None,
            }
        }
    }
}

impl<K, V, S> ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Clone + Default,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            buckets: (0..INITIAL_BUCKETS).map(|_| None).collect(),
            len: 0,
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Bucket slot for a hash against the current bucket count. Hashes are
    /// unsigned, so the index is non-negative without masking; the mapping
    /// changes whenever the bucket count does, which is why growth relinks
    /// every node instead of copying the array.
    fn bucket_of(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }

    fn find_node<Q>(&self, hash: u64, key: &Q) -> Option<&Node<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut cur = self.buckets[self.bucket_of(hash)].as_deref();
        while let Some(node) = cur {
            if node.hash == hash && node.key.borrow() == key {
                return Some(node);
            }
            cur = node.next.as_deref();
        }
        None
    }

    fn find_node_mut<Q>(&mut self, hash: u64, key: &Q) -> Option<&mut Node<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let idx = self.bucket_of(hash);
        let mut cur = self.buckets[idx].as_deref_mut();
        while let Some(node) = cur {
            if node.hash == hash && node.key.borrow() == key {
                return Some(node);
            }
            cur = node.next.as_deref_mut();
        }
        None
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current bucket count. Starts at 10, only ever doubles, and returns
    /// to 10 on [`clear`](ChainedHashMap::clear).
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(key);
        self.find_node(hash, key).map(|node| &node.value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(key);
        self.find_node_mut(hash, key).map(|node| &mut node.value)
    }

    /// True iff a mapping for `key` exists.
    ///
    /// Values are plain `V` with no nullable sentinel, so "key present" and
    /// "key absent" are distinct by construction. Map designs that admit a
    /// stored null cannot tell a null value from a missing key here; this
    /// API rules that confusion out rather than documenting around it.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(key);
        self.find_node(hash, key).is_some()
    }

    /// True iff at least one entry stores `value`. Scans every chain.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.iter().any(|(_, v)| v == value)
    }

    /// Inserts or updates a mapping. An existing entry is updated in place
    /// and its previous value returned; a new entry is pushed at its chain
    /// head and `None` returned. If the insertion lifts the load factor
    /// above 0.7, the bucket array doubles before this returns.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.make_hash(&key);
        if let Some(node) = self.find_node_mut(hash, &key) {
            return Some(mem::replace(&mut node.value, value));
        }
        self.push_entry(hash, key, value);
        None
    }

    /// Inserts only if `key` has no mapping, returning `None`; otherwise
    /// returns the existing value untouched and drops the offered one.
    pub fn insert_if_absent(&mut self, key: K, value: V) -> Option<&V> {
        let hash = self.make_hash(&key);
        if self.find_node(hash, &key).is_none() {
            self.push_entry(hash, key, value);
            return None;
        }
        self.find_node(hash, &key).map(|node| &node.value)
    }

    fn push_entry(&mut self, hash: u64, key: K, value: V) {
        let idx = self.bucket_of(hash);
        let next = self.buckets[idx].take();
        self.buckets[idx] = Some(Box::new(Node {
            key,
            value,
            hash,
            next,
        }));
        self.len += 1;
        if self.len as f64 / self.buckets.len() as f64 > MAX_LOAD_FACTOR {
            self.grow();
        }
    }

    /// Doubles the bucket array and relinks every node against the new
    /// count. Nodes move without their data being copied, and relinking
    /// works off the cached hashes against the already-doubled count, so it
    /// can neither invoke `K: Hash` nor trigger a nested growth.
    fn grow(&mut self) {
        let doubled = self.buckets.len() * 2;
        let old = mem::replace(&mut self.buckets, (0..doubled).map(|_| None).collect());
        for mut head in old {
            while let Some(mut node) = head {
                head = node.next.take();
                let idx = self.bucket_of(node.hash);
                node.next = self.buckets[idx].take();
                self.buckets[idx] = Some(node);
            }
        }
    }

    /// Unlinks and returns the value mapped to `key`, relinking the
    /// predecessor (or bucket head) around the removed node.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(key);
        let idx = self.bucket_of(hash);
        let mut link = &mut self.buckets[idx];
        loop {
            match link {
                None => return None,
                Some(node) if node.hash == hash && node.key.borrow() == key => {
                    let mut node = link.take()?;
                    *link = node.next.take();
                    self.len -= 1;
                    return Some(node.value);
                }
                Some(node) => link = &mut node.next,
            }
        }
    }

    /// Removes the mapping only if its current value equals `expected`.
    /// Returns whether a removal happened.
    pub fn remove_exact<Q>(&mut self, key: &Q, expected: &V) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: PartialEq,
    {
        let hash = self.make_hash(key);
        match self.find_node(hash, key) {
            Some(node) if node.value == *expected => {}
            _ => return false,
        }
        self.remove(key).is_some()
    }

    /// Updates the value for `key` only if a mapping exists, returning the
    /// previous value. Chain structure and `len` are untouched.
    pub fn replace<Q>(&mut self, key: &Q, value: V) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(key);
        self.find_node_mut(hash, key)
            .map(|node| mem::replace(&mut node.value, value))
    }

    /// Updates the value for `key` only if it currently equals `expected`.
    /// Returns whether an update happened.
    pub fn replace_exact<Q>(&mut self, key: &Q, expected: &V, value: V) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: PartialEq,
    {
        let hash = self.make_hash(key);
        match self.find_node_mut(hash, key) {
            Some(node) if node.value == *expected => {
                node.value = value;
                true
            }
            _ => false,
        }
    }

    /// Materialized snapshot of all keys, unordered. Distinct by the
    /// table-wide uniqueness invariant. Decoupled from the live table:
    /// later mutations do not affect the returned vector.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Materialized snapshot of all `(key, value)` pairs, unordered and
    /// decoupled from the live table.
    pub fn entries(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            node: None,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            buckets: self.buckets.iter_mut(),
            node: None,
        }
    }

    /// Discards every entry and resets capacity to the initial 10 buckets.
    /// An explicit reset, not a shrink policy: this is the only operation
    /// that ever reduces the bucket count.
    pub fn clear(&mut self) {
        self.unlink_all();
        self.buckets = (0..INITIAL_BUCKETS).map(|_| None).collect();
        self.len = 0;
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        let n = self.buckets.len() as u64;
        let mut counted = 0usize;
        for (i, slot) in self.buckets.iter().enumerate() {
            let mut cur = slot.as_deref();
            while let Some(node) = cur {
                assert_eq!(
                    (node.hash % n) as usize,
                    i,
                    "node chained under the wrong bucket"
                );
                counted += 1;
                cur = node.next.as_deref();
            }
        }
        assert_eq!(counted, self.len, "len out of sync with chained entries");
        assert!(
            self.len as f64 / self.buckets.len() as f64 <= MAX_LOAD_FACTOR,
            "load factor exceeded: {}/{}",
            self.len,
            self.buckets.len()
        );
    }
}

impl<K, V, S> ChainedHashMap<K, V, S> {
    // Chains are unlinked front to back so teardown never recurses
    // chain-deep.
    fn unlink_all(&mut self) {
        for slot in &mut self.buckets {
            let mut head = slot.take();
            while let Some(mut node) = head {
                head = node.next.take();
            }
        }
    }
}

impl<K, V, S> Drop for ChainedHashMap<K, V, S> {
    fn drop(&mut self) {
        self.unlink_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::hash::Hasher;
    use std::collections::BTreeSet;

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
        } // force all keys into the same chain
    }

    /// Invariant: an updating insert returns the previous value, leaves
    /// `len` unchanged, and later lookups observe the new value.
    #[test]
    fn insert_updates_in_place() {
        let mut m: ChainedHashMap<String, i32> = ChainedHashMap::new();
        assert_eq!(m.insert("k".to_string(), 1), None);
        assert_eq!(m.insert("k".to_string(), 2), Some(1));
        assert_eq!(m.len(), 1);
        assert_eq!(m.get("k"), Some(&2));
        m.check_invariants();
    }

    /// Invariant: `get(k).is_some() == contains_key(k)` for present and
    /// absent keys.
    #[test]
    fn get_contains_parity() {
        let mut m: ChainedHashMap<String, i32> = ChainedHashMap::new();
        for (i, k) in ["a", "b", "c"].iter().enumerate() {
            m.insert((*k).to_string(), i as i32);
        }
        for k in ["a", "b", "c"] {
            assert!(m.get(k).is_some());
            assert!(m.contains_key(k));
        }
        for k in ["x", "y", "z"] {
            assert!(m.get(k).is_none());
            assert!(!m.contains_key(k));
        }
    }

    /// Invariant: borrowed lookup works (store `String`, query with `&str`).
    #[test]
    fn borrowed_lookup_with_str() {
        let mut m: ChainedHashMap<String, i32> = ChainedHashMap::new();
        m.insert("hello".to_string(), 1);
        assert!(m.contains_key("hello"));
        assert!(!m.contains_key("world"));
        assert_eq!(m.remove("hello"), Some(1));
        assert_eq!(m.remove("hello"), None);
    }

    /// Invariant: all operations resolve the right entry when every key
    /// lands in one chain; removal relinks correctly at the head, middle,
    /// and tail of the chain.
    #[test]
    fn collision_chain_removal_relinks() {
        for victim in ["a", "b", "c"] {
            let mut m: ChainedHashMap<String, i32, ConstBuildHasher> =
                ChainedHashMap::with_hasher(ConstBuildHasher);
            m.insert("a".to_string(), 1);
            m.insert("b".to_string(), 2);
            m.insert("c".to_string(), 3);
            m.check_invariants();

            let expected = match victim {
                "a" => 1,
                "b" => 2,
                _ => 3,
            };
            assert_eq!(m.remove(victim), Some(expected));
            assert_eq!(m.len(), 2);
            m.check_invariants();

            for survivor in ["a", "b", "c"] {
                if survivor == victim {
                    assert!(!m.contains_key(survivor));
                } else {
                    assert!(m.contains_key(survivor));
                }
            }
        }
    }

    /// Invariant: pushing the entry count past 0.7 of the bucket count
    /// doubles the buckets before the insert returns, preserving every
    /// mapping; the 8th insert into a fresh table crosses 8/10.
    #[test]
    fn growth_doubles_at_load_factor() {
        let mut m: ChainedHashMap<i64, String> = ChainedHashMap::new();
        for i in 1..=7 {
            m.insert(i, format!("v{i}"));
        }
        assert_eq!(m.bucket_count(), 10); // 7/10 is at the threshold, not over
        m.insert(8, "v8".to_string());
        assert_eq!(m.bucket_count(), 20);
        assert_eq!(m.len(), 8);
        for i in 1..=8 {
            assert_eq!(m.get(&i), Some(&format!("v{i}")));
        }
        m.check_invariants();
    }

    /// Invariant: growth also holds when every key collides; the chain is
    /// relinked into the doubled array using cached hashes only.
    #[test]
    fn growth_under_full_collision() {
        let mut m: ChainedHashMap<i64, i64, ConstBuildHasher> =
            ChainedHashMap::with_hasher(ConstBuildHasher);
        for i in 0..32 {
            m.insert(i, i * 10);
            m.check_invariants();
        }
        assert_eq!(m.len(), 32);
        for i in 0..32 {
            assert_eq!(m.get(&i), Some(&(i * 10)));
        }
    }

    /// Invariant: `clear` restores the freshly constructed state, including
    /// the initial bucket count, and the table behaves fresh afterwards.
    #[test]
    fn clear_resets_capacity() {
        let mut m: ChainedHashMap<i64, i64> = ChainedHashMap::new();
        for i in 0..50 {
            m.insert(i, i);
        }
        assert!(m.bucket_count() > 10);

        m.clear();
        assert_eq!(m.len(), 0);
        assert!(m.is_empty());
        assert_eq!(m.bucket_count(), 10);
        assert_eq!(m.get(&1), None);
        m.check_invariants();

        m.insert(1, 100);
        assert_eq!(m.get(&1), Some(&100));
        assert_eq!(m.len(), 1);
    }

    /// Invariant: `iter` visits each live entry exactly once; `iter_mut`
    /// updates are observed by subsequent lookups.
    #[test]
    fn iteration_and_mutation() {
        let mut m: ChainedHashMap<String, i32> = ChainedHashMap::new();
        let keys = ["k1", "k2", "k3"];
        for (i, k) in keys.iter().enumerate() {
            m.insert((*k).to_string(), i as i32);
        }

        let seen: BTreeSet<String> = m.iter().map(|(k, _)| k.clone()).collect();
        let expected: BTreeSet<String> = keys.iter().map(|s| (*s).to_string()).collect();
        assert_eq!(seen, expected);

        for (_, v) in m.iter_mut() {
            *v += 10;
        }
        assert_eq!(m.get("k1"), Some(&10));
        assert_eq!(m.get("k2"), Some(&11));
        assert_eq!(m.get("k3"), Some(&12));
    }

    /// Invariant: a long single chain tears down without recursing, both on
    /// `clear` and on drop.
    #[test]
    fn deep_chain_teardown() {
        let mut m: ChainedHashMap<i64, i64, ConstBuildHasher> =
            ChainedHashMap::with_hasher(ConstBuildHasher);
        for i in 0..10_000 {
            m.insert(i, i);
        }
        m.clear();
        assert!(m.is_empty());

        let mut m2: ChainedHashMap<i64, i64, ConstBuildHasher> =
            ChainedHashMap::with_hasher(ConstBuildHasher);
        for i in 0..10_000 {
            m2.insert(i, i);
        }
        drop(m2);
    }
}
