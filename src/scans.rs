//! Linear scans that consume the containers from the outside: averaging
//! over shared keys, odd-key filtering, and counting pairs at a fixed
//! difference. Each needs only lookup, membership, insertion, or iteration
//! from the table, never its internals.

use crate::chained_hash_map::ChainedHashMap;
use crate::chained_hash_set::ChainedHashSet;
use core::hash::BuildHasher;

/// Mean of the values for keys present in both `map` and `keys`. Duplicate
/// keys in the slice contribute a single sample. Returns `None` when no key
/// intersects; the empty mean is undefined data, not an error.
pub fn average_of_present<S>(map: &ChainedHashMap<i64, i64, S>, keys: &[i64]) -> Option<f64>
where
    S: BuildHasher + Clone + Default,
{
    let mut seen = ChainedHashSet::new();
    let mut sum = 0i64;
    let mut count = 0u32;
    for &key in keys {
        if !seen.insert(key) {
            continue;
        }
        if let Some(&value) = map.get(&key) {
            sum += value;
            count += 1;
        }
    }
    if count == 0 {
        None
    } else {
        Some(sum as f64 / f64::from(count))
    }
}

/// Values whose keys are odd, in the table's unspecified iteration order.
/// Negative odd keys qualify.
pub fn values_with_odd_keys<V, S>(map: &ChainedHashMap<i64, V, S>) -> Vec<V>
where
    V: Clone,
    S: BuildHasher + Clone + Default,
{
    map.iter()
        .filter(|(key, _)| **key % 2 != 0)
        .map(|(_, value)| value.clone())
        .collect()
}

/// How many ordered pairs of elements in `values` differ by exactly `diff`.
/// Single pass: each element is probed against the elements seen before it,
/// in both directions, then added to the set. O(n) expected.
pub fn count_pairs_with_diff(values: &[i64], diff: i64) -> usize {
    let mut seen: ChainedHashSet<i64> = ChainedHashSet::new();
    let mut count = 0;
    for &value in values {
        if seen.contains(&(value - diff)) {
            count += 1;
        }
        if seen.contains(&(value + diff)) {
            count += 1;
        }
        seen.insert(value);
    }
    count
}
