//! Increment-only counters that remember first-seen key order.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;

/// Counter map whose iteration order is the order keys were first counted,
/// so repeated runs over the same input produce identical report rows.
#[derive(Debug)]
pub struct OrderedCounts<K> {
    counts: HashMap<K, u64>,
    order: Vec<K>,
}

impl<K> Default for OrderedCounts<K> {
    fn default() -> Self {
        OrderedCounts { counts: HashMap::new(), order: Vec::new() }
    }
}

impl<K: Eq + Hash + Clone> OrderedCounts<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the count for `key`, registering it on first sight.
    pub fn bump(&mut self, key: K) {
        match self.counts.entry(key) {
            Entry::Occupied(mut e) => *e.get_mut() += 1,
            Entry::Vacant(e) => {
                self.order.push(e.key().clone());
                e.insert(1);
            }
        }
    }

    pub fn get(&self, key: &K) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.order.iter().map(|k| (k, self.counts[k]))
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
