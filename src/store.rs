/* Licensed to the Apache Software Foundation (ASF) under one
 * or more contributor license agreements.  See the NOTICE file
 * distributed with this work for additional information
 * regarding copyright ownership.  The ASF licenses this file
 * to you under the Apache License, Version 2.0 (the
 * "License"); you may not use this file except in compliance
 * with the License.  You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing,
 * software distributed under the License is distributed on an
 * "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
 * KIND, either express or implied.  See the License for the
 * specific language governing permissions and limitations
 * under the License.
 */

use ahash::AHashMap;
use std::hash::Hash;

/// The authoritative current-state table derived from the log.
///
/// Writes are unconditional: the most recently processed record always wins,
/// regardless of offset magnitude or wall-clock order. Partitions are not a
/// dimension of the table; the view is key-space complete.
#[derive(Debug, Clone)]
pub struct MaterializedStore<K, V> {
    entries: AHashMap<K, V>,
}

impl<K, V> MaterializedStore<K, V>
where
    K: Hash + Eq,
{
    pub fn new() -> Self {
        Self {
            entries: AHashMap::new(),
        }
    }

    /// The current value for `key`, or `None` if it was never set or was
    /// deleted by a tombstone.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Unconditionally overwrites the value for `key`.
    pub fn set(&mut self, key: K, value: V) {
        self.entries.insert(key, value);
    }

    /// Unconditionally deletes `key`, returning the previous value.
    ///
    /// Removing an absent key is a no-op, not an error.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops all entries, e.g. before rebuilding the view on resubscription.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates over the live table, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }
}

impl<K, V> MaterializedStore<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Takes a point-in-time copy of the table.
    ///
    /// The snapshot reflects the state at the moment of the call and can be
    /// iterated repeatedly; mutation of the store after the call is not
    /// observed by the snapshot.
    pub fn snapshot(&self) -> Snapshot<K, V> {
        Snapshot {
            entries: self
                .entries
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        }
    }
}

impl<K, V> Default for MaterializedStore<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time, restartable copy of the table taken by
/// [`MaterializedStore::snapshot`].
#[derive(Debug, Clone)]
pub struct Snapshot<K, V> {
    entries: Vec<(K, V)>,
}

impl<K, V> Snapshot<K, V> {
    pub fn iter(&self) -> impl Iterator<Item = &(K, V)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> IntoIterator for Snapshot<K, V> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
