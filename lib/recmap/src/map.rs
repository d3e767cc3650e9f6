use std::hash::Hash;

use derive_where::derive_where;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::FxIndexMap;

/// An immutable mapping from scalar keys to non-null values, stored and
/// serialized as a flat record.
///
/// Absence is the only "no value" state: [`get`](Self::get) returns an
/// [`Option`] and there is no way to store an absent marker. Storing
/// `Option<V>` values would re-introduce a second "missing" state and defeat
/// the point; don't.
///
/// Every edit operation is copy-on-write: it returns a new map and leaves the
/// receiver untouched, even when the edit changes nothing.
#[derive_where(Default)]
#[derive(Clone, Debug)]
pub struct RecMap<K, V> {
    entries: FxIndexMap<K, V>,
}

impl<K, V> RecMap<K, V>
where
    K: Hash + Eq,
{
    /// Creates a map with no entries.
    pub fn empty() -> Self {
        RecMap { entries: FxIndexMap::default() }
    }

    /// Builds a map from `(key, value)` pairs. On a duplicate key the last
    /// value wins; the first occurrence fixes the key's position.
    pub fn from_entries(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        let mut entries = FxIndexMap::default();
        for (key, value) in pairs {
            entries.insert(key, value);
        }
        RecMap { entries }
    }

    /// Indexes `items` by a derived key. The key function also receives the
    /// item's position in the input. On a key collision the last item wins.
    pub fn from_indexing<I, F>(items: I, mut key_of: F) -> Self
    where
        I: IntoIterator<Item = V>,
        F: FnMut(&V, usize) -> K,
    {
        let mut entries = FxIndexMap::default();
        for (idx, item) in items.into_iter().enumerate() {
            entries.insert(key_of(&item, idx), item);
        }
        RecMap { entries }
    }

    /// Looks up `key`. Absence is not an error; it is the `None` case.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Whether `key` holds a value. Presence is independent of the value
    /// itself; a stored `0`, `false`, or `""` still counts.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of present entries. Always equals `self.keys().count()`.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Present keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// Values, aligned with [`keys`](Self::keys).
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }

    /// `(key, value)` pairs, aligned with [`keys`](Self::keys).
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }
}

impl<K, V> RecMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Returns a copy of this map with `value` stored at `key`. Overwriting
    /// an existing key keeps its original iteration position; a new key is
    /// appended at the end.
    #[must_use]
    pub fn set(&self, key: K, value: V) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(key, value);
        RecMap { entries }
    }

    /// Returns a copy of this map without `key`, preserving the order of the
    /// remaining entries. Removing an absent key is not an error; the result
    /// is simply content-equal to the receiver.
    #[must_use]
    pub fn remove(&self, key: &K) -> Self {
        let mut entries = self.entries.clone();
        entries.shift_remove(key);
        RecMap { entries }
    }

    /// Keeps only the entries whose key appears in `keys`. Requested keys
    /// that are absent are silently ignored. The result keeps this map's own
    /// entry order, not the order of `keys`.
    #[must_use]
    pub fn pick(&self, keys: &[K]) -> Self {
        let wanted: FxHashSet<&K> = keys.iter().collect();
        self.iter()
            .filter(|(key, _)| wanted.contains(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Drops every entry whose key appears in `keys`.
    #[must_use]
    pub fn omit(&self, keys: &[K]) -> Self {
        let dropped: FxHashSet<&K> = keys.iter().collect();
        self.iter()
            .filter(|(key, _)| !dropped.contains(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Overlays `overlay` on top of this map. On a key collision the
    /// overlay's value wins; collided keys keep their position in the base
    /// and keys new to the overlay are appended in its order.
    #[must_use]
    pub fn union(&self, overlay: &Self) -> Self {
        let mut entries = self.entries.clone();
        for (key, value) in &overlay.entries {
            entries.insert(key.clone(), value.clone());
        }
        RecMap { entries }
    }
}

impl<K, V> RecMap<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Transforms every value, keeping keys and their order. The transform
    /// also receives the key.
    #[must_use]
    pub fn map_values<V2, F>(&self, mut f: F) -> RecMap<K, V2>
    where
        F: FnMut(&K, &V) -> V2,
    {
        RecMap {
            entries: self
                .entries
                .iter()
                .map(|(key, value)| (key.clone(), f(key, value)))
                .collect(),
        }
    }
}

impl<K, T> RecMap<K, Vec<T>>
where
    K: Hash + Eq,
{
    /// Groups `items` by a derived key. Items sharing a key accumulate into
    /// one group in their input order; groups appear in order of their first
    /// item.
    pub fn from_grouping<I, F>(items: I, mut key_of: F) -> Self
    where
        I: IntoIterator<Item = T>,
        F: FnMut(&T, usize) -> K,
    {
        let mut entries: FxIndexMap<K, Vec<T>> = FxIndexMap::default();
        for (idx, item) in items.into_iter().enumerate() {
            entries.entry(key_of(&item, idx)).or_default().push(item);
        }
        RecMap { entries }
    }
}

impl<K> RecMap<K, usize>
where
    K: Hash + Eq,
{
    /// Counts how many items derive each key.
    pub fn from_counting<T, I, F>(items: I, mut key_of: F) -> Self
    where
        I: IntoIterator<Item = T>,
        F: FnMut(&T, usize) -> K,
    {
        let mut entries: FxIndexMap<K, usize> = FxIndexMap::default();
        for (idx, item) in items.into_iter().enumerate() {
            *entries.entry(key_of(&item, idx)).or_insert(0) += 1;
        }
        RecMap { entries }
    }
}

/// Content equality, independent of entry order.
impl<K, V> PartialEq for RecMap<K, V>
where
    K: Hash + Eq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K, V> Eq for RecMap<K, V>
where
    K: Hash + Eq,
    V: Eq,
{
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for RecMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RecMap::from_entries(iter)
    }
}

impl<K: Hash + Eq, V, const N: usize> From<[(K, V); N]> for RecMap<K, V> {
    fn from(pairs: [(K, V); N]) -> Self {
        RecMap::from_entries(pairs)
    }
}

impl<K, V> IntoIterator for RecMap<K, V> {
    type Item = (K, V);
    type IntoIter = indexmap::map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a RecMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = indexmap::map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Serializes as a flat record, `{"a": 1, "b": 2}`, in iteration order.
impl<K, V> Serialize for RecMap<K, V>
where
    K: Serialize + Hash + Eq,
    V: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

/// Deserializes from a flat record. A duplicated key takes the last value,
/// matching [`RecMap::from_entries`].
impl<'de, K, V> Deserialize<'de> for RecMap<K, V>
where
    K: Deserialize<'de> + Hash + Eq,
    V: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(RecMap { entries: FxIndexMap::deserialize(deserializer)? })
    }
}
