use std::{fmt, hash::Hash, marker::PhantomData};

use derive_where::derive_where;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};

use crate::{FxIndexSet, Variants};

/// An immutable set of scalar keys, stored and serialized as a flat record
/// whose values are all `true`.
///
/// Edits are copy-on-write, like [`RecMap`](crate::RecMap): every operation
/// returns a new set, even when the edit changes nothing.
#[derive_where(Default)]
#[derive(Clone, Debug)]
pub struct RecSet<K> {
    keys: FxIndexSet<K>,
}

impl<K> RecSet<K>
where
    K: Hash + Eq,
{
    /// Creates a set with no members.
    pub fn empty() -> Self {
        RecSet { keys: FxIndexSet::default() }
    }

    /// Builds a set from keys, de-duplicating. The first occurrence of a key
    /// fixes its position.
    pub fn from_keys(keys: impl IntoIterator<Item = K>) -> Self {
        RecSet { keys: keys.into_iter().collect() }
    }

    /// Whether `key` is a member.
    pub fn contains(&self, key: &K) -> bool {
        self.keys.contains(key)
    }

    /// Number of members. Always equals `self.iter().count()`.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.keys.iter()
    }
}

impl<K> RecSet<K>
where
    K: Variants + Hash + Eq + Clone,
{
    /// The set of every declared variant of the enum key domain `K`, in
    /// declaration order.
    pub fn from_enum() -> Self {
        RecSet::from_keys(K::ALL.iter().cloned())
    }
}

impl<K> RecSet<K>
where
    K: Hash + Eq + Clone,
{
    /// Returns a copy of this set with `key` as a member. Adding an existing
    /// member changes nothing but still yields a fresh set.
    #[must_use]
    pub fn add(&self, key: K) -> Self {
        let mut keys = self.keys.clone();
        keys.insert(key);
        RecSet { keys }
    }

    /// Returns a copy of this set without `key`, preserving the order of the
    /// remaining members. Removing a non-member is not an error.
    #[must_use]
    pub fn remove(&self, key: &K) -> Self {
        let mut keys = self.keys.clone();
        keys.shift_remove(key);
        RecSet { keys }
    }

    /// Adds `key` when `enable` is true, removes it otherwise.
    #[must_use]
    pub fn toggle(&self, key: K, enable: bool) -> Self {
        if enable { self.add(key) } else { self.remove(&key) }
    }

    /// Members of either set: `self`'s members in their order, then `other`'s
    /// new members in its order.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut keys = self.keys.clone();
        keys.extend(other.keys.iter().cloned());
        RecSet { keys }
    }

    /// Members of `self` that are not in `other`, in `self`'s order. Not
    /// commutative.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        RecSet::from_keys(self.iter().filter(|key| !other.contains(key)).cloned())
    }

    /// Members present in both sets, in `self`'s order.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        RecSet::from_keys(self.iter().filter(|key| other.contains(key)).cloned())
    }

    /// The members as a plain vector, in iteration order.
    pub fn to_vec(&self) -> Vec<K> {
        self.keys.iter().cloned().collect()
    }
}

/// Content equality, independent of member order.
impl<K: Hash + Eq> PartialEq for RecSet<K> {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys
    }
}

impl<K: Hash + Eq> Eq for RecSet<K> {}

impl<K: Hash + Eq> FromIterator<K> for RecSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        RecSet::from_keys(iter)
    }
}

impl<K: Hash + Eq, const N: usize> From<[K; N]> for RecSet<K> {
    fn from(keys: [K; N]) -> Self {
        RecSet::from_keys(keys)
    }
}

impl<K> IntoIterator for RecSet<K> {
    type Item = K;
    type IntoIter = indexmap::set::IntoIter<K>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter()
    }
}

impl<'a, K> IntoIterator for &'a RecSet<K> {
    type Item = &'a K;
    type IntoIter = indexmap::set::Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

/// Serializes as a flat record with `true` for every member,
/// `{"a": true, "b": true}`, in iteration order.
impl<K> Serialize for RecSet<K>
where
    K: Serialize + Hash + Eq,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.keys.len()))?;
        for key in &self.keys {
            map.serialize_entry(key, &true)?;
        }
        map.end()
    }
}

/// Deserializes from a flat record of booleans. A key mapped to `false` is a
/// member that was knocked out by hand in the serialized record; it is
/// treated as absent rather than rejected.
impl<'de, K> Deserialize<'de> for RecSet<K>
where
    K: Deserialize<'de> + Hash + Eq,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecSetVisitor<K>(PhantomData<K>);

        impl<'de, K> Visitor<'de> for RecSetVisitor<K>
        where
            K: Deserialize<'de> + Hash + Eq,
        {
            type Value = RecSet<K>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a record mapping keys to booleans")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut keys = FxIndexSet::default();
                while let Some((key, present)) = access.next_entry::<K, bool>()? {
                    if present {
                        keys.insert(key);
                    }
                }
                Ok(RecSet { keys })
            }
        }

        deserializer.deserialize_map(RecSetVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use serde_json::json;

    use super::*;
    use crate::variants;

    variants! {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        enum Color { Red, Green, Blue }
    }

    // A token domain mixing number-shaped and string-shaped keys, the way
    // hybrid enums in dynamic hosts do.
    variants! {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        enum Tok { N1, N2, N3, A, B, C }
    }

    impl Serialize for Tok {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Tok::N1 => serializer.serialize_u64(1),
                Tok::N2 => serializer.serialize_u64(2),
                Tok::N3 => serializer.serialize_u64(3),
                Tok::A => serializer.serialize_str("a"),
                Tok::B => serializer.serialize_str("b"),
                Tok::C => serializer.serialize_str("c"),
            }
        }
    }

    #[test]
    fn from_keys_dedups_and_keeps_first_occurrence_order() {
        let set = RecSet::from(["a", "b", "c", "b"]);
        assert_eq!(set.len(), 3);
        assert_eq!(set.to_vec(), vec!["a", "b", "c"]);
    }

    #[test]
    fn add_and_remove_leave_the_original_alone() {
        let set = RecSet::from(["a", "b"]);
        let bigger = set.add("c");
        let smaller = set.remove(&"b");
        assert!(bigger.contains(&"c"));
        assert!(!smaller.contains(&"b"));
        assert_eq!(set.to_vec(), vec!["a", "b"]);
    }

    #[test]
    fn redundant_edits_are_content_noops() {
        let set = RecSet::from(["a"]);
        assert_eq!(set.add("a"), set);
        assert_eq!(set.remove(&"zzz"), set);
        assert_eq!(set.toggle("zzz", false), set);
    }

    #[test]
    fn toggle_follows_its_flag() {
        let set = RecSet::from(["a"]);
        assert!(set.toggle("b", true).contains(&"b"));
        assert!(!set.toggle("a", false).contains(&"a"));
    }

    #[test]
    fn union_members_of_either() {
        let a = RecSet::from(["a", "b"]);
        let b = RecSet::from(["b", "c"]);
        assert_eq!(a.union(&b), RecSet::from(["a", "b", "c"]));
        assert_eq!(a.union(&b).to_vec(), vec!["a", "b", "c"]);
    }

    #[test]
    fn difference_removes_members_of_the_second_operand() {
        let a = RecSet::from(["a", "b", "c"]);
        let b = RecSet::from(["b", "c", "d", "e"]);
        assert_eq!(a.difference(&b), RecSet::from(["a"]));
        // Not commutative.
        assert_eq!(b.difference(&a), RecSet::from(["d", "e"]));
    }

    #[test]
    fn intersection_keeps_common_members() {
        let a = RecSet::from(["a", "b", "c"]);
        let b = RecSet::from(["b", "c", "d"]);
        assert_eq!(a.intersection(&b), RecSet::from(["b", "c"]));
        assert_eq!(a.intersection(&RecSet::empty()), RecSet::empty());
    }

    #[test]
    fn iteration_matches_len() {
        let set = RecSet::from(["x", "y", "z"]);
        assert_eq!(set.iter().count(), set.len());
        assert_eq!(set.iter().collect_vec(), vec![&"x", &"y", &"z"]);
    }

    #[test]
    fn serializes_as_a_record_of_trues() {
        let set = RecSet::from(["a", "b"]);
        assert_eq!(serde_json::to_value(&set).unwrap(), json!({"a": true, "b": true}));
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"{"a":true,"b":true}"#);
    }

    #[test]
    fn deserialization_skips_false_members() {
        let set: RecSet<String> =
            serde_json::from_str(r#"{"a": true, "b": true, "c": false}"#).unwrap();
        assert_eq!(set, RecSet::from(["a".to_owned(), "b".to_owned()]));
        assert!(!set.contains(&"c".to_owned()));
    }

    #[test]
    fn from_enum_holds_every_declared_variant() {
        let set = RecSet::<Color>::from_enum();
        assert_eq!(set.len(), 3);
        assert!(set.contains(&Color::Red));
        assert!(set.contains(&Color::Green));
        assert!(set.contains(&Color::Blue));
        assert_eq!(set.to_vec(), vec![Color::Red, Color::Green, Color::Blue]);
    }

    #[test]
    fn from_enum_hybrid_tokens_yield_only_declared_values() {
        let set = RecSet::<Tok>::from_enum();
        assert_eq!(set.len(), 6);
        assert_eq!(
            serde_json::to_value(&set).unwrap(),
            json!({"1": true, "2": true, "3": true, "a": true, "b": true, "c": true}),
        );
    }

    #[test]
    fn enum_set_edits_compose_with_set_algebra() {
        let all = RecSet::<Color>::from_enum();
        let warm = RecSet::from([Color::Red]);
        let cool = all.difference(&warm);
        assert_eq!(cool, RecSet::from([Color::Green, Color::Blue]));
        assert_eq!(cool.union(&warm), all);
    }
}
