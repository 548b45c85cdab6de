//! Property metadata (`$meta`).
//!
//! Metadata is an ordered list of human-labelled entries. On the wire each label
//! is replaced by its normalized id (see [`crate::id::normalize`]):
//!
//! ```text
//! .../{property}/$meta/$mainkey-ids     = id-1,id-2
//! .../{property}/$meta/{id}/$key        = original label
//! .../{property}/$meta/{id}/$value      = value
//! ```

use alloc::string::String;
use alloc::vec::Vec;

use crate::id;

/// A single metadata entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MetaEntry {
    id: String,
    key: String,
    value: String,
}

impl MetaEntry {
    /// Normalized id used as topic segment.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Original label, published on `$key`.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Published on `$value`.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Ordered key → value metadata of a property.
///
/// Iteration follows insertion order. Inserting an existing key replaces its
/// value without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Meta {
    entries: Vec<MetaEntry>,
}

impl Meta {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an entry, returning the previous value of `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|e| e.key == key) {
            return Some(core::mem::replace(&mut entry.value, value));
        }
        self.entries.push(MetaEntry {
            id: id::normalize(&key),
            key,
            value,
        });
        None
    }

    /// The value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }

    /// Removes `key`, returning its value. Later entries move up.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|e| e.key == key)?;
        Some(self.entries.remove(index).value)
    }

    /// Number of entries, counting keys that share an id separately.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|e| (e.key.as_str(), e.value.as_str()))
    }

    /// Iterates entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &MetaEntry> {
        self.entries.iter()
    }

    /// Distinct, non-empty ids in order of first appearance.
    ///
    /// Keys that normalize to an empty id have no topic and are left out.
    /// Keys sharing an id share its `$key`/`$value` topics; the later entry is
    /// what the broker keeps.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            if !entry.id.is_empty() && !ids.contains(&entry.id.as_str()) {
                ids.push(&entry.id);
            }
        }
        ids
    }

    /// The `$mainkey-ids` payload.
    pub fn encode_ids(&self) -> String {
        self.ids().join(",")
    }

    /// Logs keys that cannot be published one-to-one.
    pub(crate) fn report_unpublishable(&self, property: &str) {
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.id.is_empty() {
                warn!(
                    "meta key '{}' of '{}' has no usable characters; not published",
                    entry.key.as_str(),
                    property
                );
            } else if self.entries[..index].iter().any(|e| e.id == entry.id) {
                warn!(
                    "meta key '{}' of '{}' shares id '{}' with an earlier key",
                    entry.key.as_str(),
                    property,
                    entry.id.as_str()
                );
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Meta {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut meta = Meta::new();
        for (key, value) in iter {
            meta.insert(key, value);
        }
        meta
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Meta {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn keeps_insertion_order() {
        let meta = Meta::from([("c", "d"), ("a", "b")]);
        let pairs: Vec<_> = meta.iter().collect();
        assert_eq!(pairs, vec![("c", "d"), ("a", "b")]);
        assert_eq!(meta.encode_ids(), "c,a");
    }

    #[test]
    fn replacing_a_key_keeps_its_position() {
        let mut meta = Meta::from([("a", "1"), ("b", "2")]);
        assert_eq!(meta.insert("a", "3"), Some("1".into()));
        let pairs: Vec<_> = meta.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn ids_are_normalized_labels() {
        let meta = Meta::from([("Main Key", "x"), ("Gęstość", "y")]);
        assert_eq!(meta.encode_ids(), "main-key,gestosc");
        let entry = meta.entries().next().unwrap();
        assert_eq!(entry.id(), "main-key");
        assert_eq!(entry.key(), "Main Key");
        assert_eq!(entry.value(), "x");
    }

    #[test]
    fn empty_meta_has_empty_id_list() {
        assert_eq!(Meta::new().encode_ids(), "");
        assert!(Meta::new().ids().is_empty());
    }

    #[test]
    fn colliding_keys_are_kept_and_share_one_id() {
        let meta = Meta::from([("a b", "1"), ("x", "0"), ("a-b", "2")]);
        let pairs: Vec<_> = meta.iter().collect();
        assert_eq!(pairs, vec![("a b", "1"), ("x", "0"), ("a-b", "2")]);
        assert_eq!(meta.len(), 3);
        assert_eq!(meta.ids(), vec!["a-b", "x"]);
        assert_eq!(meta.encode_ids(), "a-b,x");
    }

    #[test]
    fn keys_without_usable_characters_have_no_id() {
        let meta = Meta::from([("???", "1"), ("b", "2")]);
        assert_eq!(meta.get("???"), Some("1"));
        assert_eq!(meta.encode_ids(), "b");
    }

    #[test]
    fn remove_drops_entry() {
        let mut meta = Meta::from([("a", "1"), ("b", "2")]);
        assert_eq!(meta.remove("a"), Some("1".into()));
        assert_eq!(meta.get("a"), None);
        assert_eq!(meta.get("b"), Some("2"));
        assert_eq!(meta.len(), 1);
    }
}
