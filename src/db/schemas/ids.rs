//! Document identifiers and id sets
//!
//! Child records reference their owner by the owner's id rendered as a
//! string (`parent_id: "5f0c..."`), while the owner's own `_id` is usually a
//! native `ObjectId`. Ids are therefore compared by their string key.

use bson::Bson;
use std::collections::BTreeMap;

/// String key of a document id, if the id has a comparable form
pub fn id_key(id: &Bson) -> Option<String> {
    match id {
        Bson::ObjectId(oid) => Some(oid.to_hex()),
        Bson::String(s) => Some(s.clone()),
        Bson::Int32(n) => Some(n.to_string()),
        Bson::Int64(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Ordered set of document ids, keyed by [`id_key`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdSet {
    ids: BTreeMap<String, Bson>,
}

impl IdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an id. Returns false if it has no key or is already present.
    pub fn insert(&mut self, id: Bson) -> bool {
        match id_key(&id) {
            Some(key) if !self.ids.contains_key(&key) => {
                self.ids.insert(key, id);
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.ids.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.ids.keys().map(String::as_str)
    }

    /// Values for an `$in` filter on a reference field.
    ///
    /// Each id contributes its string key, and also its native value when
    /// that differs, so references stored either way are matched.
    // Wider than a string-only match: native ObjectId references count too.
    pub fn membership_values(&self) -> Vec<Bson> {
        let mut values = Vec::with_capacity(self.ids.len() * 2);
        for (key, raw) in &self.ids {
            values.push(Bson::String(key.clone()));
            if !matches!(raw, Bson::String(_)) {
                values.push(raw.clone());
            }
        }
        values
    }
}

impl FromIterator<Bson> for IdSet {
    fn from_iter<I: IntoIterator<Item = Bson>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;

    #[test]
    fn test_id_key_forms() {
        let oid = ObjectId::parse_str("5f0c3b0e9d1a2b3c4d5e6f70").unwrap();
        assert_eq!(
            id_key(&Bson::ObjectId(oid)).as_deref(),
            Some("5f0c3b0e9d1a2b3c4d5e6f70")
        );
        assert_eq!(id_key(&Bson::String("org1".into())).as_deref(), Some("org1"));
        assert_eq!(id_key(&Bson::Int64(42)).as_deref(), Some("42"));
        assert_eq!(id_key(&Bson::Null), None);
    }

    #[test]
    fn test_insert_deduplicates_by_key() {
        let oid = ObjectId::parse_str("5f0c3b0e9d1a2b3c4d5e6f70").unwrap();
        let mut set = IdSet::new();
        assert!(set.insert(Bson::ObjectId(oid)));
        assert!(!set.insert(Bson::String(oid.to_hex())));
        assert!(!set.insert(Bson::Null));
        assert_eq!(set.len(), 1);
        assert!(set.contains("5f0c3b0e9d1a2b3c4d5e6f70"));
    }

    #[test]
    fn test_membership_values_include_native_ids() {
        let oid = ObjectId::parse_str("5f0c3b0e9d1a2b3c4d5e6f70").unwrap();
        let set: IdSet = vec![Bson::String("org1".into()), Bson::ObjectId(oid)]
            .into_iter()
            .collect();

        let values = set.membership_values();
        assert_eq!(values.len(), 3);
        assert!(values.contains(&Bson::String("org1".into())));
        assert!(values.contains(&Bson::String(oid.to_hex())));
        assert!(values.contains(&Bson::ObjectId(oid)));
    }

    #[test]
    fn test_keys_are_sorted() {
        let set: IdSet = ["b", "a", "c"]
            .into_iter()
            .map(|s| Bson::String(s.to_string()))
            .collect();
        assert_eq!(set.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert!(!set.is_empty());
    }
}
