//! Secondary index: `key -> set<id>`

use std::collections::{BTreeSet, HashMap};

use uuid::Uuid;

#[derive(Debug)]
pub struct SecondaryIndex {
    name: &'static str,
    entries: HashMap<String, BTreeSet<Uuid>>,
}

impl SecondaryIndex {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: HashMap::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn insert(&mut self, keys: &[String], id: Uuid) {
        for key in keys {
            self.entries.entry(key.clone()).or_default().insert(id);
        }
    }

    pub fn remove(&mut self, keys: &[String], id: Uuid) {
        for key in keys {
            if let Some(ids) = self.entries.get_mut(key) {
                ids.remove(&id);
                if ids.is_empty() {
                    self.entries.remove(key);
                }
            }
        }
    }

    /// Ids filed under `key`; may include ids whose record is gone
    pub fn lookup(&self, key: &str) -> impl Iterator<Item = Uuid> + '_ {
        self.entries.get(key).into_iter().flatten().copied()
    }

    /// Whether `id` is filed under any key
    pub fn contains_id(&self, id: Uuid) -> bool {
        self.entries.values().any(|ids| ids.contains(&id))
    }

    pub fn key_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_keys_are_dropped() {
        let mut index = SecondaryIndex::new("tag");
        let id = Uuid::from_u128(1);
        let keys = vec!["finance".to_string(), "q1".to_string()];
        index.insert(&keys, id);
        assert_eq!(index.key_count(), 2);
        assert_eq!(index.lookup("q1").collect::<Vec<_>>(), vec![id]);

        index.remove(&keys, id);
        assert_eq!(index.key_count(), 0);
        assert!(!index.contains_id(id));
        assert_eq!(index.lookup("q1").count(), 0);
    }
}
