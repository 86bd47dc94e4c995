//! EntityStore - Records of one entity type plus their secondary indexes
//!
//! Records are listed in insertion order. Every mutation keeps the indexes
//! named by `T::INDEXES` in step with the primary map, so callers never
//! maintain an index themselves.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use bureau::domain::services::query::{matches, validate_filter};
use bureau::{Clock, DomainError, Entity, Filter, IdGenerator};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::index::SecondaryIndex;

/// Attempts before giving up on a generator that keeps colliding
const MAX_ID_ATTEMPTS: usize = 16;

#[derive(Debug)]
struct Slot<T> {
    seq: u64,
    entity: T,
}

pub struct EntityStore<T: Entity> {
    records: HashMap<Uuid, Slot<T>>,
    order: BTreeMap<u64, Uuid>,
    next_seq: u64,
    indexes: Vec<SecondaryIndex>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

fn index_entity<T: Entity>(indexes: &mut [SecondaryIndex], entity: &T) {
    for index in indexes.iter_mut() {
        index.insert(&entity.index_keys(index.name()), entity.id());
    }
}

fn unindex_entity<T: Entity>(indexes: &mut [SecondaryIndex], entity: &T) {
    for index in indexes.iter_mut() {
        index.remove(&entity.index_keys(index.name()), entity.id());
    }
}

/// Next `updated_at`, strictly after `previous`
fn bump(clock: &dyn Clock, previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = clock.now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

impl<T: Entity> EntityStore<T> {
    pub fn new(ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: HashMap::new(),
            order: BTreeMap::new(),
            next_seq: 0,
            indexes: T::INDEXES.iter().copied().map(SecondaryIndex::new).collect(),
            ids,
            clock,
        }
    }

    fn fresh_id(&self) -> Result<Uuid, DomainError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_id();
            if !self.records.contains_key(&id) {
                return Ok(id);
            }
        }
        Err(DomainError::Repository(format!(
            "id generator produced {MAX_ID_ATTEMPTS} colliding ids for {}",
            T::ENTITY_TYPE
        )))
    }

    pub fn create(&mut self, draft: T::Draft) -> Result<T, DomainError> {
        let id = self.fresh_id()?;
        let entity = T::from_draft(id, self.clock.now(), draft);
        index_entity(&mut self.indexes, &entity);

        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, id);
        self.records.insert(
            id,
            Slot {
                seq,
                entity: entity.clone(),
            },
        );
        Ok(entity)
    }

    pub fn get(&self, id: Uuid) -> Option<T> {
        self.records.get(&id).map(|slot| slot.entity.clone())
    }

    pub fn all(&self) -> Vec<T> {
        self.order
            .values()
            .filter_map(|id| self.records.get(id))
            .map(|slot| slot.entity.clone())
            .collect()
    }

    pub fn filter(&self, filter: &Filter) -> Result<Vec<T>, DomainError> {
        validate_filter::<T>(filter)?;
        Ok(self
            .order
            .values()
            .filter_map(|id| self.records.get(id))
            .filter(|slot| matches(&slot.entity, filter))
            .map(|slot| slot.entity.clone())
            .collect())
    }

    pub fn by_index(&self, name: &str, key: &str) -> Result<Vec<T>, DomainError> {
        let index = self
            .indexes
            .iter()
            .find(|index| index.name() == name)
            .ok_or_else(|| {
                DomainError::validation(
                    "index",
                    format!("{} has no index named `{name}`", T::ENTITY_TYPE),
                )
            })?;

        let mut slots: Vec<&Slot<T>> = index
            .lookup(key)
            .filter_map(|id| self.records.get(&id))
            .collect();
        slots.sort_by_key(|slot| slot.seq);
        Ok(slots.into_iter().map(|slot| slot.entity.clone()).collect())
    }

    pub fn update(&mut self, id: Uuid, patch: T::Patch) -> Result<T, DomainError> {
        let mut next = self
            .records
            .get(&id)
            .map(|slot| slot.entity.clone())
            .ok_or_else(|| DomainError::not_found(T::ENTITY_TYPE, id))?;
        next.apply_patch(patch);
        self.commit(id, next)
    }

    /// Run `change` on a copy of the current entity and commit it on success
    pub fn modify(
        &mut self,
        id: Uuid,
        change: impl FnOnce(&mut T) -> Result<(), DomainError>,
    ) -> Result<T, DomainError> {
        let mut next = self
            .records
            .get(&id)
            .map(|slot| slot.entity.clone())
            .ok_or_else(|| DomainError::not_found(T::ENTITY_TYPE, id))?;
        change(&mut next)?;
        self.commit(id, next)
    }

    fn commit(&mut self, id: Uuid, mut next: T) -> Result<T, DomainError> {
        let slot = self
            .records
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(T::ENTITY_TYPE, id))?;

        next.set_timestamps(
            slot.entity.created_at(),
            bump(self.clock.as_ref(), slot.entity.updated_at()),
        );
        let previous = std::mem::replace(&mut slot.entity, next);
        unindex_entity(&mut self.indexes, &previous);
        index_entity(&mut self.indexes, &slot.entity);
        Ok(slot.entity.clone())
    }

    pub fn delete(&mut self, id: Uuid) -> bool {
        match self.records.remove(&id) {
            Some(slot) => {
                self.order.remove(&slot.seq);
                unindex_entity(&mut self.indexes, &slot.entity);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether any index still files `id`
    pub fn indexed_anywhere(&self, id: Uuid) -> bool {
        self.indexes.iter().any(|index| index.contains_id(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{ManualClock, SequentialIds};
    use bureau::domain::{DocumentPatch, NewDocument};
    use bureau::{Document, FilterClause};

    fn store() -> (EntityStore<Document>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = EntityStore::new(Arc::new(SequentialIds::new()), clock.clone());
        (store, clock)
    }

    fn pdf(title: &str, tags: &[&str]) -> NewDocument {
        NewDocument::new(title, "application/pdf", 1024)
            .with_tags(tags.iter().map(|t| t.to_string()).collect())
    }

    #[test]
    fn test_create_then_get_round_trips() {
        let (mut store, _) = store();
        let created = store.create(pdf("Invoice March", &["finance"])).unwrap();
        assert_eq!(store.get(created.id), Some(created.clone()));
        assert_eq!(created.created_at, created.updated_at);
    }

    #[test]
    fn test_delete_clears_every_index() {
        let (mut store, _) = store();
        let doc = store.create(pdf("Invoice March", &["finance", "q1"])).unwrap();
        assert!(store.indexed_anywhere(doc.id));

        assert!(store.delete(doc.id));
        assert_eq!(store.get(doc.id), None);
        assert!(!store.indexed_anywhere(doc.id));
        assert!(store.by_index(Document::BY_TAG, "finance").unwrap().is_empty());
        assert!(!store.delete(doc.id));
    }

    #[test]
    fn test_update_moves_index_keys() {
        let (mut store, _) = store();
        let doc = store.create(pdf("Budget", &["draft"])).unwrap();
        store
            .update(
                doc.id,
                DocumentPatch {
                    tags: Some(vec!["Final".to_string()]),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(store.by_index(Document::BY_TAG, "draft").unwrap().is_empty());
        let found = store.by_index(Document::BY_TAG, "final").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tags, vec!["Final".to_string()]);
    }

    #[test]
    fn test_updated_at_strictly_increases_on_a_frozen_clock() {
        let (mut store, _) = store();
        let doc = store.create(pdf("Budget", &[])).unwrap();
        let first = store
            .update(doc.id, DocumentPatch { title: Some("Budget v2".into()), ..Default::default() })
            .unwrap();
        let second = store
            .update(doc.id, DocumentPatch { title: Some("Budget v3".into()), ..Default::default() })
            .unwrap();
        assert!(first.updated_at > doc.updated_at);
        assert!(second.updated_at > first.updated_at);
        assert_eq!(second.created_at, doc.created_at);
    }

    #[test]
    fn test_updated_at_follows_an_advancing_clock() {
        let (mut store, clock) = store();
        let doc = store.create(pdf("Budget", &[])).unwrap();
        clock.advance(Duration::minutes(5));
        let updated = store.modify(doc.id, |_| Ok(())).unwrap();
        assert_eq!(updated.updated_at, doc.created_at + Duration::minutes(5));
    }

    #[test]
    fn test_modify_reindexes_on_success_and_keeps_entity_on_failure() {
        let (mut store, _) = store();
        let doc = store.create(pdf("Budget", &["draft"])).unwrap();

        let err = store
            .modify(doc.id, |d| {
                d.tags = vec!["lost".to_string()];
                Err(DomainError::validation("tags", "refused"))
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed { .. }));
        assert_eq!(store.get(doc.id), Some(doc.clone()));
        assert!(store.by_index(Document::BY_TAG, "lost").unwrap().is_empty());

        let saved = store
            .modify(doc.id, |d| {
                d.tags = vec!["final".to_string()];
                Ok(())
            })
            .unwrap();
        assert_eq!(saved.id, doc.id);
        assert!(saved.updated_at > doc.updated_at);
        assert!(store.by_index(Document::BY_TAG, "draft").unwrap().is_empty());
        assert_eq!(store.by_index(Document::BY_TAG, "final").unwrap(), vec![saved]);

        assert!(matches!(
            store.modify(Uuid::from_u128(999), |_| Ok(())),
            Err(DomainError::NotFound { .. })
        ));
    }

    #[test]
    fn test_find_where_is_ordered_subset() {
        let (mut store, _) = store();
        for (title, tag) in [("A", "x"), ("B", "y"), ("C", "x"), ("D", "x")] {
            store.create(pdf(title, &[tag])).unwrap();
        }
        let filter = Filter::new().and(FilterClause::equals("tags", "x"));
        let found = store.filter(&filter).unwrap();
        let expected: Vec<Document> = store
            .all()
            .into_iter()
            .filter(|d| d.tags.contains(&"x".to_string()))
            .collect();
        assert_eq!(found, expected);
        assert_eq!(
            found.iter().map(|d| d.title.as_str()).collect::<Vec<_>>(),
            vec!["A", "C", "D"]
        );
    }

    #[test]
    fn test_index_lookup_keeps_insertion_order_and_rejects_unknown_names() {
        let (mut store, _) = store();
        let ids: Vec<Uuid> = (0..3)
            .map(|i| store.create(pdf(&format!("Doc {i}"), &["shared"])).unwrap().id)
            .collect();
        let found: Vec<Uuid> = store
            .by_index(Document::BY_TAG, "shared")
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(found, ids);

        assert!(matches!(
            store.by_index("colour", "red"),
            Err(DomainError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn test_missing_ids_are_not_found() {
        let (mut store, _) = store();
        let ghost = Uuid::from_u128(999);
        assert!(matches!(
            store.update(ghost, DocumentPatch::default()),
            Err(DomainError::NotFound { .. })
        ));
    }

    struct StuckIds;
    impl IdGenerator for StuckIds {
        fn next_id(&self) -> Uuid {
            Uuid::from_u128(42)
        }
    }

    #[test]
    fn test_colliding_generator_is_reported() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let mut store: EntityStore<Document> = EntityStore::new(Arc::new(StuckIds), clock);
        store.create(pdf("First", &[])).unwrap();
        assert!(matches!(
            store.create(pdf("Second", &[])),
            Err(DomainError::Repository(_))
        ));
        assert_eq!(store.len(), 1);
    }
}
