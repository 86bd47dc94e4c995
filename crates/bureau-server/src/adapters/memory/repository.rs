//! In-memory implementation of EntityRepository
//!
//! Each call takes the lock once and releases it before returning, so a
//! single store operation is atomic and no lock is held across an await.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use bureau::{Clock, DomainError, Entity, EntityRepository, Filter, IdGenerator, Mutation};
use uuid::Uuid;

use super::store::EntityStore;

pub struct InMemoryRepository<T: Entity> {
    store: RwLock<EntityStore<T>>,
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new(ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: RwLock::new(EntityStore::new(ids, clock)),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, EntityStore<T>>, DomainError> {
        self.store
            .read()
            .map_err(|_| DomainError::Repository(format!("{} store lock poisoned", T::ENTITY_TYPE)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, EntityStore<T>>, DomainError> {
        self.store
            .write()
            .map_err(|_| DomainError::Repository(format!("{} store lock poisoned", T::ENTITY_TYPE)))
    }
}

#[async_trait]
impl<T: Entity> EntityRepository<T> for InMemoryRepository<T> {
    async fn create(&self, draft: T::Draft) -> Result<T, DomainError> {
        self.write()?.create(draft)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, DomainError> {
        Ok(self.read()?.get(id))
    }

    async fn find_all(&self) -> Result<Vec<T>, DomainError> {
        Ok(self.read()?.all())
    }

    async fn find_where(&self, filter: &Filter) -> Result<Vec<T>, DomainError> {
        self.read()?.filter(filter)
    }

    async fn find_by_index(&self, index: &str, key: &str) -> Result<Vec<T>, DomainError> {
        self.read()?.by_index(index, key)
    }

    async fn update(&self, id: Uuid, patch: T::Patch) -> Result<T, DomainError> {
        self.write()?.update(id, patch)
    }

    async fn modify<'a>(&self, id: Uuid, change: Mutation<'a, T>) -> Result<T, DomainError> {
        self.write()?.modify(id, change)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.write()?.delete(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{ManualClock, SequentialIds};
    use bureau::domain::{EmployeePatch, NewEmployee};
    use bureau::{Employee, Repo};
    use chrono::{NaiveDate, Utc};

    fn repo() -> Repo<Employee> {
        Arc::new(InMemoryRepository::new(
            Arc::new(SequentialIds::new()),
            Arc::new(ManualClock::new(Utc::now())),
        ))
    }

    fn hire(first: &str, department: &str, manager_id: Option<Uuid>) -> NewEmployee {
        NewEmployee {
            first_name: first.to_string(),
            last_name: "Durand".to_string(),
            email: format!("{}@bureau.test", first.to_lowercase()),
            department: department.to_string(),
            position: "Engineer".to_string(),
            manager_id,
            hire_date: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            salary: 48_000.0,
            status: None,
        }
    }

    #[tokio::test]
    async fn test_repository_round_trip_and_indexes() {
        let repo = repo();
        let lead = repo.create(hire("Ines", "Engineering", None)).await.unwrap();
        let report = repo
            .create(hire("Hugo", "Engineering", Some(lead.id)))
            .await
            .unwrap();

        assert_eq!(repo.find_by_id(report.id).await.unwrap(), Some(report.clone()));
        let reports = repo
            .find_by_index(Employee::BY_MANAGER, &lead.id.to_string())
            .await
            .unwrap();
        assert_eq!(reports, vec![report.clone()]);

        repo.update(
            report.id,
            EmployeePatch {
                manager_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(repo
            .find_by_index(Employee::BY_MANAGER, &lead.id.to_string())
            .await
            .unwrap()
            .is_empty());

        assert!(repo.delete(lead.id).await.unwrap());
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }
}
