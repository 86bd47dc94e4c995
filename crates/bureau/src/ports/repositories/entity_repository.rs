//! Entity Repository Port
//!
//! One store per entity type. Implementations assign ids and timestamps,
//! keep the secondary indexes named by [`Entity::INDEXES`] in step with
//! every mutation, and list records in insertion order.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, Entity, Filter};

/// Repository interface for any [`Entity`]
#[async_trait]
pub trait EntityRepository<T: Entity>: Send + Sync {
    /// Store a new entity built from the draft
    async fn create(&self, draft: T::Draft) -> Result<T, DomainError>;

    /// Find an entity by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, DomainError>;

    /// All entities, insertion order
    async fn find_all(&self) -> Result<Vec<T>, DomainError>;

    /// Entities satisfying every clause, insertion order
    async fn find_where(&self, filter: &Filter) -> Result<Vec<T>, DomainError>;

    /// Entities filed under `key` in the named index
    async fn find_by_index(&self, index: &str, key: &str) -> Result<Vec<T>, DomainError>;

    /// Merge a patch into an existing entity
    async fn update(&self, id: Uuid, patch: T::Patch) -> Result<T, DomainError>;

    /// Apply `change` to the stored entity and persist the result in one step
    ///
    /// No other mutation of the same store interleaves with it. When
    /// `change` fails the entity is left as it was.
    async fn modify<'a>(&self, id: Uuid, change: Mutation<'a, T>) -> Result<T, DomainError>;

    /// Delete an entity by ID
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

/// In-place change applied by [`EntityRepository::modify`]
pub type Mutation<'a, T> = Box<dyn FnOnce(&mut T) -> Result<(), DomainError> + Send + 'a>;

/// Shared handle to a repository, as held by application services
pub type Repo<T> = Arc<dyn EntityRepository<T>>;
