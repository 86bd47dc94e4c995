//! In-memory entity stores
//!
//! `EntityStore` holds the records and secondary indexes of one entity type;
//! `InMemoryRepository` puts it behind a lock and implements the repository port.

mod index;
mod repository;
mod store;

pub use index::SecondaryIndex;
pub use repository::InMemoryRepository;
pub use store::EntityStore;
