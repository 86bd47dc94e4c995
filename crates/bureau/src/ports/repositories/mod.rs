//! Repository Ports
//!
//! Abstract interface for entity storage operations.

mod entity_repository;

pub use entity_repository::*;
