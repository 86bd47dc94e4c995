//! Domain Layer
//!
//! Pure domain logic without infrastructure dependencies.
//! Contains entities, value objects, domain services, configuration and errors.

pub mod config;
pub mod entities;
pub mod errors;
pub mod services;
pub mod value_objects;

// Re-exports for convenience
pub use config::*;
pub use entities::*;
pub use errors::*;
pub use services::{Scored, Searchable};
pub use value_objects::*;
