//! Domain Services
//!
//! Stateless logic shared by the application layer.

pub mod folder_paths;
pub mod query;
pub mod relevance;

pub use folder_paths::*;
pub use query::{apply_filter, matches, validate_filter};
pub use relevance::{rank, score, Scored, Searchable};
