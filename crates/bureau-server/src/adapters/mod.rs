//! Infrastructure Adapters
//!
//! Implementations of domain ports: in-memory entity stores plus the
//! id and clock sources they draw from.

pub mod clock;
pub mod ids;
pub mod memory;

// Re-exports
pub use clock::{ManualClock, SystemClock};
pub use ids::{SequentialIds, UuidV4Ids};
pub use memory::InMemoryRepository;
