//! Service Ports
//!
//! Sources of identity and time injected into the stores.

mod clock;
mod ids;

pub use clock::*;
pub use ids::*;
