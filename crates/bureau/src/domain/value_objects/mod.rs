//! Value Objects
//!
//! Immutable objects defined by their attributes rather than identity.

mod deal_stage;
mod field_value;
mod filter;
mod hr;
mod linked_entity_type;
mod workflow_status;

pub use deal_stage::*;
pub use field_value::*;
pub use filter::*;
pub use hr::*;
pub use linked_entity_type::*;
pub use workflow_status::*;
