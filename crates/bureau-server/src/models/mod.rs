//! Bureau API Models
//!
//! Request/response DTOs documented with utoipa.
//! - GED: folders, documents, links, signatures, notifications
//! - HR: employees, leave requests
//! - Marketing: contacts, segments
//! - Sales: deals, pipeline summary

mod common;
mod ged;
mod hr;
mod marketing;
mod sales;

pub use common::*;
pub use ged::*;
pub use hr::*;
pub use marketing::*;
pub use sales::*;
