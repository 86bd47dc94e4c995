//! Domain Entities
//!
//! Pure domain models without infrastructure dependencies.
//! - GED: Folder, Document, DocumentLink, SignatureWorkflow, Notification
//! - HR: Employee, LeaveRequest
//! - Marketing: Contact, Segment
//! - Sales: Deal

mod contact;
mod deal;
mod document;
mod document_link;
mod employee;
mod entity;
mod folder;
mod leave_request;
mod notification;
mod segment;
mod signature;

pub use contact::*;
pub use deal::*;
pub use document::*;
pub use document_link::*;
pub use employee::*;
pub use entity::*;
pub use folder::*;
pub use leave_request::*;
pub use notification::*;
pub use segment::*;
pub use signature::*;
