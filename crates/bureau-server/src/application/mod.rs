//! Application Layer (Use Cases)
//!
//! Application services orchestrate domain operations across stores.

mod document_service;
mod folder_service;
mod hr_service;
mod marketing_service;
mod pipeline_service;
mod signature_service;

#[cfg(test)]
pub(crate) mod testing;

pub use document_service::DocumentService;
pub use folder_service::FolderService;
pub use hr_service::HrService;
pub use marketing_service::MarketingService;
pub use pipeline_service::{PipelineService, StageTotals};
pub use signature_service::SignatureService;
