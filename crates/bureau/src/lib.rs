//! Bureau Domain Library
//!
//! Core domain types and interfaces for the Bureau back office: document
//! management (GED), HR, marketing and the sales pipeline.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: Core domain models (Folder, Document, SignatureWorkflow, Employee, Deal, ...)
//!   - `value_objects/`: Statuses, filter clauses and field values
//!   - `services/`: Filter evaluation, relevance scoring, folder paths
//!   - `errors/`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `repositories/`: Entity store interface
//!   - `services/`: Id and clock sources
//!
//! # Usage
//!
//! ```rust,ignore
//! use bureau::domain::{Document, Filter, FilterClause};
//! use bureau::ports::EntityRepository;
//! ```

pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    Contact, Deal, DealStage, Document, DocumentLink, DomainConfig, DomainError, Employee,
    EmployeeStatus, Entity, FieldValue, Filter, FilterClause, FilterOperator, Folder,
    LeaveRequest, LeaveStatus, LinkedEntityType, Notification, Scored, Searchable, Segment,
    SignatureStep, SignatureWorkflow, StepStatus, Validate, WorkflowStatus,
};
pub use ports::{
    // Storage
    EntityRepository,
    Mutation,
    Repo,
    // Identity and time
    Clock,
    IdGenerator,
};
