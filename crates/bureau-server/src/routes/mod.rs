//! Bureau API Routes
//!
//! - /bureau/folders - Folder tree
//! - /bureau/documents - Documents, search and CRM links
//! - /bureau/links - Links seen from the CRM side
//! - /bureau/signatures - Signature workflows
//! - /bureau/notifications - Signer and requester inboxes
//! - /bureau/employees, /bureau/leave - HR
//! - /bureau/contacts, /bureau/segments - Marketing
//! - /bureau/deals, /bureau/pipeline - Sales

pub mod documents;
pub mod folders;
pub mod hr;
pub mod marketing;
pub mod sales;
pub mod signatures;
pub mod swagger;

use axum::http::StatusCode;
use bureau::DomainError;

/// Error half of every handler result
pub type ApiError = (StatusCode, String);

/// Map a domain failure onto its HTTP status
pub(crate) fn domain_error(err: DomainError) -> ApiError {
    let status = match &err {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::InvalidTransition { .. }
        | DomainError::DependentsExist { .. }
        | DomainError::DuplicateMembership { .. } => StatusCode::CONFLICT,
        DomainError::Repository(_) => {
            tracing::error!("Repository failure: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

pub(crate) fn not_found(entity: &str) -> ApiError {
    (StatusCode::NOT_FOUND, format!("{} not found", entity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_domain_errors_map_to_statuses() {
        let cases = [
            (DomainError::not_found("Deal", Uuid::nil()), StatusCode::NOT_FOUND),
            (DomainError::validation("title", "empty"), StatusCode::UNPROCESSABLE_ENTITY),
            (
                DomainError::invalid_transition("Deal", "won", "lead", "closed"),
                StatusCode::CONFLICT,
            ),
            (
                DomainError::dependents_exist("Folder", Uuid::nil(), 2),
                StatusCode::CONFLICT,
            ),
            (DomainError::duplicate("segment_members", "x"), StatusCode::CONFLICT),
            (
                DomainError::Repository("lock poisoned".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(domain_error(err).0, expected);
        }
    }
}
