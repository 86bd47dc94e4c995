//! Domain Errors
//!
//! Error types for domain operations.

use thiserror::Error;
use uuid::Uuid;

/// Domain layer errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid transition for {entity_type}: {from} -> {to} ({reason})")]
    InvalidTransition {
        entity_type: String,
        from: String,
        to: String,
        reason: String,
    },

    #[error("{entity_type} {id} still has {dependents} dependent record(s)")]
    DependentsExist {
        entity_type: String,
        id: String,
        dependents: usize,
    },

    #[error("Validation failed on `{field}`: {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Duplicate membership in {relation}: {key}")]
    DuplicateMembership { relation: String, key: String },

    #[error("Repository error: {0}")]
    Repository(String),
}

impl DomainError {
    pub fn not_found<T: AsRef<str>>(entity_type: T, id: Uuid) -> Self {
        Self::NotFound {
            entity_type: entity_type.as_ref().to_string(),
            id: id.to_string(),
        }
    }

    pub fn not_found_str<T: AsRef<str>>(entity_type: T, id: &str) -> Self {
        Self::NotFound {
            entity_type: entity_type.as_ref().to_string(),
            id: id.to_string(),
        }
    }

    pub fn invalid_transition(
        entity_type: impl Into<String>,
        from: impl ToString,
        to: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidTransition {
            entity_type: entity_type.into(),
            from: from.to_string(),
            to: to.to_string(),
            reason: reason.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn dependents_exist(entity_type: impl Into<String>, id: Uuid, dependents: usize) -> Self {
        Self::DependentsExist {
            entity_type: entity_type.into(),
            id: id.to_string(),
            dependents,
        }
    }

    pub fn duplicate(relation: impl Into<String>, key: impl ToString) -> Self {
        Self::DuplicateMembership {
            relation: relation.into(),
            key: key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = DomainError::validation("title", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Validation failed on `title`: must not be empty"
        );

        let err = DomainError::invalid_transition("LeaveRequest", "approved", "rejected", "already decided");
        assert!(err.to_string().contains("approved -> rejected"));
    }
}
