//! Entity - Contract shared by every record kept in an entity store
//!
//! The store assigns ids and timestamps, maintains the secondary indexes
//! named in [`Entity::INDEXES`], and evaluates filter clauses through
//! [`Entity::field`].

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::config::DomainConfig;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::FieldValue;

pub trait Entity: Clone + std::fmt::Debug + Send + Sync + 'static {
    /// Name used in errors and logs
    const ENTITY_TYPE: &'static str;
    /// Fields addressable by filter clauses
    const FIELDS: &'static [&'static str];
    /// Secondary indexes the store keeps for this entity
    const INDEXES: &'static [&'static str];

    /// Fields supplied at creation
    type Draft: Send + 'static;
    /// Typed partial update, merged shallowly
    type Patch: Send + 'static;

    fn from_draft(id: Uuid, now: DateTime<Utc>, draft: Self::Draft) -> Self;
    fn apply_patch(&mut self, patch: Self::Patch);

    fn id(&self) -> Uuid;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;
    fn set_timestamps(&mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>);

    /// Field value for filtering; `None` when the entity has no such field
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// Keys this entity occupies in the named index
    fn index_keys(&self, index: &str) -> Vec<String>;
}

/// Validation applied to drafts and patches before they reach a store
pub trait Validate {
    fn validate(&self, config: &DomainConfig) -> Result<(), DomainError>;
}

/// Index key used for "no parent" / "no owner" style optional references
pub const NONE_KEY: &str = "none";

/// Index key of an optional reference, [`NONE_KEY`] when absent
pub fn optional_key(id: Option<Uuid>) -> String {
    id.map(|id| id.to_string())
        .unwrap_or_else(|| NONE_KEY.to_string())
}

pub(crate) fn require_name(
    field: &str,
    value: &str,
    config: &DomainConfig,
) -> Result<(), DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    if trimmed.chars().count() > config.max_name_length {
        return Err(DomainError::validation(
            field,
            format!("must be at most {} characters", config.max_name_length),
        ));
    }
    Ok(())
}

pub(crate) fn require_email(field: &str, value: &str) -> Result<(), DomainError> {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(DomainError::validation(field, "must be a valid email address")),
    }
}

pub(crate) fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !out.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
            out.push(tag);
        }
    }
    out
}

pub(crate) fn tag_keys(tags: &[String]) -> Vec<String> {
    tags.iter().map(|t| t.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_name_rejects_blank_and_long() {
        let config = DomainConfig::default();
        assert!(require_name("name", "  ", &config).is_err());
        assert!(require_name("name", &"x".repeat(256), &config).is_err());
        assert!(require_name("name", "Contracts", &config).is_ok());
    }

    #[test]
    fn test_require_email() {
        assert!(require_email("email", "ada@example.com").is_ok());
        assert!(require_email("email", "ada@localhost").is_err());
        assert!(require_email("email", "@example.com").is_err());
    }

    #[test]
    fn test_normalize_tags_trims_and_dedupes() {
        let tags = normalize_tags(vec![
            " Finance ".to_string(),
            "finance".to_string(),
            "".to_string(),
            "Q1".to_string(),
        ]);
        assert_eq!(tags, vec!["Finance".to_string(), "Q1".to_string()]);
    }
}
