//! Segment - Marketing audience defined by filter clauses plus hand-picked members

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::contact::Contact;
use super::entity::{require_name, Entity, Validate};
use crate::domain::config::DomainConfig;
use crate::domain::errors::DomainError;
use crate::domain::services::query::validate_filter;
use crate::domain::value_objects::{FieldValue, Filter};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Dynamic membership, evaluated against contacts
    pub filter: Filter,
    /// Contacts added by hand regardless of the filter
    pub static_members: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSegment {
    pub name: String,
    pub description: Option<String>,
    pub filter: Filter,
}

#[derive(Debug, Clone, Default)]
pub struct SegmentPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub filter: Option<Filter>,
}

impl Segment {
    pub const BY_MEMBER: &'static str = "member";

    pub fn add_member(&mut self, contact_id: Uuid) -> Result<(), DomainError> {
        if self.static_members.contains(&contact_id) {
            return Err(DomainError::duplicate(
                format!("segment {}", self.id),
                contact_id,
            ));
        }
        self.static_members.push(contact_id);
        Ok(())
    }

    pub fn remove_member(&mut self, contact_id: Uuid) -> bool {
        let before = self.static_members.len();
        self.static_members.retain(|id| *id != contact_id);
        before != self.static_members.len()
    }
}

impl Validate for NewSegment {
    fn validate(&self, config: &DomainConfig) -> Result<(), DomainError> {
        require_name("name", &self.name, config)?;
        validate_filter::<Contact>(&self.filter)
    }
}

impl Validate for SegmentPatch {
    fn validate(&self, config: &DomainConfig) -> Result<(), DomainError> {
        if let Some(name) = &self.name {
            require_name("name", name, config)?;
        }
        if let Some(filter) = &self.filter {
            validate_filter::<Contact>(filter)?;
        }
        Ok(())
    }
}

impl Entity for Segment {
    const ENTITY_TYPE: &'static str = "Segment";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "member_count",
        "created_at",
        "updated_at",
    ];
    const INDEXES: &'static [&'static str] = &[Self::BY_MEMBER];

    type Draft = NewSegment;
    type Patch = SegmentPatch;

    fn from_draft(id: Uuid, now: DateTime<Utc>, draft: NewSegment) -> Self {
        Self {
            id,
            name: draft.name.trim().to_string(),
            description: draft.description,
            filter: draft.filter,
            static_members: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: SegmentPatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(filter) = patch.filter {
            self.filter = filter;
        }
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn set_timestamps(&mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) {
        self.created_at = created_at;
        self.updated_at = updated_at;
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        Some(match name {
            "id" => self.id.into(),
            "name" => self.name.as_str().into(),
            "description" => self.description.clone().into(),
            "member_count" => (self.static_members.len() as u64).into(),
            "created_at" => self.created_at.into(),
            "updated_at" => self.updated_at.into(),
            _ => return None,
        })
    }

    fn index_keys(&self, index: &str) -> Vec<String> {
        match index {
            Self::BY_MEMBER => self.static_members.iter().map(|id| id.to_string()).collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::FilterClause;

    #[test]
    fn test_duplicate_member_rejected() {
        let mut segment = Segment::from_draft(
            Uuid::from_u128(1),
            Utc::now(),
            NewSegment {
                name: "Paris leads".into(),
                description: None,
                filter: Filter::new(),
            },
        );
        let contact = Uuid::from_u128(5);
        segment.add_member(contact).unwrap();
        assert!(matches!(
            segment.add_member(contact),
            Err(DomainError::DuplicateMembership { .. })
        ));
        assert!(segment.remove_member(contact));
        assert!(!segment.remove_member(contact));
    }

    #[test]
    fn test_filter_must_target_contact_fields() {
        let config = DomainConfig::default();
        let draft = NewSegment {
            name: "Bad".into(),
            description: None,
            filter: Filter::new().and(FilterClause::equals("salary", 10.0)),
        };
        assert!(matches!(
            draft.validate(&config),
            Err(DomainError::ValidationFailed { ref field, .. }) if field == "salary"
        ));
    }
}
