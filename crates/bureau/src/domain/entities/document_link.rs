//! DocumentLink - Association between a document and a CRM object
//!
//! Identified by `(document_id, entity_type, entity_id)` and indexed from
//! both sides.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::{Entity, Validate};
use crate::domain::config::DomainConfig;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{FieldValue, LinkedEntityType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLink {
    pub id: Uuid,
    pub document_id: Uuid,
    pub entity_type: LinkedEntityType,
    pub entity_id: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDocumentLink {
    pub document_id: Uuid,
    pub entity_type: LinkedEntityType,
    pub entity_id: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DocumentLinkPatch {
    pub note: Option<Option<String>>,
}

/// Key of the linked CRM object in the `target` index
pub fn target_key(entity_type: LinkedEntityType, entity_id: &str) -> String {
    format!("{entity_type}:{}", entity_id.trim())
}

impl DocumentLink {
    pub const BY_DOCUMENT: &'static str = "document";
    pub const BY_TARGET: &'static str = "target";

    pub fn target_key(&self) -> String {
        target_key(self.entity_type, &self.entity_id)
    }

    /// Same composite key
    pub fn same_relation(&self, other: &NewDocumentLink) -> bool {
        self.document_id == other.document_id
            && self.entity_type == other.entity_type
            && self.entity_id == other.entity_id.trim()
    }
}

impl Validate for NewDocumentLink {
    fn validate(&self, _config: &DomainConfig) -> Result<(), DomainError> {
        if self.entity_id.trim().is_empty() {
            return Err(DomainError::validation("entity_id", "must not be empty"));
        }
        Ok(())
    }
}

impl Validate for DocumentLinkPatch {
    fn validate(&self, _config: &DomainConfig) -> Result<(), DomainError> {
        Ok(())
    }
}

impl Entity for DocumentLink {
    const ENTITY_TYPE: &'static str = "DocumentLink";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "document_id",
        "entity_type",
        "entity_id",
        "note",
        "created_at",
        "updated_at",
    ];
    const INDEXES: &'static [&'static str] = &[Self::BY_DOCUMENT, Self::BY_TARGET];

    type Draft = NewDocumentLink;
    type Patch = DocumentLinkPatch;

    fn from_draft(id: Uuid, now: DateTime<Utc>, draft: NewDocumentLink) -> Self {
        Self {
            id,
            document_id: draft.document_id,
            entity_type: draft.entity_type,
            entity_id: draft.entity_id.trim().to_string(),
            note: draft.note,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: DocumentLinkPatch) {
        if let Some(note) = patch.note {
            self.note = note;
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
            "document_id" => self.document_id.into(),
            "entity_type" => self.entity_type.to_string().into(),
            "entity_id" => self.entity_id.as_str().into(),
            "note" => self.note.clone().into(),
            "created_at" => self.created_at.into(),
            "updated_at" => self.updated_at.into(),
            _ => return None,
        })
    }

    fn index_keys(&self, index: &str) -> Vec<String> {
        match index {
            Self::BY_DOCUMENT => vec![self.document_id.to_string()],
            Self::BY_TARGET => vec![self.target_key()],
            _ => Vec::new(),
        }
    }
}
