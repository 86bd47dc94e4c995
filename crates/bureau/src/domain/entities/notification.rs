//! Notification - Inbox entry produced by document workflows

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::{Entity, Validate};
use crate::domain::config::DomainConfig;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::FieldValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    /// Recipient email, stored lowercase
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub workflow_id: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub workflow_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationPatch {
    pub read: Option<bool>,
}

impl Notification {
    pub const BY_RECIPIENT: &'static str = "recipient";
}

impl Validate for NewNotification {
    fn validate(&self, _config: &DomainConfig) -> Result<(), DomainError> {
        if self.recipient.trim().is_empty() {
            return Err(DomainError::validation("recipient", "must not be empty"));
        }
        Ok(())
    }
}

impl Entity for Notification {
    const ENTITY_TYPE: &'static str = "Notification";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "recipient",
        "subject",
        "body",
        "workflow_id",
        "read",
        "created_at",
        "updated_at",
    ];
    const INDEXES: &'static [&'static str] = &[Self::BY_RECIPIENT];

    type Draft = NewNotification;
    type Patch = NotificationPatch;

    fn from_draft(id: Uuid, now: DateTime<Utc>, draft: NewNotification) -> Self {
        Self {
            id,
            recipient: draft.recipient.trim().to_lowercase(),
            subject: draft.subject,
            body: draft.body,
            workflow_id: draft.workflow_id,
            read: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: NotificationPatch) {
        if let Some(read) = patch.read {
            self.read = read;
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
            "recipient" => self.recipient.as_str().into(),
            "subject" => self.subject.as_str().into(),
            "body" => self.body.as_str().into(),
            "workflow_id" => self.workflow_id.into(),
            "read" => self.read.into(),
            "created_at" => self.created_at.into(),
            "updated_at" => self.updated_at.into(),
            _ => return None,
        })
    }

    fn index_keys(&self, index: &str) -> Vec<String> {
        match index {
            Self::BY_RECIPIENT => vec![self.recipient.clone()],
            _ => Vec::new(),
        }
    }
}
