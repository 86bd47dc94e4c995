//! Contact - Marketing audience member

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::{normalize_tags, require_email, require_name, tag_keys, Entity, Validate};
use crate::domain::config::DomainConfig;
use crate::domain::errors::DomainError;
use crate::domain::services::relevance::Searchable;
use crate::domain::value_objects::FieldValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub city: Option<String>,
    pub tags: Vec<String>,
    /// Lead scoring, 0-100
    pub lead_score: u32,
    /// Opted in to marketing messages (email and SMS)
    pub subscribed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub city: Option<String>,
    pub tags: Vec<String>,
    pub lead_score: u32,
    pub subscribed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ContactPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub company: Option<Option<String>>,
    pub city: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub lead_score: Option<u32>,
    pub subscribed: Option<bool>,
}

impl Contact {
    pub const BY_TAG: &'static str = "tag";
    pub const BY_CITY: &'static str = "city";

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

const MAX_LEAD_SCORE: u32 = 100;

fn validate_score(score: u32) -> Result<(), DomainError> {
    if score > MAX_LEAD_SCORE {
        return Err(DomainError::validation(
            "lead_score",
            format!("must be between 0 and {MAX_LEAD_SCORE}"),
        ));
    }
    Ok(())
}

fn validate_phone(phone: &str) -> Result<(), DomainError> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '.' | '(' | ')'));
    if !allowed || digits < 6 {
        return Err(DomainError::validation("phone", "must be a dialable phone number"));
    }
    Ok(())
}

impl Validate for NewContact {
    fn validate(&self, config: &DomainConfig) -> Result<(), DomainError> {
        require_name("first_name", &self.first_name, config)?;
        require_name("last_name", &self.last_name, config)?;
        require_email("email", &self.email)?;
        if let Some(phone) = &self.phone {
            validate_phone(phone)?;
        }
        validate_score(self.lead_score)
    }
}

impl Validate for ContactPatch {
    fn validate(&self, config: &DomainConfig) -> Result<(), DomainError> {
        if let Some(v) = &self.first_name {
            require_name("first_name", v, config)?;
        }
        if let Some(v) = &self.last_name {
            require_name("last_name", v, config)?;
        }
        if let Some(v) = &self.email {
            require_email("email", v)?;
        }
        if let Some(Some(phone)) = &self.phone {
            validate_phone(phone)?;
        }
        if let Some(score) = self.lead_score {
            validate_score(score)?;
        }
        Ok(())
    }
}

impl Entity for Contact {
    const ENTITY_TYPE: &'static str = "Contact";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "first_name",
        "last_name",
        "email",
        "phone",
        "company",
        "city",
        "tags",
        "lead_score",
        "subscribed",
        "created_at",
        "updated_at",
    ];
    const INDEXES: &'static [&'static str] = &[Self::BY_TAG, Self::BY_CITY];

    type Draft = NewContact;
    type Patch = ContactPatch;

    fn from_draft(id: Uuid, now: DateTime<Utc>, draft: NewContact) -> Self {
        Self {
            id,
            first_name: draft.first_name.trim().to_string(),
            last_name: draft.last_name.trim().to_string(),
            email: draft.email.trim().to_lowercase(),
            phone: draft.phone,
            company: draft.company,
            city: draft.city,
            tags: normalize_tags(draft.tags),
            lead_score: draft.lead_score,
            subscribed: draft.subscribed,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: ContactPatch) {
        if let Some(v) = patch.first_name {
            self.first_name = v.trim().to_string();
        }
        if let Some(v) = patch.last_name {
            self.last_name = v.trim().to_string();
        }
        if let Some(v) = patch.email {
            self.email = v.trim().to_lowercase();
        }
        if let Some(v) = patch.phone {
            self.phone = v;
        }
        if let Some(v) = patch.company {
            self.company = v;
        }
        if let Some(v) = patch.city {
            self.city = v;
        }
        if let Some(v) = patch.tags {
            self.tags = normalize_tags(v);
        }
        if let Some(v) = patch.lead_score {
            self.lead_score = v;
        }
        if let Some(v) = patch.subscribed {
            self.subscribed = v;
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
            "first_name" => self.first_name.as_str().into(),
            "last_name" => self.last_name.as_str().into(),
            "email" => self.email.as_str().into(),
            "phone" => self.phone.clone().into(),
            "company" => self.company.clone().into(),
            "city" => self.city.clone().into(),
            "tags" => self.tags.clone().into(),
            "lead_score" => self.lead_score.into(),
            "subscribed" => self.subscribed.into(),
            "created_at" => self.created_at.into(),
            "updated_at" => self.updated_at.into(),
            _ => return None,
        })
    }

    fn index_keys(&self, index: &str) -> Vec<String> {
        match index {
            Self::BY_TAG => tag_keys(&self.tags),
            Self::BY_CITY => self.city.iter().map(|c| c.to_lowercase()).collect(),
            _ => Vec::new(),
        }
    }
}

impl Searchable for Contact {
    fn title(&self) -> Cow<'_, str> {
        Cow::Owned(self.full_name())
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn body(&self) -> Option<&str> {
        self.company.as_deref()
    }
}
