//! Document - File record stored in the GED

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::{normalize_tags, optional_key, require_name, tag_keys, Entity, Validate};
use crate::domain::config::DomainConfig;
use crate::domain::errors::DomainError;
use crate::domain::services::relevance::Searchable;
use crate::domain::value_objects::FieldValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub folder_id: Option<Uuid>,
    pub owner_id: Option<String>,
    pub mime_type: String,
    pub size_bytes: u64,
    pub tags: Vec<String>,
    pub description: Option<String>,
    /// Bumped whenever new content replaces the file
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub folder_id: Option<Uuid>,
    pub owner_id: Option<String>,
    pub mime_type: String,
    pub size_bytes: u64,
    pub tags: Vec<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub folder_id: Option<Option<Uuid>>,
    pub tags: Option<Vec<String>>,
    pub description: Option<Option<String>>,
    /// New content as `(mime_type, size_bytes)`
    pub content: Option<(String, u64)>,
}

impl Document {
    pub const BY_FOLDER: &'static str = "folder";
    pub const BY_OWNER: &'static str = "owner";
    pub const BY_TAG: &'static str = "tag";
}

impl NewDocument {
    pub fn new(title: impl Into<String>, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            title: title.into(),
            folder_id: None,
            owner_id: None,
            mime_type: mime_type.into(),
            size_bytes,
            tags: Vec::new(),
            description: None,
        }
    }

    pub fn in_folder(mut self, folder_id: Uuid) -> Self {
        self.folder_id = Some(folder_id);
        self
    }

    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

fn validate_content(mime_type: &str, size_bytes: u64, config: &DomainConfig) -> Result<(), DomainError> {
    if mime_type.trim().is_empty() || !mime_type.contains('/') {
        return Err(DomainError::validation("mime_type", "must look like type/subtype"));
    }
    if !config.allowed_mime_types.is_empty()
        && !config
            .allowed_mime_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(mime_type))
    {
        return Err(DomainError::validation(
            "mime_type",
            format!("{mime_type} is not an accepted file type"),
        ));
    }
    if size_bytes > config.max_upload_bytes {
        return Err(DomainError::validation(
            "size_bytes",
            format!("exceeds the {} byte upload limit", config.max_upload_bytes),
        ));
    }
    Ok(())
}

impl Validate for NewDocument {
    fn validate(&self, config: &DomainConfig) -> Result<(), DomainError> {
        require_name("title", &self.title, config)?;
        validate_content(&self.mime_type, self.size_bytes, config)
    }
}

impl Validate for DocumentPatch {
    fn validate(&self, config: &DomainConfig) -> Result<(), DomainError> {
        if let Some(title) = &self.title {
            require_name("title", title, config)?;
        }
        if let Some((mime_type, size_bytes)) = &self.content {
            validate_content(mime_type, *size_bytes, config)?;
        }
        Ok(())
    }
}

impl Entity for Document {
    const ENTITY_TYPE: &'static str = "Document";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "title",
        "folder_id",
        "owner_id",
        "mime_type",
        "size_bytes",
        "tags",
        "description",
        "version",
        "created_at",
        "updated_at",
    ];
    const INDEXES: &'static [&'static str] = &[Self::BY_FOLDER, Self::BY_OWNER, Self::BY_TAG];

    type Draft = NewDocument;
    type Patch = DocumentPatch;

    fn from_draft(id: Uuid, now: DateTime<Utc>, draft: NewDocument) -> Self {
        Self {
            id,
            title: draft.title.trim().to_string(),
            folder_id: draft.folder_id,
            owner_id: draft.owner_id,
            mime_type: draft.mime_type.to_lowercase(),
            size_bytes: draft.size_bytes,
            tags: normalize_tags(draft.tags),
            description: draft.description,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: DocumentPatch) {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(folder_id) = patch.folder_id {
            self.folder_id = folder_id;
        }
        if let Some(tags) = patch.tags {
            self.tags = normalize_tags(tags);
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some((mime_type, size_bytes)) = patch.content {
            self.mime_type = mime_type.to_lowercase();
            self.size_bytes = size_bytes;
            self.version += 1;
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
            "title" => self.title.as_str().into(),
            "folder_id" => self.folder_id.into(),
            "owner_id" => self.owner_id.clone().into(),
            "mime_type" => self.mime_type.as_str().into(),
            "size_bytes" => self.size_bytes.into(),
            "tags" => self.tags.clone().into(),
            "description" => self.description.clone().into(),
            "version" => self.version.into(),
            "created_at" => self.created_at.into(),
            "updated_at" => self.updated_at.into(),
            _ => return None,
        })
    }

    fn index_keys(&self, index: &str) -> Vec<String> {
        match index {
            Self::BY_FOLDER => vec![optional_key(self.folder_id)],
            Self::BY_OWNER => self.owner_id.iter().cloned().collect(),
            Self::BY_TAG => tag_keys(&self.tags),
            _ => Vec::new(),
        }
    }
}

impl Searchable for Document {
    fn title(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.title)
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn body(&self) -> Option<&str> {
        self.description.as_deref()
    }
}
