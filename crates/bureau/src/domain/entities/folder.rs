//! Folder - Hierarchical container for documents (GED)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::{optional_key, require_name, Entity, Validate};
use crate::domain::config::DomainConfig;
use crate::domain::errors::DomainError;
use crate::domain::services::folder_paths::{join_path, rebase, rename_leaf, PATH_SEPARATOR};
use crate::domain::value_objects::FieldValue;

/// Folder with a derived `/`-joined path from the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    /// Derived from ancestor names, rewritten on every ancestor rename or move
    pub path: String,
    pub owner_id: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new folder
#[derive(Debug, Clone)]
pub struct NewFolder {
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub parent_path: Option<String>,
    pub owner_id: Option<String>,
    pub description: Option<String>,
}

/// Partial update of a folder; moves go through [`Folder::relocate`]
#[derive(Debug, Clone, Default)]
pub struct FolderPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

impl Folder {
    pub const BY_PARENT: &'static str = "parent";
    pub const BY_OWNER: &'static str = "owner";

    /// Move under `parent` (or to the root), recomputing the path
    pub fn relocate(&mut self, parent: Option<&Folder>) {
        self.parent_id = parent.map(|p| p.id);
        self.path = join_path(parent.map(|p| p.path.as_str()), &self.name);
    }

    /// Follow an ancestor's path change; returns false if not a descendant
    pub fn rebase(&mut self, old_prefix: &str, new_prefix: &str) -> bool {
        match rebase(&self.path, old_prefix, new_prefix) {
            Some(path) => {
                self.path = path;
                true
            }
            None => false,
        }
    }

    /// Nesting depth, root folders are depth 0
    pub fn depth(&self) -> usize {
        self.path.matches(PATH_SEPARATOR).count()
    }
}

impl NewFolder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_id: None,
            parent_path: None,
            owner_id: None,
            description: None,
        }
    }

    /// Place the new folder under `parent`
    pub fn within(mut self, parent: &Folder) -> Self {
        self.parent_id = Some(parent.id);
        self.parent_path = Some(parent.path.clone());
        self
    }

    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

fn validate_folder_name(name: &str, config: &DomainConfig) -> Result<(), DomainError> {
    require_name("name", name, config)?;
    if name.contains(PATH_SEPARATOR) {
        return Err(DomainError::validation(
            "name",
            format!("must not contain '{PATH_SEPARATOR}'"),
        ));
    }
    Ok(())
}

impl Validate for NewFolder {
    fn validate(&self, config: &DomainConfig) -> Result<(), DomainError> {
        validate_folder_name(&self.name, config)
    }
}

impl Validate for FolderPatch {
    fn validate(&self, config: &DomainConfig) -> Result<(), DomainError> {
        match &self.name {
            Some(name) => validate_folder_name(name, config),
            None => Ok(()),
        }
    }
}

impl Entity for Folder {
    const ENTITY_TYPE: &'static str = "Folder";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "parent_id",
        "path",
        "owner_id",
        "description",
        "created_at",
        "updated_at",
    ];
    const INDEXES: &'static [&'static str] = &[Self::BY_PARENT, Self::BY_OWNER];

    type Draft = NewFolder;
    type Patch = FolderPatch;

    fn from_draft(id: Uuid, now: DateTime<Utc>, draft: NewFolder) -> Self {
        let name = draft.name.trim().to_string();
        Self {
            id,
            path: join_path(draft.parent_path.as_deref(), &name),
            name,
            parent_id: draft.parent_id,
            owner_id: draft.owner_id,
            description: draft.description,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: FolderPatch) {
        if let Some(name) = patch.name {
            let name = name.trim().to_string();
            self.path = rename_leaf(&self.path, &name);
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
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
            "parent_id" => self.parent_id.into(),
            "path" => self.path.as_str().into(),
            "owner_id" => self.owner_id.clone().into(),
            "description" => self.description.clone().into(),
            "created_at" => self.created_at.into(),
            "updated_at" => self.updated_at.into(),
            _ => return None,
        })
    }

    fn index_keys(&self, index: &str) -> Vec<String> {
        match index {
            Self::BY_PARENT => vec![optional_key(self.parent_id)],
            Self::BY_OWNER => self.owner_id.iter().cloned().collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(id: u128, draft: NewFolder) -> Folder {
        Folder::from_draft(Uuid::from_u128(id), Utc::now(), draft)
    }

    #[test]
    fn test_child_path_derives_from_parent() {
        let root = folder(1, NewFolder::new("Contracts"));
        let child = folder(2, NewFolder::new("2026").within(&root));
        assert_eq!(child.path, "Contracts/2026");
        assert_eq!(child.parent_id, Some(root.id));
        assert_eq!(child.depth(), 1);
    }

    #[test]
    fn test_rename_patch_rewrites_leaf() {
        let root = folder(1, NewFolder::new("Contracts"));
        let mut child = folder(2, NewFolder::new("2026").within(&root));
        child.apply_patch(FolderPatch {
            name: Some("2027".to_string()),
            ..Default::default()
        });
        assert_eq!(child.path, "Contracts/2027");
    }

    #[test]
    fn test_name_with_separator_is_rejected() {
        let config = DomainConfig::default();
        let err = NewFolder::new("a/b").validate(&config).unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed { ref field, .. } if field == "name"));
    }

    #[test]
    fn test_parent_index_uses_none_key_for_roots() {
        let root = folder(1, NewFolder::new("Contracts"));
        assert_eq!(root.index_keys(Folder::BY_PARENT), vec!["none".to_string()]);
    }
}
