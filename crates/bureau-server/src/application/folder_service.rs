//! Folder Application Service (Use Case)
//!
//! Folders form a tree. Every folder stores its full path, so renaming or
//! moving a folder rewrites the paths of its whole subtree.

use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use bureau::domain::services::folder_paths::would_create_cycle;
use bureau::domain::{optional_key, FolderPatch, NewFolder};
use bureau::{DomainConfig, DomainError, Folder, Repo, Validate};

use super::DocumentService;

/// Application service for Folder operations
pub struct FolderService {
    folders: Repo<Folder>,
    documents: Arc<DocumentService>,
    config: Arc<DomainConfig>,
}

impl FolderService {
    pub fn new(folders: Repo<Folder>, documents: Arc<DocumentService>, config: Arc<DomainConfig>) -> Self {
        Self {
            folders,
            documents,
            config,
        }
    }

    /// Get all Folders
    pub async fn list_all(&self) -> Result<Vec<Folder>, DomainError> {
        self.folders.find_all().await
    }

    /// Get a Folder by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Folder>, DomainError> {
        self.folders.find_by_id(id).await
    }

    async fn require(&self, id: Uuid) -> Result<Folder, DomainError> {
        self.folders
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Folder", id))
    }

    /// Direct children of `parent`, or the root folders when `None`
    pub async fn children(&self, parent: Option<Uuid>) -> Result<Vec<Folder>, DomainError> {
        self.folders
            .find_by_index(Folder::BY_PARENT, &optional_key(parent))
            .await
    }

    pub async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Folder>, DomainError> {
        self.folders.find_by_index(Folder::BY_OWNER, owner_id).await
    }

    /// Every folder below `id`, parents before their children
    pub async fn descendants(&self, id: Uuid) -> Result<Vec<Folder>, DomainError> {
        let mut found = Vec::new();
        let mut frontier = vec![id];
        while let Some(current) = frontier.pop() {
            for child in self.children(Some(current)).await? {
                frontier.push(child.id);
                found.push(child);
            }
        }
        Ok(found)
    }

    /// Create a new Folder, at the root or under `parent_id`
    pub async fn create(
        &self,
        name: String,
        parent_id: Option<Uuid>,
        owner_id: Option<String>,
        description: Option<String>,
    ) -> Result<Folder, DomainError> {
        let mut draft = NewFolder::new(name);
        if let Some(parent_id) = parent_id {
            let parent = self.require(parent_id).await?;
            draft = draft.within(&parent);
        }
        draft.owner_id = owner_id;
        draft.description = description;
        draft.validate(&self.config)?;

        let saved = self.folders.create(draft).await?;
        tracing::info!("Created Folder: {} ({})", saved.path, saved.id);
        Ok(saved)
    }

    /// Update a Folder; a rename rewrites every descendant path
    pub async fn update(&self, id: Uuid, patch: FolderPatch) -> Result<Folder, DomainError> {
        patch.validate(&self.config)?;
        let current = self.require(id).await?;
        let updated = self.folders.update(id, patch).await?;

        if updated.path != current.path {
            let rewritten = self
                .rewrite_descendants(id, &current.path, &updated.path)
                .await?;
            tracing::info!(
                "Renamed Folder: {} -> {} ({} descendant path(s) rewritten)",
                current.path,
                updated.path,
                rewritten
            );
        }
        Ok(updated)
    }

    /// Re-parent a Folder; moving it under itself or a descendant is refused
    pub async fn move_to(&self, id: Uuid, new_parent: Option<Uuid>) -> Result<Folder, DomainError> {
        let current = self.require(id).await?;
        if current.parent_id == new_parent {
            return Ok(current);
        }

        let parent = match new_parent {
            Some(parent_id) => {
                let parent = self.require(parent_id).await?;
                let parents: HashMap<Uuid, Option<Uuid>> = self
                    .folders
                    .find_all()
                    .await?
                    .into_iter()
                    .map(|f| (f.id, f.parent_id))
                    .collect();
                if would_create_cycle(id, parent_id, &parents) {
                    return Err(DomainError::invalid_transition(
                        "Folder",
                        current.path,
                        parent.path,
                        "a folder cannot be moved under itself or one of its descendants",
                    ));
                }
                Some(parent)
            }
            None => None,
        };

        let mut old_path = current.path.clone();
        let saved = self
            .folders
            .modify(
                id,
                Box::new(|folder| {
                    old_path = folder.path.clone();
                    folder.relocate(parent.as_ref());
                    Ok(())
                }),
            )
            .await?;
        let rewritten = self
            .rewrite_descendants(id, &old_path, &saved.path)
            .await?;

        tracing::info!(
            "Moved Folder: {} -> {} ({} descendant path(s) rewritten)",
            old_path,
            saved.path,
            rewritten
        );
        Ok(saved)
    }

    async fn rewrite_descendants(
        &self,
        id: Uuid,
        old_prefix: &str,
        new_prefix: &str,
    ) -> Result<usize, DomainError> {
        let mut rewritten = 0;
        for folder in self.descendants(id).await? {
            let mut moved = false;
            self.folders
                .modify(
                    folder.id,
                    Box::new(|folder| {
                        moved = folder.rebase(old_prefix, new_prefix);
                        Ok(())
                    }),
                )
                .await?;
            if moved {
                rewritten += 1;
            }
        }
        Ok(rewritten)
    }

    /// Delete a Folder
    ///
    /// A folder holding sub-folders or documents is only deleted when
    /// `recursive` is set, in which case its whole subtree goes with it.
    pub async fn delete(&self, id: Uuid, recursive: bool) -> Result<bool, DomainError> {
        if self.folders.find_by_id(id).await?.is_none() {
            return Ok(false);
        }

        let children = self.children(Some(id)).await?;
        let documents = self.documents.list_in_folder(id).await?;
        let dependents = children.len() + documents.len();
        if dependents > 0 && !recursive {
            return Err(DomainError::dependents_exist("Folder", id, dependents));
        }

        let mut subtree = self.descendants(id).await?;
        // Deepest first so no folder outlives its parent
        subtree.reverse();
        let mut removed_documents = 0;
        for folder in subtree.iter().map(|f| f.id).chain(std::iter::once(id)) {
            for document in self.documents.list_in_folder(folder).await? {
                if self.documents.delete(document.id).await? {
                    removed_documents += 1;
                }
            }
            if folder != id {
                self.folders.delete(folder).await?;
            }
        }

        let deleted = self.folders.delete(id).await?;
        if deleted {
            tracing::info!(
                "Deleted Folder: {} ({} sub-folder(s), {} document(s))",
                id,
                subtree.len(),
                removed_documents
            );
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::Fixture;
    use bureau::domain::NewDocument;

    async fn folder(service: &FolderService, name: &str, parent: Option<&Folder>) -> Folder {
        service
            .create(name.to_string(), parent.map(|p| p.id), None, None)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_rename_rewrites_child_paths() {
        let fx = Fixture::new();
        let service = fx.folders();
        let contracts = folder(&service, "Contracts", None).await;
        let year = folder(&service, "2026", Some(&contracts)).await;
        let quarter = folder(&service, "Q1", Some(&year)).await;
        assert_eq!(year.path, "Contracts/2026");

        service
            .update(
                contracts.id,
                FolderPatch {
                    name: Some("Contracts-Archive".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let year = service.get_by_id(year.id).await.unwrap().unwrap();
        let quarter = service.get_by_id(quarter.id).await.unwrap().unwrap();
        assert_eq!(year.path, "Contracts-Archive/2026");
        assert_eq!(quarter.path, "Contracts-Archive/2026/Q1");
    }

    #[tokio::test]
    async fn test_move_under_descendant_is_refused() {
        let fx = Fixture::new();
        let service = fx.folders();
        let a = folder(&service, "A", None).await;
        let b = folder(&service, "B", Some(&a)).await;
        let c = folder(&service, "C", Some(&b)).await;

        for target in [a.id, b.id, c.id] {
            let err = service.move_to(a.id, Some(target)).await.unwrap_err();
            assert!(matches!(err, DomainError::InvalidTransition { .. }));
        }
        let a = service.get_by_id(a.id).await.unwrap().unwrap();
        assert_eq!(a.parent_id, None);
        assert_eq!(a.path, "A");
    }

    #[tokio::test]
    async fn test_move_rewrites_subtree_and_indexes() {
        let fx = Fixture::new();
        let service = fx.folders();
        let hr = folder(&service, "HR", None).await;
        let archive = folder(&service, "Archive", None).await;
        let payroll = folder(&service, "Payroll", Some(&hr)).await;
        let march = folder(&service, "March", Some(&payroll)).await;

        let moved = service.move_to(payroll.id, Some(archive.id)).await.unwrap();
        assert_eq!(moved.path, "Archive/Payroll");
        let march = service.get_by_id(march.id).await.unwrap().unwrap();
        assert_eq!(march.path, "Archive/Payroll/March");

        assert!(service.children(Some(hr.id)).await.unwrap().is_empty());
        let under_archive = service.children(Some(archive.id)).await.unwrap();
        assert_eq!(under_archive.len(), 1);

        let back = service.move_to(payroll.id, None).await.unwrap();
        assert_eq!(back.path, "Payroll");
        let roots = service.children(None).await.unwrap();
        assert_eq!(roots.len(), 3);
    }

    #[tokio::test]
    async fn test_delete_with_dependents_needs_recursive() {
        let fx = Fixture::new();
        let service = fx.folders();
        let root = folder(&service, "Sales", None).await;
        let child = folder(&service, "Quotes", Some(&root)).await;
        let doc = fx
            .documents()
            .create(NewDocument::new("Quote 17", "application/pdf", 100).in_folder(child.id))
            .await
            .unwrap();

        let err = service.delete(root.id, false).await.unwrap_err();
        assert!(matches!(err, DomainError::DependentsExist { dependents: 1, .. }));
        assert!(service.get_by_id(child.id).await.unwrap().is_some());

        assert!(service.delete(root.id, true).await.unwrap());
        assert!(service.list_all().await.unwrap().is_empty());
        assert!(fx.docs.find_by_id(doc.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_under_missing_parent_is_not_found() {
        let fx = Fixture::new();
        let err = fx
            .folders()
            .create("Lost".into(), Some(Uuid::from_u128(404)), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
