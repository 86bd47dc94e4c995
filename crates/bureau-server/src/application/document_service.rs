//! Document Application Service (Use Case)
//!
//! Orchestrates documents, their links to CRM records and text search.
//! Links and signature workflows have no meaning without their document
//! and are removed along with it.

use std::sync::Arc;
use uuid::Uuid;

use bureau::domain::services::relevance::rank;
use bureau::domain::{
    target_key, DocumentLinkPatch, DocumentPatch, NewDocument, NewDocumentLink,
};
use bureau::{
    Document, DocumentLink, DomainConfig, DomainError, Filter, Folder, LinkedEntityType, Repo,
    Scored, SignatureWorkflow, Validate,
};

/// Application service for Document operations
pub struct DocumentService {
    documents: Repo<Document>,
    links: Repo<DocumentLink>,
    workflows: Repo<SignatureWorkflow>,
    folders: Repo<Folder>,
    config: Arc<DomainConfig>,
}

impl DocumentService {
    pub fn new(
        documents: Repo<Document>,
        links: Repo<DocumentLink>,
        workflows: Repo<SignatureWorkflow>,
        folders: Repo<Folder>,
        config: Arc<DomainConfig>,
    ) -> Self {
        Self {
            documents,
            links,
            workflows,
            folders,
            config,
        }
    }

    /// Get all Documents
    pub async fn list_all(&self) -> Result<Vec<Document>, DomainError> {
        self.documents.find_all().await
    }

    /// Get a Document by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Document>, DomainError> {
        self.documents.find_by_id(id).await
    }

    pub async fn find(&self, filter: &Filter) -> Result<Vec<Document>, DomainError> {
        self.documents.find_where(filter).await
    }

    /// Documents filed directly in a folder
    pub async fn list_in_folder(&self, folder_id: Uuid) -> Result<Vec<Document>, DomainError> {
        self.documents
            .find_by_index(Document::BY_FOLDER, &folder_id.to_string())
            .await
    }

    pub async fn list_by_tag(&self, tag: &str) -> Result<Vec<Document>, DomainError> {
        self.documents
            .find_by_index(Document::BY_TAG, &tag.to_lowercase())
            .await
    }

    async fn ensure_folder(&self, folder_id: Uuid) -> Result<(), DomainError> {
        match self.folders.find_by_id(folder_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Folder", folder_id)),
        }
    }

    /// Create a new Document
    pub async fn create(&self, draft: NewDocument) -> Result<Document, DomainError> {
        draft.validate(&self.config)?;
        if let Some(folder_id) = draft.folder_id {
            self.ensure_folder(folder_id).await?;
        }
        let saved = self.documents.create(draft).await?;

        tracing::info!(
            "Created Document: {} ({}) - {}",
            saved.title,
            saved.id,
            saved.mime_type
        );

        Ok(saved)
    }

    /// Update a Document; new content bumps its version
    pub async fn update(&self, id: Uuid, patch: DocumentPatch) -> Result<Document, DomainError> {
        patch.validate(&self.config)?;
        if let Some(Some(folder_id)) = patch.folder_id {
            self.ensure_folder(folder_id).await?;
        }
        self.documents.update(id, patch).await
    }

    /// Delete a Document together with its links and signature workflows
    pub async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        if self.documents.find_by_id(id).await?.is_none() {
            return Ok(false);
        }

        let key = id.to_string();
        let links = self
            .links
            .find_by_index(DocumentLink::BY_DOCUMENT, &key)
            .await?;
        for link in &links {
            self.links.delete(link.id).await?;
        }
        let workflows = self
            .workflows
            .find_by_index(SignatureWorkflow::BY_DOCUMENT, &key)
            .await?;
        for workflow in &workflows {
            self.workflows.delete(workflow.id).await?;
        }

        let deleted = self.documents.delete(id).await?;
        if deleted {
            tracing::info!(
                "Deleted Document: {} ({} links, {} workflows)",
                id,
                links.len(),
                workflows.len()
            );
        }
        Ok(deleted)
    }

    /// Rank documents matching `filter` against `query`
    pub async fn search(
        &self,
        query: &str,
        filter: &Filter,
    ) -> Result<Vec<Scored<Document>>, DomainError> {
        let candidates = self.documents.find_where(filter).await?;
        let results = rank(candidates, query);
        tracing::debug!("Document search {:?}: {} hit(s)", query, results.len());
        Ok(results)
    }

    /// Link a Document to a CRM record
    pub async fn link(&self, draft: NewDocumentLink) -> Result<DocumentLink, DomainError> {
        draft.validate(&self.config)?;
        if self.documents.find_by_id(draft.document_id).await?.is_none() {
            return Err(DomainError::not_found("Document", draft.document_id));
        }
        let existing = self
            .links
            .find_by_index(DocumentLink::BY_DOCUMENT, &draft.document_id.to_string())
            .await?;
        if existing.iter().any(|link| link.same_relation(&draft)) {
            return Err(DomainError::duplicate(
                "document_links",
                format!(
                    "{}->{}",
                    draft.document_id,
                    target_key(draft.entity_type, &draft.entity_id)
                ),
            ));
        }

        let saved = self.links.create(draft).await?;
        tracing::info!(
            "Linked Document {} to {}",
            saved.document_id,
            saved.target_key()
        );
        Ok(saved)
    }

    pub async fn links_for_document(&self, document_id: Uuid) -> Result<Vec<DocumentLink>, DomainError> {
        self.links
            .find_by_index(DocumentLink::BY_DOCUMENT, &document_id.to_string())
            .await
    }

    /// Links pointing at one CRM record
    pub async fn links_for_target(
        &self,
        entity_type: LinkedEntityType,
        entity_id: &str,
    ) -> Result<Vec<DocumentLink>, DomainError> {
        self.links
            .find_by_index(DocumentLink::BY_TARGET, &target_key(entity_type, entity_id))
            .await
    }

    /// Drop every link pointing at a CRM record that is going away
    pub async fn unlink_target(
        &self,
        entity_type: LinkedEntityType,
        entity_id: &str,
    ) -> Result<usize, DomainError> {
        let mut removed = 0;
        for link in self.links_for_target(entity_type, entity_id).await? {
            if self.links.delete(link.id).await? {
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::info!(
                "Removed {} DocumentLink(s) to {}",
                removed,
                target_key(entity_type, entity_id)
            );
        }
        Ok(removed)
    }

    /// Documents linked to one CRM record, in link order
    pub async fn documents_for_target(
        &self,
        entity_type: LinkedEntityType,
        entity_id: &str,
    ) -> Result<Vec<Document>, DomainError> {
        let mut documents = Vec::new();
        for link in self.links_for_target(entity_type, entity_id).await? {
            if let Some(document) = self.documents.find_by_id(link.document_id).await? {
                documents.push(document);
            }
        }
        Ok(documents)
    }

    pub async fn update_link(&self, id: Uuid, patch: DocumentLinkPatch) -> Result<DocumentLink, DomainError> {
        patch.validate(&self.config)?;
        self.links.update(id, patch).await
    }

    pub async fn unlink(&self, link_id: Uuid) -> Result<bool, DomainError> {
        let deleted = self.links.delete(link_id).await?;
        if deleted {
            tracing::info!("Deleted DocumentLink: {}", link_id);
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::Fixture;
    use bureau::domain::NewSignatureWorkflow;
    use bureau::FilterClause;

    fn pdf(title: &str) -> NewDocument {
        NewDocument::new(title, "application/pdf", 2048)
    }

    #[tokio::test]
    async fn test_invoice_search_orders_by_score_then_insertion() {
        let fx = Fixture::new();
        let service = fx.documents();
        service.create(pdf("Invoice March")).await.unwrap();
        service.create(pdf("Invoice April")).await.unwrap();
        service.create(pdf("Payroll summary")).await.unwrap();

        let hits = service.search("invoice", &Filter::new()).await.unwrap();
        let titles: Vec<&str> = hits.iter().map(|h| h.item.title.as_str()).collect();
        assert_eq!(titles, vec!["Invoice March", "Invoice April"]);
        assert!(hits.iter().all(|h| h.score == Some(75)));

        assert!(service.search("xyz", &Filter::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_respects_filter() {
        let fx = Fixture::new();
        let service = fx.documents();
        service
            .create(pdf("Invoice March").with_tags(vec!["paid".into()]))
            .await
            .unwrap();
        service.create(pdf("Invoice April")).await.unwrap();

        let filter = Filter::new().and(FilterClause::equals("tags", "paid"));
        let hits = service.search("invoice", &filter).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].item.title, "Invoice March");

        let all = service.search("", &filter).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].score, None);
    }

    #[tokio::test]
    async fn test_duplicate_link_is_rejected() {
        let fx = Fixture::new();
        let service = fx.documents();
        let doc = service.create(pdf("Contract")).await.unwrap();
        let draft = NewDocumentLink {
            document_id: doc.id,
            entity_type: LinkedEntityType::Deal,
            entity_id: "deal-42".into(),
            note: None,
        };
        service.link(draft.clone()).await.unwrap();
        assert!(matches!(
            service.link(draft.clone()).await,
            Err(DomainError::DuplicateMembership { .. })
        ));
        let padded = NewDocumentLink {
            entity_id: " deal-42 ".into(),
            ..draft
        };
        assert!(matches!(
            service.link(padded).await,
            Err(DomainError::DuplicateMembership { .. })
        ));

        let docs = service
            .documents_for_target(LinkedEntityType::Deal, "deal-42")
            .await
            .unwrap();
        assert_eq!(docs, vec![doc]);
    }

    #[tokio::test]
    async fn test_unlink_target_only_touches_that_record() {
        let fx = Fixture::new();
        let service = fx.documents();
        fx.link_document(LinkedEntityType::Deal, "deal-42").await;
        fx.link_document(LinkedEntityType::Deal, " deal-42").await;
        let kept = fx.link_document(LinkedEntityType::Contact, "deal-42").await;

        assert_eq!(service.unlink_target(LinkedEntityType::Deal, "deal-42").await.unwrap(), 2);
        assert_eq!(fx.links.find_all().await.unwrap(), vec![kept]);
        assert_eq!(service.unlink_target(LinkedEntityType::Deal, "deal-42").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_cascades_links_and_workflows() {
        let fx = Fixture::new();
        let service = fx.documents();
        let doc = service.create(pdf("Contract")).await.unwrap();
        service
            .link(NewDocumentLink {
                document_id: doc.id,
                entity_type: LinkedEntityType::Contact,
                entity_id: "c-1".into(),
                note: None,
            })
            .await
            .unwrap();
        fx.workflows
            .create(NewSignatureWorkflow::new(
                doc.id,
                "Sign contract",
                "legal@bureau.test",
                fx.clock_now() + chrono::Duration::days(3),
            ))
            .await
            .unwrap();

        assert!(service.delete(doc.id).await.unwrap());
        assert!(fx.links.find_all().await.unwrap().is_empty());
        assert!(fx.workflows.find_all().await.unwrap().is_empty());
        assert!(!service.delete(doc.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_folder_is_not_found() {
        let fx = Fixture::new();
        let result = fx
            .documents()
            .create(pdf("Orphan").in_folder(Uuid::from_u128(77)))
            .await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }
}
