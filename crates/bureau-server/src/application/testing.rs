//! Deterministic wiring shared by the application service tests

use std::sync::Arc;

use bureau::domain::{NewDocument, NewDocumentLink};
use bureau::{
    Clock, Contact, Deal, Document, DocumentLink, DomainConfig, Employee, Entity, Folder,
    LeaveRequest, LinkedEntityType, Notification, Repo, Segment, SignatureWorkflow,
};
use chrono::{DateTime, TimeZone, Utc};

use super::{
    DocumentService, FolderService, HrService, MarketingService, PipelineService,
    SignatureService,
};
use crate::adapters::{InMemoryRepository, ManualClock, SequentialIds};

pub struct Fixture {
    pub clock: Arc<ManualClock>,
    pub ids: Arc<SequentialIds>,
    pub config: Arc<DomainConfig>,
    pub folders: Repo<Folder>,
    pub docs: Repo<Document>,
    pub links: Repo<DocumentLink>,
    pub workflows: Repo<SignatureWorkflow>,
    pub notifications: Repo<Notification>,
    pub employees: Repo<Employee>,
    pub leave: Repo<LeaveRequest>,
    pub contacts: Repo<Contact>,
    pub segments: Repo<Segment>,
    pub deals: Repo<Deal>,
}

impl Fixture {
    pub fn new() -> Self {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).single().unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let ids = Arc::new(SequentialIds::new());
        Self {
            folders: repo(&ids, &clock),
            docs: repo(&ids, &clock),
            links: repo(&ids, &clock),
            workflows: repo(&ids, &clock),
            notifications: repo(&ids, &clock),
            employees: repo(&ids, &clock),
            leave: repo(&ids, &clock),
            contacts: repo(&ids, &clock),
            segments: repo(&ids, &clock),
            deals: repo(&ids, &clock),
            config: Arc::new(DomainConfig::default()),
            clock,
            ids,
        }
    }

    pub fn clock_now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// File a fresh document and link it to one CRM record
    pub async fn link_document(&self, entity_type: LinkedEntityType, entity_id: &str) -> DocumentLink {
        let documents = self.documents();
        let document = documents
            .create(NewDocument::new("Attachment", "application/pdf", 512))
            .await
            .unwrap();
        documents
            .link(NewDocumentLink {
                document_id: document.id,
                entity_type,
                entity_id: entity_id.to_string(),
                note: None,
            })
            .await
            .unwrap()
    }

    pub fn documents(&self) -> DocumentService {
        DocumentService::new(
            self.docs.clone(),
            self.links.clone(),
            self.workflows.clone(),
            self.folders.clone(),
            self.config.clone(),
        )
    }

    pub fn folders(&self) -> FolderService {
        FolderService::new(
            self.folders.clone(),
            Arc::new(self.documents()),
            self.config.clone(),
        )
    }

    pub fn signatures(&self) -> SignatureService {
        SignatureService::new(
            self.workflows.clone(),
            self.docs.clone(),
            self.notifications.clone(),
            self.ids.clone(),
            self.clock.clone(),
            self.config.clone(),
        )
    }

    pub fn hr(&self) -> HrService {
        HrService::new(
            self.employees.clone(),
            self.leave.clone(),
            Arc::new(self.documents()),
            self.clock.clone(),
            self.config.clone(),
        )
    }

    pub fn marketing(&self) -> MarketingService {
        MarketingService::new(
            self.contacts.clone(),
            self.segments.clone(),
            self.deals.clone(),
            Arc::new(self.documents()),
            self.config.clone(),
        )
    }

    pub fn pipeline(&self) -> PipelineService {
        PipelineService::new(
            self.deals.clone(),
            self.contacts.clone(),
            Arc::new(self.documents()),
            self.clock.clone(),
            self.config.clone(),
        )
    }
}

fn repo<T: Entity>(ids: &Arc<SequentialIds>, clock: &Arc<ManualClock>) -> Repo<T> {
    Arc::new(InMemoryRepository::<T>::new(ids.clone(), clock.clone()))
}
