//! Signature Application Service (Use Case)
//!
//! Drives signature workflows through their state machine and records a
//! notification whenever a signer is asked to sign or a workflow reaches an
//! outcome. Expiry is settled before any requested transition is applied.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use bureau::domain::{
    NewNotification, NewSignatureStep, NewSignatureWorkflow, NotificationPatch,
    SignatureWorkflowPatch,
};
use bureau::{
    Clock, Document, DomainConfig, DomainError, IdGenerator, Notification, Repo,
    SignatureWorkflow, Validate, WorkflowStatus,
};

/// Application service for SignatureWorkflow operations
pub struct SignatureService {
    workflows: Repo<SignatureWorkflow>,
    documents: Repo<Document>,
    notifications: Repo<Notification>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    config: Arc<DomainConfig>,
}

impl SignatureService {
    pub fn new(
        workflows: Repo<SignatureWorkflow>,
        documents: Repo<Document>,
        notifications: Repo<Notification>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
        config: Arc<DomainConfig>,
    ) -> Self {
        Self {
            workflows,
            documents,
            notifications,
            ids,
            clock,
            config,
        }
    }

    /// Get all workflows
    pub async fn list_all(&self) -> Result<Vec<SignatureWorkflow>, DomainError> {
        self.workflows.find_all().await
    }

    /// Get a workflow by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<SignatureWorkflow>, DomainError> {
        self.workflows.find_by_id(id).await
    }

    pub async fn list_for_document(&self, document_id: Uuid) -> Result<Vec<SignatureWorkflow>, DomainError> {
        self.workflows
            .find_by_index(SignatureWorkflow::BY_DOCUMENT, &document_id.to_string())
            .await
    }

    pub async fn list_by_status(&self, status: WorkflowStatus) -> Result<Vec<SignatureWorkflow>, DomainError> {
        self.workflows
            .find_by_index(SignatureWorkflow::BY_STATUS, &status.to_string())
            .await
    }

    /// Workflows in which `email` is one of the signers
    pub async fn list_for_signer(&self, email: &str) -> Result<Vec<SignatureWorkflow>, DomainError> {
        self.workflows
            .find_by_index(SignatureWorkflow::BY_SIGNER, &email.trim().to_lowercase())
            .await
    }

    async fn require(&self, id: Uuid) -> Result<SignatureWorkflow, DomainError> {
        self.workflows
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("SignatureWorkflow", id))
    }

    /// Now plus the configured number of days
    fn default_expiry(&self) -> Result<DateTime<Utc>, DomainError> {
        let days = self.config.signature_expiry_days;
        Duration::try_days(days)
            .and_then(|span| self.clock.now().checked_add_signed(span))
            .ok_or_else(|| {
                DomainError::validation(
                    "expires_at",
                    format!("{days} day(s) from now is out of range"),
                )
            })
    }

    /// Create a draft workflow for a document
    ///
    /// Without an explicit expiry the workflow expires after the configured
    /// number of days.
    pub async fn create(
        &self,
        document_id: Uuid,
        title: String,
        created_by: String,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<SignatureWorkflow, DomainError> {
        let expires_at = match expires_at {
            Some(at) => at,
            None => self.default_expiry()?,
        };
        let draft = NewSignatureWorkflow::new(document_id, title, created_by, expires_at);
        draft.validate(&self.config)?;
        if self.documents.find_by_id(document_id).await?.is_none() {
            return Err(DomainError::not_found("Document", document_id));
        }

        let saved = self.workflows.create(draft).await?;
        tracing::info!(
            "Created SignatureWorkflow: {} ({}) for Document {}",
            saved.title,
            saved.id,
            saved.document_id
        );
        Ok(saved)
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: SignatureWorkflowPatch,
    ) -> Result<SignatureWorkflow, DomainError> {
        patch.validate(&self.config)?;
        let current = self.require(id).await?;
        if current.status != WorkflowStatus::Draft {
            return Err(DomainError::invalid_transition(
                "SignatureWorkflow",
                current.status,
                current.status,
                "only a draft can be edited",
            ));
        }
        self.workflows.update(id, patch).await
    }

    /// Add a signer to a draft workflow
    pub async fn add_step(
        &self,
        id: Uuid,
        step: NewSignatureStep,
    ) -> Result<SignatureWorkflow, DomainError> {
        step.validate(&self.config)?;
        let step_id = self.ids.next_id();
        let saved = self
            .workflows
            .modify(
                id,
                Box::new(move |workflow| workflow.add_step(step_id, step).map(|_| ())),
            )
            .await?;
        tracing::info!("Added signer step {} to SignatureWorkflow {}", step_id, id);
        Ok(saved)
    }

    pub async fn remove_step(&self, id: Uuid, step_id: Uuid) -> Result<SignatureWorkflow, DomainError> {
        self.workflows
            .modify(id, Box::new(move |workflow| workflow.remove_step(step_id)))
            .await
    }

    /// `draft -> pending`, notifying the first signers
    pub async fn start(&self, id: Uuid) -> Result<SignatureWorkflow, DomainError> {
        let now = self.clock.now();
        let mut sent = Vec::new();
        let saved = self
            .workflows
            .modify(
                id,
                Box::new(|workflow| {
                    sent = workflow.start(now)?;
                    Ok(())
                }),
            )
            .await?;

        tracing::info!("Started SignatureWorkflow: {} ({} signer(s) notified)", id, sent.len());
        self.notify_signers(&saved, &sent).await?;
        Ok(saved)
    }

    /// Sign a sent step; the next ordinal is dispatched once its turn comes
    pub async fn sign(&self, id: Uuid, step_id: Uuid) -> Result<SignatureWorkflow, DomainError> {
        let now = self.clock.now();
        self.settle_expiry(id, now).await?;

        let mut sent = Vec::new();
        let saved = self
            .workflows
            .modify(
                id,
                Box::new(|workflow| {
                    sent = workflow.sign_step(step_id, now)?;
                    Ok(())
                }),
            )
            .await?;
        tracing::info!("Step {} signed in SignatureWorkflow {}", step_id, id);

        self.notify_signers(&saved, &sent).await?;
        if saved.status == WorkflowStatus::Completed {
            tracing::info!("SignatureWorkflow completed: {}", id);
            self.notify_creator(&saved).await?;
        }
        Ok(saved)
    }

    /// Decline a sent step, cancelling the whole workflow
    pub async fn decline(
        &self,
        id: Uuid,
        step_id: Uuid,
        reason: Option<String>,
    ) -> Result<SignatureWorkflow, DomainError> {
        let now = self.clock.now();
        self.settle_expiry(id, now).await?;

        let saved = self
            .workflows
            .modify(
                id,
                Box::new(move |workflow| workflow.decline_step(step_id, reason, now)),
            )
            .await?;
        tracing::warn!("Step {} declined, SignatureWorkflow {} cancelled", step_id, id);

        self.notify_creator(&saved).await?;
        Ok(saved)
    }

    /// Expire every pending workflow whose deadline has passed
    pub async fn expire_due(&self) -> Result<Vec<SignatureWorkflow>, DomainError> {
        let now = self.clock.now();
        let mut expired = Vec::new();
        for workflow in self.list_by_status(WorkflowStatus::Pending).await? {
            if let Some(saved) = self.expire_if_due(workflow.id, now).await? {
                expired.push(saved);
            }
        }
        if !expired.is_empty() {
            tracing::info!("Expired {} SignatureWorkflow(s)", expired.len());
        }
        Ok(expired)
    }

    /// Persist a pending expiry so the caller's transition sees the expired state
    async fn settle_expiry(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), DomainError> {
        let workflow = self.require(id).await?;
        if workflow.status == WorkflowStatus::Pending && workflow.is_past_expiry(now) {
            if let Some(saved) = self.expire_if_due(id, now).await? {
                tracing::info!("SignatureWorkflow expired: {}", saved.id);
            }
        }
        Ok(())
    }

    /// Expire one workflow, re-checking its deadline under the store lock
    async fn expire_if_due(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<SignatureWorkflow>, DomainError> {
        let saved = self
            .workflows
            .modify(
                id,
                Box::new(|workflow| {
                    if !workflow.expire_if_due(now) {
                        return Err(DomainError::invalid_transition(
                            "SignatureWorkflow",
                            workflow.status,
                            WorkflowStatus::Expired,
                            "workflow is not due to expire",
                        ));
                    }
                    Ok(())
                }),
            )
            .await;
        match saved {
            Ok(saved) => {
                self.notify_creator(&saved).await?;
                Ok(Some(saved))
            }
            // Settled or removed by another caller in the meantime
            Err(DomainError::InvalidTransition { .. } | DomainError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn notify_signers(
        &self,
        workflow: &SignatureWorkflow,
        step_ids: &[Uuid],
    ) -> Result<(), DomainError> {
        for step in workflow.steps.iter().filter(|s| step_ids.contains(&s.id)) {
            self.notify(NewNotification {
                recipient: step.signer_email.clone(),
                subject: format!("Signature requested: {}", workflow.title),
                body: format!(
                    "{}, please sign \"{}\" before {}.",
                    step.signer_name,
                    workflow.title,
                    workflow.expires_at.format("%Y-%m-%d %H:%M UTC")
                ),
                workflow_id: Some(workflow.id),
            })
            .await?;
        }
        Ok(())
    }

    async fn notify_creator(&self, workflow: &SignatureWorkflow) -> Result<(), DomainError> {
        self.notify(NewNotification {
            recipient: workflow.created_by.clone(),
            subject: format!("Signature workflow {}: {}", workflow.status, workflow.title),
            body: format!(
                "\"{}\" is now {} ({} of {} signature(s) collected).",
                workflow.title,
                workflow.status,
                workflow
                    .steps
                    .iter()
                    .filter(|s| s.status == bureau::StepStatus::Signed)
                    .count(),
                workflow.steps.len()
            ),
            workflow_id: Some(workflow.id),
        })
        .await
    }

    async fn notify(&self, draft: NewNotification) -> Result<(), DomainError> {
        draft.validate(&self.config)?;
        let saved = self.notifications.create(draft).await?;
        tracing::debug!("Notification {} queued for {}", saved.id, saved.recipient);
        Ok(())
    }

    /// Inbox of one recipient, oldest first
    pub async fn notifications_for(&self, recipient: &str) -> Result<Vec<Notification>, DomainError> {
        self.notifications
            .find_by_index(Notification::BY_RECIPIENT, &recipient.trim().to_lowercase())
            .await
    }

    /// Mark a notification read; it must belong to `recipient`
    pub async fn mark_read(&self, recipient: &str, id: Uuid) -> Result<Notification, DomainError> {
        let recipient = recipient.trim().to_lowercase();
        match self.notifications.find_by_id(id).await? {
            Some(n) if n.recipient == recipient => {
                self.notifications
                    .update(id, NotificationPatch { read: Some(true) })
                    .await
            }
            _ => Err(DomainError::not_found("Notification", id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::Fixture;
    use async_trait::async_trait;
    use bureau::domain::NewDocument;
    use bureau::{EntityRepository, Filter, Mutation, StepStatus};

    /// Hands control back to the runtime after every read, so concurrent
    /// callers interleave between looking a workflow up and changing it
    struct YieldingRepo(Repo<SignatureWorkflow>);

    #[async_trait]
    impl EntityRepository<SignatureWorkflow> for YieldingRepo {
        async fn create(&self, draft: NewSignatureWorkflow) -> Result<SignatureWorkflow, DomainError> {
            self.0.create(draft).await
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<SignatureWorkflow>, DomainError> {
            let found = self.0.find_by_id(id).await;
            tokio::task::yield_now().await;
            found
        }

        async fn find_all(&self) -> Result<Vec<SignatureWorkflow>, DomainError> {
            self.0.find_all().await
        }

        async fn find_where(&self, filter: &Filter) -> Result<Vec<SignatureWorkflow>, DomainError> {
            self.0.find_where(filter).await
        }

        async fn find_by_index(&self, index: &str, key: &str) -> Result<Vec<SignatureWorkflow>, DomainError> {
            let found = self.0.find_by_index(index, key).await;
            tokio::task::yield_now().await;
            found
        }

        async fn update(&self, id: Uuid, patch: SignatureWorkflowPatch) -> Result<SignatureWorkflow, DomainError> {
            self.0.update(id, patch).await
        }

        async fn modify<'a>(
            &self,
            id: Uuid,
            change: Mutation<'a, SignatureWorkflow>,
        ) -> Result<SignatureWorkflow, DomainError> {
            self.0.modify(id, change).await
        }

        async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
            self.0.delete(id).await
        }
    }

    fn yielding_service(fx: &Fixture) -> SignatureService {
        SignatureService::new(
            Arc::new(YieldingRepo(fx.workflows.clone())),
            fx.docs.clone(),
            fx.notifications.clone(),
            fx.ids.clone(),
            fx.clock.clone(),
            fx.config.clone(),
        )
    }

    async fn workflow_with_signers(fx: &Fixture, signers: &[(u32, &str)]) -> SignatureWorkflow {
        let doc = fx
            .documents()
            .create(NewDocument::new("Lease", "application/pdf", 10))
            .await
            .unwrap();
        let service = fx.signatures();
        let mut wf = service
            .create(doc.id, "Lease signature".into(), "owner@bureau.test".into(), None)
            .await
            .unwrap();
        for (order, email) in signers {
            wf = service
                .add_step(wf.id, NewSignatureStep::new(*order, "Signer", *email))
                .await
                .unwrap();
        }
        wf
    }

    #[tokio::test]
    async fn test_two_sequential_signers_complete() {
        let fx = Fixture::new();
        let service = fx.signatures();
        let wf = workflow_with_signers(&fx, &[(1, "ana@bureau.test"), (2, "ben@bureau.test")]).await;
        let (first, second) = (wf.steps[0].id, wf.steps[1].id);

        let wf = service.start(wf.id).await.unwrap();
        assert_eq!(wf.status, WorkflowStatus::Pending);
        assert_eq!(wf.step(first).unwrap().status, StepStatus::Sent);
        assert_eq!(wf.step(second).unwrap().status, StepStatus::Pending);

        let wf = service.sign(wf.id, first).await.unwrap();
        assert_eq!(wf.step(second).unwrap().status, StepStatus::Sent);
        assert_eq!(wf.status, WorkflowStatus::Pending);

        let wf = service.sign(wf.id, second).await.unwrap();
        assert_eq!(wf.status, WorkflowStatus::Completed);
        assert!(wf.steps.iter().all(|s| s.status == StepStatus::Signed));

        assert_eq!(service.notifications_for("ana@bureau.test").await.unwrap().len(), 1);
        assert_eq!(service.notifications_for("BEN@bureau.test").await.unwrap().len(), 1);
        let inbox = service.notifications_for("owner@bureau.test").await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert!(inbox[0].subject.contains("completed"));
    }

    #[tokio::test]
    async fn test_decline_cancels_and_blocks_further_steps() {
        let fx = Fixture::new();
        let service = fx.signatures();
        let wf = workflow_with_signers(&fx, &[(1, "ana@bureau.test"), (1, "ben@bureau.test")]).await;
        let (a, b) = (wf.steps[0].id, wf.steps[1].id);
        service.start(wf.id).await.unwrap();

        let wf = service
            .decline(wf.id, a, Some("wrong address".into()))
            .await
            .unwrap();
        assert_eq!(wf.status, WorkflowStatus::Cancelled);

        let err = service.sign(wf.id, b).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
        let unchanged = service.get_by_id(wf.id).await.unwrap().unwrap();
        assert_eq!(unchanged, wf);
    }

    #[tokio::test]
    async fn test_expiry_is_settled_before_signing() {
        let fx = Fixture::new();
        let service = fx.signatures();
        let wf = workflow_with_signers(&fx, &[(1, "ana@bureau.test")]).await;
        let step = wf.steps[0].id;
        service.start(wf.id).await.unwrap();

        fx.clock.advance(Duration::days(31));
        let err = service.sign(wf.id, step).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));

        let wf = service.get_by_id(wf.id).await.unwrap().unwrap();
        assert_eq!(wf.status, WorkflowStatus::Expired);
        assert_eq!(wf.steps[0].status, StepStatus::Expired);
        assert!(service.expire_due().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expire_due_sweeps_pending_workflows() {
        let fx = Fixture::new();
        let service = fx.signatures();
        let wf = workflow_with_signers(&fx, &[(1, "ana@bureau.test")]).await;
        service.start(wf.id).await.unwrap();

        assert!(service.expire_due().await.unwrap().is_empty());
        fx.clock.advance(Duration::days(30));
        let expired = service.expire_due().await.unwrap();
        assert_eq!(expired.len(), 1);
        assert!(service
            .list_by_status(WorkflowStatus::Pending)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            service.list_by_status(WorkflowStatus::Expired).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_workflow_needs_an_existing_document() {
        let fx = Fixture::new();
        let err = fx
            .signatures()
            .create(Uuid::from_u128(5000), "Ghost".into(), "owner@bureau.test".into(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_mark_read_checks_recipient() {
        let fx = Fixture::new();
        let service = fx.signatures();
        let wf = workflow_with_signers(&fx, &[(1, "ana@bureau.test")]).await;
        service.start(wf.id).await.unwrap();
        let note = service.notifications_for("ana@bureau.test").await.unwrap()[0].clone();

        assert!(service.mark_read("ben@bureau.test", note.id).await.is_err());
        let read = service.mark_read("ana@bureau.test", note.id).await.unwrap();
        assert!(read.read);
    }

    #[tokio::test]
    async fn test_parallel_signers_signing_at_once_both_count() {
        let fx = Fixture::new();
        let service = yielding_service(&fx);
        let wf = workflow_with_signers(&fx, &[(1, "ana@bureau.test"), (1, "ben@bureau.test")]).await;
        let (a, b) = (wf.steps[0].id, wf.steps[1].id);
        service.start(wf.id).await.unwrap();

        let (first, second) = tokio::join!(service.sign(wf.id, a), service.sign(wf.id, b));
        first.unwrap();
        second.unwrap();

        let stored = service.get_by_id(wf.id).await.unwrap().unwrap();
        assert!(stored.steps.iter().all(|s| s.status == StepStatus::Signed));
        assert_eq!(stored.status, WorkflowStatus::Completed);
        let inbox = service.notifications_for("owner@bureau.test").await.unwrap();
        assert_eq!(inbox.len(), 1);
    }

    #[tokio::test]
    async fn test_sweeper_and_signer_racing_past_expiry_settle_once() {
        let fx = Fixture::new();
        let service = yielding_service(&fx);
        let wf = workflow_with_signers(&fx, &[(1, "ana@bureau.test")]).await;
        let step = wf.steps[0].id;
        service.start(wf.id).await.unwrap();
        fx.clock.advance(Duration::days(31));

        let (signed, swept) = tokio::join!(service.sign(wf.id, step), service.expire_due());
        assert!(matches!(signed, Err(DomainError::InvalidTransition { .. })));
        swept.unwrap();

        let stored = service.get_by_id(wf.id).await.unwrap().unwrap();
        assert_eq!(stored.status, WorkflowStatus::Expired);
        let inbox = service.notifications_for("owner@bureau.test").await.unwrap();
        assert_eq!(inbox.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_transition_leaves_workflow_untouched() {
        let fx = Fixture::new();
        let service = fx.signatures();
        let wf = workflow_with_signers(&fx, &[(1, "ana@bureau.test")]).await;

        let err = service.sign(wf.id, wf.steps[0].id).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
        assert_eq!(service.get_by_id(wf.id).await.unwrap().unwrap(), wf);
    }

    #[tokio::test]
    async fn test_out_of_range_default_expiry_is_rejected() {
        let mut fx = Fixture::new();
        fx.config = Arc::new(DomainConfig::default().with_signature_expiry_days(200_000_000_000_000));
        let doc = fx
            .documents()
            .create(NewDocument::new("Lease", "application/pdf", 10))
            .await
            .unwrap();
        let service = fx.signatures();

        let err = service
            .create(doc.id, "Lease".into(), "owner@bureau.test".into(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed { .. }));

        let explicit = fx.clock_now() + Duration::days(7);
        let wf = service
            .create(doc.id, "Lease".into(), "owner@bureau.test".into(), Some(explicit))
            .await
            .unwrap();
        assert_eq!(wf.expires_at, explicit);
    }
}
