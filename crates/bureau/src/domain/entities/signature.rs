//! SignatureWorkflow - Ordered electronic signature circuit for a document
//!
//! A workflow is built as a draft, started, and then driven by its signers:
//!
//! ```text
//! workflow: draft -> pending -> { completed | cancelled | expired }
//! step:     pending -> sent -> { signed | declined }
//!           pending | sent -> expired   (only when the workflow expires)
//! ```
//!
//! Steps carry an ordinal; a step can only be sent once every step with a
//! lower ordinal has signed. Steps sharing an ordinal are signed in
//! parallel. Every method either applies its transition completely or
//! returns an error and leaves the workflow untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::{require_email, require_name, Entity, Validate};
use crate::domain::config::DomainConfig;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{FieldValue, StepStatus, WorkflowStatus};

const WORKFLOW: &str = "SignatureWorkflow";
const STEP: &str = "SignatureStep";

/// One signer's position in the circuit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureStep {
    pub id: Uuid,
    /// Ordinal, 1-based; equal ordinals sign in parallel
    pub order: u32,
    pub signer_name: String,
    /// Stored lowercase
    pub signer_email: String,
    pub status: StepStatus,
    pub sent_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub decline_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureWorkflow {
    pub id: Uuid,
    pub document_id: Uuid,
    pub title: String,
    /// Email of the requester, notified when the workflow settles
    pub created_by: String,
    pub status: WorkflowStatus,
    /// Sorted by ordinal, insertion order within an ordinal
    pub steps: Vec<SignatureStep>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSignatureWorkflow {
    pub document_id: Uuid,
    pub title: String,
    pub created_by: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSignatureStep {
    pub order: u32,
    pub signer_name: String,
    pub signer_email: String,
}

/// Only applicable while the workflow is a draft
#[derive(Debug, Clone, Default)]
pub struct SignatureWorkflowPatch {
    pub title: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SignatureWorkflow {
    pub const BY_DOCUMENT: &'static str = "document";
    pub const BY_STATUS: &'static str = "status";
    pub const BY_SIGNER: &'static str = "signer";

    pub fn step(&self, step_id: Uuid) -> Option<&SignatureStep> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    fn step_index(&self, step_id: Uuid) -> Result<usize, DomainError> {
        self.steps
            .iter()
            .position(|s| s.id == step_id)
            .ok_or_else(|| DomainError::not_found(STEP, step_id))
    }

    /// Append a signer; only allowed while drafting
    pub fn add_step(&mut self, step_id: Uuid, step: NewSignatureStep) -> Result<&SignatureStep, DomainError> {
        if self.status != WorkflowStatus::Draft {
            return Err(DomainError::invalid_transition(
                WORKFLOW,
                self.status,
                self.status,
                "signers can only be added to a draft",
            ));
        }
        let email = step.signer_email.trim().to_lowercase();
        if self.steps.iter().any(|s| s.signer_email == email) {
            return Err(DomainError::duplicate("signature_steps", email));
        }

        self.steps.push(SignatureStep {
            id: step_id,
            order: step.order,
            signer_name: step.signer_name.trim().to_string(),
            signer_email: email,
            status: StepStatus::Pending,
            sent_at: None,
            completed_at: None,
            decline_reason: None,
        });
        // Stable: keeps insertion order within an ordinal
        self.steps.sort_by_key(|s| s.order);

        self.step(step_id)
            .ok_or_else(|| DomainError::not_found(STEP, step_id))
    }

    /// Drop a signer; only allowed while drafting
    pub fn remove_step(&mut self, step_id: Uuid) -> Result<(), DomainError> {
        if self.status != WorkflowStatus::Draft {
            return Err(DomainError::invalid_transition(
                WORKFLOW,
                self.status,
                self.status,
                "signers can only be removed from a draft",
            ));
        }
        let idx = self.step_index(step_id)?;
        self.steps.remove(idx);
        Ok(())
    }

    pub fn is_past_expiry(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Aggregate status as a function of the step statuses
    pub fn derive_status(&self, now: DateTime<Utc>) -> WorkflowStatus {
        if self.status == WorkflowStatus::Draft {
            return WorkflowStatus::Draft;
        }
        if self.steps.iter().any(|s| s.status == StepStatus::Declined) {
            return WorkflowStatus::Cancelled;
        }
        if !self.steps.is_empty() && self.steps.iter().all(|s| s.status == StepStatus::Signed) {
            return WorkflowStatus::Completed;
        }
        if self.steps.iter().any(|s| s.status == StepStatus::Expired) || self.is_past_expiry(now) {
            return WorkflowStatus::Expired;
        }
        WorkflowStatus::Pending
    }

    fn prior_ordinals_signed(&self, order: u32) -> bool {
        self.steps
            .iter()
            .filter(|s| s.order < order)
            .all(|s| s.status == StepStatus::Signed)
    }

    /// Pending steps whose earlier ordinals have all signed
    pub fn eligible_steps(&self) -> Vec<&SignatureStep> {
        if self.status != WorkflowStatus::Pending {
            return Vec::new();
        }
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Pending && self.prior_ordinals_signed(s.order))
            .collect()
    }

    fn ensure_accepting(&self, now: DateTime<Utc>, to: StepStatus) -> Result<(), DomainError> {
        if self.status != WorkflowStatus::Pending {
            return Err(DomainError::invalid_transition(
                WORKFLOW,
                self.status,
                format!("step {to}"),
                format!("workflow is {}, not awaiting signatures", self.status),
            ));
        }
        if self.is_past_expiry(now) {
            return Err(DomainError::invalid_transition(
                WORKFLOW,
                self.status,
                format!("step {to}"),
                "workflow has passed its expiry",
            ));
        }
        Ok(())
    }

    /// `draft -> pending`; sends the first ordinal and returns the sent step ids
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<Vec<Uuid>, DomainError> {
        if self.status != WorkflowStatus::Draft {
            return Err(DomainError::invalid_transition(
                WORKFLOW,
                self.status,
                WorkflowStatus::Pending,
                "only a draft can be started",
            ));
        }
        if self.steps.is_empty() {
            return Err(DomainError::invalid_transition(
                WORKFLOW,
                self.status,
                WorkflowStatus::Pending,
                "workflow has no signers",
            ));
        }
        if self.is_past_expiry(now) {
            return Err(DomainError::invalid_transition(
                WORKFLOW,
                self.status,
                WorkflowStatus::Pending,
                "expiry is already past",
            ));
        }

        self.status = WorkflowStatus::Pending;
        Ok(self.dispatch_eligible(now))
    }

    /// `pending -> sent` for one step
    pub fn send_step(&mut self, step_id: Uuid, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_accepting(now, StepStatus::Sent)?;
        let idx = self.step_index(step_id)?;
        let step = &self.steps[idx];
        if step.status != StepStatus::Pending {
            return Err(DomainError::invalid_transition(
                STEP,
                step.status,
                StepStatus::Sent,
                "step was already sent or decided",
            ));
        }
        if !self.prior_ordinals_signed(step.order) {
            return Err(DomainError::invalid_transition(
                STEP,
                step.status,
                StepStatus::Sent,
                "earlier signers have not all signed",
            ));
        }

        let step = &mut self.steps[idx];
        step.status = StepStatus::Sent;
        step.sent_at = Some(now);
        Ok(())
    }

    /// Send every eligible step, returning their ids
    pub fn dispatch_eligible(&mut self, now: DateTime<Utc>) -> Vec<Uuid> {
        let ids: Vec<Uuid> = self.eligible_steps().iter().map(|s| s.id).collect();
        for step in self.steps.iter_mut().filter(|s| ids.contains(&s.id)) {
            step.status = StepStatus::Sent;
            step.sent_at = Some(now);
        }
        ids
    }

    /// `sent -> signed`; returns the ids of steps sent as a consequence
    pub fn sign_step(&mut self, step_id: Uuid, now: DateTime<Utc>) -> Result<Vec<Uuid>, DomainError> {
        self.ensure_accepting(now, StepStatus::Signed)?;
        let idx = self.step_index(step_id)?;
        let step = &self.steps[idx];
        if step.status != StepStatus::Sent {
            return Err(DomainError::invalid_transition(
                STEP,
                step.status,
                StepStatus::Signed,
                "only a sent step can be signed",
            ));
        }

        let step = &mut self.steps[idx];
        step.status = StepStatus::Signed;
        step.completed_at = Some(now);
        self.status = self.derive_status(now);

        if self.status == WorkflowStatus::Pending {
            Ok(self.dispatch_eligible(now))
        } else {
            Ok(Vec::new())
        }
    }

    /// `sent -> declined`; cancels the whole workflow
    pub fn decline_step(
        &mut self,
        step_id: Uuid,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.ensure_accepting(now, StepStatus::Declined)?;
        let idx = self.step_index(step_id)?;
        let step = &self.steps[idx];
        if step.status != StepStatus::Sent {
            return Err(DomainError::invalid_transition(
                STEP,
                step.status,
                StepStatus::Declined,
                "only a sent step can be declined",
            ));
        }

        let step = &mut self.steps[idx];
        step.status = StepStatus::Declined;
        step.completed_at = Some(now);
        step.decline_reason = reason;
        self.status = self.derive_status(now);
        Ok(())
    }

    /// Force a pending workflow past its expiry, and its open steps, to expired
    ///
    /// Returns whether anything changed.
    pub fn expire_if_due(&mut self, now: DateTime<Utc>) -> bool {
        if self.status != WorkflowStatus::Pending || !self.is_past_expiry(now) {
            return false;
        }
        for step in self.steps.iter_mut().filter(|s| s.status.is_open()) {
            step.status = StepStatus::Expired;
            step.completed_at = Some(now);
        }
        self.status = WorkflowStatus::Expired;
        true
    }

    /// Lowercase emails of every signer
    pub fn signer_emails(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.signer_email.clone()).collect()
    }
}

impl NewSignatureWorkflow {
    pub fn new(
        document_id: Uuid,
        title: impl Into<String>,
        created_by: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            document_id,
            title: title.into(),
            created_by: created_by.into(),
            expires_at,
        }
    }
}

impl NewSignatureStep {
    pub fn new(order: u32, signer_name: impl Into<String>, signer_email: impl Into<String>) -> Self {
        Self {
            order,
            signer_name: signer_name.into(),
            signer_email: signer_email.into(),
        }
    }
}

impl Validate for NewSignatureWorkflow {
    fn validate(&self, config: &DomainConfig) -> Result<(), DomainError> {
        require_name("title", &self.title, config)?;
        require_email("created_by", &self.created_by)
    }
}

impl Validate for NewSignatureStep {
    fn validate(&self, config: &DomainConfig) -> Result<(), DomainError> {
        if self.order == 0 {
            return Err(DomainError::validation("order", "must be at least 1"));
        }
        require_name("signer_name", &self.signer_name, config)?;
        require_email("signer_email", &self.signer_email)
    }
}

impl Validate for SignatureWorkflowPatch {
    fn validate(&self, config: &DomainConfig) -> Result<(), DomainError> {
        if let Some(title) = &self.title {
            require_name("title", title, config)?;
        }
        Ok(())
    }
}

impl Entity for SignatureWorkflow {
    const ENTITY_TYPE: &'static str = WORKFLOW;
    const FIELDS: &'static [&'static str] = &[
        "id",
        "document_id",
        "title",
        "created_by",
        "status",
        "signers",
        "step_count",
        "expires_at",
        "created_at",
        "updated_at",
    ];
    const INDEXES: &'static [&'static str] = &[Self::BY_DOCUMENT, Self::BY_STATUS, Self::BY_SIGNER];

    type Draft = NewSignatureWorkflow;
    type Patch = SignatureWorkflowPatch;

    fn from_draft(id: Uuid, now: DateTime<Utc>, draft: NewSignatureWorkflow) -> Self {
        Self {
            id,
            document_id: draft.document_id,
            title: draft.title.trim().to_string(),
            created_by: draft.created_by.trim().to_lowercase(),
            status: WorkflowStatus::Draft,
            steps: Vec::new(),
            expires_at: draft.expires_at,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: SignatureWorkflowPatch) {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(expires_at) = patch.expires_at {
            self.expires_at = expires_at;
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
            "title" => self.title.as_str().into(),
            "created_by" => self.created_by.as_str().into(),
            "status" => self.status.to_string().into(),
            "signers" => self.signer_emails().into(),
            "step_count" => (self.steps.len() as u64).into(),
            "expires_at" => self.expires_at.into(),
            "created_at" => self.created_at.into(),
            "updated_at" => self.updated_at.into(),
            _ => return None,
        })
    }

    fn index_keys(&self, index: &str) -> Vec<String> {
        match index {
            Self::BY_DOCUMENT => vec![self.document_id.to_string()],
            Self::BY_STATUS => vec![self.status.to_string()],
            Self::BY_SIGNER => self.signer_emails(),
            _ => Vec::new(),
        }
    }
}
