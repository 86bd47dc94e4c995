//! GED (document management) DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use bureau::domain::{DocumentPatch, NewDocument, NewSignatureStep, SignatureStep};
use bureau::{
    Document, DocumentLink, Folder, LinkedEntityType, Notification, Scored, SignatureWorkflow,
    StepStatus, WorkflowStatus,
};

use super::common::double_option;

// ============================================
// Folders
// ============================================

#[derive(Debug, Serialize, ToSchema)]
pub struct FolderResponse {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    /// `/`-joined names from the root
    pub path: String,
    pub owner_id: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Folder> for FolderResponse {
    fn from(f: Folder) -> Self {
        Self {
            id: f.id,
            name: f.name,
            parent_id: f.parent_id,
            path: f.path,
            owner_id: f.owner_id,
            description: f.description,
            created_at: f.created_at,
            updated_at: f.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFolderRequest {
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub owner_id: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFolderRequest {
    pub name: Option<String>,
    /// `null` clears the description
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveFolderRequest {
    /// New parent; `null` moves the folder to the root
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FolderListParams {
    pub owner_id: Option<String>,
}

// ============================================
// Documents
// ============================================

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub title: String,
    pub folder_id: Option<Uuid>,
    pub owner_id: Option<String>,
    pub mime_type: String,
    pub size_bytes: u64,
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Document> for DocumentResponse {
    fn from(d: Document) -> Self {
        Self {
            id: d.id,
            title: d.title,
            folder_id: d.folder_id,
            owner_id: d.owner_id,
            mime_type: d.mime_type,
            size_bytes: d.size_bytes,
            tags: d.tags,
            description: d.description,
            version: d.version,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDocumentRequest {
    pub title: String,
    pub folder_id: Option<Uuid>,
    pub owner_id: Option<String>,
    pub mime_type: String,
    pub size_bytes: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    pub description: Option<String>,
}

impl From<CreateDocumentRequest> for NewDocument {
    fn from(r: CreateDocumentRequest) -> Self {
        NewDocument {
            title: r.title,
            folder_id: r.folder_id,
            owner_id: r.owner_id,
            mime_type: r.mime_type,
            size_bytes: r.size_bytes,
            tags: r.tags,
            description: r.description,
        }
    }
}

/// A new revision of the file
#[derive(Debug, Deserialize, ToSchema)]
pub struct DocumentContentRequest {
    pub mime_type: String,
    pub size_bytes: u64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDocumentRequest {
    pub title: Option<String>,
    /// `null` takes the document out of its folder
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub folder_id: Option<Option<Uuid>>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    /// New content bumps the version
    pub content: Option<DocumentContentRequest>,
}

impl From<UpdateDocumentRequest> for DocumentPatch {
    fn from(r: UpdateDocumentRequest) -> Self {
        DocumentPatch {
            title: r.title,
            folder_id: r.folder_id,
            tags: r.tags,
            description: r.description,
            content: r.content.map(|c| (c.mime_type, c.size_bytes)),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DocumentListParams {
    pub folder_id: Option<Uuid>,
    pub tag: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentSearchHit {
    pub document: DocumentResponse,
    /// Absent for an empty query
    pub score: Option<u32>,
}

impl From<Scored<Document>> for DocumentSearchHit {
    fn from(s: Scored<Document>) -> Self {
        Self {
            document: s.item.into(),
            score: s.score,
        }
    }
}

// ============================================
// Links
// ============================================

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentLinkResponse {
    pub id: Uuid,
    pub document_id: Uuid,
    #[schema(value_type = String)]
    pub entity_type: LinkedEntityType,
    pub entity_id: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DocumentLink> for DocumentLinkResponse {
    fn from(l: DocumentLink) -> Self {
        Self {
            id: l.id,
            document_id: l.document_id,
            entity_type: l.entity_type,
            entity_id: l.entity_id,
            note: l.note,
            created_at: l.created_at,
            updated_at: l.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLinkRequest {
    /// contact, company, deal, employee or campaign
    #[schema(value_type = String)]
    pub entity_type: LinkedEntityType,
    pub entity_id: String,
    pub note: Option<String>,
}

// ============================================
// Signatures
// ============================================

#[derive(Debug, Serialize, ToSchema)]
pub struct SignatureStepResponse {
    pub id: Uuid,
    pub order: u32,
    pub signer_name: String,
    pub signer_email: String,
    #[schema(value_type = String)]
    pub status: StepStatus,
    pub sent_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub decline_reason: Option<String>,
}

impl From<SignatureStep> for SignatureStepResponse {
    fn from(s: SignatureStep) -> Self {
        Self {
            id: s.id,
            order: s.order,
            signer_name: s.signer_name,
            signer_email: s.signer_email,
            status: s.status,
            sent_at: s.sent_at,
            completed_at: s.completed_at,
            decline_reason: s.decline_reason,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignatureWorkflowResponse {
    pub id: Uuid,
    pub document_id: Uuid,
    pub title: String,
    pub created_by: String,
    #[schema(value_type = String)]
    pub status: WorkflowStatus,
    pub steps: Vec<SignatureStepResponse>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SignatureWorkflow> for SignatureWorkflowResponse {
    fn from(w: SignatureWorkflow) -> Self {
        Self {
            id: w.id,
            document_id: w.document_id,
            title: w.title,
            created_by: w.created_by,
            status: w.status,
            steps: w.steps.into_iter().map(Into::into).collect(),
            expires_at: w.expires_at,
            created_at: w.created_at,
            updated_at: w.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSignatureRequest {
    pub document_id: Uuid,
    pub title: String,
    /// Email of the requester, notified of the outcome
    pub created_by: String,
    /// Defaults to the configured expiry window
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSignatureRequest {
    pub title: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddStepRequest {
    /// Signing round, starting at 1; equal orders sign in parallel
    pub order: u32,
    pub signer_name: String,
    pub signer_email: String,
}

impl From<AddStepRequest> for NewSignatureStep {
    fn from(r: AddStepRequest) -> Self {
        NewSignatureStep::new(r.order, r.signer_name, r.signer_email)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DeclineRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SignatureListParams {
    pub document_id: Option<Uuid>,
    #[param(value_type = Option<String>)]
    pub status: Option<WorkflowStatus>,
    pub signer: Option<String>,
}

// ============================================
// Notifications
// ============================================

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub workflow_id: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            recipient: n.recipient,
            subject: n.subject,
            body: n.body,
            workflow_id: n.workflow_id,
            read: n.read,
            created_at: n.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLinkRequest {
    /// `null` clears the note
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub note: Option<Option<String>>,
}
