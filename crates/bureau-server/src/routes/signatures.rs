//! Signature Routes - multi-signer workflows and their notifications
//!
//! HTTP handlers that delegate to SignatureService.

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;

use bureau::domain::SignatureWorkflowPatch;

use super::{domain_error, not_found, ApiError};
use crate::models::{
    AddStepRequest, CreateSignatureRequest, DeclineRequest, NotificationResponse,
    SignatureListParams, SignatureWorkflowResponse, UpdateSignatureRequest,
};
use crate::AppState;

type WorkflowResult = Result<Json<SignatureWorkflowResponse>, ApiError>;

fn workflow_list(workflows: Vec<bureau::SignatureWorkflow>) -> Json<Vec<SignatureWorkflowResponse>> {
    Json(workflows.into_iter().map(Into::into).collect())
}

/// List workflows by document, status or signer
#[utoipa::path(
    get,
    path = "/bureau/signatures",
    params(SignatureListParams),
    responses(
        (status = 200, description = "Signature workflows", body = Vec<SignatureWorkflowResponse>)
    ),
    tag = "Signatures"
)]
pub async fn list_signatures(
    State(state): State<AppState>,
    Query(params): Query<SignatureListParams>,
) -> Result<Json<Vec<SignatureWorkflowResponse>>, ApiError> {
    let service = &state.signature_service;
    let workflows = if let Some(document_id) = params.document_id {
        service.list_for_document(document_id).await
    } else if let Some(status) = params.status {
        service.list_by_status(status).await
    } else if let Some(signer) = params.signer {
        service.list_for_signer(&signer).await
    } else {
        service.list_all().await
    }
    .map_err(domain_error)?;

    Ok(workflow_list(workflows))
}

/// Open a draft workflow on a document
#[utoipa::path(
    post,
    path = "/bureau/signatures",
    request_body = CreateSignatureRequest,
    responses(
        (status = 200, description = "Draft created", body = SignatureWorkflowResponse),
        (status = 404, description = "Document not found"),
        (status = 422, description = "Invalid title, requester or expiry")
    ),
    tag = "Signatures"
)]
pub async fn create_signature(
    State(state): State<AppState>,
    Json(payload): Json<CreateSignatureRequest>,
) -> WorkflowResult {
    let workflow = state
        .signature_service
        .create(
            payload.document_id,
            payload.title,
            payload.created_by,
            payload.expires_at,
        )
        .await
        .map_err(domain_error)?;

    Ok(Json(workflow.into()))
}

#[utoipa::path(
    get,
    path = "/bureau/signatures/{id}",
    params(("id" = Uuid, Path, description = "Workflow ID")),
    responses(
        (status = 200, description = "Workflow found", body = SignatureWorkflowResponse),
        (status = 404, description = "Workflow not found")
    ),
    tag = "Signatures"
)]
pub async fn get_signature(State(state): State<AppState>, Path(id): Path<Uuid>) -> WorkflowResult {
    let workflow = state
        .signature_service
        .get_by_id(id)
        .await
        .map_err(domain_error)?
        .ok_or_else(|| not_found("SignatureWorkflow"))?;

    Ok(Json(workflow.into()))
}

/// Edit a draft workflow
#[utoipa::path(
    put,
    path = "/bureau/signatures/{id}",
    params(("id" = Uuid, Path, description = "Workflow ID")),
    request_body = UpdateSignatureRequest,
    responses(
        (status = 200, description = "Workflow updated", body = SignatureWorkflowResponse),
        (status = 404, description = "Workflow not found"),
        (status = 409, description = "Workflow already started")
    ),
    tag = "Signatures"
)]
pub async fn update_signature(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSignatureRequest>,
) -> WorkflowResult {
    let patch = SignatureWorkflowPatch {
        title: payload.title,
        expires_at: payload.expires_at,
    };
    let workflow = state
        .signature_service
        .update(id, patch)
        .await
        .map_err(domain_error)?;

    Ok(Json(workflow.into()))
}

/// Add a signer step to a draft
#[utoipa::path(
    post,
    path = "/bureau/signatures/{id}/steps",
    params(("id" = Uuid, Path, description = "Workflow ID")),
    request_body = AddStepRequest,
    responses(
        (status = 200, description = "Step added", body = SignatureWorkflowResponse),
        (status = 404, description = "Workflow not found"),
        (status = 409, description = "Workflow already started or signer already present")
    ),
    tag = "Signatures"
)]
pub async fn add_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddStepRequest>,
) -> WorkflowResult {
    let workflow = state
        .signature_service
        .add_step(id, payload.into())
        .await
        .map_err(domain_error)?;

    Ok(Json(workflow.into()))
}

#[utoipa::path(
    delete,
    path = "/bureau/signatures/{id}/steps/{step_id}",
    params(
        ("id" = Uuid, Path, description = "Workflow ID"),
        ("step_id" = Uuid, Path, description = "Step ID")
    ),
    responses(
        (status = 200, description = "Step removed", body = SignatureWorkflowResponse),
        (status = 404, description = "Workflow or step not found"),
        (status = 409, description = "Workflow already started")
    ),
    tag = "Signatures"
)]
pub async fn remove_step(
    State(state): State<AppState>,
    Path((id, step_id)): Path<(Uuid, Uuid)>,
) -> WorkflowResult {
    let workflow = state
        .signature_service
        .remove_step(id, step_id)
        .await
        .map_err(domain_error)?;

    Ok(Json(workflow.into()))
}

/// Send the workflow to its first signers
#[utoipa::path(
    post,
    path = "/bureau/signatures/{id}/start",
    params(("id" = Uuid, Path, description = "Workflow ID")),
    responses(
        (status = 200, description = "Workflow pending", body = SignatureWorkflowResponse),
        (status = 404, description = "Workflow not found"),
        (status = 409, description = "Not a draft, or no signers")
    ),
    tag = "Signatures"
)]
pub async fn start_signature(State(state): State<AppState>, Path(id): Path<Uuid>) -> WorkflowResult {
    let workflow = state
        .signature_service
        .start(id)
        .await
        .map_err(domain_error)?;

    Ok(Json(workflow.into()))
}

#[utoipa::path(
    post,
    path = "/bureau/signatures/{id}/steps/{step_id}/sign",
    params(
        ("id" = Uuid, Path, description = "Workflow ID"),
        ("step_id" = Uuid, Path, description = "Step ID")
    ),
    responses(
        (status = 200, description = "Step signed", body = SignatureWorkflowResponse),
        (status = 404, description = "Workflow or step not found"),
        (status = 409, description = "Step not awaiting a signature, or workflow closed")
    ),
    tag = "Signatures"
)]
pub async fn sign_step(
    State(state): State<AppState>,
    Path((id, step_id)): Path<(Uuid, Uuid)>,
) -> WorkflowResult {
    let workflow = state
        .signature_service
        .sign(id, step_id)
        .await
        .map_err(domain_error)?;

    Ok(Json(workflow.into()))
}

/// Decline a step; the whole workflow is cancelled
#[utoipa::path(
    post,
    path = "/bureau/signatures/{id}/steps/{step_id}/decline",
    params(
        ("id" = Uuid, Path, description = "Workflow ID"),
        ("step_id" = Uuid, Path, description = "Step ID")
    ),
    request_body = DeclineRequest,
    responses(
        (status = 200, description = "Step declined", body = SignatureWorkflowResponse),
        (status = 404, description = "Workflow or step not found"),
        (status = 409, description = "Step not awaiting a signature, or workflow closed")
    ),
    tag = "Signatures"
)]
pub async fn decline_step(
    State(state): State<AppState>,
    Path((id, step_id)): Path<(Uuid, Uuid)>,
    payload: Option<Json<DeclineRequest>>,
) -> WorkflowResult {
    let reason = payload.and_then(|Json(body)| body.reason);
    let workflow = state
        .signature_service
        .decline(id, step_id, reason)
        .await
        .map_err(domain_error)?;

    Ok(Json(workflow.into()))
}

/// Expire every pending workflow past its deadline
#[utoipa::path(
    post,
    path = "/bureau/signatures/expire",
    responses(
        (status = 200, description = "Workflows expired by this sweep", body = Vec<SignatureWorkflowResponse>)
    ),
    tag = "Signatures"
)]
pub async fn expire_signatures(
    State(state): State<AppState>,
) -> Result<Json<Vec<SignatureWorkflowResponse>>, ApiError> {
    let expired = state
        .signature_service
        .expire_due()
        .await
        .map_err(domain_error)?;

    Ok(workflow_list(expired))
}

/// Inbox of one email address
#[utoipa::path(
    get,
    path = "/bureau/notifications/{recipient}",
    params(("recipient" = String, Path, description = "Recipient email")),
    responses(
        (status = 200, description = "Notifications, oldest first", body = Vec<NotificationResponse>)
    ),
    tag = "Signatures"
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    Path(recipient): Path<String>,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    let notifications = state
        .signature_service
        .notifications_for(&recipient)
        .await
        .map_err(domain_error)?;

    Ok(Json(notifications.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/bureau/notifications/{recipient}/{id}/read",
    params(
        ("recipient" = String, Path, description = "Recipient email"),
        ("id" = Uuid, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification marked read", body = NotificationResponse),
        (status = 404, description = "No such notification for this recipient")
    ),
    tag = "Signatures"
)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path((recipient, id)): Path<(String, Uuid)>,
) -> Result<Json<NotificationResponse>, ApiError> {
    let notification = state
        .signature_service
        .mark_read(&recipient, id)
        .await
        .map_err(domain_error)?;

    Ok(Json(notification.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bureau/signatures", get(list_signatures).post(create_signature))
        .route("/bureau/signatures/expire", post(expire_signatures))
        .route(
            "/bureau/signatures/:id",
            get(get_signature).put(update_signature),
        )
        .route("/bureau/signatures/:id/start", post(start_signature))
        .route("/bureau/signatures/:id/steps", post(add_step))
        .route("/bureau/signatures/:id/steps/:step_id", delete(remove_step))
        .route("/bureau/signatures/:id/steps/:step_id/sign", post(sign_step))
        .route(
            "/bureau/signatures/:id/steps/:step_id/decline",
            post(decline_step),
        )
        .route("/bureau/notifications/:recipient", get(list_notifications))
        .route(
            "/bureau/notifications/:recipient/:id/read",
            post(mark_notification_read),
        )
}
