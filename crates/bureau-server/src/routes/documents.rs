//! Document Routes - GED documents, search and CRM links
//!
//! HTTP handlers that delegate to DocumentService.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use bureau::domain::{DocumentLinkPatch, NewDocumentLink};
use bureau::{Filter, LinkedEntityType};

use super::{domain_error, not_found, ApiError};
use crate::models::{
    CreateDocumentRequest, CreateLinkRequest, DocumentLinkResponse, DocumentListParams,
    DocumentResponse, DocumentSearchHit, FilterRequest, SearchRequest, StatusResponse,
    UpdateDocumentRequest, UpdateLinkRequest,
};
use crate::AppState;

fn document_list(documents: Vec<bureau::Document>) -> Json<Vec<DocumentResponse>> {
    Json(documents.into_iter().map(Into::into).collect())
}

fn link_list(links: Vec<bureau::DocumentLink>) -> Json<Vec<DocumentLinkResponse>> {
    Json(links.into_iter().map(Into::into).collect())
}

/// List documents, by folder or tag when given
#[utoipa::path(
    get,
    path = "/bureau/documents",
    params(DocumentListParams),
    responses(
        (status = 200, description = "Documents in creation order", body = Vec<DocumentResponse>),
        (status = 500, description = "Internal server error")
    ),
    tag = "GED"
)]
pub async fn list_documents(
    State(state): State<AppState>,
    Query(params): Query<DocumentListParams>,
) -> Result<Json<Vec<DocumentResponse>>, ApiError> {
    let service = &state.document_service;
    let documents = match (params.folder_id, params.tag) {
        (Some(folder_id), _) => service.list_in_folder(folder_id).await,
        (None, Some(tag)) => service.list_by_tag(&tag).await,
        (None, None) => service.list_all().await,
    }
    .map_err(domain_error)?;

    Ok(document_list(documents))
}

/// Documents matching every filter clause
#[utoipa::path(
    post,
    path = "/bureau/documents/query",
    request_body = FilterRequest,
    responses(
        (status = 200, description = "Matching documents", body = Vec<DocumentResponse>),
        (status = 422, description = "Unknown field or malformed clause")
    ),
    tag = "GED"
)]
pub async fn query_documents(
    State(state): State<AppState>,
    Json(payload): Json<FilterRequest>,
) -> Result<Json<Vec<DocumentResponse>>, ApiError> {
    let filter = Filter::from(payload);
    let documents = state
        .document_service
        .find(&filter)
        .await
        .map_err(domain_error)?;

    Ok(document_list(documents))
}

/// Relevance-ranked search over titles, tags and descriptions
#[utoipa::path(
    post,
    path = "/bureau/documents/search",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Hits, best first", body = Vec<DocumentSearchHit>),
        (status = 422, description = "Unknown field or malformed clause")
    ),
    tag = "GED"
)]
pub async fn search_documents(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<Vec<DocumentSearchHit>>, ApiError> {
    let filter = Filter::from(payload.filters);
    let hits = state
        .document_service
        .search(&payload.query, &filter)
        .await
        .map_err(domain_error)?;

    Ok(Json(hits.into_iter().map(Into::into).collect()))
}

/// Register a document
#[utoipa::path(
    post,
    path = "/bureau/documents",
    request_body = CreateDocumentRequest,
    responses(
        (status = 200, description = "Document created", body = DocumentResponse),
        (status = 404, description = "Folder not found"),
        (status = 422, description = "Invalid title, type or size")
    ),
    tag = "GED"
)]
pub async fn create_document(
    State(state): State<AppState>,
    Json(payload): Json<CreateDocumentRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let document = state
        .document_service
        .create(payload.into())
        .await
        .map_err(domain_error)?;

    Ok(Json(document.into()))
}

/// Get document by ID
#[utoipa::path(
    get,
    path = "/bureau/documents/{id}",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document found", body = DocumentResponse),
        (status = 404, description = "Document not found")
    ),
    tag = "GED"
)]
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let document = state
        .document_service
        .get_by_id(id)
        .await
        .map_err(domain_error)?
        .ok_or_else(|| not_found("Document"))?;

    Ok(Json(document.into()))
}

/// Update metadata, or upload a new revision via `content`
#[utoipa::path(
    put,
    path = "/bureau/documents/{id}",
    params(("id" = Uuid, Path, description = "Document ID")),
    request_body = UpdateDocumentRequest,
    responses(
        (status = 200, description = "Document updated", body = DocumentResponse),
        (status = 404, description = "Document or folder not found"),
        (status = 422, description = "Invalid field")
    ),
    tag = "GED"
)]
pub async fn update_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDocumentRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let document = state
        .document_service
        .update(id, payload.into())
        .await
        .map_err(domain_error)?;

    Ok(Json(document.into()))
}

/// Delete a document with its links and signature workflows
#[utoipa::path(
    delete,
    path = "/bureau/documents/{id}",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document deleted", body = StatusResponse),
        (status = 404, description = "Document not found")
    ),
    tag = "GED"
)]
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, ApiError> {
    let deleted = state
        .document_service
        .delete(id)
        .await
        .map_err(domain_error)?;

    if !deleted {
        return Err(not_found("Document"));
    }
    Ok(Json(StatusResponse::ok(format!("Document {} deleted", id))))
}

/// CRM records a document is linked to
#[utoipa::path(
    get,
    path = "/bureau/documents/{id}/links",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Links of the document", body = Vec<DocumentLinkResponse>)
    ),
    tag = "GED"
)]
pub async fn list_document_links(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<DocumentLinkResponse>>, ApiError> {
    let links = state
        .document_service
        .links_for_document(id)
        .await
        .map_err(domain_error)?;

    Ok(link_list(links))
}

/// Link a document to a contact, company, deal, employee or campaign
#[utoipa::path(
    post,
    path = "/bureau/documents/{id}/links",
    params(("id" = Uuid, Path, description = "Document ID")),
    request_body = CreateLinkRequest,
    responses(
        (status = 200, description = "Link created", body = DocumentLinkResponse),
        (status = 404, description = "Document not found"),
        (status = 409, description = "Link already exists")
    ),
    tag = "GED"
)]
pub async fn create_link(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<Json<DocumentLinkResponse>, ApiError> {
    let draft = NewDocumentLink {
        document_id: id,
        entity_type: payload.entity_type,
        entity_id: payload.entity_id,
        note: payload.note,
    };
    let link = state
        .document_service
        .link(draft)
        .await
        .map_err(domain_error)?;

    Ok(Json(link.into()))
}

/// Edit the note of a link
#[utoipa::path(
    put,
    path = "/bureau/links/{id}",
    params(("id" = Uuid, Path, description = "Link ID")),
    request_body = UpdateLinkRequest,
    responses(
        (status = 200, description = "Link updated", body = DocumentLinkResponse),
        (status = 404, description = "Link not found")
    ),
    tag = "GED"
)]
pub async fn update_link(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<DocumentLinkResponse>, ApiError> {
    let link = state
        .document_service
        .update_link(id, DocumentLinkPatch { note: payload.note })
        .await
        .map_err(domain_error)?;

    Ok(Json(link.into()))
}

#[utoipa::path(
    delete,
    path = "/bureau/links/{id}",
    params(("id" = Uuid, Path, description = "Link ID")),
    responses(
        (status = 200, description = "Link removed", body = StatusResponse),
        (status = 404, description = "Link not found")
    ),
    tag = "GED"
)]
pub async fn delete_link(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, ApiError> {
    let deleted = state
        .document_service
        .unlink(id)
        .await
        .map_err(domain_error)?;

    if !deleted {
        return Err(not_found("DocumentLink"));
    }
    Ok(Json(StatusResponse::ok(format!("DocumentLink {} deleted", id))))
}

/// Links pointing at one CRM record
#[utoipa::path(
    get,
    path = "/bureau/links/{entity_type}/{entity_id}",
    params(
        ("entity_type" = String, Path, description = "contact, company, deal, employee or campaign"),
        ("entity_id" = String, Path, description = "Record ID in its own system")
    ),
    responses(
        (status = 200, description = "Links to the record", body = Vec<DocumentLinkResponse>)
    ),
    tag = "GED"
)]
pub async fn list_target_links(
    State(state): State<AppState>,
    Path((entity_type, entity_id)): Path<(LinkedEntityType, String)>,
) -> Result<Json<Vec<DocumentLinkResponse>>, ApiError> {
    let links = state
        .document_service
        .links_for_target(entity_type, &entity_id)
        .await
        .map_err(domain_error)?;

    Ok(link_list(links))
}

/// Documents linked to one CRM record
#[utoipa::path(
    get,
    path = "/bureau/links/{entity_type}/{entity_id}/documents",
    params(
        ("entity_type" = String, Path, description = "contact, company, deal, employee or campaign"),
        ("entity_id" = String, Path, description = "Record ID in its own system")
    ),
    responses(
        (status = 200, description = "Linked documents", body = Vec<DocumentResponse>)
    ),
    tag = "GED"
)]
pub async fn list_target_documents(
    State(state): State<AppState>,
    Path((entity_type, entity_id)): Path<(LinkedEntityType, String)>,
) -> Result<Json<Vec<DocumentResponse>>, ApiError> {
    let documents = state
        .document_service
        .documents_for_target(entity_type, &entity_id)
        .await
        .map_err(domain_error)?;

    Ok(document_list(documents))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bureau/documents", get(list_documents).post(create_document))
        .route("/bureau/documents/query", post(query_documents))
        .route("/bureau/documents/search", post(search_documents))
        .route(
            "/bureau/documents/:id",
            get(get_document).put(update_document).delete(delete_document),
        )
        .route(
            "/bureau/documents/:id/links",
            get(list_document_links).post(create_link),
        )
        .route("/bureau/links/:id", put(update_link).delete(delete_link))
        .route(
            "/bureau/links/:entity_type/:entity_id",
            get(list_target_links),
        )
        .route(
            "/bureau/links/:entity_type/:entity_id/documents",
            get(list_target_documents),
        )
}
