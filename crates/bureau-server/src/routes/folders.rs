//! Folder Routes - GED folder tree
//!
//! HTTP handlers that delegate to FolderService.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use bureau::domain::FolderPatch;

use super::{domain_error, not_found, ApiError};
use crate::models::{
    CreateFolderRequest, DeleteParams, DocumentResponse, FolderListParams, FolderResponse,
    MoveFolderRequest, StatusResponse, UpdateFolderRequest,
};
use crate::AppState;

fn folder_list(folders: Vec<bureau::Folder>) -> Json<Vec<FolderResponse>> {
    Json(folders.into_iter().map(Into::into).collect())
}

async fn ensure_folder(state: &AppState, id: Uuid) -> Result<(), ApiError> {
    state
        .folder_service
        .get_by_id(id)
        .await
        .map_err(domain_error)?
        .map(|_| ())
        .ok_or_else(|| not_found("Folder"))
}

/// List folders, optionally those of one owner
#[utoipa::path(
    get,
    path = "/bureau/folders",
    params(FolderListParams),
    responses(
        (status = 200, description = "Folders, sorted by path", body = Vec<FolderResponse>),
        (status = 500, description = "Internal server error")
    ),
    tag = "GED"
)]
pub async fn list_folders(
    State(state): State<AppState>,
    Query(params): Query<FolderListParams>,
) -> Result<Json<Vec<FolderResponse>>, ApiError> {
    let folders = match params.owner_id {
        Some(owner_id) => state.folder_service.list_by_owner(&owner_id).await,
        None => state.folder_service.list_all().await,
    }
    .map_err(domain_error)?;

    Ok(folder_list(folders))
}

/// Top-level folders
#[utoipa::path(
    get,
    path = "/bureau/folders/roots",
    responses(
        (status = 200, description = "Folders without a parent", body = Vec<FolderResponse>)
    ),
    tag = "GED"
)]
pub async fn list_root_folders(
    State(state): State<AppState>,
) -> Result<Json<Vec<FolderResponse>>, ApiError> {
    let folders = state.folder_service.children(None).await.map_err(domain_error)?;
    Ok(folder_list(folders))
}

/// Create a folder at the root or under a parent
#[utoipa::path(
    post,
    path = "/bureau/folders",
    request_body = CreateFolderRequest,
    responses(
        (status = 200, description = "Folder created", body = FolderResponse),
        (status = 404, description = "Parent not found"),
        (status = 422, description = "Invalid name")
    ),
    tag = "GED"
)]
pub async fn create_folder(
    State(state): State<AppState>,
    Json(payload): Json<CreateFolderRequest>,
) -> Result<Json<FolderResponse>, ApiError> {
    let folder = state
        .folder_service
        .create(
            payload.name,
            payload.parent_id,
            payload.owner_id,
            payload.description,
        )
        .await
        .map_err(domain_error)?;

    Ok(Json(folder.into()))
}

/// Get folder by ID
#[utoipa::path(
    get,
    path = "/bureau/folders/{id}",
    params(("id" = Uuid, Path, description = "Folder ID")),
    responses(
        (status = 200, description = "Folder found", body = FolderResponse),
        (status = 404, description = "Folder not found")
    ),
    tag = "GED"
)]
pub async fn get_folder(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FolderResponse>, ApiError> {
    let folder = state
        .folder_service
        .get_by_id(id)
        .await
        .map_err(domain_error)?
        .ok_or_else(|| not_found("Folder"))?;

    Ok(Json(folder.into()))
}

/// Rename or describe a folder
#[utoipa::path(
    put,
    path = "/bureau/folders/{id}",
    params(("id" = Uuid, Path, description = "Folder ID")),
    request_body = UpdateFolderRequest,
    responses(
        (status = 200, description = "Folder updated", body = FolderResponse),
        (status = 404, description = "Folder not found"),
        (status = 422, description = "Invalid name")
    ),
    tag = "GED"
)]
pub async fn update_folder(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFolderRequest>,
) -> Result<Json<FolderResponse>, ApiError> {
    let patch = FolderPatch {
        name: payload.name,
        description: payload.description,
    };
    let folder = state
        .folder_service
        .update(id, patch)
        .await
        .map_err(domain_error)?;

    Ok(Json(folder.into()))
}

/// Move a folder under a new parent, or to the root
#[utoipa::path(
    post,
    path = "/bureau/folders/{id}/move",
    params(("id" = Uuid, Path, description = "Folder ID")),
    request_body = MoveFolderRequest,
    responses(
        (status = 200, description = "Folder moved", body = FolderResponse),
        (status = 404, description = "Folder or parent not found"),
        (status = 409, description = "Move would create a cycle")
    ),
    tag = "GED"
)]
pub async fn move_folder(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MoveFolderRequest>,
) -> Result<Json<FolderResponse>, ApiError> {
    let folder = state
        .folder_service
        .move_to(id, payload.parent_id)
        .await
        .map_err(domain_error)?;

    Ok(Json(folder.into()))
}

/// Delete a folder; `recursive` also removes sub-folders and documents
#[utoipa::path(
    delete,
    path = "/bureau/folders/{id}",
    params(
        ("id" = Uuid, Path, description = "Folder ID"),
        DeleteParams
    ),
    responses(
        (status = 200, description = "Folder deleted", body = StatusResponse),
        (status = 404, description = "Folder not found"),
        (status = 409, description = "Folder is not empty")
    ),
    tag = "GED"
)]
pub async fn delete_folder(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<StatusResponse>, ApiError> {
    let deleted = state
        .folder_service
        .delete(id, params.recursive)
        .await
        .map_err(domain_error)?;

    if !deleted {
        return Err(not_found("Folder"));
    }
    Ok(Json(StatusResponse::ok(format!("Folder {} deleted", id))))
}

/// Direct children of a folder
#[utoipa::path(
    get,
    path = "/bureau/folders/{id}/children",
    params(("id" = Uuid, Path, description = "Folder ID")),
    responses(
        (status = 200, description = "Child folders", body = Vec<FolderResponse>),
        (status = 404, description = "Folder not found")
    ),
    tag = "GED"
)]
pub async fn list_children(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<FolderResponse>>, ApiError> {
    ensure_folder(&state, id).await?;
    let folders = state
        .folder_service
        .children(Some(id))
        .await
        .map_err(domain_error)?;

    Ok(folder_list(folders))
}

/// Whole subtree below a folder
#[utoipa::path(
    get,
    path = "/bureau/folders/{id}/descendants",
    params(("id" = Uuid, Path, description = "Folder ID")),
    responses(
        (status = 200, description = "Descendant folders", body = Vec<FolderResponse>),
        (status = 404, description = "Folder not found")
    ),
    tag = "GED"
)]
pub async fn list_descendants(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<FolderResponse>>, ApiError> {
    ensure_folder(&state, id).await?;
    let folders = state
        .folder_service
        .descendants(id)
        .await
        .map_err(domain_error)?;

    Ok(folder_list(folders))
}

/// Documents filed directly in a folder
#[utoipa::path(
    get,
    path = "/bureau/folders/{id}/documents",
    params(("id" = Uuid, Path, description = "Folder ID")),
    responses(
        (status = 200, description = "Documents in the folder", body = Vec<DocumentResponse>)
    ),
    tag = "GED"
)]
pub async fn list_folder_documents(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<DocumentResponse>>, ApiError> {
    let documents = state
        .document_service
        .list_in_folder(id)
        .await
        .map_err(domain_error)?;

    Ok(Json(documents.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bureau/folders", get(list_folders).post(create_folder))
        .route("/bureau/folders/roots", get(list_root_folders))
        .route(
            "/bureau/folders/:id",
            get(get_folder).put(update_folder).delete(delete_folder),
        )
        .route("/bureau/folders/:id/move", post(move_folder))
        .route("/bureau/folders/:id/children", get(list_children))
        .route("/bureau/folders/:id/descendants", get(list_descendants))
        .route("/bureau/folders/:id/documents", get(list_folder_documents))
}
