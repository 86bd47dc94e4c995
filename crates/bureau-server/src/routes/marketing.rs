//! Marketing Routes - contacts and segments
//!
//! HTTP handlers that delegate to MarketingService.

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;

use bureau::Filter;

use super::{domain_error, not_found, ApiError};
use crate::models::{
    AddMemberRequest, ContactListParams, ContactResponse, ContactSearchHit, CreateContactRequest,
    CreateSegmentRequest, FilterRequest, SearchRequest, SegmentResponse, StatusResponse,
    UpdateContactRequest, UpdateSegmentRequest,
};
use crate::AppState;

type SegmentResult = Result<Json<SegmentResponse>, ApiError>;

fn contact_list(contacts: Vec<bureau::Contact>) -> Json<Vec<ContactResponse>> {
    Json(contacts.into_iter().map(Into::into).collect())
}

fn segment_list(segments: Vec<bureau::Segment>) -> Json<Vec<SegmentResponse>> {
    Json(segments.into_iter().map(Into::into).collect())
}

// ============================================
// Contacts
// ============================================

/// List contacts, by tag or city when given
#[utoipa::path(
    get,
    path = "/bureau/contacts",
    params(ContactListParams),
    responses(
        (status = 200, description = "Contacts", body = Vec<ContactResponse>)
    ),
    tag = "Marketing"
)]
pub async fn list_contacts(
    State(state): State<AppState>,
    Query(params): Query<ContactListParams>,
) -> Result<Json<Vec<ContactResponse>>, ApiError> {
    let service = &state.marketing_service;
    let contacts = match (params.tag, params.city) {
        (Some(tag), _) => service.contacts_by_tag(&tag).await,
        (None, Some(city)) => service.contacts_by_city(&city).await,
        (None, None) => service.list_contacts().await,
    }
    .map_err(domain_error)?;

    Ok(contact_list(contacts))
}

#[utoipa::path(
    post,
    path = "/bureau/contacts/query",
    request_body = FilterRequest,
    responses(
        (status = 200, description = "Matching contacts", body = Vec<ContactResponse>),
        (status = 422, description = "Unknown field or malformed clause")
    ),
    tag = "Marketing"
)]
pub async fn query_contacts(
    State(state): State<AppState>,
    Json(payload): Json<FilterRequest>,
) -> Result<Json<Vec<ContactResponse>>, ApiError> {
    let contacts = state
        .marketing_service
        .find_contacts(&Filter::from(payload))
        .await
        .map_err(domain_error)?;

    Ok(contact_list(contacts))
}

/// Relevance-ranked search over names, tags and companies
#[utoipa::path(
    post,
    path = "/bureau/contacts/search",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Hits, best first", body = Vec<ContactSearchHit>),
        (status = 422, description = "Unknown field or malformed clause")
    ),
    tag = "Marketing"
)]
pub async fn search_contacts(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<Vec<ContactSearchHit>>, ApiError> {
    let hits = state
        .marketing_service
        .search_contacts(&payload.query, &Filter::from(payload.filters))
        .await
        .map_err(domain_error)?;

    Ok(Json(hits.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/bureau/contacts",
    request_body = CreateContactRequest,
    responses(
        (status = 200, description = "Contact created", body = ContactResponse),
        (status = 422, description = "Invalid field")
    ),
    tag = "Marketing"
)]
pub async fn create_contact(
    State(state): State<AppState>,
    Json(payload): Json<CreateContactRequest>,
) -> Result<Json<ContactResponse>, ApiError> {
    let contact = state
        .marketing_service
        .create_contact(payload.into())
        .await
        .map_err(domain_error)?;

    Ok(Json(contact.into()))
}

#[utoipa::path(
    get,
    path = "/bureau/contacts/{id}",
    params(("id" = Uuid, Path, description = "Contact ID")),
    responses(
        (status = 200, description = "Contact found", body = ContactResponse),
        (status = 404, description = "Contact not found")
    ),
    tag = "Marketing"
)]
pub async fn get_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContactResponse>, ApiError> {
    let contact = state
        .marketing_service
        .get_contact(id)
        .await
        .map_err(domain_error)?
        .ok_or_else(|| not_found("Contact"))?;

    Ok(Json(contact.into()))
}

#[utoipa::path(
    put,
    path = "/bureau/contacts/{id}",
    params(("id" = Uuid, Path, description = "Contact ID")),
    request_body = UpdateContactRequest,
    responses(
        (status = 200, description = "Contact updated", body = ContactResponse),
        (status = 404, description = "Contact not found"),
        (status = 422, description = "Invalid field")
    ),
    tag = "Marketing"
)]
pub async fn update_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContactRequest>,
) -> Result<Json<ContactResponse>, ApiError> {
    let contact = state
        .marketing_service
        .update_contact(id, payload.into())
        .await
        .map_err(domain_error)?;

    Ok(Json(contact.into()))
}

/// Delete a contact and drop it from every segment
#[utoipa::path(
    delete,
    path = "/bureau/contacts/{id}",
    params(("id" = Uuid, Path, description = "Contact ID")),
    responses(
        (status = 200, description = "Contact deleted", body = StatusResponse),
        (status = 404, description = "Contact not found"),
        (status = 409, description = "Contact still has deals")
    ),
    tag = "Marketing"
)]
pub async fn delete_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, ApiError> {
    let deleted = state
        .marketing_service
        .delete_contact(id)
        .await
        .map_err(domain_error)?;

    if !deleted {
        return Err(not_found("Contact"));
    }
    Ok(Json(StatusResponse::ok(format!("Contact {} deleted", id))))
}

/// Segments listing the contact as a static member
#[utoipa::path(
    get,
    path = "/bureau/contacts/{id}/segments",
    params(("id" = Uuid, Path, description = "Contact ID")),
    responses(
        (status = 200, description = "Segments of the contact", body = Vec<SegmentResponse>)
    ),
    tag = "Marketing"
)]
pub async fn list_contact_segments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<SegmentResponse>>, ApiError> {
    let segments = state
        .marketing_service
        .segments_of(id)
        .await
        .map_err(domain_error)?;

    Ok(segment_list(segments))
}

// ============================================
// Segments
// ============================================

#[utoipa::path(
    get,
    path = "/bureau/segments",
    responses(
        (status = 200, description = "Segments", body = Vec<SegmentResponse>)
    ),
    tag = "Marketing"
)]
pub async fn list_segments(
    State(state): State<AppState>,
) -> Result<Json<Vec<SegmentResponse>>, ApiError> {
    let segments = state
        .marketing_service
        .list_segments()
        .await
        .map_err(domain_error)?;

    Ok(segment_list(segments))
}

#[utoipa::path(
    post,
    path = "/bureau/segments",
    request_body = CreateSegmentRequest,
    responses(
        (status = 200, description = "Segment created", body = SegmentResponse),
        (status = 422, description = "Invalid name or filter")
    ),
    tag = "Marketing"
)]
pub async fn create_segment(
    State(state): State<AppState>,
    Json(payload): Json<CreateSegmentRequest>,
) -> SegmentResult {
    let segment = state
        .marketing_service
        .create_segment(payload.into())
        .await
        .map_err(domain_error)?;

    Ok(Json(segment.into()))
}

#[utoipa::path(
    get,
    path = "/bureau/segments/{id}",
    params(("id" = Uuid, Path, description = "Segment ID")),
    responses(
        (status = 200, description = "Segment found", body = SegmentResponse),
        (status = 404, description = "Segment not found")
    ),
    tag = "Marketing"
)]
pub async fn get_segment(State(state): State<AppState>, Path(id): Path<Uuid>) -> SegmentResult {
    let segment = state
        .marketing_service
        .get_segment(id)
        .await
        .map_err(domain_error)?
        .ok_or_else(|| not_found("Segment"))?;

    Ok(Json(segment.into()))
}

#[utoipa::path(
    put,
    path = "/bureau/segments/{id}",
    params(("id" = Uuid, Path, description = "Segment ID")),
    request_body = UpdateSegmentRequest,
    responses(
        (status = 200, description = "Segment updated", body = SegmentResponse),
        (status = 404, description = "Segment not found"),
        (status = 422, description = "Invalid name or filter")
    ),
    tag = "Marketing"
)]
pub async fn update_segment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSegmentRequest>,
) -> SegmentResult {
    let segment = state
        .marketing_service
        .update_segment(id, payload.into())
        .await
        .map_err(domain_error)?;

    Ok(Json(segment.into()))
}

#[utoipa::path(
    delete,
    path = "/bureau/segments/{id}",
    params(("id" = Uuid, Path, description = "Segment ID")),
    responses(
        (status = 200, description = "Segment deleted", body = StatusResponse),
        (status = 404, description = "Segment not found")
    ),
    tag = "Marketing"
)]
pub async fn delete_segment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, ApiError> {
    let deleted = state
        .marketing_service
        .delete_segment(id)
        .await
        .map_err(domain_error)?;

    if !deleted {
        return Err(not_found("Segment"));
    }
    Ok(Json(StatusResponse::ok(format!("Segment {} deleted", id))))
}

/// Resolved audience: filter matches, then static members
#[utoipa::path(
    get,
    path = "/bureau/segments/{id}/members",
    params(("id" = Uuid, Path, description = "Segment ID")),
    responses(
        (status = 200, description = "Contacts in the segment", body = Vec<ContactResponse>),
        (status = 404, description = "Segment not found")
    ),
    tag = "Marketing"
)]
pub async fn list_members(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ContactResponse>>, ApiError> {
    let contacts = state
        .marketing_service
        .segment_contacts(id)
        .await
        .map_err(domain_error)?;

    Ok(contact_list(contacts))
}

#[utoipa::path(
    post,
    path = "/bureau/segments/{id}/members",
    params(("id" = Uuid, Path, description = "Segment ID")),
    request_body = AddMemberRequest,
    responses(
        (status = 200, description = "Member added", body = SegmentResponse),
        (status = 404, description = "Segment or contact not found"),
        (status = 409, description = "Contact already a member")
    ),
    tag = "Marketing"
)]
pub async fn add_member(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddMemberRequest>,
) -> SegmentResult {
    let segment = state
        .marketing_service
        .add_member(id, payload.contact_id)
        .await
        .map_err(domain_error)?;

    Ok(Json(segment.into()))
}

#[utoipa::path(
    delete,
    path = "/bureau/segments/{id}/members/{contact_id}",
    params(
        ("id" = Uuid, Path, description = "Segment ID"),
        ("contact_id" = Uuid, Path, description = "Contact ID")
    ),
    responses(
        (status = 200, description = "Member removed", body = StatusResponse),
        (status = 404, description = "Segment not found or contact not a member")
    ),
    tag = "Marketing"
)]
pub async fn remove_member(
    State(state): State<AppState>,
    Path((id, contact_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<StatusResponse>, ApiError> {
    let removed = state
        .marketing_service
        .remove_member(id, contact_id)
        .await
        .map_err(domain_error)?;

    if !removed {
        return Err(not_found("Segment member"));
    }
    Ok(Json(StatusResponse::ok(format!(
        "Contact {} removed from Segment {}",
        contact_id, id
    ))))
}

pub fn router() -> Router<AppState> {
    Router::new()
        // Contacts
        .route("/bureau/contacts", get(list_contacts).post(create_contact))
        .route("/bureau/contacts/query", post(query_contacts))
        .route("/bureau/contacts/search", post(search_contacts))
        .route(
            "/bureau/contacts/:id",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
        .route("/bureau/contacts/:id/segments", get(list_contact_segments))
        // Segments
        .route("/bureau/segments", get(list_segments).post(create_segment))
        .route(
            "/bureau/segments/:id",
            get(get_segment).put(update_segment).delete(delete_segment),
        )
        .route(
            "/bureau/segments/:id/members",
            get(list_members).post(add_member),
        )
        .route(
            "/bureau/segments/:id/members/:contact_id",
            delete(remove_member),
        )
}
