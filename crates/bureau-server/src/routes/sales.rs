//! Sales Routes - deals and the pipeline summary
//!
//! HTTP handlers that delegate to PipelineService.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use bureau::Filter;

use super::{domain_error, not_found, ApiError};
use crate::models::{
    CreateDealRequest, DealListParams, DealResponse, FilterRequest, MoveStageRequest,
    StageSummaryResponse, StatusResponse, UpdateDealRequest,
};
use crate::AppState;

type DealResult = Result<Json<DealResponse>, ApiError>;

fn deal_list(deals: Vec<bureau::Deal>) -> Json<Vec<DealResponse>> {
    Json(deals.into_iter().map(Into::into).collect())
}

/// List deals by stage, owner or contact
#[utoipa::path(
    get,
    path = "/bureau/deals",
    params(DealListParams),
    responses(
        (status = 200, description = "Deals", body = Vec<DealResponse>)
    ),
    tag = "Sales"
)]
pub async fn list_deals(
    State(state): State<AppState>,
    Query(params): Query<DealListParams>,
) -> Result<Json<Vec<DealResponse>>, ApiError> {
    let service = &state.pipeline_service;
    let deals = if let Some(stage) = params.stage {
        service.list_by_stage(stage).await
    } else if let Some(owner_id) = params.owner_id {
        service.list_by_owner(&owner_id).await
    } else if let Some(contact_id) = params.contact_id {
        service.list_for_contact(contact_id).await
    } else {
        service.list_all().await
    }
    .map_err(domain_error)?;

    Ok(deal_list(deals))
}

#[utoipa::path(
    post,
    path = "/bureau/deals/query",
    request_body = FilterRequest,
    responses(
        (status = 200, description = "Matching deals", body = Vec<DealResponse>),
        (status = 422, description = "Unknown field or malformed clause")
    ),
    tag = "Sales"
)]
pub async fn query_deals(
    State(state): State<AppState>,
    Json(payload): Json<FilterRequest>,
) -> Result<Json<Vec<DealResponse>>, ApiError> {
    let deals = state
        .pipeline_service
        .find(&Filter::from(payload))
        .await
        .map_err(domain_error)?;

    Ok(deal_list(deals))
}

#[utoipa::path(
    post,
    path = "/bureau/deals",
    request_body = CreateDealRequest,
    responses(
        (status = 200, description = "Deal created", body = DealResponse),
        (status = 404, description = "Contact not found"),
        (status = 422, description = "Invalid field")
    ),
    tag = "Sales"
)]
pub async fn create_deal(
    State(state): State<AppState>,
    Json(payload): Json<CreateDealRequest>,
) -> DealResult {
    let deal = state
        .pipeline_service
        .create(payload.into())
        .await
        .map_err(domain_error)?;

    Ok(Json(deal.into()))
}

#[utoipa::path(
    get,
    path = "/bureau/deals/{id}",
    params(("id" = Uuid, Path, description = "Deal ID")),
    responses(
        (status = 200, description = "Deal found", body = DealResponse),
        (status = 404, description = "Deal not found")
    ),
    tag = "Sales"
)]
pub async fn get_deal(State(state): State<AppState>, Path(id): Path<Uuid>) -> DealResult {
    let deal = state
        .pipeline_service
        .get_by_id(id)
        .await
        .map_err(domain_error)?
        .ok_or_else(|| not_found("Deal"))?;

    Ok(Json(deal.into()))
}

#[utoipa::path(
    put,
    path = "/bureau/deals/{id}",
    params(("id" = Uuid, Path, description = "Deal ID")),
    request_body = UpdateDealRequest,
    responses(
        (status = 200, description = "Deal updated", body = DealResponse),
        (status = 404, description = "Deal or contact not found"),
        (status = 422, description = "Invalid field")
    ),
    tag = "Sales"
)]
pub async fn update_deal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDealRequest>,
) -> DealResult {
    let deal = state
        .pipeline_service
        .update(id, payload.into())
        .await
        .map_err(domain_error)?;

    Ok(Json(deal.into()))
}

/// Move a deal to another pipeline stage
#[utoipa::path(
    post,
    path = "/bureau/deals/{id}/stage",
    params(("id" = Uuid, Path, description = "Deal ID")),
    request_body = MoveStageRequest,
    responses(
        (status = 200, description = "Deal moved", body = DealResponse),
        (status = 404, description = "Deal not found"),
        (status = 409, description = "Deal already closed")
    ),
    tag = "Sales"
)]
pub async fn move_stage(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MoveStageRequest>,
) -> DealResult {
    let deal = state
        .pipeline_service
        .move_stage(id, payload.stage)
        .await
        .map_err(domain_error)?;

    Ok(Json(deal.into()))
}

#[utoipa::path(
    delete,
    path = "/bureau/deals/{id}",
    params(("id" = Uuid, Path, description = "Deal ID")),
    responses(
        (status = 200, description = "Deal deleted", body = StatusResponse),
        (status = 404, description = "Deal not found")
    ),
    tag = "Sales"
)]
pub async fn delete_deal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, ApiError> {
    let deleted = state
        .pipeline_service
        .delete(id)
        .await
        .map_err(domain_error)?;

    if !deleted {
        return Err(not_found("Deal"));
    }
    Ok(Json(StatusResponse::ok(format!("Deal {} deleted", id))))
}

/// Count and amounts per stage, in pipeline order
#[utoipa::path(
    get,
    path = "/bureau/pipeline",
    responses(
        (status = 200, description = "One entry per stage", body = Vec<StageSummaryResponse>)
    ),
    tag = "Sales"
)]
pub async fn pipeline_summary(
    State(state): State<AppState>,
) -> Result<Json<Vec<StageSummaryResponse>>, ApiError> {
    let totals = state
        .pipeline_service
        .summary()
        .await
        .map_err(domain_error)?;

    Ok(Json(totals.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bureau/deals", get(list_deals).post(create_deal))
        .route("/bureau/deals/query", post(query_deals))
        .route(
            "/bureau/deals/:id",
            get(get_deal).put(update_deal).delete(delete_deal),
        )
        .route("/bureau/deals/:id/stage", post(move_stage))
        .route("/bureau/pipeline", get(pipeline_summary))
}
