//! Sales pipeline DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use bureau::domain::{DealPatch, NewDeal};
use bureau::{Deal, DealStage};

use crate::application::StageTotals;

use super::common::double_option;

#[derive(Debug, Serialize, ToSchema)]
pub struct DealResponse {
    pub id: Uuid,
    pub title: String,
    pub contact_id: Option<Uuid>,
    pub owner_id: Option<String>,
    #[schema(value_type = String)]
    pub stage: DealStage,
    pub amount: f64,
    pub currency: String,
    /// `amount` times the stage's win probability
    pub weighted_amount: f64,
    pub expected_close: Option<NaiveDate>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Deal> for DealResponse {
    fn from(d: Deal) -> Self {
        Self {
            weighted_amount: d.weighted_amount(),
            id: d.id,
            title: d.title,
            contact_id: d.contact_id,
            owner_id: d.owner_id,
            stage: d.stage,
            amount: d.amount,
            currency: d.currency,
            expected_close: d.expected_close,
            closed_at: d.closed_at,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDealRequest {
    pub title: String,
    pub contact_id: Option<Uuid>,
    pub owner_id: Option<String>,
    /// Defaults to `lead`
    #[schema(value_type = Option<String>)]
    pub stage: Option<DealStage>,
    pub amount: f64,
    pub currency: String,
    pub expected_close: Option<NaiveDate>,
}

impl From<CreateDealRequest> for NewDeal {
    fn from(r: CreateDealRequest) -> Self {
        NewDeal {
            title: r.title,
            contact_id: r.contact_id,
            owner_id: r.owner_id,
            stage: r.stage,
            amount: r.amount,
            currency: r.currency,
            expected_close: r.expected_close,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDealRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub contact_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub owner_id: Option<Option<String>>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub expected_close: Option<Option<NaiveDate>>,
}

impl From<UpdateDealRequest> for DealPatch {
    fn from(r: UpdateDealRequest) -> Self {
        DealPatch {
            title: r.title,
            contact_id: r.contact_id,
            owner_id: r.owner_id,
            amount: r.amount,
            currency: r.currency,
            expected_close: r.expected_close,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveStageRequest {
    #[schema(value_type = String)]
    pub stage: DealStage,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DealListParams {
    #[param(value_type = Option<String>)]
    pub stage: Option<DealStage>,
    pub owner_id: Option<String>,
    pub contact_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StageSummaryResponse {
    #[schema(value_type = String)]
    pub stage: DealStage,
    pub count: usize,
    pub total_amount: f64,
    pub weighted_amount: f64,
}

impl From<StageTotals> for StageSummaryResponse {
    fn from(t: StageTotals) -> Self {
        Self {
            stage: t.stage,
            count: t.count,
            total_amount: t.total_amount,
            weighted_amount: t.weighted_amount,
        }
    }
}
