//! Shared request shapes

use bureau::{Filter, FilterClause};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// ANDed filter clauses, e.g. `{"clauses": [{"field": "city", "operator": "equals", "value": "Paris"}]}`
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct FilterRequest {
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub clauses: Vec<FilterClause>,
}

impl From<FilterRequest> for Filter {
    fn from(request: FilterRequest) -> Self {
        Filter::from(request.clauses)
    }
}

/// Text search with optional filter clauses
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SearchRequest {
    /// Empty query lists every filtered record, unscored
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub filters: Vec<FilterClause>,
}

/// `?recursive=true` cascades to dependents
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteParams {
    #[serde(default)]
    pub recursive: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

impl StatusResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
        }
    }
}
