//! Sensor Routes
//!
//! - GET /api/v1/sensors - Sensor metadata filtered by type

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{SensorListResponse, SensorParams};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::query::sensors::parse_types;
use crate::query::SensorListRequest;

/// GET /api/v1/sensors?types=PH,DO&limit=3&skip=0
///
/// Without `types` every sensor is listed.
pub async fn list_sensors(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SensorParams>, QueryRejection>,
) -> ApiResult<Json<SensorListResponse>> {
    let Query(params) = params?;
    let mut request = SensorListRequest::new();
    if let Some(types) = params.types.as_deref() {
        request = request.types(parse_types(types));
    }
    if let Some(limit) = params.limit {
        request = request.limit(limit);
    }
    if let Some(skip) = params.skip {
        request = request.skip(skip);
    }

    let cancel = state.request_token();
    let data = state.executor.list_sensors(&request, &cancel).await?;

    Ok(Json(SensorListResponse { data }))
}
