//! Measurement Routes
//!
//! - GET /api/v1/measurements - Measurements of one sensor
//! - GET /api/v1/measurements/count - Count matching measurements
//! - GET /api/v1/measurements/:id - One measurement by document id

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use std::sync::Arc;
use std::time::Instant;

use crate::api::dto::{
    CountParams, CountResponse, FailureDto, ListMeta, MeasurementListResponse, MeasurementParams,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::decode::{DecodePolicy, SensorMeasurementRecord};
use crate::query::{parse_instant, SensorQueryRequest, ValidationError};
use crate::store::FindOptions;

/// GET /api/v1/measurements
///
/// Decoded measurements of one sensor in store order. Undecodable documents
/// are listed under `failures` unless `onError=abort`.
pub async fn list_measurements(
    State(state): State<Arc<AppState>>,
    params: Result<Query<MeasurementParams>, QueryRejection>,
) -> ApiResult<Json<MeasurementListResponse>> {
    let start = Instant::now();
    let Query(params) = params?;

    let sensor_id = params.sensor_id.as_deref().unwrap_or_default();
    let request = build_request(&state, sensor_id, params.from.as_deref(), params.to.as_deref())?;

    let policy = match params.on_error.as_deref() {
        Some(raw) => raw.parse::<DecodePolicy>().map_err(ApiError::Validation)?,
        None => state.executor.config().decode_policy,
    };

    let cancel = state.request_token();
    let assembled = state
        .executor
        .find_measurements_with(
            &request,
            FindOptions::page(params.limit, params.skip),
            policy,
            &cancel,
        )
        .await?;

    let failures: Vec<FailureDto> = assembled.failures.into_iter().map(FailureDto::from).collect();

    Ok(Json(MeasurementListResponse {
        meta: ListMeta {
            count: assembled.records.len(),
            skipped: failures.len(),
            execution_time_ms: start.elapsed().as_millis() as u64,
        },
        data: assembled.records,
        failures,
    }))
}

/// GET /api/v1/measurements/count
pub async fn count_measurements(
    State(state): State<Arc<AppState>>,
    params: Result<Query<CountParams>, QueryRejection>,
) -> ApiResult<Json<CountResponse>> {
    let Query(params) = params?;
    let cancel = state.request_token();

    let count = match params.sensor_id.as_deref() {
        None => state.executor.count_all(&cancel).await?,
        Some(sensor_id) => {
            let request =
                build_request(&state, sensor_id, params.from.as_deref(), params.to.as_deref())?;
            state.executor.count_measurements(&request, &cancel).await?
        }
    };

    Ok(Json(CountResponse { count }))
}

/// GET /api/v1/measurements/:id
pub async fn get_measurement(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<SensorMeasurementRecord>> {
    let cancel = state.request_token();
    let record = state.executor.find_measurement(&id, &cancel).await?;
    Ok(Json(record))
}

fn build_request(
    state: &AppState,
    sensor_id: &str,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<SensorQueryRequest, ValidationError> {
    let from = parse_instant("from", from)?;
    let to = parse_instant("to", to)?;
    let request = SensorQueryRequest::new(sensor_id, state.executor.config().id_scheme)?;
    Ok(request.with_bounds(from, to))
}
