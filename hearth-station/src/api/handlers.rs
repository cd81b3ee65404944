use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use hearth_core::{ClimateState, SensorState, Snapshot};
use serde::Deserialize;

use crate::peripheral::{ClimateService, PeripheralService, SensorService};

use super::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<String>,
}

/// GET /info
pub async fn info<S: Snapshot>(
    State(service): State<PeripheralService<S>>,
) -> Result<Json<S>, ApiError> {
    Ok(Json(service.info().await?))
}

/// PATCH /enabled
pub async fn toggle_enabled<S: Snapshot>(
    State(service): State<PeripheralService<S>>,
) -> Result<Json<S>, ApiError> {
    Ok(Json(service.toggle_enabled().await?))
}

/// PATCH /detected
pub async fn toggle_detected(
    State(service): State<SensorService>,
) -> Result<Json<SensorState>, ApiError> {
    Ok(Json(service.toggle_detected().await?))
}

/// PATCH /update
///
/// Only the setpoints of the body are used; the unit is always asked to be
/// enabled.
pub async fn update_settings(
    State(service): State<ClimateService>,
    desired: Result<Json<ClimateState>, JsonRejection>,
) -> Result<Json<ClimateState>, ApiError> {
    let Json(desired) = desired.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let state = service
        .update_settings(desired.temperature, desired.humidity)
        .await?;
    Ok(Json(state))
}

/// GET /logs?limit=N
pub async fn logs<S: Snapshot>(
    State(service): State<PeripheralService<S>>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<Vec<S::Logged>>, ApiError> {
    let limit = query
        .limit
        .as_deref()
        .and_then(|v| v.parse::<i64>().ok())
        .ok_or_else(|| ApiError::BadRequest("Invalid limit parameter".to_string()))?;

    Ok(Json(service.logs(limit).await?))
}
