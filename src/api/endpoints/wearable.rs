//! Wearable sync from the companion phone app.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{require_reading, ApiContext, StatusResponse};

#[derive(Debug, Deserialize)]
pub struct HealthConnectData {
    /// Heart-rate variability, ms.
    pub hrv: f64,
}

/// `POST /api/health-connect-data`
pub async fn sync(
    State(ctx): State<ApiContext>,
    Json(data): Json<HealthConnectData>,
) -> Result<Json<StatusResponse>, ApiError> {
    let hrv = require_reading("hrv", data.hrv)?;
    ctx.core.patient().apply_wearable(hrv);
    Ok(Json(StatusResponse {
        status: "data received and state updated",
    }))
}
