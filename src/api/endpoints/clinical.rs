//! Manually entered lab results.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{require_reading, ApiContext, StatusResponse};

#[derive(Debug, Deserialize)]
pub struct ClinicalData {
    pub biomarker_level: f64,
}

/// `POST /api/clinical-data`
pub async fn record(
    State(ctx): State<ApiContext>,
    Json(data): Json<ClinicalData>,
) -> Result<Json<StatusResponse>, ApiError> {
    let level = require_reading("biomarker_level", data.biomarker_level)?;
    ctx.core.patient().apply_biomarker(level);
    Ok(Json(StatusResponse {
        status: "clinical data updated",
    }))
}
