//! Symptom endpoints.
//!
//! - `POST /api/symptom-analysis`: multipart `description` + optional `photo`
//! - `GET /api/symptoms`: recent reports, newest first

use axum::extract::{Multipart, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{require_text, ApiContext};
use crate::classifier::ImageInput;
use crate::db;
use crate::models::{NewSymptomReport, Severity, SymptomReport};
use crate::scoring::DEFAULT_WINDOW_DAYS;

/// Largest accepted photo.
pub const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;

const DEFAULT_LIST_LIMIT: u32 = 50;
const MAX_LIST_LIMIT: u32 = 500;

#[derive(Debug, Serialize)]
pub struct SymptomAnalysisResponse {
    pub id: i64,
    pub severity: Severity,
    pub advice: String,
    pub classified_by: String,
    /// Symptom score after this report was folded in.
    pub symptom_score: f64,
}

/// Uploaded photo. Only the file name is kept; bytes go to the classifier.
struct Photo {
    file_name: Option<String>,
    bytes: Vec<u8>,
}

async fn read_form(mut multipart: Multipart) -> Result<(String, Option<Photo>), ApiError> {
    let mut description = None;
    let mut photo = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("description") => description = Some(field.text().await?),
            Some("photo") => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await?;
                if bytes.len() > MAX_PHOTO_BYTES {
                    return Err(ApiError::PayloadTooLarge(format!(
                        "photo exceeds {} MB",
                        MAX_PHOTO_BYTES / (1024 * 1024)
                    )));
                }
                // Browsers send an empty part when no file was picked.
                if !bytes.is_empty() {
                    photo = Some(Photo {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    let description =
        description.ok_or_else(|| ApiError::BadRequest("description is required".into()))?;
    Ok((description, photo))
}

/// `POST /api/symptom-analysis`
pub async fn analyze(
    State(ctx): State<ApiContext>,
    multipart: Multipart,
) -> Result<Json<SymptomAnalysisResponse>, ApiError> {
    let (description, photo) = read_form(multipart).await?;
    let description = require_text("description", &description)?;

    let photo_path = photo.as_ref().and_then(|p| p.file_name.clone());
    let image = photo.map(|p| ImageInput::from_upload(p.bytes, p.file_name.as_deref()));

    let classification = ctx
        .core
        .classifier()
        .classify_symptom(description, image.as_ref())
        .await;
    let classified_by = classification.classified_by();
    let verdict = classification.into_verdict();

    let _intake = ctx.core.lock_symptom_intake().await;
    let now = Utc::now();
    let conn = ctx.core.open_db()?;
    let id = db::insert_symptom_report(
        &conn,
        &NewSymptomReport {
            timestamp: now,
            description,
            severity: verdict.severity,
            photo_path: photo_path.as_deref(),
            advice: Some(verdict.advice.as_str()),
            classified_by: &classified_by,
        },
    )?;

    // A failed history fetch fails the request; the score is left as is.
    let history = db::get_recent_symptoms(&conn, DEFAULT_WINDOW_DAYS, now)?;
    let symptom_score = ctx.core.patient().apply_symptom_history(&history);

    Ok(Json(SymptomAnalysisResponse {
        id,
        severity: verdict.severity,
        advice: verdict.advice,
        classified_by,
        symptom_score,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SymptomListQuery {
    pub limit: Option<u32>,
}

/// `GET /api/symptoms?limit=`
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<SymptomListQuery>,
) -> Result<Json<Vec<SymptomReport>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT);
    let conn = ctx.core.open_db()?;
    Ok(Json(db::list_symptom_reports(&conn, limit)?))
}
