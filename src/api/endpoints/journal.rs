//! Journal endpoints.
//!
//! - `POST /api/journal`: classify, store, fold sentiment into state
//! - `GET /api/journal`: all entries, newest first
//! - `GET /api/journal/:id`: one entry

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{require_text, ApiContext};
use crate::db;
use crate::models::{JournalEntry, NewJournalEntry};

#[derive(Debug, Deserialize)]
pub struct JournalEntryCreate {
    pub content: String,
}

/// `POST /api/journal`
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(entry): Json<JournalEntryCreate>,
) -> Result<Json<JournalEntry>, ApiError> {
    let content = require_text("content", &entry.content)?;

    let classification = ctx.core.classifier().classify_journal(content).await;
    let classified_by = classification.classified_by();
    let verdict = classification.verdict();

    let conn = ctx.core.open_db()?;
    let stored = db::insert_journal_entry(
        &conn,
        &NewJournalEntry {
            timestamp: Utc::now(),
            content,
            ai_analysis: Some(verdict.analysis.as_str()),
            ai_encouragement: Some(verdict.message.as_str()),
            sentiment_score: Some(verdict.sentiment),
            classified_by: &classified_by,
        },
    )?;

    // Only after the row is safely stored.
    ctx.core
        .patient()
        .apply_journal_sentiment(stored.sentiment_score);

    Ok(Json(stored))
}

/// `GET /api/journal`
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<JournalEntry>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(db::list_journal_entries(&conn)?))
}

/// `GET /api/journal/:id`
pub async fn get_one(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<JournalEntry>, ApiError> {
    let conn = ctx.core.open_db()?;
    db::get_journal_entry(&conn, id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Journal entry {id} not found")))
}
