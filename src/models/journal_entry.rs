use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Single implicit user. The column exists so rows stay compatible
/// with a future multi-user schema.
pub const DEFAULT_USER_ID: i64 = 1;

/// A persisted journal entry with the classifier's reading of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: i64,
    pub user_id: i64,
    pub timestamp: DateTime<Utc>,
    pub content: String,
    pub ai_analysis: Option<String>,
    pub ai_encouragement: Option<String>,
    pub sentiment_score: Option<f64>,
    /// `"model"` or `"fallback:<reason>"`.
    pub classified_by: String,
}

/// Insert payload for a journal entry.
#[derive(Debug, Clone)]
pub struct NewJournalEntry<'a> {
    pub timestamp: DateTime<Utc>,
    pub content: &'a str,
    pub ai_analysis: Option<&'a str>,
    pub ai_encouragement: Option<&'a str>,
    pub sentiment_score: Option<f64>,
    pub classified_by: &'a str,
}
