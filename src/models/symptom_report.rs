use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::Severity;

/// A persisted symptom report.
///
/// `severity` keeps the stored label verbatim; rows written by older
/// builds or by hand may carry labels outside [`Severity`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomReport {
    pub id: i64,
    pub user_id: i64,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub severity: String,
    pub photo_path: Option<String>,
    pub advice: Option<String>,
    pub classified_by: String,
}

impl SymptomReport {
    /// Parsed severity, `None` for unrecognized labels.
    pub fn severity(&self) -> Option<Severity> {
        Severity::from_label(&self.severity)
    }
}

/// Insert payload for a symptom report.
#[derive(Debug, Clone)]
pub struct NewSymptomReport<'a> {
    pub timestamp: DateTime<Utc>,
    pub description: &'a str,
    pub severity: Severity,
    pub photo_path: Option<&'a str>,
    pub advice: Option<&'a str>,
    pub classified_by: &'a str,
}
