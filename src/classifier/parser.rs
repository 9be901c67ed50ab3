//! Model reply → verdict.
//!
//! Replies are expected to be a single JSON object, possibly wrapped in a
//! Markdown code fence or surrounded by stray prose.

use serde::Deserialize;

use super::{ClassifierError, JournalVerdict, SymptomVerdict};
use crate::models::Severity;

#[derive(Deserialize)]
struct RawJournal {
    analysis: String,
    #[serde(alias = "sentiment")]
    sentiment_score: f64,
    #[serde(alias = "message")]
    encouragement: String,
}

#[derive(Deserialize)]
struct RawSymptom {
    severity: String,
    advice: String,
}

/// Remove a surrounding ```` ``` ```` / ```` ```json ```` fence if present.
pub(super) fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

fn parse_object<T: for<'de> Deserialize<'de>>(raw: &str) -> Result<T, ClassifierError> {
    let cleaned = strip_code_fences(raw);
    match serde_json::from_str(cleaned) {
        Ok(parsed) => Ok(parsed),
        Err(first) => {
            // Prose around the object: retry on the outermost braces.
            let start = cleaned.find('{');
            let end = cleaned.rfind('}');
            match (start, end) {
                (Some(s), Some(e)) if s < e => serde_json::from_str(&cleaned[s..=e])
                    .map_err(|e| ClassifierError::Malformed(e.to_string())),
                _ => Err(ClassifierError::Malformed(first.to_string())),
            }
        }
    }
}

pub(super) fn parse_journal(raw: &str) -> Result<JournalVerdict, ClassifierError> {
    let parsed: RawJournal = parse_object(raw)?;
    if !parsed.sentiment_score.is_finite() {
        return Err(ClassifierError::Malformed(format!(
            "non-finite sentiment {}",
            parsed.sentiment_score
        )));
    }
    Ok(JournalVerdict {
        analysis: parsed.analysis.trim().to_string(),
        sentiment: parsed.sentiment_score.clamp(-1.0, 1.0),
        message: parsed.encouragement.trim().to_string(),
    })
}

pub(super) fn parse_symptom(raw: &str) -> Result<SymptomVerdict, ClassifierError> {
    let parsed: RawSymptom = parse_object(raw)?;
    let severity = Severity::from_label(&parsed.severity).ok_or_else(|| {
        ClassifierError::Malformed(format!("unknown severity '{}'", parsed.severity))
    })?;
    Ok(SymptomVerdict {
        severity,
        advice: parsed.advice.trim().to_string(),
    })
}
