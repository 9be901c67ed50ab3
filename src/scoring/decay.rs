//! Linear time-decay aggregation of symptom history.
//!
//! Stateless: the score is recomputed from the full recent history every
//! time a new report arrives, so identical inputs always give identical output.

use chrono::{DateTime, Utc};

use crate::models::{Severity, SymptomReport};

/// Default decay window in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Upper bound of the aggregated symptom score.
pub const MAX_SYMPTOM_SCORE: f64 = 10.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Base contribution of a single report before decay.
pub fn severity_weight(severity: Severity) -> f64 {
    match severity {
        Severity::Mild => 1.0,
        Severity::Moderate => 2.5,
        Severity::Severe => 5.0,
    }
}

/// Decay factor for a report `age_days` old: 1.0 at age 0, 0.0 at the
/// window edge and beyond.
fn decay_factor(age_days: f64, window_days: f64) -> f64 {
    // Reports stamped in the future (clock skew) count as brand new.
    let age = age_days.max(0.0);
    ((window_days - age) / window_days).max(0.0)
}

/// Aggregate a symptom history into a single score in `[0, 10]`.
///
/// Records older than the window contribute nothing; unrecognized
/// severity labels contribute nothing. A zero-day window yields 0.0.
pub fn aggregate_symptoms(history: &[SymptomReport], as_of: DateTime<Utc>, window_days: u32) -> f64 {
    if window_days == 0 {
        return 0.0;
    }
    let window = f64::from(window_days);

    let total: f64 = history
        .iter()
        .map(|report| {
            let age_days = (as_of - report.timestamp).num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY;
            let decay = decay_factor(age_days, window);
            let base = report.severity().map(severity_weight).unwrap_or(0.0);
            let contribution = base * decay;
            tracing::debug!(
                severity = %report.severity,
                age_days,
                contribution,
                "Symptom contribution"
            );
            contribution
        })
        .sum();

    total.min(MAX_SYMPTOM_SCORE)
}
