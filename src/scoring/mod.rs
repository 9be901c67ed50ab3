//! Composite scoring and decay model.
//!
//! Four signals arrive asynchronously (wearable reading, journal sentiment,
//! symptom history, clinical biomarker). Each producer writes one field of
//! [`PatientStateHolder`]; the broadcast loop reads a [`PatientSnapshot`] and
//! runs it through [`assess`] to get a 0–100 progress score plus an insight band.

pub mod decay;
pub mod patient_state;
pub mod progress;
pub mod smoothing;

pub use decay::{aggregate_symptoms, severity_weight, DEFAULT_WINDOW_DAYS, MAX_SYMPTOM_SCORE};
pub use patient_state::{PatientSnapshot, PatientStateHolder};
pub use progress::{assess, InsightBand, NormalizedComponents, ProgressAssessment};
pub use smoothing::smooth_sentiment;
