//! Process-wide patient state, written by four independent producers and
//! read once per broadcast tick.
//!
//! Each field is its own atomic cell. Writers never block on each other and
//! a reader can never observe a half-written value; a snapshot may mix
//! fields from before and after a concurrent write, which the scoring
//! engine tolerates because it treats every field independently.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::decay::{aggregate_symptoms, DEFAULT_WINDOW_DAYS};
use super::smoothing::smooth_sentiment;
use crate::models::SymptomReport;

pub const DEFAULT_WEARABLE_METRIC: f64 = 40.0;
pub const DEFAULT_SMOOTHED_SENTIMENT: f64 = 0.0;
pub const DEFAULT_SYMPTOM_SCORE: f64 = 0.0;
pub const DEFAULT_CLINICAL_BIOMARKER: f64 = 10.0;

/// Immutable copy of the patient state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatientSnapshot {
    /// Most recent wearable reading (HRV, ms).
    pub wearable_metric: f64,
    /// Running average of journal sentiment; -1 calm, +1 distressed.
    pub smoothed_sentiment: f64,
    /// Decayed symptom severity in `[0, 10]`.
    pub symptom_score: f64,
    /// Latest lab value; lower is better.
    pub clinical_biomarker: f64,
}

impl Default for PatientSnapshot {
    fn default() -> Self {
        Self {
            wearable_metric: DEFAULT_WEARABLE_METRIC,
            smoothed_sentiment: DEFAULT_SMOOTHED_SENTIMENT,
            symptom_score: DEFAULT_SYMPTOM_SCORE,
            clinical_biomarker: DEFAULT_CLINICAL_BIOMARKER,
        }
    }
}

/// `f64` stored as raw bits in an `AtomicU64`.
#[derive(Debug)]
struct AtomicF64(AtomicU64);

impl AtomicF64 {
    fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Release);
    }

    /// Atomically replace the value with `f(current)`, returning the new value.
    fn update(&self, f: impl Fn(f64) -> f64) -> f64 {
        let mut current = self.0.load(Ordering::Acquire);
        loop {
            let next = f(f64::from_bits(current)).to_bits();
            match self
                .0
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return f64::from_bits(next),
                Err(actual) => current = actual,
            }
        }
    }
}

/// Shared patient state. Construct once at startup and hand out by `Arc`.
#[derive(Debug)]
pub struct PatientStateHolder {
    wearable_metric: AtomicF64,
    smoothed_sentiment: AtomicF64,
    symptom_score: AtomicF64,
    clinical_biomarker: AtomicF64,
}

impl PatientStateHolder {
    pub fn new() -> Self {
        Self::from_snapshot(PatientSnapshot::default())
    }

    /// Start from explicit values (tests, restores).
    pub fn from_snapshot(snapshot: PatientSnapshot) -> Self {
        Self {
            wearable_metric: AtomicF64::new(snapshot.wearable_metric),
            smoothed_sentiment: AtomicF64::new(snapshot.smoothed_sentiment),
            symptom_score: AtomicF64::new(snapshot.symptom_score),
            clinical_biomarker: AtomicF64::new(snapshot.clinical_biomarker),
        }
    }

    /// Wearable sync: replace the wearable reading.
    pub fn apply_wearable(&self, value: f64) {
        self.wearable_metric.store(value);
        tracing::info!(wearable_metric = value, "State updated from wearable sync");
    }

    /// Journal submitted: fold the sentiment into the running average.
    /// Returns the new average.
    pub fn apply_journal_sentiment(&self, score: Option<f64>) -> f64 {
        let Some(sample) = score else {
            return self.smoothed_sentiment.load();
        };
        let next = self
            .smoothed_sentiment
            .update(|previous| smooth_sentiment(previous, Some(sample)));
        tracing::info!(sample, smoothed_sentiment = next, "Sentiment updated from journal");
        next
    }

    /// Biomarker entered: replace the lab value.
    pub fn apply_biomarker(&self, level: f64) {
        self.clinical_biomarker.store(level);
        tracing::info!(clinical_biomarker = level, "Clinical biomarker updated");
    }

    /// Symptom submitted: recompute the symptom score from the recent
    /// history as of now, over the default window. Returns the new score.
    pub fn apply_symptom_history(&self, history: &[SymptomReport]) -> f64 {
        self.apply_symptom_history_at(history, Utc::now(), DEFAULT_WINDOW_DAYS)
    }

    /// Recompute the symptom score against an explicit clock and window.
    pub fn apply_symptom_history_at(
        &self,
        history: &[SymptomReport],
        as_of: DateTime<Utc>,
        window_days: u32,
    ) -> f64 {
        let score = aggregate_symptoms(history, as_of, window_days);
        self.symptom_score.store(score);
        tracing::info!(
            reports = history.len(),
            symptom_score = score,
            "Symptom score recalculated from history"
        );
        score
    }

    /// Copy of all four fields.
    pub fn snapshot(&self) -> PatientSnapshot {
        PatientSnapshot {
            wearable_metric: self.wearable_metric.load(),
            smoothed_sentiment: self.smoothed_sentiment.load(),
            symptom_score: self.symptom_score.load(),
            clinical_biomarker: self.clinical_biomarker.load(),
        }
    }
}

impl Default for PatientStateHolder {
    fn default() -> Self {
        Self::new()
    }
}
