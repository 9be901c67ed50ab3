//! Progress score engine: four signals → one 0–100 score + insight band.

use serde::{Deserialize, Serialize};

use super::patient_state::PatientSnapshot;

/// Wearable reading considered healthy (HRV, ms). Higher is better.
const WEARABLE_REFERENCE: f64 = 50.0;
/// Biomarker level considered healthy. Lower is better.
const BIOMARKER_REFERENCE: f64 = 2.5;

// Weights in percent. Integer so the sum can be checked at compile time.
const WEARABLE_WEIGHT_PCT: u32 = 20;
const SENTIMENT_WEIGHT_PCT: u32 = 15;
const SYMPTOM_WEIGHT_PCT: u32 = 25;
const BIOMARKER_WEIGHT_PCT: u32 = 40;

const _: () = assert!(
    WEARABLE_WEIGHT_PCT + SENTIMENT_WEIGHT_PCT + SYMPTOM_WEIGHT_PCT + BIOMARKER_WEIGHT_PCT == 100,
    "progress weights must sum to 100%"
);

fn weight(pct: u32) -> f64 {
    f64::from(pct) / 100.0
}

/// Clamp to `[0, 100]`; NaN maps to the floor.
fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Each signal mapped onto `[0, 100]`, 100 being best.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedComponents {
    pub wearable: f64,
    pub sentiment: f64,
    pub symptoms: f64,
    pub biomarker: f64,
}

impl NormalizedComponents {
    pub fn from_snapshot(snapshot: &PatientSnapshot) -> Self {
        let wearable = (snapshot.wearable_metric / WEARABLE_REFERENCE * 100.0).min(100.0);
        // -1 is very positive, +1 very distressed
        let sentiment = (1.0 - snapshot.smoothed_sentiment) * 50.0;
        let symptoms = 100.0 - snapshot.symptom_score * 10.0;
        let biomarker = if snapshot.clinical_biomarker > 0.0 {
            (BIOMARKER_REFERENCE / snapshot.clinical_biomarker * 100.0).min(100.0)
        } else {
            100.0
        };

        Self {
            wearable: clamp_score(wearable),
            sentiment: clamp_score(sentiment),
            symptoms: clamp_score(symptoms),
            biomarker: clamp_score(biomarker),
        }
    }

    /// Fixed weighted sum, clamped to `[0, 100]`.
    pub fn weighted_score(&self) -> f64 {
        clamp_score(
            self.wearable * weight(WEARABLE_WEIGHT_PCT)
                + self.sentiment * weight(SENTIMENT_WEIGHT_PCT)
                + self.symptoms * weight(SYMPTOM_WEIGHT_PCT)
                + self.biomarker * weight(BIOMARKER_WEIGHT_PCT),
        )
    }
}

/// Qualitative reading of the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightBand {
    /// score > 85
    ExcellentProgress,
    /// 65 < score ≤ 85
    SteadyProgress,
    /// 40 < score ≤ 65
    Stable,
    /// score ≤ 40
    HighStress,
}

impl InsightBand {
    pub fn from_score(score: f64) -> Self {
        if score > 85.0 {
            Self::ExcellentProgress
        } else if score > 65.0 {
            Self::SteadyProgress
        } else if score > 40.0 {
            Self::Stable
        } else {
            Self::HighStress
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExcellentProgress => "excellent_progress",
            Self::SteadyProgress => "steady_progress",
            Self::Stable => "stable",
            Self::HighStress => "high_stress",
        }
    }

    /// Advisory copy shown on the dashboard.
    pub fn message(self) -> &'static str {
        match self {
            Self::ExcellentProgress => {
                "Showing excellent signs of positive progress. All metrics are trending strongly in the right direction."
            }
            Self::SteadyProgress => {
                "Steady positive progress. Your physiological and emotional well-being are well-aligned with recovery."
            }
            Self::Stable => {
                "Maintaining a stable condition. Focus on consistency in self-care and symptom management."
            }
            Self::HighStress => {
                "Multiple metrics indicate a high level of body and mind stress. This is a key time to focus on rest and consult your care team."
            }
        }
    }
}

/// Result of one scoring pass. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressAssessment {
    pub score: f64,
    pub band: InsightBand,
    pub insight: &'static str,
    pub components: NormalizedComponents,
}

/// Score a snapshot. Pure and deterministic.
pub fn assess(snapshot: &PatientSnapshot) -> ProgressAssessment {
    let components = NormalizedComponents::from_snapshot(snapshot);
    let score = components.weighted_score();
    let band = InsightBand::from_score(score);
    ProgressAssessment {
        score,
        band,
        insight: band.message(),
        components,
    }
}
