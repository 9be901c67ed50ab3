//! Severity/sentiment classifier adapter.
//!
//! Wraps a generative model behind two calls, `classify_journal` and
//! `classify_symptom`. Neither ever returns an error: any failure
//! (no key, transport, upstream status, safety refusal, unparsable reply)
//! yields a fixed conservative verdict tagged with a [`FallbackReason`],
//! so callers and storage can still tell a real verdict from a default.
//! No retries.

mod gemini;
mod gemini_types;
mod parser;
mod prompt;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::ClassifierConfig;
use crate::models::Severity;

pub use gemini::GeminiClient;

/// Timeout for a single classification round trip.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

const JOURNAL_FALLBACK_ANALYSIS: &str = "Entry saved.";
const JOURNAL_FALLBACK_SENTIMENT: f64 = 0.1;
const JOURNAL_FALLBACK_MESSAGE: &str =
    "Thank you for sharing. Remember that every step, no matter how small, is part of your journey.";
const SYMPTOM_FALLBACK_ADVICE: &str =
    "Unable to analyze symptom at this time. As a precaution, please consult your care team.";

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Classifier not configured")]
    NotConfigured,
    #[error("Empty input")]
    EmptyInput,
    #[error("Cannot reach classifier service: {0}")]
    Connection(String),
    #[error("Classifier service returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("Response withheld by upstream safety policy: {0}")]
    Refused(String),
    #[error("Malformed classifier response: {0}")]
    Malformed(String),
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl ClassifierError {
    pub fn fallback_reason(&self) -> FallbackReason {
        match self {
            Self::NotConfigured => FallbackReason::NotConfigured,
            Self::EmptyInput => FallbackReason::EmptyInput,
            Self::Connection(_) | Self::HttpClient(_) => FallbackReason::Unreachable,
            Self::Upstream { .. } => FallbackReason::Upstream,
            Self::Refused(_) => FallbackReason::Refused,
            Self::Malformed(_) => FallbackReason::Malformed,
        }
    }
}

/// Why a fallback verdict was used instead of a model verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    NotConfigured,
    EmptyInput,
    Unreachable,
    Upstream,
    Refused,
    Malformed,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::EmptyInput => "empty_input",
            Self::Unreachable => "unreachable",
            Self::Upstream => "upstream",
            Self::Refused => "refused",
            Self::Malformed => "malformed",
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Verdicts
// ═══════════════════════════════════════════════════════════

/// Journal verdict. `sentiment` runs from -1 (calm, hopeful) to 1 (distressed).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalVerdict {
    pub analysis: String,
    pub sentiment: f64,
    pub message: String,
}

impl JournalVerdict {
    pub fn fallback() -> Self {
        Self {
            analysis: JOURNAL_FALLBACK_ANALYSIS.into(),
            sentiment: JOURNAL_FALLBACK_SENTIMENT,
            message: JOURNAL_FALLBACK_MESSAGE.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymptomVerdict {
    pub severity: Severity,
    pub advice: String,
}

impl SymptomVerdict {
    pub fn fallback() -> Self {
        Self {
            severity: Severity::Moderate,
            advice: SYMPTOM_FALLBACK_ADVICE.into(),
        }
    }
}

/// Either what the model said, or the default used in its place.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification<T> {
    Verdict(T),
    Fallback { verdict: T, reason: FallbackReason },
}

impl<T> Classification<T> {
    pub fn verdict(&self) -> &T {
        match self {
            Self::Verdict(v) | Self::Fallback { verdict: v, .. } => v,
        }
    }

    pub fn into_verdict(self) -> T {
        match self {
            Self::Verdict(v) | Self::Fallback { verdict: v, .. } => v,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self {
            Self::Verdict(_) => None,
            Self::Fallback { reason, .. } => Some(*reason),
        }
    }

    /// Provenance tag stored alongside the row: `model` or `fallback:<reason>`.
    pub fn classified_by(&self) -> String {
        match self {
            Self::Verdict(_) => "model".to_string(),
            Self::Fallback { reason, .. } => format!("fallback:{}", reason.as_str()),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Model backend
// ═══════════════════════════════════════════════════════════

/// Image attached to a symptom report.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInput {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImageInput {
    /// MIME type is guessed from the upload's file name; `image/jpeg` otherwise.
    pub fn from_upload(bytes: Vec<u8>, file_name: Option<&str>) -> Self {
        let mime_type = file_name
            .and_then(|name| mime_guess::from_path(name).first())
            .filter(|m| m.type_() == mime_guess::mime::IMAGE)
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| "image/jpeg".to_string());
        Self { bytes, mime_type }
    }
}

/// Text-generation backend (allows mocking).
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        image: Option<&ImageInput>,
    ) -> Result<String, ClassifierError>;
}

/// Classifier adapter used by the HTTP handlers.
#[derive(Clone)]
pub struct Classifier {
    model: Option<Arc<dyn GenerativeModel>>,
}

impl Classifier {
    /// Build from configuration. No API key means every call falls back.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        match &config.api_key {
            Some(key) => {
                let client = GeminiClient::new(
                    &config.base_url,
                    &config.model,
                    key,
                    REQUEST_TIMEOUT_SECS,
                )?;
                tracing::info!(model = %config.model, "Classifier backed by Gemini");
                Ok(Self::with_model(Arc::new(client)))
            }
            None => {
                tracing::warn!("No API key configured, classifier will always fall back");
                Ok(Self::unconfigured())
            }
        }
    }

    pub fn with_model(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model: Some(model) }
    }

    pub fn unconfigured() -> Self {
        Self { model: None }
    }

    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    pub async fn classify_journal(&self, text: &str) -> Classification<JournalVerdict> {
        match self.try_journal(text).await {
            Ok(verdict) => Classification::Verdict(verdict),
            Err(e) => {
                let reason = e.fallback_reason();
                tracing::warn!(reason = reason.as_str(), error = %e, "Journal classification fell back");
                Classification::Fallback {
                    verdict: JournalVerdict::fallback(),
                    reason,
                }
            }
        }
    }

    pub async fn classify_symptom(
        &self,
        text: &str,
        image: Option<&ImageInput>,
    ) -> Classification<SymptomVerdict> {
        match self.try_symptom(text, image).await {
            Ok(verdict) => Classification::Verdict(verdict),
            Err(e) => {
                let reason = e.fallback_reason();
                tracing::warn!(reason = reason.as_str(), error = %e, "Symptom classification fell back");
                Classification::Fallback {
                    verdict: SymptomVerdict::fallback(),
                    reason,
                }
            }
        }
    }

    async fn try_journal(&self, text: &str) -> Result<JournalVerdict, ClassifierError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ClassifierError::EmptyInput);
        }
        let model = self.model.as_ref().ok_or(ClassifierError::NotConfigured)?;
        let raw = model.generate(&prompt::journal_prompt(text), None).await?;
        parser::parse_journal(&raw)
    }

    async fn try_symptom(
        &self,
        text: &str,
        image: Option<&ImageInput>,
    ) -> Result<SymptomVerdict, ClassifierError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ClassifierError::EmptyInput);
        }
        let model = self.model.as_ref().ok_or(ClassifierError::NotConfigured)?;
        let raw = model.generate(&prompt::symptom_prompt(text), image).await?;
        parser::parse_symptom(&raw)
    }
}

// ═══════════════════════════════════════════════════════════
// Test support
// ═══════════════════════════════════════════════════════════
