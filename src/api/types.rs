//! Shared types for the API layer.

use std::sync::Arc;

use serde::Serialize;

use crate::api::error::ApiError;
use crate::core_state::CoreState;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// `{"status": "..."}` acknowledgement.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

// ═══════════════════════════════════════════════════════════
// Boundary validation
// ═══════════════════════════════════════════════════════════

/// A reading must be finite and non-negative before it reaches the state holder.
pub fn require_reading(field: &str, value: f64) -> Result<f64, ApiError> {
    if !value.is_finite() {
        return Err(ApiError::BadRequest(format!("{field} must be a finite number")));
    }
    if value < 0.0 {
        return Err(ApiError::BadRequest(format!("{field} must be >= 0")));
    }
    Ok(value)
}

/// Trimmed text, rejecting blank input.
pub fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest(format!("{field} is required")));
    }
    Ok(trimmed)
}
