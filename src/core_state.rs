//! Shared application state.
//!
//! One `CoreState` is built at startup, wrapped in `Arc`, and handed to the
//! HTTP handlers and the broadcast loop. Nothing here is global.

use std::path::PathBuf;

use crate::broadcast::ConnectionHub;
use crate::classifier::Classifier;
use crate::db;
use crate::scoring::PatientStateHolder;

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    /// Running summary of the patient, written by producers, read per tick.
    patient: PatientStateHolder,
    /// Open dashboard connections.
    hub: ConnectionHub,
    classifier: Classifier,
    db_path: PathBuf,
    /// Held across insert, history fetch and score store.
    symptom_intake: tokio::sync::Mutex<()>,
}

impl CoreState {
    pub fn new(db_path: impl Into<PathBuf>, classifier: Classifier) -> Self {
        Self {
            patient: PatientStateHolder::new(),
            hub: ConnectionHub::new(),
            classifier,
            db_path: db_path.into(),
            symptom_intake: tokio::sync::Mutex::new(()),
        }
    }

    pub fn patient(&self) -> &PatientStateHolder {
        &self.patient
    }

    pub fn hub(&self) -> &ConnectionHub {
        &self.hub
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Serializes symptom intake so the stored score always reflects
    /// every report inserted before it.
    pub async fn lock_symptom_intake(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.symptom_intake.lock().await
    }

    /// Open a fresh connection. Handlers open one per request.
    pub fn open_db(&self) -> Result<rusqlite::Connection, CoreError> {
        db::open_database(&self.db_path).map_err(CoreError::Database)
    }

    /// Create the schema if needed (opening applies pending migrations).
    /// Run once at startup so a bad path fails before the server binds.
    pub fn migrate(&self) -> Result<(), CoreError> {
        self.open_db().map(|_| ())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("Background task failed: {0}")]
    Task(String),
}

// ═══════════════════════════════════════════════════════════
// Test support
// ═══════════════════════════════════════════════════════════
