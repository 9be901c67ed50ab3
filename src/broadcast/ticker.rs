//! Fixed-cadence scoring loop.
//!
//! Each tick: snapshot → [`assess`] → payload → hub. The tick runs inline
//! in the loop task, so two ticks never overlap; if one runs long, the
//! missed timer ticks are skipped rather than queued.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::core_state::{CoreError, CoreState};
use crate::scoring::{assess, InsightBand, NormalizedComponents, PatientSnapshot};

/// Message pushed to dashboards every tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressPayload {
    pub progress_score: f64,
    pub insight: &'static str,
    pub insight_band: InsightBand,
    /// Raw inputs, as the dashboard labels them.
    pub hrv: f64,
    pub avg_sentiment: f64,
    pub symptom_score: f64,
    pub clinical_biomarker: f64,
    pub components: NormalizedComponents,
}

/// Score a snapshot into the wire payload. Pure.
pub fn build_payload(snapshot: &PatientSnapshot) -> ProgressPayload {
    let assessment = assess(snapshot);
    ProgressPayload {
        progress_score: assessment.score,
        insight: assessment.insight,
        insight_band: assessment.band,
        hrv: snapshot.wearable_metric,
        avg_sentiment: snapshot.smoothed_sentiment,
        symptom_score: snapshot.symptom_score,
        clinical_biomarker: snapshot.clinical_biomarker,
        components: assessment.components,
    }
}

/// One broadcast cycle. Returns the payload that was sent.
pub fn run_tick(core: &CoreState) -> ProgressPayload {
    let payload = build_payload(&core.patient().snapshot());
    match core.hub().broadcast(&payload) {
        Ok(delivered) => tracing::debug!(
            score = payload.progress_score,
            band = payload.insight_band.as_str(),
            delivered,
            "Progress broadcast"
        ),
        Err(e) => tracing::error!(error = %e, "Failed to serialize progress payload"),
    }
    payload
}

// ═══════════════════════════════════════════════════════════
// Loop lifecycle
// ═══════════════════════════════════════════════════════════

/// Handle to the running loop. Dropping it leaves the loop running.
pub struct BroadcastHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl BroadcastHandle {
    /// Signal the loop to stop. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("Broadcast loop shutdown signal sent");
        }
    }

    /// Signal and wait for the loop task to finish.
    pub async fn stop(mut self) -> Result<(), CoreError> {
        self.shutdown();
        self.task
            .await
            .map_err(|e| CoreError::Task(e.to_string()))
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn the loop on the current runtime. The first tick fires immediately.
pub fn start_broadcast_loop(core: Arc<CoreState>, period: Duration) -> BroadcastHandle {
    // tokio::time::interval panics on a zero period.
    let period = period.max(Duration::from_millis(1));
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(period_ms = period.as_millis() as u64, "Broadcast loop started");

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                _ = interval.tick() => {
                    run_tick(&core);
                }
            }
        }

        tracing::info!("Broadcast loop stopped");
    });

    BroadcastHandle {
        shutdown_tx: Some(shutdown_tx),
        task,
    }
}
