//! Recipient registry for the push channel.
//!
//! Each WebSocket connection registers a bounded sender; its writer task
//! drains the other end. Delivery is best effort and at most once: a
//! recipient whose channel is closed or full is removed on the spot.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

/// Per-connection queue depth.
pub const CHANNEL_CAPACITY: usize = 32;

#[derive(Default)]
pub struct ConnectionHub {
    channels: Mutex<HashMap<Uuid, mpsc::Sender<String>>>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    // The map holds no cross-entry invariant, so a poisoned lock is still usable.
    fn channels(&self) -> MutexGuard<'_, HashMap<Uuid, mpsc::Sender<String>>> {
        self.channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a recipient. Returns its id for later [`unregister`](Self::unregister).
    pub fn register(&self, tx: mpsc::Sender<String>) -> Uuid {
        let id = Uuid::new_v4();
        let total = {
            let mut channels = self.channels();
            channels.insert(id, tx);
            channels.len()
        };
        tracing::info!(recipient = %id, total, "Dashboard connected");
        id
    }

    /// Remove a recipient. Returns whether it was still registered.
    pub fn unregister(&self, id: &Uuid) -> bool {
        let (removed, total) = {
            let mut channels = self.channels();
            let removed = channels.remove(id).is_some();
            (removed, channels.len())
        };
        if removed {
            tracing::info!(recipient = %id, total, "Dashboard disconnected");
        }
        removed
    }

    /// Send a pre-serialized message to one recipient. Drops it on failure.
    pub fn send_to(&self, id: &Uuid, text: String) -> bool {
        let mut channels = self.channels();
        let Some(tx) = channels.get(id) else {
            return false;
        };
        match tx.try_send(text) {
            Ok(()) => true,
            Err(e) => {
                channels.remove(id);
                tracing::debug!(recipient = %id, reason = send_failure(&e), "Recipient dropped");
                false
            }
        }
    }

    /// Serialize `payload` once and deliver it to every recipient.
    ///
    /// Returns how many recipients accepted it. Failing recipients are
    /// removed and never affect delivery to the others.
    pub fn broadcast<T: Serialize>(&self, payload: &T) -> Result<usize, serde_json::Error> {
        let text = serde_json::to_string(payload)?;
        let mut delivered = 0;
        let mut channels = self.channels();
        channels.retain(|id, tx| match tx.try_send(text.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(e) => {
                tracing::debug!(recipient = %id, reason = send_failure(&e), "Recipient dropped");
                false
            }
        });
        Ok(delivered)
    }

    pub fn len(&self) -> usize {
        self.channels().len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels().is_empty()
    }
}

fn send_failure<T>(err: &TrySendError<T>) -> &'static str {
    match err {
        TrySendError::Full(_) => "full",
        TrySendError::Closed(_) => "closed",
    }
}
