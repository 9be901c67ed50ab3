//! Dashboard push channel.
//!
//! Connection lifecycle:
//! 1. Client opens `GET /api/ws/health-data`
//! 2. Connection registers a bounded channel with the [`ConnectionHub`]
//!    and immediately receives the current progress payload
//! 3. Every broadcast tick arrives through the hub
//! 4. Incoming text frames are ignored (keep-alive); close, error, or a
//!    dropped channel end the connection and unregister it
//!
//! [`ConnectionHub`]: crate::broadcast::ConnectionHub

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::api::types::ApiContext;
use crate::broadcast::hub::CHANNEL_CAPACITY;
use crate::broadcast::build_payload;
use crate::core_state::CoreState;

/// WebSocket upgrade handler.
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(ctx): State<ApiContext>) -> impl IntoResponse {
    let core = ctx.core.clone();
    ws.on_upgrade(move |socket| handle_ws(socket, core))
}

/// Spawns a writer task (hub channel → socket), then reads until the
/// client goes away or the hub drops the channel.
async fn handle_ws(socket: WebSocket, core: Arc<CoreState>) {
    let (ws_sink, mut ws_stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<String>(CHANNEL_CAPACITY);
    let id = core.hub().register(tx);

    let mut writer = tokio::spawn(async move {
        let mut sink = ws_sink;
        while let Some(text) = rx.recv().await {
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    // Current state right away, so a new dashboard doesn't wait a tick.
    match serde_json::to_string(&build_payload(&core.patient().snapshot())) {
        Ok(json) => {
            core.hub().send_to(&id, json);
        }
        Err(e) => tracing::error!(error = %e, "Failed to serialize initial payload"),
    }

    let mut writer_finished = false;
    loop {
        tokio::select! {
            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(recipient = %id, error = %e, "WebSocket read error");
                        break;
                    }
                    _ => {} // keep-alive text, binary, ping/pong
                }
            }
            _ = &mut writer => {
                writer_finished = true;
                break;
            }
        }
    }

    // Unregister drops the hub's sender, which ends the writer task.
    core.hub().unregister(&id);
    if !writer_finished {
        let _ = writer.await;
    }
}
