pub mod api; // REST + WebSocket surface
pub mod broadcast; // Periodic progress push
pub mod classifier; // Journal/symptom classification with safe fallbacks
pub mod config;
pub mod core_state; // Shared state handed to handlers and the loop
pub mod db;
pub mod models;
pub mod scoring; // Decay, smoothing, progress score

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::ServerError;
use crate::classifier::Classifier;
use crate::config::ServerConfig;
use crate::core_state::CoreState;

/// Start the service and block until Ctrl-C.
pub async fn run() -> Result<(), ServerError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = ServerConfig::from_env()?;
    tracing::info!(
        bind = %config.bind_addr,
        db = %config.db_path.display(),
        tick_ms = config.tick_period.as_millis() as u64,
        "Configuration loaded"
    );

    let classifier = Classifier::from_config(&config.classifier)?;
    let core = Arc::new(CoreState::new(config.db_path.clone(), classifier));
    core.migrate()?;

    let broadcast = broadcast::start_broadcast_loop(core.clone(), config.tick_period);
    let server = api::start_api_server(core, config.bind_addr).await?;
    tracing::info!(addr = %server.local_addr, "{} ready", config::APP_NAME);

    let signal = tokio::signal::ctrl_c().await.map_err(ServerError::Signal);
    tracing::info!("Shutting down");

    let served = server.stop().await;
    broadcast.stop().await?;
    signal?;
    served
}
