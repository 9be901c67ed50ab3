use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "CareCompanion";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default listen address for the REST + WebSocket server.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Default SQLite file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "./care_companion.db";

/// Broadcast cadence for the progress score push channel.
pub const DEFAULT_TICK_MS: u64 = 2000;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

// Environment variable names
pub const ENV_BIND: &str = "CARE_COMPANION_BIND";
pub const ENV_DB: &str = "CARE_COMPANION_DB";
pub const ENV_TICK_MS: &str = "CARE_COMPANION_TICK_MS";
pub const ENV_API_KEY: &str = "GOOGLE_API_KEY";
pub const ENV_MODEL: &str = "GEMINI_MODEL";
pub const ENV_BASE_URL: &str = "GEMINI_BASE_URL";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,care_companion_lib=debug,tower_http=info"
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Classifier backend settings. `api_key == None` means the classifier
/// runs in fallback-only mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    pub tick_period: Duration,
    pub classifier: ClassifierConfig,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_raw = get(ENV_BIND).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                var: ENV_BIND,
                value: bind_raw.clone(),
                reason: e.to_string(),
            })?;

        let db_path = PathBuf::from(get(ENV_DB).unwrap_or_else(|| DEFAULT_DB_PATH.to_string()));

        let tick_ms = match get(ENV_TICK_MS) {
            Some(raw) => {
                let ms = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| ConfigError::InvalidValue {
                        var: ENV_TICK_MS,
                        value: raw.clone(),
                        reason: e.to_string(),
                    })?;
                if ms == 0 {
                    return Err(ConfigError::InvalidValue {
                        var: ENV_TICK_MS,
                        value: raw,
                        reason: "must be greater than zero".into(),
                    });
                }
                ms
            }
            None => DEFAULT_TICK_MS,
        };

        let classifier = ClassifierConfig {
            api_key: get(ENV_API_KEY).map(|k| k.trim().to_string()),
            model: get(ENV_MODEL).unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            base_url: get(ENV_BASE_URL)
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        };

        Ok(Self {
            bind_addr,
            db_path,
            tick_period: Duration::from_millis(tick_ms),
            classifier,
        })
    }
}
