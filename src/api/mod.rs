//! HTTP and WebSocket surface.
//!
//! All routes live under `/api/`. There is no authentication: the service
//! tracks a single implicit patient.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;
pub mod websocket;

pub use router::api_router;
pub use server::{start_api_server, ApiServer, ServerError};
pub use types::ApiContext;
