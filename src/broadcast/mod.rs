//! Periodic progress broadcast.
//!
//! [`ConnectionHub`] fans one JSON payload out to every open dashboard
//! connection; [`start_broadcast_loop`] scores the patient snapshot on a
//! fixed cadence and hands the result to the hub.

pub mod hub;
pub mod ticker;

pub use hub::ConnectionHub;
pub use ticker::{build_payload, run_tick, start_broadcast_loop, BroadcastHandle, ProgressPayload};
