//! API endpoint handlers, one module per producer or read view.

pub mod clinical;
pub mod health;
pub mod journal;
pub mod state;
pub mod symptoms;
pub mod wearable;
