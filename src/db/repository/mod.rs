//! Repository layer: entity-scoped database operations.

mod journal;
mod symptom;

pub use journal::*;
pub use symptom::*;
