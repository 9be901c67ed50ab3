pub mod enums;
pub mod journal_entry;
pub mod symptom_report;

pub use enums::*;
pub use journal_entry::*;
pub use symptom_report::*;
