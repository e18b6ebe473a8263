// Library interface for gpro-setup
// The binary and integration tests both go through these modules

pub mod config;
pub mod errors;
pub mod formulas;
pub mod report;
pub mod snapshot;
pub mod writer;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::GproError;
pub use snapshot::{Snapshot, SnapshotProvider};
pub use writer::ReportRecord;
