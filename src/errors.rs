// Error types for gpro-setup

use snafu::Snafu;
use std::{io, path::PathBuf};

use crate::snapshot::SnapshotField;

#[derive(Debug, Snafu)]
pub enum GproError {
    // Formula preconditions
    #[snafu(display("Insufficient data: snapshot has no {field} record"))]
    InsufficientData { field: SnapshotField },
    #[snafu(display("Invalid user input: {field} - {reason}"))]
    InvalidUserInput { field: String, reason: String },
    #[snafu(display("Invalid lap time: {value}"))]
    InvalidLapTime { value: String },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // Snapshot provider errors
    #[snafu(display("Unable to read snapshot file: {}", path.display()))]
    SnapshotLoadError { path: PathBuf, source: io::Error },
    #[snafu(display("Invalid snapshot file: {}", path.display()))]
    SnapshotParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[snafu(display("Snapshot provider {provider} has no post-race results"))]
    MissingRaceResult { provider: String },

    // Report log errors
    #[snafu(display("Error writing report file"))]
    WriterError { source: io::Error },
    #[snafu(display("Error loading report file: {}", path.display()))]
    ReportLoadError { path: PathBuf, source: io::Error },
}
