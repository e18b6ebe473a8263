use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::info;
use serde::{Deserialize, Serialize};
use serde_jsonlines::WriteExt;

use crate::GproError;
use crate::formulas::{
    overtaking::OvertakingAnalysis,
    parts_wear::PartsWearAnalysis,
    post_race::PostRaceAnalysis,
    qualifying::QualifyingResult,
    setup::SetupResult,
    strategy::{FuelCalculation, StrategyResult},
};

/// One line of the report log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "report", rename_all = "snake_case")]
pub enum ReportRecord {
    Setup(SetupResult),
    Strategy(Box<StrategyResult>),
    Fuel(FuelCalculation),
    Qualifying(Box<QualifyingResult>),
    Wear(Box<PartsWearAnalysis>),
    Overtaking(Box<OvertakingAnalysis>),
    PostRace(Box<PostRaceAnalysis>),
}

impl ReportRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            ReportRecord::Setup(_) => "setup",
            ReportRecord::Strategy(_) => "strategy",
            ReportRecord::Fuel(_) => "fuel",
            ReportRecord::Qualifying(_) => "qualifying",
            ReportRecord::Wear(_) => "wear",
            ReportRecord::Overtaking(_) => "overtaking",
            ReportRecord::PostRace(_) => "post_race",
        }
    }
}

/// Write `records` to `file`, replacing whatever it held.
pub fn write_reports(file: &Path, records: &[ReportRecord]) -> Result<(), GproError> {
    let report_file = File::create(file).map_err(|e| GproError::WriterError { source: e })?;
    let mut report_file_writer = BufWriter::new(report_file);
    report_file_writer
        .write_json_lines(records)
        .map_err(|e| GproError::WriterError { source: e })?;
    report_file_writer
        .flush()
        .map_err(|e| GproError::WriterError { source: e })?;
    info!("Wrote {} reports to {}", records.len(), file.display());
    Ok(())
}

/// Append a single record, creating the log if needed.
pub fn append_report(file: &Path, record: &ReportRecord) -> Result<(), GproError> {
    serde_jsonlines::append_json_lines(file, [record])
        .map_err(|e| GproError::WriterError { source: e })?;
    info!("Appended {} report to {}", record.kind(), file.display());
    Ok(())
}

pub fn load_reports(file: &Path) -> Result<Vec<ReportRecord>, GproError> {
    let to_load_error = |e: std::io::Error| GproError::ReportLoadError {
        path: file.to_path_buf(),
        source: e,
    };
    serde_jsonlines::json_lines(file)
        .map_err(to_load_error)?
        .collect::<Result<Vec<ReportRecord>, std::io::Error>>()
        .map_err(to_load_error)
}
