// Snapshot providers: where race weekend data comes from

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{CarData, DriverData, Snapshot, TrackData, WeatherData, mock};
use crate::config::AppConfig;
use crate::errors::GproError;
use crate::formulas::post_race::RaceResult;

/// Trait defining the interface for fetching race weekend data
pub trait SnapshotProvider {
    /// Short provider name used in logs and errors
    fn name(&self) -> &str;

    /// Fetch every pre-race record in one go
    fn sync_pre_race(&self) -> Result<Snapshot, GproError>;

    /// Fetch the results of the last race
    fn post_race_results(&self) -> Result<RaceResult, GproError>;

    fn driver_data(&self) -> Result<Option<DriverData>, GproError> {
        Ok(self.sync_pre_race()?.driver)
    }

    fn car_data(&self) -> Result<Option<CarData>, GproError> {
        Ok(self.sync_pre_race()?.car)
    }

    fn track_data(&self) -> Result<Option<TrackData>, GproError> {
        Ok(self.sync_pre_race()?.track)
    }

    fn weather_data(&self) -> Result<Option<WeatherData>, GproError> {
        Ok(self.sync_pre_race()?.weather)
    }
}

/// Which provider implementation to construct
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Built-in development data
    #[default]
    Mock,
    /// Snapshot exported to a JSON file
    File,
}

impl ProviderKind {
    /// Construct the provider selected by the configuration.
    pub fn build(config: &AppConfig) -> Result<Box<dyn SnapshotProvider>, GproError> {
        match config.provider {
            ProviderKind::Mock => Ok(Box::new(MockSnapshotProvider)),
            ProviderKind::File => {
                let snapshot_path =
                    config
                        .snapshot_path
                        .clone()
                        .ok_or(GproError::InvalidUserInput {
                            field: "snapshot_path".to_string(),
                            reason: "the file provider needs a snapshot file".to_string(),
                        })?;
                Ok(Box::new(FileSnapshotProvider::new(
                    snapshot_path,
                    config.race_result_path.clone(),
                )))
            }
        }
    }
}

/// Provider serving the built-in Monza development weekend
#[derive(Debug, Default, Clone, Copy)]
pub struct MockSnapshotProvider;

impl SnapshotProvider for MockSnapshotProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn sync_pre_race(&self) -> Result<Snapshot, GproError> {
        debug!("Serving mock snapshot");
        Ok(mock::mock_snapshot())
    }

    fn post_race_results(&self) -> Result<RaceResult, GproError> {
        Ok(mock::mock_race_result())
    }
}

/// Provider reading JSON exports from disk
pub struct FileSnapshotProvider {
    snapshot_path: PathBuf,
    race_result_path: Option<PathBuf>,
}

impl FileSnapshotProvider {
    pub fn new(snapshot_path: PathBuf, race_result_path: Option<PathBuf>) -> Self {
        Self {
            snapshot_path,
            race_result_path,
        }
    }

    fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, GproError> {
        let data = fs::read_to_string(path).map_err(|e| GproError::SnapshotLoadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&data).map_err(|e| GproError::SnapshotParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

impl SnapshotProvider for FileSnapshotProvider {
    fn name(&self) -> &str {
        "file"
    }

    fn sync_pre_race(&self) -> Result<Snapshot, GproError> {
        let snapshot: Snapshot = Self::read_json(&self.snapshot_path)?;
        info!("Loaded snapshot from {:?}", self.snapshot_path);
        Ok(snapshot)
    }

    fn post_race_results(&self) -> Result<RaceResult, GproError> {
        let path = self
            .race_result_path
            .as_ref()
            .ok_or(GproError::MissingRaceResult {
                provider: self.name().to_string(),
            })?;
        Self::read_json(path)
    }
}
