use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::GproError;
use crate::formulas::parts_wear::DEFAULT_BUDGET;
use crate::snapshot::ProviderKind;

const CONFIG_DIR_NAME: &str = "gpro-setup";
const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_REMAINING_RACES: u32 = 10;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Where snapshots come from
    pub provider: ProviderKind,
    /// Snapshot export read by the file provider
    pub snapshot_path: Option<PathBuf>,
    /// Race result export read by the file provider
    pub race_result_path: Option<PathBuf>,
    /// Races left in the season for the parts wear planner
    pub remaining_races: u32,
    /// Team budget available for maintenance
    pub budget: f64,
    /// Fixed seed for competitor and opponent sampling. None draws from entropy.
    pub rng_seed: Option<u64>,
    /// JSON lines file every report gets appended to
    pub report_log: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Mock,
            snapshot_path: None,
            race_result_path: None,
            remaining_races: DEFAULT_REMAINING_RACES,
            budget: DEFAULT_BUDGET,
            rng_seed: None,
            report_log: None,
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Result<PathBuf, GproError> {
        Ok(dirs::config_dir()
            .ok_or(GproError::NoConfigDir)?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }

    /// Load the config from the user's config directory, if one was saved.
    pub fn from_local_file() -> Result<Option<Self>, GproError> {
        let config_path = Self::default_path()?;
        if config_path.exists() {
            Self::load_from(&config_path).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, GproError> {
        let file =
            std::fs::File::open(path).map_err(|e| GproError::ConfigIOError { source: e })?;
        serde_json::from_reader(file).map_err(|e| GproError::ConfigSerializeError { source: e })
    }

    pub fn save(&self) -> Result<PathBuf, GproError> {
        let config_path = Self::default_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), GproError> {
        if let Some(parent) = config_path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| GproError::ConfigIOError { source: e })?;
        }

        let file = std::fs::File::create(config_path)
            .map_err(|e| GproError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| GproError::ConfigSerializeError { source: e })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join(CONFIG_FILE_NAME);
        let config = AppConfig {
            provider: ProviderKind::File,
            snapshot_path: Some(PathBuf::from("/tmp/snapshot.json")),
            rng_seed: Some(42),
            remaining_races: 6,
            ..Default::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, r#"{ "rng_seed": 7 }"#).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.rng_seed, Some(7));
        assert_eq!(config.provider, ProviderKind::Mock);
        assert_eq!(config.remaining_races, DEFAULT_REMAINING_RACES);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "provider = mock").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(GproError::ConfigSerializeError { .. })
        ));
    }
}
