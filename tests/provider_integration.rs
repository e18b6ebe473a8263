// Integration tests for providers, configuration and the report log

use std::fs;

use gpro_setup::formulas::{
    post_race::analyze_race_performance, setup::calculate_optimal_setup,
    strategy::calculate_race_strategy,
};
use gpro_setup::snapshot::mock::{mock_race_result, mock_snapshot};
use gpro_setup::snapshot::ProviderKind;
use gpro_setup::writer::{append_report, load_reports};
use gpro_setup::{AppConfig, GproError, ReportRecord};
use tempfile::TempDir;

fn write_exports(dir: &TempDir) -> AppConfig {
    let snapshot_path = dir.path().join("snapshot.json");
    let result_path = dir.path().join("race_result.json");
    fs::write(
        &snapshot_path,
        serde_json::to_string_pretty(&mock_snapshot()).unwrap(),
    )
    .unwrap();
    fs::write(
        &result_path,
        serde_json::to_string_pretty(&mock_race_result()).unwrap(),
    )
    .unwrap();

    AppConfig {
        provider: ProviderKind::File,
        snapshot_path: Some(snapshot_path),
        race_result_path: Some(result_path),
        report_log: Some(dir.path().join("reports.jsonl")),
        ..Default::default()
    }
}

#[test]
fn test_file_provider_weekend() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_exports(&temp_dir);

    let provider = ProviderKind::build(&config).unwrap();
    assert_eq!(provider.name(), "file");

    let snapshot = provider.sync_pre_race().unwrap();
    assert_eq!(snapshot.track().unwrap().name, "Monza");

    let setup = calculate_optimal_setup(&snapshot).unwrap();
    let strategy = calculate_race_strategy(&snapshot).unwrap();
    let result = provider.post_race_results().unwrap();
    let analysis = analyze_race_performance(&setup, &strategy, &result).unwrap();
    assert_eq!(analysis.data_completeness, 100);

    let log = config.report_log.as_ref().unwrap();
    append_report(log, &ReportRecord::Setup(setup.clone())).unwrap();
    append_report(log, &ReportRecord::PostRace(Box::new(analysis))).unwrap();

    let reports = load_reports(log).unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0], ReportRecord::Setup(setup));
    assert_eq!(reports[1].kind(), "post_race");
}

#[test]
fn test_partial_snapshot_export() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("partial.json");
    // a real export might only carry some records, with out of range values
    fs::write(
        &path,
        r#"{"track_data": {"name": "Spa", "country": "Belgium", "length": 7.004, "laps": 44,
            "power_importance": 120, "handling_importance": 70, "acceleration_importance": 60,
            "overtaking_difficulty": 35, "fuel_consumption": 75, "tyre_wear": 55,
            "grip_level": 70, "downforce_importance": 50}}"#,
    )
    .unwrap();

    let config = AppConfig {
        provider: ProviderKind::File,
        snapshot_path: Some(path),
        ..Default::default()
    };
    let provider = ProviderKind::build(&config).unwrap();
    let snapshot = provider.sync_pre_race().unwrap();

    let track = provider.track_data().unwrap().unwrap();
    assert_eq!(track.length_km, 7.004);
    // clamped on read
    assert_eq!(snapshot.track().unwrap().power_importance, 100.0);
    assert!(matches!(
        calculate_optimal_setup(&snapshot),
        Err(GproError::InsufficientData { .. })
    ));
    assert!(matches!(
        provider.post_race_results(),
        Err(GproError::MissingRaceResult { .. })
    ));
}

#[test]
fn test_config_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("config.json");

    let config = AppConfig {
        remaining_races: 4,
        budget: 2_500_000.0,
        rng_seed: Some(99),
        ..write_exports(&temp_dir)
    };
    config.save_to(&path).unwrap();

    let loaded = AppConfig::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_config_defaults_fill_missing_keys() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, r#"{"rng_seed": 7}"#).unwrap();

    let loaded = AppConfig::load_from(&path).unwrap();
    assert_eq!(loaded.rng_seed, Some(7));
    assert_eq!(loaded.provider, ProviderKind::Mock);
    assert_eq!(loaded.remaining_races, 10);
}
