// End-to-end scenarios run through the public formula API

use gpro_setup::GproError;
use gpro_setup::formulas::{
    TyreCompound,
    overtaking::{Recommendation, analyze_overtaking},
    parts_wear::{HealthStatus, analyze_parts_wear, health_status},
    qualifying::simulate_qualifying,
    setup::calculate_optimal_setup,
    strategy::{FuelEfficiency, calculate_advanced_fuel, optimal_race_compound},
};
use gpro_setup::snapshot::mock::{mock_snapshot, mock_track, mock_weather};
use gpro_setup::snapshot::{PartKind, Snapshot, SnapshotField};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn test_monza_fuel_load() {
    let track = mock_track();
    assert_eq!(track.name, "Monza");
    let weather = mock_weather();

    let fuel = calculate_advanced_fuel(&track, &weather.race, track.laps, 85.0, 80.0);
    assert_ne!(fuel.efficiency, FuelEfficiency::Poor);
    assert!(fuel.total > 0.0);
    assert!((fuel.safety - fuel.total * 1.05).abs() <= 0.1);
}

#[test]
fn test_aggressive_driver_risks_more_in_qualifying() {
    let mut snapshot = mock_snapshot();
    if let Some(driver) = snapshot.driver.as_mut() {
        driver.aggressiveness = 90.0;
    }
    let setup = calculate_optimal_setup(&snapshot).unwrap();
    assert_eq!(setup.qualifying.risk.index(), 4);
}

#[test]
fn test_worn_part_is_critical() {
    assert_eq!(health_status(90.0, 95.0), HealthStatus::Critical);

    let mut snapshot = mock_snapshot();
    if let Some(car) = snapshot.car.as_mut() {
        car.part_mut(PartKind::Engine).wear = 90.0;
    }
    let analysis = analyze_parts_wear(&snapshot, 5).unwrap();
    let engine = analysis
        .current_status
        .iter()
        .find(|status| status.part == PartKind::Engine)
        .unwrap();
    assert_eq!(engine.health_status, HealthStatus::Critical);
    // most worn part comes first
    assert_eq!(analysis.current_status[0].part, PartKind::Engine);
}

#[test]
fn test_late_race_long_shots_are_aborted() {
    let snapshot = mock_snapshot();
    for seed in 0..50 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let analysis = analyze_overtaking(&snapshot, 15, 49, 53, &mut rng).unwrap();
        for opportunity in &analysis.opportunities {
            if opportunity.success_probability < 70 {
                assert_eq!(opportunity.recommendation, Recommendation::Abort);
            }
        }
    }
}

#[test]
fn test_rain_forces_hard_race_tyres() {
    let track = mock_track();
    let mut weather = mock_weather().race;
    weather.rain_probability = 60.0;

    let compound = optimal_race_compound(&track, &weather);
    assert!(compound.index() >= 4);
    assert!(matches!(compound, TyreCompound::Hard | TyreCompound::ExtraHard));
}

#[test]
fn test_seeded_runs_repeat() {
    let snapshot = mock_snapshot();

    let first = simulate_qualifying(&snapshot, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
    let second = simulate_qualifying(&snapshot, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
    assert_eq!(first, second);

    let first = analyze_overtaking(&snapshot, 10, 25, 53, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
    let second =
        analyze_overtaking(&snapshot, 10, 25, 53, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_missing_records_are_reported() {
    let snapshot = Snapshot {
        weather: None,
        ..mock_snapshot()
    };
    assert!(matches!(
        calculate_optimal_setup(&snapshot),
        Err(GproError::InsufficientData {
            field: SnapshotField::Weather
        })
    ));
    // wear planning only needs the car and the track
    assert!(analyze_parts_wear(&snapshot, 3).is_ok());

    let empty = Snapshot::default();
    assert!(matches!(
        analyze_parts_wear(&empty, 3),
        Err(GproError::InsufficientData {
            field: SnapshotField::Car
        })
    ));
}
