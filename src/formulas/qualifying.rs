use itertools::Itertools;
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{LapTime, TyreCompound};
use crate::errors::GproError;
use crate::snapshot::{CarData, DriverData, Snapshot, TrackData, WeatherCondition};

const COMPETITOR_COUNT: u32 = 10;

const COMPETITOR_WEAKNESSES: [&str; 8] = [
    "Weak in sector 1 chicane",
    "Loses time in high-speed corners",
    "Poor traction out of slow corners",
    "Struggles with brake balance",
    "Inconsistent lap times",
    "Poor tyre management",
    "Weak qualifying pace",
    "Makes mistakes under pressure",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPlan {
    /// Litres
    pub fuel_load: u32,
    pub tyre_compound: TyreCompound,
    /// Percentage of the driver's limit
    pub push_level: u32,
    pub optimal_lap_window: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualifyingStrategy {
    pub q1: SessionPlan,
    pub q2: SessionPlan,
    /// Percent improvement from Q1 to Q2
    pub track_evolution: f64,
    pub traffic_risk: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorAnalysis {
    /// Rank among the sampled rivals, fastest first
    pub position: u32,
    pub expected_time: LapTime,
    pub threat_level: Severity,
    pub weakness: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualifyingResult {
    /// Grid slot in [1, 30]
    pub predicted_position: u32,
    pub q1_time: LapTime,
    pub q2_time: LapTime,
    /// Grid places lost to engine and gearbox changes
    pub grid_penalty: u32,
    /// Percentage in [40, 95]
    pub confidence: u32,
    pub risk_factors: Vec<String>,
    pub strategy: QualifyingStrategy,
    pub competitors: Vec<CompetitorAnalysis>,
}

/// Predict Q1 and Q2 lap times, the resulting grid slot and the rivals
/// around it.
///
/// Rival lap times are sampled from `rng`; everything else is derived from
/// the snapshot alone.
pub fn simulate_qualifying<R>(snapshot: &Snapshot, rng: &mut R) -> Result<QualifyingResult, GproError>
where
    R: Rng + ?Sized,
{
    let driver = snapshot.driver()?;
    let car = snapshot.car()?;
    let track = snapshot.track()?;
    let weather = snapshot.weather()?.qualifying;

    let q1_time = q1_time(&driver, &car, &track, &weather);
    let q2_time = q2_time(&driver, &weather, q1_time);
    let predicted_position = grid_position(q2_time, &track);

    debug!(
        "Qualifying at {}: Q1 {}, Q2 {}, P{}",
        track.name, q1_time, q2_time, predicted_position
    );

    Ok(QualifyingResult {
        predicted_position,
        q1_time,
        q2_time,
        grid_penalty: grid_penalty(&car),
        confidence: qualifying_confidence(&driver, &car, &weather),
        risk_factors: risk_factors(&driver, &car, &track, &weather),
        strategy: qualifying_strategy(&driver, &track, &weather),
        competitors: analyze_competitors(q2_time, rng),
    })
}

/// Reference lap for the circuit: about 18 s per km, slower on twisty tracks.
fn track_base_time(track: &TrackData) -> f64 {
    let speed_factor = (200.0 - track.power_importance) / 100.0;
    60.0 + track.length_km * 18.0 * (1.0 + speed_factor * 0.1)
}

fn weather_impact(weather: &WeatherCondition) -> f64 {
    let mut impact = 1.0 + (weather.temperature - 22.0).abs() * 0.001 + weather.wind_speed * 0.0001;
    if weather.rain_probability > 30.0 {
        impact += 0.005;
    }
    impact
}

fn q1_time(
    driver: &DriverData,
    car: &CarData,
    track: &TrackData,
    weather: &WeatherCondition,
) -> LapTime {
    let driver_factor = 1.0 - (driver.concentration * 1.5 + driver.overall) / 400.0;
    let car_factor = 1.0 - (car.average_performance() - 50.0) / 500.0;
    // green track, less rubber down in Q1
    let green_track = 1.005;
    LapTime::from_seconds(
        track_base_time(track) * driver_factor * car_factor * weather_impact(weather) * green_track,
    )
}

fn q2_time(driver: &DriverData, weather: &WeatherCondition, q1: LapTime) -> LapTime {
    let track_evolution = 0.994;
    let driver_improvement = 1.0 - driver.technical_insight / 1000.0;
    let pressure = if driver.concentration > 80.0 {
        0.998
    } else {
        1.002
    };
    let temperature = 1.0 + (weather.temperature - 25.0).abs() * 0.0001;
    LapTime::from_seconds(q1.seconds() * track_evolution * driver_improvement * pressure * temperature)
}

/// Place a lap time against three synthetic bands: elite (P1-6),
/// midfield (P7-20) and backmarkers (P21-30).
fn grid_position(lap: LapTime, track: &TrackData) -> u32 {
    let seconds = lap.seconds();
    let base = track_base_time(track);
    let elite = base * 0.97;
    let midfield = base * 0.995;
    let back = base * 1.02;

    let position = if seconds <= elite {
        let spread = (seconds - elite + 0.5) / 0.5;
        (1.0 + spread * 5.0).round().max(1.0)
    } else if seconds <= midfield {
        let spread = (seconds - elite) / (midfield - elite);
        (7.0 + spread * 13.0).round()
    } else {
        let spread = ((seconds - midfield) / (back - midfield)).min(1.0);
        (21.0 + spread * 9.0).round()
    };
    position as u32
}

fn grid_penalty(car: &CarData) -> u32 {
    let mut penalty = 0;
    if car.engine.wear > 90.0 {
        penalty += 10;
    }
    if car.gearbox.wear > 85.0 {
        penalty += 5;
    }
    penalty
}

fn qualifying_confidence(driver: &DriverData, car: &CarData, weather: &WeatherCondition) -> u32 {
    let mut confidence = 70.0;
    confidence += (driver.concentration - 50.0) * 0.4;
    confidence += (driver.experience - 50.0) * 0.2;
    confidence -= car.average_wear() * 0.3;
    if weather.rain_probability > 20.0 {
        confidence -= weather.rain_probability * 0.2;
    }
    confidence.round().clamp(40.0, 95.0) as u32
}

fn risk_factors(
    driver: &DriverData,
    car: &CarData,
    track: &TrackData,
    weather: &WeatherCondition,
) -> Vec<String> {
    let mut risks = Vec::new();
    if driver.concentration < 70.0 {
        risks.push("Low concentration: risk of mistakes in Q2".to_string());
    }
    if driver.aggressiveness > 85.0 {
        risks.push("Very aggressive style: risk of track limit violations".to_string());
    }
    if car.engine.wear > 50.0 {
        risks.push("Worn engine: possible loss of power".to_string());
    }
    if weather.rain_probability > 15.0 {
        risks.push(format!(
            "{:.0}% chance of rain during qualifying",
            weather.rain_probability
        ));
    }
    if weather.wind_speed > 20.0 {
        risks.push("Strong wind: difficult in fast corners".to_string());
    }
    if track.overtaking_difficulty > 80.0 {
        risks.push("Narrow track: high risk of traffic in qualifying".to_string());
    }
    risks
}

fn qualifying_strategy(
    driver: &DriverData,
    track: &TrackData,
    weather: &WeatherCondition,
) -> QualifyingStrategy {
    let awareness = driver.concentration + driver.experience;
    let traffic_risk = if track.length_km < 4.0 && awareness < 140.0 {
        Severity::High
    } else if track.length_km < 5.0 && awareness < 160.0 {
        Severity::Medium
    } else {
        Severity::Low
    };

    QualifyingStrategy {
        // conservative run to make the cut
        q1: SessionPlan {
            fuel_load: 15,
            tyre_compound: if weather.temperature > 28.0 {
                TyreCompound::Soft
            } else {
                TyreCompound::ExtraSoft
            },
            push_level: 85,
            optimal_lap_window: "Laps 3-4 (track evolution)".to_string(),
        },
        q2: SessionPlan {
            fuel_load: 12,
            tyre_compound: TyreCompound::ExtraSoft,
            push_level: 100,
            optimal_lap_window: "Last 2 minutes (maximum track grip)".to_string(),
        },
        track_evolution: if track.grip_level > 70.0 { 1.2 } else { 0.8 },
        traffic_risk,
    }
}

/// Sample the ten rivals closest to `your_time`, fastest first.
fn analyze_competitors<R>(your_time: LapTime, rng: &mut R) -> Vec<CompetitorAnalysis>
where
    R: Rng + ?Sized,
{
    (0..COMPETITOR_COUNT)
        .map(|_| {
            let variance: f64 = rng.gen_range(-1.0..1.0);
            let threat_level = if variance < -0.5 {
                Severity::High
            } else if variance < 0.2 {
                Severity::Medium
            } else {
                Severity::Low
            };
            let weakness = COMPETITOR_WEAKNESSES[rng.gen_range(0..COMPETITOR_WEAKNESSES.len())];
            CompetitorAnalysis {
                position: 0,
                expected_time: LapTime::from_seconds(your_time.seconds() + variance),
                threat_level,
                weakness: weakness.to_string(),
            }
        })
        .sorted_by(|a, b| {
            a.expected_time
                .seconds()
                .total_cmp(&b.expected_time.seconds())
        })
        .enumerate()
        .map(|(index, competitor)| CompetitorAnalysis {
            position: index as u32 + 1,
            ..competitor
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::mock::{arb_snapshot, mock_snapshot};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_monza_qualifying() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let result = simulate_qualifying(&mock_snapshot(), &mut rng).unwrap();

        assert!(result.q2_time < result.q1_time);
        assert!((1..=30).contains(&result.predicted_position));
        assert_eq!(result.grid_penalty, 0);
        assert!((40..=95).contains(&result.confidence));
        assert_eq!(result.strategy.q2.tyre_compound, TyreCompound::ExtraSoft);
        assert_eq!(result.strategy.q1.tyre_compound, TyreCompound::ExtraSoft);
        assert_eq!(result.strategy.track_evolution, 1.2);
        assert_eq!(result.strategy.traffic_risk, Severity::Low);
    }

    #[test]
    fn test_competitors_sorted_and_numbered() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let result = simulate_qualifying(&mock_snapshot(), &mut rng).unwrap();
        let competitors = &result.competitors;

        assert_eq!(competitors.len(), 10);
        assert!(competitors.windows(2).all(|w| w[0].expected_time <= w[1].expected_time));
        let positions: Vec<u32> = competitors.iter().map(|c| c.position).collect();
        assert_eq!(positions, (1..=10).collect::<Vec<_>>());
        for competitor in competitors {
            let delta = competitor.expected_time.seconds() - result.q2_time.seconds();
            assert!((-1.001..1.001).contains(&delta));
            assert!(COMPETITOR_WEAKNESSES.contains(&competitor.weakness.as_str()));
        }
    }

    #[test]
    fn test_grid_penalties() {
        let mut car = mock_snapshot().car.unwrap();
        car.engine.wear = 95.0;
        assert_eq!(grid_penalty(&car), 10);
        car.gearbox.wear = 90.0;
        assert_eq!(grid_penalty(&car), 15);
    }

    #[test]
    fn test_grid_position_bands() {
        let track = mock_snapshot().track.unwrap();
        let base = track_base_time(&track);
        let elite = base * 0.97;
        let midfield = base * 0.995;
        assert_eq!(grid_position(LapTime::from_seconds(base * 0.5), &track), 1);
        assert_eq!(grid_position(LapTime::from_seconds(elite - 0.2), &track), 4);
        let inside_midfield = elite + (midfield - elite) * 10.0 / 13.0;
        assert_eq!(grid_position(LapTime::from_seconds(inside_midfield), &track), 17);
        assert_eq!(grid_position(LapTime::from_seconds(base * 1.5), &track), 30);
    }

    #[test]
    fn test_traffic_risk_on_short_tracks() {
        let snapshot = mock_snapshot();
        let mut driver = snapshot.driver.unwrap();
        let mut track = snapshot.track.unwrap();
        let weather = snapshot.weather.unwrap().qualifying;
        track.length_km = 3.3;
        driver.concentration = 60.0;
        driver.experience = 60.0;
        assert_eq!(
            qualifying_strategy(&driver, &track, &weather).traffic_risk,
            Severity::High
        );
        track.length_km = 4.5;
        assert_eq!(
            qualifying_strategy(&driver, &track, &weather).traffic_risk,
            Severity::Medium
        );
    }

    #[test]
    fn test_risk_factors() {
        let snapshot = mock_snapshot();
        let mut driver = snapshot.driver.unwrap();
        let car = snapshot.car.unwrap();
        let track = snapshot.track.unwrap();
        let mut weather = snapshot.weather.unwrap().qualifying;
        assert!(risk_factors(&driver, &car, &track, &weather).is_empty());

        driver.concentration = 50.0;
        weather.rain_probability = 40.0;
        weather.wind_speed = 30.0;
        let risks = risk_factors(&driver, &car, &track, &weather);
        assert_eq!(risks.len(), 3);
        assert!(risks.contains(&"40% chance of rain during qualifying".to_string()));
    }

    #[test]
    fn test_missing_driver_is_reported() {
        let mut snapshot = mock_snapshot();
        snapshot.driver = None;
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(
            simulate_qualifying(&snapshot, &mut rng),
            Err(GproError::InsufficientData { .. })
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_qualifying_is_deterministic_per_seed(snapshot in arb_snapshot(), seed in any::<u64>()) {
            let first = simulate_qualifying(&snapshot, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
            let second = simulate_qualifying(&snapshot, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_qualifying_outputs_in_range(snapshot in arb_snapshot(), seed in any::<u64>()) {
            let result = simulate_qualifying(&snapshot, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
            prop_assert!((1..=30).contains(&result.predicted_position));
            prop_assert!((40..=95).contains(&result.confidence));
            prop_assert!(result.grid_penalty <= 15);
            prop_assert_eq!(result.competitors.len(), 10);
        }
    }
}
