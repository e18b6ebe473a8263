use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use super::{TyreCompound, format_race_time};
use crate::errors::GproError;
use crate::snapshot::{
    CarData, Conditions, DriverData, Snapshot, TrackData, TrackDifficulty, WeatherCondition,
    WeatherData, clamp_rating,
};

pub const DEFAULT_DRIVER_SKILL: f64 = 85.0;
pub const DEFAULT_CAR_EFFICIENCY: f64 = 80.0;
pub const DEFAULT_TYRE_LIFE: u32 = 30;
pub const DEFAULT_TRAFFIC_DENSITY: f64 = 70.0;

/// Litres per lap for an average car on an average circuit
const BASE_FUEL_PER_LAP: f64 = 2.8;
const SAFETY_MARGIN: f64 = 1.05;
const BASE_PIT_TIME: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelEfficiency {
    Optimal,
    Good,
    Poor,
}

impl std::fmt::Display for FuelEfficiency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FuelEfficiency::Optimal => write!(f, "Optimal"),
            FuelEfficiency::Good => write!(f, "Good"),
            FuelEfficiency::Poor => write!(f, "Poor"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelCalculation {
    /// Litres burned per lap
    pub per_lap: f64,
    /// Litres for the whole distance
    pub total: f64,
    /// Total plus a 5% margin
    pub safety: f64,
    pub efficiency: FuelEfficiency,
    pub recommendation: String,
}

/// Estimate fuel consumption for a stint of `laps` laps.
///
/// Consumption starts from a 2.8 L/lap baseline and is scaled by the
/// circuit's fuel rating, the session weather, the driver's skill and the
/// car's efficiency. Better drivers and more efficient cars burn less.
pub fn calculate_advanced_fuel(
    track: &TrackData,
    weather: &WeatherCondition,
    laps: u32,
    driver_skill: f64,
    car_efficiency: f64,
) -> FuelCalculation {
    let track_multiplier = 1.0 + (track.fuel_consumption - 50.0) / 500.0;
    let weather_multiplier = match weather.conditions {
        Conditions::HeavyRain => 1.15,
        Conditions::LightRain => 1.08,
        _ => 1.0,
    };
    let driver_skill = clamp_rating("fuel", "driver_skill", driver_skill);
    let car_efficiency = clamp_rating("fuel", "car_efficiency", car_efficiency);
    let driver_multiplier = 1.0 - (driver_skill - 70.0) * 0.002;
    let car_multiplier = 1.0 - (car_efficiency - 70.0) * 0.001;

    let per_lap = BASE_FUEL_PER_LAP
        * track_multiplier
        * weather_multiplier
        * driver_multiplier
        * car_multiplier;
    let total = per_lap * laps as f64;
    let safety = total * SAFETY_MARGIN;

    let efficiency = if per_lap < 2.5 {
        FuelEfficiency::Optimal
    } else if per_lap < 3.0 {
        FuelEfficiency::Good
    } else {
        FuelEfficiency::Poor
    };
    let recommendation = match efficiency {
        FuelEfficiency::Optimal => "Setup is already fuel efficient",
        FuelEfficiency::Good => "Consider a less aggressive driving style to save fuel",
        FuelEfficiency::Poor => "Review engine setup and driving style to improve efficiency",
    }
    .to_string();

    FuelCalculation {
        per_lap,
        total,
        safety,
        efficiency,
        recommendation,
    }
}

/// Tyre families the recommender chooses from. Unlike [`TyreCompound`] this
/// includes the rain tyres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedTyre {
    Soft,
    Medium,
    Hard,
    Intermediate,
    Wet,
}

impl std::fmt::Display for RecommendedTyre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecommendedTyre::Soft => write!(f, "Soft"),
            RecommendedTyre::Medium => write!(f, "Medium"),
            RecommendedTyre::Hard => write!(f, "Hard"),
            RecommendedTyre::Intermediate => write!(f, "Intermediate"),
            RecommendedTyre::Wet => write!(f, "Wet"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TyreRecommendation {
    pub primary: RecommendedTyre,
    pub secondary: RecommendedTyre,
    pub reason: String,
    /// Percentage in [70, 98], or 95 in the rain
    pub confidence: u32,
    /// Expected degradation percentage in [15, 45]
    pub expected_degradation: u32,
}

pub fn tyre_recommendation(
    track: &TrackData,
    weather: &WeatherCondition,
    driver_skill: f64,
    car_handling: f64,
) -> TyreRecommendation {
    if weather.conditions.is_rain() {
        let heavy = weather.conditions == Conditions::HeavyRain;
        return TyreRecommendation {
            primary: if heavy {
                RecommendedTyre::Wet
            } else {
                RecommendedTyre::Intermediate
            },
            secondary: RecommendedTyre::Intermediate,
            reason: "Rain calls for dedicated wet weather tyres".to_string(),
            confidence: 95,
            expected_degradation: if heavy { 15 } else { 20 },
        };
    }

    let very_hard = track.difficulty() == TrackDifficulty::VeryHard;
    let temperature = weather.temperature;
    let (primary, secondary, reason, confidence, degradation) = if temperature > 35.0 {
        (
            RecommendedTyre::Hard,
            RecommendedTyre::Medium,
            "Very high temperatures call for hard tyres",
            90,
            25,
        )
    } else if temperature > 28.0 {
        (
            if very_hard {
                RecommendedTyre::Hard
            } else {
                RecommendedTyre::Medium
            },
            RecommendedTyre::Hard,
            "High temperatures and track wear",
            85,
            30,
        )
    } else if temperature < 15.0 {
        (
            RecommendedTyre::Soft,
            RecommendedTyre::Medium,
            "Low temperatures need soft tyres for grip",
            88,
            35,
        )
    } else if very_hard {
        (
            RecommendedTyre::Medium,
            RecommendedTyre::Hard,
            "Demanding track needs a grip and durability compromise",
            82,
            28,
        )
    } else {
        (
            RecommendedTyre::Medium,
            RecommendedTyre::Soft,
            "Ideal conditions for medium tyres",
            90,
            22,
        )
    };

    let skill = (clamp_rating("tyres", "driver_skill", driver_skill)
        + clamp_rating("tyres", "car_handling", car_handling))
        / 2.0;
    let confidence = confidence + ((skill - 75.0) / 5.0).floor() as i32;
    let degradation = degradation - ((skill - 75.0) / 10.0).floor() as i32;

    TyreRecommendation {
        primary,
        secondary,
        reason: reason.to_string(),
        confidence: confidence.clamp(70, 98) as u32,
        expected_degradation: degradation.clamp(15, 45) as u32,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitWindowAnalysis {
    pub optimal: u32,
    pub alternatives: Vec<u32>,
    pub traffic_factor: f64,
    pub weather_risk: f64,
}

/// Pick a pit lap close to the tyre life, kept inside the low traffic middle
/// of the race (30% to 70% of the distance).
pub fn calculate_pit_window(
    total_laps: u32,
    tyre_life: u32,
    traffic_density: f64,
) -> PitWindowAnalysis {
    let laps = total_laps as i64;
    let low_traffic_start = (laps as f64 * 0.3).floor() as i64;
    let low_traffic_end = (laps as f64 * 0.7).floor() as i64;
    let optimal = (tyre_life as i64).max(low_traffic_start).min(low_traffic_end);

    let alternatives = [
        (optimal - 8).max(1),
        optimal - 4,
        optimal + 4,
        (optimal + 8).min(laps - 5),
    ]
    .into_iter()
    .filter(|&lap| lap > 0 && lap < laps - 3)
    .map(|lap| lap as u32)
    .collect();

    PitWindowAnalysis {
        optimal: optimal.max(0) as u32,
        alternatives,
        traffic_factor: traffic_density / 100.0,
        weather_risk: 0.2,
    }
}

pub fn optimal_qualifying_compound(weather: &WeatherCondition) -> TyreCompound {
    if weather.rain_probability > 50.0 {
        TyreCompound::Hard
    } else if weather.temperature > 35.0 {
        TyreCompound::Medium
    } else if weather.temperature > 25.0 {
        TyreCompound::Soft
    } else {
        TyreCompound::ExtraSoft
    }
}

/// Race compound from track wear and temperature. A likely wet race never
/// goes below Hard.
pub fn optimal_race_compound(track: &TrackData, weather: &WeatherCondition) -> TyreCompound {
    let mut compound = TyreCompound::Medium.index();
    if track.tyre_wear > 75.0 {
        compound += 1;
    }
    if track.tyre_wear < 40.0 {
        compound -= 1;
    }
    if weather.temperature > 30.0 {
        compound += 1;
    }
    if weather.temperature < 15.0 {
        compound -= 1;
    }

    let compound = TyreCompound::from_index(compound);
    if weather.rain_probability > 50.0 {
        compound.max(TyreCompound::Hard)
    } else {
        compound
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelStrategy {
    /// Litres for the qualifying laps
    pub qualifying_fuel: u32,
    /// Litres for the race distance including the buffer
    pub race_fuel: u32,
    pub total_fuel: u32,
    pub safety_buffer: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitStop {
    pub lap: u32,
    pub reason: String,
    /// Compound to fit, None when the stop depends on the weather
    pub compound_change: Option<TyreCompound>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitStrategy {
    pub recommended_stops: u32,
    /// Planned stops ordered by lap
    pub pit_windows: Vec<PitStop>,
    /// Seconds lost in the pit lane
    pub total_pit_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TyreStrategy {
    pub qualifying_compound: TyreCompound,
    pub race_compound: TyreCompound,
    /// Tyre wear percentage at the end of a stint
    pub expected_wear: f64,
    /// Seconds lost per lap to wear
    pub tyre_degradation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyResult {
    pub fuel_strategy: FuelStrategy,
    pub pit_strategy: PitStrategy,
    pub tyre_strategy: TyreStrategy,
    /// Percentage in [30, 95]
    pub confidence: u32,
    pub notes: Vec<String>,
    /// `H:MM:SS`
    pub estimated_race_time: String,
}

/// Full race plan: fuel loads, pit stops, tyres and an overall race time.
pub fn calculate_race_strategy(snapshot: &Snapshot) -> Result<StrategyResult, GproError> {
    let driver = snapshot.driver()?;
    let car = snapshot.car()?;
    let track = snapshot.track()?;
    let weather = snapshot.weather()?;

    let fuel_strategy = fuel_strategy(&driver, &track, &weather.race);
    let pit_strategy = pit_strategy(&driver, &track, &weather.race);
    let tyre_strategy = tyre_strategy(&driver, &track, &weather);
    let confidence = strategy_confidence(&driver, &track, &weather);
    let notes = strategy_notes(&driver, &track, &weather, pit_strategy.recommended_stops);
    let estimated_race_time =
        estimate_race_time(&driver, &car, &track, pit_strategy.recommended_stops);

    debug!(
        "Strategy for {}: {} stop(s), {}L race fuel, confidence {}",
        track.name, pit_strategy.recommended_stops, fuel_strategy.race_fuel, confidence
    );

    Ok(StrategyResult {
        fuel_strategy,
        pit_strategy,
        tyre_strategy,
        confidence,
        notes,
        estimated_race_time,
    })
}

fn fuel_strategy(driver: &DriverData, track: &TrackData, weather: &WeatherCondition) -> FuelStrategy {
    let base_per_lap = track.fuel_consumption / 100.0 * 2.5;
    let driver_efficiency = 1.0 - (driver.technical_insight - 50.0) / 300.0;
    let weather_factor = if weather.rain_probability > 50.0 {
        1.15
    } else {
        1.0
    };
    let track_factor = (track.length_km / 4.5).clamp(0.8, 1.2);
    let per_lap = base_per_lap * driver_efficiency * weather_factor * track_factor;

    // 5 flying laps plus the out and in laps
    let qualifying_fuel = (per_lap * 7.0).ceil() as u32;
    let race_fuel_base = (per_lap * track.laps as f64).ceil() as u32;
    let safety_buffer = (race_fuel_base as f64 * 0.08).ceil() as u32;
    let race_fuel = race_fuel_base + safety_buffer;

    FuelStrategy {
        qualifying_fuel,
        race_fuel,
        total_fuel: qualifying_fuel.max(race_fuel),
        safety_buffer,
    }
}

fn pit_strategy(driver: &DriverData, track: &TrackData, weather: &WeatherCondition) -> PitStrategy {
    let pit_time = BASE_PIT_TIME + if track.length_km > 5.0 { 2.0 } else { 0.0 };

    let driver_wear_factor = 1.0 - (driver.concentration - 50.0) / 200.0;
    let weather_wear_factor = if weather.temperature > 30.0 {
        1.2
    } else if weather.temperature < 15.0 {
        0.8
    } else {
        1.0
    };
    let wear_per_lap = track.tyre_wear / 100.0 * driver_wear_factor * weather_wear_factor;
    // laps until the tyres reach 80% wear
    let max_stint = if wear_per_lap > 0.0 {
        (80.0 / (wear_per_lap * 100.0)).floor() as u32
    } else {
        u32::MAX
    };

    let race_compound = optimal_race_compound(track, weather);
    let laps = track.laps;
    let at = |fraction: f64| (laps as f64 * fraction).round() as u32;

    let mut pit_windows = Vec::new();
    let mut recommended_stops = if laps <= max_stint {
        0
    } else if laps as f64 <= max_stint as f64 * 1.8 {
        pit_windows.push(PitStop {
            lap: at(0.6),
            reason: "Tyre change for degradation".to_string(),
            compound_change: Some(race_compound),
        });
        1
    } else {
        pit_windows.push(PitStop {
            lap: at(0.4),
            reason: "First stop for the tyre strategy".to_string(),
            compound_change: Some(race_compound),
        });
        pit_windows.push(PitStop {
            lap: at(0.7),
            reason: "Second stop, fresh tyres for the final stint".to_string(),
            compound_change: Some(race_compound.softer(1)),
        });
        2
    };

    if weather.rain_probability > 40.0 {
        pit_windows.push(PitStop {
            lap: at(0.3),
            reason: "Possible change for rain".to_string(),
            compound_change: None,
        });
        recommended_stops += 1;
    }

    PitStrategy {
        recommended_stops,
        pit_windows: pit_windows
            .into_iter()
            .sorted_by_key(|stop| stop.lap)
            .collect(),
        total_pit_time: recommended_stops as f64 * pit_time,
    }
}

fn tyre_strategy(driver: &DriverData, track: &TrackData, weather: &WeatherData) -> TyreStrategy {
    let driver_factor = (driver.concentration + driver.technical_insight) / 200.0;
    TyreStrategy {
        qualifying_compound: optimal_qualifying_compound(&weather.qualifying),
        race_compound: optimal_race_compound(track, &weather.race),
        expected_wear: (track.tyre_wear - driver_factor * 20.0).max(10.0),
        tyre_degradation: track.tyre_wear / 100.0 * 0.05,
    }
}

fn strategy_confidence(driver: &DriverData, track: &TrackData, weather: &WeatherData) -> u32 {
    let mut confidence = 75.0;
    confidence += (driver.experience - 50.0) * 0.2;
    confidence += (driver.technical_insight - 50.0) * 0.15;
    if weather.race.rain_probability > 30.0 {
        confidence -= weather.race.rain_probability * 0.3;
    }
    if track.overtaking_difficulty > 70.0 {
        confidence -= 10.0;
    }
    confidence *= weather.forecast_accuracy / 100.0;
    confidence.round().clamp(30.0, 95.0) as u32
}

fn strategy_notes(
    driver: &DriverData,
    track: &TrackData,
    weather: &WeatherData,
    recommended_stops: u32,
) -> Vec<String> {
    let mut notes = Vec::new();
    let mut note = |text: &str| notes.push(text.to_string());

    match recommended_stops {
        0 => note("No-stop strategy: run the whole race on one set of tyres"),
        1 => note("One-stop strategy: the safe choice for most races"),
        _ => note("Multi-stop strategy: riskier but it can pay off"),
    }

    if weather.race.rain_probability > 50.0 {
        note("High chance of rain: keep intermediates ready");
    } else if weather.race.rain_probability > 20.0 {
        note("Rain is possible: watch the weather during the race");
    }

    if weather.race.temperature > 32.0 {
        note("Very high temperature: risk of overheating the tyres");
    } else if weather.race.temperature < 12.0 {
        note("Low temperature: softer tyres for grip");
    }

    if track.tyre_wear > 75.0 {
        note("High tyre wear: prioritise tyre management");
    }
    if track.fuel_consumption > 80.0 {
        note("High fuel consumption: manage the engine carefully");
    }
    if track.overtaking_difficulty < 30.0 {
        note("Easy overtaking: an aggressive strategy is affordable");
    } else if track.overtaking_difficulty > 70.0 {
        note("Hard to overtake: track position is crucial, avoid risks");
    }

    if driver.aggressiveness > 75.0 {
        note("Aggressive style: watch tyre consumption");
    }
    if driver.concentration < 60.0 {
        note("Low concentration: avoid complex strategies");
    }

    notes
}

fn estimate_race_time(
    driver: &DriverData,
    car: &CarData,
    track: &TrackData,
    pit_stops: u32,
) -> String {
    let base_lap = 60.0 + track.length_km * 13.0;
    let driver_factor = 1.0 - (driver.overall - 50.0) / 300.0;
    let car_factor = 1.0 - (car.average_performance() - 50.0) / 400.0;
    let racing_time = base_lap * driver_factor * car_factor * track.laps as f64;
    format_race_time(racing_time + pit_stops as f64 * BASE_PIT_TIME)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioRisk {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for ScenarioRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioRisk::Low => write!(f, "Low"),
            ScenarioRisk::Medium => write!(f, "Medium"),
            ScenarioRisk::High => write!(f, "High"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyScenario {
    pub name: String,
    /// Tyre sequence, e.g. `Medium → Hard`
    pub strategy: String,
    /// `H:MM:SS.d`
    pub estimated_time: String,
    pub position: u32,
    pub risk: ScenarioRisk,
    pub probability: u32,
    /// Fuel saved versus the baseline, percent
    pub fuel_savings: i32,
    /// Tyre life left at the flag, percent
    pub tyre_life: u32,
}

/// The four canned race plans offered next to the computed strategy.
pub fn strategy_scenarios(
    track: &TrackData,
    tyre_rec: &TyreRecommendation,
    total_laps: u32,
) -> Vec<StrategyScenario> {
    let base_time = (70.0 + track.length_km * 15.0) * total_laps as f64;
    let primary = tyre_rec.primary;
    let secondary = tyre_rec.secondary;

    let scenario = |name: &str,
                    strategy: String,
                    offset: f64,
                    position: u32,
                    risk: ScenarioRisk,
                    probability: u32,
                    fuel_savings: i32,
                    tyre_life: u32| StrategyScenario {
        name: name.to_string(),
        strategy,
        estimated_time: format_scenario_time(base_time + offset),
        position,
        risk,
        probability,
        fuel_savings,
        tyre_life,
    };

    vec![
        scenario(
            "Conservative one-stop",
            format!("{primary} → {secondary}"),
            15.0,
            8,
            ScenarioRisk::Low,
            85,
            5,
            95,
        ),
        scenario(
            "Aggressive two-stop",
            format!("Soft → {primary} → {secondary}"),
            -8.0,
            5,
            ScenarioRisk::High,
            65,
            -10,
            75,
        ),
        scenario(
            "Balanced",
            format!("{primary} → Hard"),
            2.0,
            6,
            ScenarioRisk::Medium,
            78,
            0,
            85,
        ),
        scenario(
            "Weather hedge",
            format!("{primary} → Intermediate (if rain)"),
            20.0,
            4,
            ScenarioRisk::Medium,
            45,
            -5,
            70,
        ),
    ]
}

/// `H:MM:SS.d`, tenths truncated
fn format_scenario_time(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let tenths = ((seconds % 1.0) * 10.0).floor() as u32;
    format!("{}.{}", format_race_time(seconds), tenths.min(9))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::mock::{mock_driver, mock_snapshot, mock_track, mock_weather};
    use proptest::prelude::*;

    fn sunny(temperature: f64) -> WeatherCondition {
        WeatherCondition {
            temperature,
            ..mock_weather().race
        }
    }

    #[test]
    fn test_monza_fuel_is_not_poor() {
        let fuel = calculate_advanced_fuel(
            &mock_track(),
            &mock_weather().race,
            53,
            DEFAULT_DRIVER_SKILL,
            DEFAULT_CAR_EFFICIENCY,
        );
        assert_eq!(fuel.efficiency, FuelEfficiency::Good);
        assert!(fuel.total > 0.0);
        assert!((fuel.safety - fuel.total * 1.05).abs() < 0.1);
    }

    #[test]
    fn test_out_of_range_ratings_keep_fuel_positive() {
        let track = mock_track();
        let race = mock_weather().race;
        let clamped = calculate_advanced_fuel(&track, &race, 53, 100.0, 80.0);
        for (skill, efficiency) in [(600.0, 80.0), (85.0, 2000.0), (-50.0, -50.0)] {
            let fuel = calculate_advanced_fuel(&track, &race, 53, skill, efficiency);
            assert!(fuel.per_lap > 0.0);
            assert!(fuel.total > 0.0);
        }
        assert_eq!(calculate_advanced_fuel(&track, &race, 53, 600.0, 80.0), clamped);
    }

    #[test]
    fn test_rain_increases_fuel() {
        let dry = calculate_advanced_fuel(&mock_track(), &sunny(20.0), 10, 85.0, 80.0);
        let wet = WeatherCondition {
            conditions: Conditions::HeavyRain,
            ..sunny(20.0)
        };
        let wet = calculate_advanced_fuel(&mock_track(), &wet, 10, 85.0, 80.0);
        assert!((wet.per_lap / dry.per_lap - 1.15).abs() < 1e-9);
    }

    #[test]
    fn test_rain_forces_wet_tyres() {
        let weather = WeatherCondition {
            conditions: Conditions::HeavyRain,
            ..sunny(20.0)
        };
        let rec = tyre_recommendation(&mock_track(), &weather, 85.0, 80.0);
        assert_eq!(rec.primary, RecommendedTyre::Wet);
        assert_eq!(rec.secondary, RecommendedTyre::Intermediate);
        assert_eq!(rec.confidence, 95);
        assert_eq!(rec.expected_degradation, 15);

        let weather = WeatherCondition {
            conditions: Conditions::LightRain,
            ..weather
        };
        let rec = tyre_recommendation(&mock_track(), &weather, 85.0, 80.0);
        assert_eq!(rec.primary, RecommendedTyre::Intermediate);
        assert_eq!(rec.expected_degradation, 20);
    }

    #[test]
    fn test_tyre_temperature_bands() {
        let track = mock_track();
        let rec = tyre_recommendation(&track, &sunny(38.0), 75.0, 75.0);
        assert_eq!(rec.primary, RecommendedTyre::Hard);
        assert_eq!((rec.confidence, rec.expected_degradation), (90, 25));

        let rec = tyre_recommendation(&track, &sunny(10.0), 75.0, 75.0);
        assert_eq!(rec.primary, RecommendedTyre::Soft);

        let mut very_hard = track.clone();
        very_hard.overtaking_difficulty = 90.0;
        let rec = tyre_recommendation(&very_hard, &sunny(30.0), 75.0, 75.0);
        assert_eq!(rec.primary, RecommendedTyre::Hard);
        let rec = tyre_recommendation(&very_hard, &sunny(20.0), 75.0, 75.0);
        assert_eq!((rec.primary, rec.secondary), (RecommendedTyre::Medium, RecommendedTyre::Hard));
    }

    #[test]
    fn test_skill_adjusts_confidence_and_degradation() {
        // optimal band: 90 / 22, skill 95 adds 4 confidence and removes 2 degradation
        let rec = tyre_recommendation(&mock_track(), &sunny(20.0), 95.0, 95.0);
        assert_eq!(rec.confidence, 94);
        assert_eq!(rec.expected_degradation, 20);
    }

    #[test]
    fn test_pit_window() {
        let window = calculate_pit_window(53, 30, 70.0);
        assert_eq!(window.optimal, 30);
        assert_eq!(window.alternatives, vec![22, 26, 34, 38]);
        assert!((window.traffic_factor - 0.7).abs() < 1e-9);

        // tyre life outside the middle of the race gets pulled inside it
        assert_eq!(calculate_pit_window(50, 5, 70.0).optimal, 15);
        assert_eq!(calculate_pit_window(50, 45, 70.0).optimal, 35);
    }

    #[test]
    fn test_compound_choices() {
        let mut weather = sunny(20.0);
        assert_eq!(optimal_qualifying_compound(&weather), TyreCompound::ExtraSoft);
        weather.temperature = 30.0;
        assert_eq!(optimal_qualifying_compound(&weather), TyreCompound::Soft);
        weather.rain_probability = 60.0;
        assert_eq!(optimal_qualifying_compound(&weather), TyreCompound::Hard);

        let mut track = mock_track();
        track.tyre_wear = 80.0;
        assert_eq!(optimal_race_compound(&track, &sunny(32.0)), TyreCompound::ExtraHard);
        track.tyre_wear = 30.0;
        assert_eq!(optimal_race_compound(&track, &sunny(10.0)), TyreCompound::ExtraSoft);
    }

    #[test]
    fn test_wet_race_compound_is_at_least_hard() {
        let weather = WeatherCondition {
            rain_probability: 60.0,
            ..sunny(10.0)
        };
        let mut track = mock_track();
        track.tyre_wear = 20.0;
        assert!(optimal_race_compound(&track, &weather).index() >= 4);
    }

    #[test]
    fn test_race_strategy_for_monza() {
        let strategy = calculate_race_strategy(&mock_snapshot()).unwrap();
        let fuel = &strategy.fuel_strategy;
        assert!(fuel.race_fuel > fuel.qualifying_fuel);
        assert_eq!(fuel.total_fuel, fuel.race_fuel);
        assert!(fuel.safety_buffer > 0);

        let pits = &strategy.pit_strategy;
        assert_eq!(pits.recommended_stops as usize, pits.pit_windows.len());
        assert!(pits.pit_windows.windows(2).all(|w| w[0].lap <= w[1].lap));
        // Monza is longer than 5 km
        assert!((pits.total_pit_time - pits.recommended_stops as f64 * 27.0).abs() < 1e-9);

        assert!((30..=95).contains(&strategy.confidence));
        assert!(strategy.notes.iter().any(|n| n.contains("fuel")));
        assert_eq!(strategy.estimated_race_time.split(':').count(), 3);
    }

    #[test]
    fn test_rainy_race_adds_weather_stop() {
        let mut snapshot = mock_snapshot();
        if let Some(weather) = snapshot.weather.as_mut() {
            weather.race.rain_probability = 70.0;
        }
        let strategy = calculate_race_strategy(&snapshot).unwrap();
        let weather_stops = strategy
            .pit_strategy
            .pit_windows
            .iter()
            .filter(|stop| stop.compound_change.is_none())
            .count();
        assert_eq!(weather_stops, 1);
        assert!(strategy.notes.iter().any(|n| n.contains("intermediates")));
    }

    #[test]
    fn test_race_strategy_requires_every_record() {
        let mut snapshot = mock_snapshot();
        snapshot.weather = None;
        assert!(matches!(
            calculate_race_strategy(&snapshot),
            Err(GproError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_strategy_scenarios() {
        let track = mock_track();
        let rec = tyre_recommendation(&track, &mock_weather().race, 85.0, 80.0);
        let scenarios = strategy_scenarios(&track, &rec, 53);
        assert_eq!(scenarios.len(), 4);
        assert_eq!(scenarios[0].strategy, "Medium → Soft");
        assert_eq!(scenarios[1].risk, ScenarioRisk::High);
        assert_eq!(scenarios[3].position, 4);
        // (70 + 5.793 * 15) * 53 + 15 = 8330.4 s
        assert_eq!(scenarios[0].estimated_time, "2:18:50.4");
    }

    #[test]
    fn test_low_concentration_note() {
        let mut driver = mock_driver();
        driver.concentration = 40.0;
        let notes = strategy_notes(&driver, &mock_track(), &mock_weather(), 1);
        assert!(notes.iter().any(|n| n.contains("concentration")));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_fuel_totals_scale_with_laps(
            fuel_consumption in 0.0f64..100.0,
            laps in 1u32..90,
            skill in -500.0f64..1000.0,
            efficiency in -500.0f64..1000.0,
        ) {
            let mut track = mock_track();
            track.fuel_consumption = fuel_consumption;
            let fuel = calculate_advanced_fuel(&track, &mock_weather().race, laps, skill, efficiency);
            prop_assert!(fuel.per_lap > 0.0);
            prop_assert!((fuel.total - fuel.per_lap * laps as f64).abs() < 1e-6);
            prop_assert!(fuel.safety >= fuel.total);
        }

        #[test]
        fn prop_pit_window_stays_in_race(
            total_laps in 10u32..100,
            tyre_life in 0u32..120,
        ) {
            let window = calculate_pit_window(total_laps, tyre_life, 70.0);
            let optimal = window.optimal as f64;
            prop_assert!(optimal >= (total_laps as f64 * 0.3).floor());
            prop_assert!(optimal <= (total_laps as f64 * 0.7).floor());
            for lap in window.alternatives {
                prop_assert!(lap > 0 && lap + 3 < total_laps);
            }
        }

        #[test]
        fn prop_race_compound_respects_rain(
            tyre_wear in 0.0f64..100.0,
            temperature in -5.0f64..45.0,
            rain in 0.0f64..100.0,
        ) {
            let mut track = mock_track();
            track.tyre_wear = tyre_wear;
            let weather = WeatherCondition {
                temperature,
                rain_probability: rain,
                ..mock_weather().race
            };
            let compound = optimal_race_compound(&track, &weather);
            if rain > 50.0 {
                prop_assert!(compound >= TyreCompound::Hard);
            }
        }

        #[test]
        fn prop_tyre_recommendation_ranges(
            temperature in -5.0f64..45.0,
            skill in 0.0f64..100.0,
            handling in 0.0f64..100.0,
        ) {
            let rec = tyre_recommendation(&mock_track(), &sunny(temperature), skill, handling);
            prop_assert!((70..=98).contains(&rec.confidence));
            prop_assert!((15..=45).contains(&rec.expected_degradation));
        }
    }
}
