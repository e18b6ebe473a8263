use itertools::{EitherOrBoth, Itertools};
use log::debug;
use serde::{Deserialize, Serialize};

use super::LapTime;
use super::setup::SetupResult;
use super::strategy::StrategyResult;
use crate::errors::GproError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TyreWearReading {
    pub front_left: f64,
    pub front_right: f64,
    pub rear_left: f64,
    pub rear_right: f64,
}

impl TyreWearReading {
    pub fn max(&self) -> f64 {
        self.front_left
            .max(self.front_right)
            .max(self.rear_left)
            .max(self.rear_right)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceWeather {
    pub temperature: f64,
    pub rain_occurred: bool,
    pub conditions_changed: bool,
}

/// What actually happened in the race, as reported after the flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResult {
    pub position: u32,
    /// Best lap, `M:SS.mmm`
    pub lap_time: String,
    pub total_time: String,
    pub points_scored: u32,
    pub actual_pit_stops: u32,
    #[serde(default)]
    pub pit_stop_laps: Vec<u32>,
    pub fuel_used: f64,
    pub tyre_wear: TyreWearReading,
    pub incidents: u32,
    #[serde(default)]
    pub penalties: Vec<String>,
    pub actual_weather: RaceWeather,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accuracy {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Accuracy {
    /// Grade `difference` against the upper bounds of the excellent, good and fair bands.
    fn grade(difference: f64, bands: [f64; 3]) -> Self {
        if difference <= bands[0] {
            Accuracy::Excellent
        } else if difference <= bands[1] {
            Accuracy::Good
        } else if difference <= bands[2] {
            Accuracy::Fair
        } else {
            Accuracy::Poor
        }
    }

    fn strategy_points(self) -> f64 {
        match self {
            Accuracy::Excellent => 15.0,
            Accuracy::Good => 10.0,
            Accuracy::Fair => 5.0,
            Accuracy::Poor => -10.0,
        }
    }
}

impl std::fmt::Display for Accuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Accuracy::Excellent => write!(f, "excellent"),
            Accuracy::Good => write!(f, "good"),
            Accuracy::Fair => write!(f, "fair"),
            Accuracy::Poor => write!(f, "poor"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupAnalysis {
    pub predicted_lap_time: LapTime,
    pub actual_best_lap: LapTime,
    /// Seconds, negative when faster than predicted
    pub time_difference: f64,
    pub accuracy: Accuracy,
    /// Score in [0, 100]
    pub setup_effectiveness: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelEfficiencyAnalysis {
    pub predicted: f64,
    pub actual: f64,
    pub difference: f64,
    pub accuracy: Accuracy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitTimingAnalysis {
    pub predicted_laps: Vec<u32>,
    pub actual_laps: Vec<u32>,
    pub timing_accuracy: Accuracy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyAnalysis {
    pub predicted_stops: u32,
    pub actual_stops: u32,
    pub strategy_deviation: String,
    pub fuel_efficiency: FuelEfficiencyAnalysis,
    pub pit_timing: PitTimingAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallPerformance {
    /// Score in [0, 100]
    pub race_score: u32,
    pub improvements: Vec<String>,
    pub strengths: Vec<String>,
    pub lessons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRaceAnalysis {
    pub setup_analysis: SetupAnalysis,
    pub strategy_analysis: StrategyAnalysis,
    pub overall_performance: OverallPerformance,
    /// Percentage in [30, 100]
    pub analysis_reliability: u32,
    /// Share of the result fields that were reported, in percent
    pub data_completeness: u32,
}

/// Compare the weekend's predictions with what happened in the race.
///
/// Fails with [`GproError::InvalidLapTime`] when the reported best lap is
/// not in `M:SS.mmm` form.
pub fn analyze_race_performance(
    setup: &SetupResult,
    strategy: &StrategyResult,
    result: &RaceResult,
) -> Result<PostRaceAnalysis, GproError> {
    let setup_analysis = analyze_setup(setup, result)?;
    let strategy_analysis = analyze_strategy(strategy, result);
    let overall_performance = overall_performance(&setup_analysis, &strategy_analysis, result);

    debug!(
        "Post-race: setup {} ({:+.3}s), fuel {}, pit timing {}, score {}",
        setup_analysis.accuracy,
        setup_analysis.time_difference,
        strategy_analysis.fuel_efficiency.accuracy,
        strategy_analysis.pit_timing.timing_accuracy,
        overall_performance.race_score
    );

    Ok(PostRaceAnalysis {
        setup_analysis,
        strategy_analysis,
        overall_performance,
        analysis_reliability: analysis_reliability(result),
        data_completeness: data_completeness(result),
    })
}

/// Absolute difference as a percentage of the prediction.
fn percentage_difference(difference: f64, predicted: f64) -> f64 {
    if predicted == 0.0 {
        if difference == 0.0 { 0.0 } else { 100.0 }
    } else {
        (difference / predicted * 100.0).abs()
    }
}

fn analyze_setup(setup: &SetupResult, result: &RaceResult) -> Result<SetupAnalysis, GproError> {
    let predicted = setup.expected_lap_time;
    let actual: LapTime = result.lap_time.parse()?;

    let time_difference = actual.seconds() - predicted.seconds();
    let percentage = percentage_difference(time_difference, predicted.seconds());

    let effectiveness =
        (100.0 - (percentage * 5.0).min(50.0) - result.incidents as f64 * 10.0).max(0.0);

    Ok(SetupAnalysis {
        predicted_lap_time: predicted,
        actual_best_lap: actual,
        time_difference,
        accuracy: Accuracy::grade(percentage, [1.0, 2.5, 5.0]),
        setup_effectiveness: effectiveness.round() as u32,
    })
}

fn analyze_strategy(strategy: &StrategyResult, result: &RaceResult) -> StrategyAnalysis {
    let predicted_stops = strategy.pit_strategy.recommended_stops;
    let actual_stops = result.actual_pit_stops;

    let strategy_deviation = if actual_stops == predicted_stops {
        "Strategy executed as planned".to_string()
    } else if actual_stops > predicted_stops {
        format!(
            "Extra stops: {} more pit stops than planned",
            actual_stops - predicted_stops
        )
    } else {
        format!(
            "Fewer stops: {} pit stops less than planned",
            predicted_stops - actual_stops
        )
    };

    let predicted_fuel = strategy.fuel_strategy.race_fuel as f64;
    let fuel_difference = result.fuel_used - predicted_fuel;
    let fuel_accuracy = Accuracy::grade(
        percentage_difference(fuel_difference, predicted_fuel),
        [5.0, 10.0, 20.0],
    );

    let predicted_laps: Vec<u32> = strategy
        .pit_strategy
        .pit_windows
        .iter()
        .map(|stop| stop.lap)
        .collect();
    let actual_laps = result.pit_stop_laps.clone();
    let timing_accuracy = match (predicted_laps.is_empty(), actual_laps.is_empty()) {
        (true, true) => Accuracy::Excellent,
        // one side stopped, the other did not
        (true, false) | (false, true) => Accuracy::Poor,
        (false, false) => Accuracy::grade(
            average_lap_difference(&predicted_laps, &actual_laps),
            [2.0, 5.0, 10.0],
        ),
    };

    StrategyAnalysis {
        predicted_stops,
        actual_stops,
        strategy_deviation,
        fuel_efficiency: FuelEfficiencyAnalysis {
            predicted: predicted_fuel,
            actual: result.fuel_used,
            difference: fuel_difference,
            accuracy: fuel_accuracy,
        },
        pit_timing: PitTimingAnalysis {
            predicted_laps,
            actual_laps,
            timing_accuracy,
        },
    }
}

/// Mean lap gap between planned and actual stops, pairing them in order.
/// An unmatched stop counts against lap 0.
fn average_lap_difference(predicted: &[u32], actual: &[u32]) -> f64 {
    let pairs = predicted.len().max(actual.len());
    if pairs == 0 {
        return 0.0;
    }
    let total: u32 = predicted
        .iter()
        .zip_longest(actual)
        .map(|pair| match pair {
            EitherOrBoth::Both(p, a) => p.abs_diff(*a),
            EitherOrBoth::Left(lap) | EitherOrBoth::Right(lap) => *lap,
        })
        .sum();
    total as f64 / pairs as f64
}

fn strategy_score(analysis: &StrategyAnalysis) -> f64 {
    (70.0
        + analysis.fuel_efficiency.accuracy.strategy_points()
        + analysis.pit_timing.timing_accuracy.strategy_points())
    .clamp(0.0, 100.0)
}

fn overall_performance(
    setup: &SetupAnalysis,
    strategy: &StrategyAnalysis,
    result: &RaceResult,
) -> OverallPerformance {
    let execution = (100.0 - result.incidents as f64 * 20.0).max(0.0);
    let race_score = (50.0
        + setup.setup_effectiveness as f64 * 0.4
        + strategy_score(strategy) * 0.3
        + execution * 0.3)
        .clamp(0.0, 100.0);

    OverallPerformance {
        race_score: race_score.round() as u32,
        improvements: improvements(setup, strategy, result),
        strengths: strengths(setup, strategy, result),
        lessons: lessons(setup, strategy, result),
    }
}

fn improvements(setup: &SetupAnalysis, strategy: &StrategyAnalysis, result: &RaceResult) -> Vec<String> {
    let mut improvements = Vec::new();
    if setup.accuracy == Accuracy::Poor {
        improvements.push(
            "Review the setup calculation: large gap between predicted and actual lap times"
                .to_string(),
        );
    }
    if setup.time_difference > 2.0 {
        improvements.push("Setup was too optimistic: consider more conservative settings".to_string());
    }
    if strategy.fuel_efficiency.difference > 10.0 {
        improvements.push("Improve the fuel consumption forecast".to_string());
    }
    if strategy.pit_timing.timing_accuracy == Accuracy::Poor {
        improvements.push("Pit stop timing missed the planned windows".to_string());
    }
    if result.incidents > 0 {
        improvements.push("Reduce risk: incidents during the race".to_string());
    }
    if result.tyre_wear.front_left > 90.0 || result.tyre_wear.front_right > 90.0 {
        improvements.push("Manage the front tyres: wear was excessive".to_string());
    }
    improvements
}

fn strengths(setup: &SetupAnalysis, strategy: &StrategyAnalysis, result: &RaceResult) -> Vec<String> {
    let mut strengths = Vec::new();
    if setup.accuracy == Accuracy::Excellent {
        strengths.push("Setup prediction was spot on: lap times close to the forecast".to_string());
    }
    if strategy.fuel_efficiency.accuracy == Accuracy::Excellent {
        strengths.push("Fuel calculation matched consumption".to_string());
    }
    if strategy.pit_timing.timing_accuracy == Accuracy::Excellent {
        strengths.push("Pit stops executed as planned".to_string());
    }
    if result.incidents == 0 {
        strengths.push("Clean race with no incidents".to_string());
    }
    if setup.time_difference < -0.5 {
        strengths.push("Setup beat expectations: faster than predicted".to_string());
    }
    strengths
}

fn lessons(setup: &SetupAnalysis, strategy: &StrategyAnalysis, result: &RaceResult) -> Vec<String> {
    let mut lessons = Vec::new();
    if setup.time_difference.abs() > 1.0 {
        lessons.push("Setup calculation needs calibrating for this kind of track".to_string());
    }
    if strategy.actual_stops != strategy.predicted_stops {
        lessons.push(
            "Unexpected factors changed the strategy: plan for more scenarios".to_string(),
        );
    }
    if result.actual_weather.conditions_changed {
        lessons.push("Weather changed during the race: watch conditions live".to_string());
    }

    let max_wear = result.tyre_wear.max();
    if max_wear < 50.0 {
        lessons.push("Tyres were under-used: room for a more aggressive strategy".to_string());
    } else if max_wear > 85.0 {
        lessons.push("Tyres were at the limit: manage them more conservatively".to_string());
    }
    lessons
}

/// How far the analysis can be trusted, given the gaps in the result.
fn analysis_reliability(result: &RaceResult) -> u32 {
    let mut reliability: i32 = 100;
    if result.fuel_used == 0.0 {
        reliability -= 20;
    }
    if result.tyre_wear.front_left == 0.0 {
        reliability -= 15;
    }
    if result.pit_stop_laps.is_empty() && result.actual_pit_stops > 0 {
        reliability -= 25;
    }
    reliability.max(30) as u32
}

fn data_completeness(result: &RaceResult) -> u32 {
    // stop count, incidents and points are always reported
    let reported = [
        result.position > 0,
        !result.lap_time.is_empty(),
        !result.total_time.is_empty(),
        true,
        result.fuel_used != 0.0,
        result.tyre_wear.front_left != 0.0,
        true,
        result.actual_weather.temperature != 0.0,
        !result.pit_stop_laps.is_empty(),
        true,
    ];
    let count = reported.iter().filter(|field| **field).count();
    (count as f64 / reported.len() as f64 * 100.0).round() as u32
}
