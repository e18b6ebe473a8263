use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::points_for_position;
use crate::errors::GproError;
use crate::snapshot::{CarData, DriverData, Snapshot, TrackData};

/// Positions ahead considered as overtaking targets
const MAX_TARGETS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OvertakeRisk {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl std::fmt::Display for OvertakeRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OvertakeRisk::VeryLow => write!(f, "very low"),
            OvertakeRisk::Low => write!(f, "low"),
            OvertakeRisk::Medium => write!(f, "medium"),
            OvertakeRisk::High => write!(f, "high"),
            OvertakeRisk::VeryHigh => write!(f, "very high"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Go,
    Wait,
    Abort,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recommendation::Go => write!(f, "go"),
            Recommendation::Wait => write!(f, "wait"),
            Recommendation::Abort => write!(f, "abort"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechniqueKind {
    Slipstream,
    LateBraking,
    Undercut,
    DrsPass,
}

impl std::fmt::Display for TechniqueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TechniqueKind::Slipstream => write!(f, "slipstream"),
            TechniqueKind::LateBraking => write!(f, "late braking"),
            TechniqueKind::Undercut => write!(f, "undercut"),
            TechniqueKind::DrsPass => write!(f, "DRS pass"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OvertakingTechnique {
    pub kind: TechniqueKind,
    pub setup_adjustment: String,
    /// Fuel burn relative to a normal lap
    pub fuel_usage: f64,
    /// Tyre wear relative to a normal lap
    pub tyre_wear: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OvertakingOpportunity {
    pub target_position: u32,
    pub target_driver: String,
    /// Percentage in [5, 95]
    pub success_probability: u32,
    pub risk_level: OvertakeRisk,
    pub optimal_lap: u32,
    pub optimal_turn: String,
    pub technique: OvertakingTechnique,
    /// Speed advantage needed, km/h
    pub required_delta: u32,
    pub recommendation: Recommendation,
    pub reasoning: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackWeather {
    Dry,
    Wet,
    Changing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Traffic {
    Clear,
    Light,
    Heavy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceConditions {
    pub weather: TrackWeather,
    pub traffic: Traffic,
    /// Laps newer than the opponent's tyres
    pub tyre_advantage: i32,
    /// kg lighter than the opponent
    pub fuel_advantage: f64,
    /// Percent faster than the opponent
    pub performance_gap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMatrix {
    pub position: u32,
    pub lap: u32,
    pub track_section: String,
    pub conditions: RaceConditions,
    /// Score in [0, 100]
    pub risk_score: u32,
    /// Score in [0, 100]
    pub reward_score: u32,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushPhase {
    pub start_lap: u32,
    pub end_lap: u32,
    pub intensity: u32,
    pub target: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavingTarget {
    Fuel,
    Tyres,
    Engine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConservePhase {
    pub start_lap: u32,
    pub end_lap: u32,
    pub saving_target: SavingTarget,
    /// Percent saved over the phase
    pub amount: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceStrategy {
    /// Percentage in [0, 100]
    pub aggressiveness: f64,
    pub push_phases: Vec<PushPhase>,
    pub conserve_phases: Vec<ConservePhase>,
    /// Laps of the opportunities worth going for
    pub overtaking_windows: Vec<u32>,
    pub estimated_position_gain: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrsZoneAnalysis {
    pub zone: u32,
    pub location: String,
    /// Metres
    pub length: f64,
    pub success_rate: f64,
    pub optimal_entry: String,
    pub risks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentAnalysis {
    pub base_risk: i32,
    pub driver_factors: i32,
    pub track_factors: i32,
    pub weather_factors: i32,
    /// Percentage in [1, 50]
    pub total_risk: u32,
    pub historical_data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseOutcome {
    /// Positions gained, or lost for the worst case
    pub positions: i32,
    pub points: u32,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedGains {
    pub best_case: CaseOutcome,
    pub likely_case: CaseOutcome,
    pub worst_case: CaseOutcome,
    /// Expected points, one decimal
    pub expected_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OvertakingAnalysis {
    pub current_position: u32,
    /// Sorted by success probability, best first
    pub opportunities: Vec<OvertakingOpportunity>,
    pub risk_matrix: RiskMatrix,
    pub optimal_strategy: RaceStrategy,
    pub drs_zones: Vec<DrsZoneAnalysis>,
    pub incident_probability: IncidentAnalysis,
    pub expected_gains: ExpectedGains,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum SpotDifficulty {
    Easy,
    Medium,
    Hard,
    VeryHard,
    Extreme,
}

#[derive(Debug, Clone, Copy)]
struct OvertakingSpot {
    turn: &'static str,
    difficulty: SpotDifficulty,
}

const fn spot(turn: &'static str, difficulty: SpotDifficulty) -> OvertakingSpot {
    OvertakingSpot { turn, difficulty }
}

const MONZA_SPOTS: [OvertakingSpot; 4] = [
    spot("T1 - Variante del Rettifilo", SpotDifficulty::Medium),
    spot("T4 - Variante della Roggia", SpotDifficulty::Hard),
    spot("T8 - Prima Lesmo", SpotDifficulty::VeryHard),
    spot("T11 - Parabolica", SpotDifficulty::Medium),
];

const MONACO_SPOTS: [OvertakingSpot; 3] = [
    spot("T1 - Sainte Devote", SpotDifficulty::VeryHard),
    spot("T10 - Chicane", SpotDifficulty::Extreme),
    spot("T14 - Nouvelle Chicane", SpotDifficulty::Hard),
];

const SPA_SPOTS: [OvertakingSpot; 3] = [
    spot("T1 - La Source", SpotDifficulty::Medium),
    spot("T5 - Les Combes", SpotDifficulty::Easy),
    spot("T18 - Bus Stop", SpotDifficulty::Medium),
];

const GENERIC_SPOTS: [OvertakingSpot; 3] = [
    spot("Turn 1", SpotDifficulty::Medium),
    spot("Main Straight", SpotDifficulty::Easy),
    spot("Hairpin", SpotDifficulty::Hard),
];

fn overtaking_spots(track: &TrackData) -> &'static [OvertakingSpot] {
    match track.name.as_str() {
        "Monza" => &MONZA_SPOTS,
        "Monaco" => &MONACO_SPOTS,
        "Spa" => &SPA_SPOTS,
        _ => &GENERIC_SPOTS,
    }
}

/// The easiest known place to pass; the first listed wins a tie.
fn easiest_spot(track: &TrackData) -> &'static str {
    overtaking_spots(track)
        .iter()
        .min_by_key(|spot| spot.difficulty)
        .map(|spot| spot.turn)
        .unwrap_or("Turn 1")
}

/// Evaluate passing the cars ahead from `position` at `lap` of `total_laps`.
///
/// Opponent strength, race conditions, DRS zone figures and the weather
/// contribution to incident risk are sampled from `rng`, in that order.
pub fn analyze_overtaking<R>(
    snapshot: &Snapshot,
    position: u32,
    lap: u32,
    total_laps: u32,
    rng: &mut R,
) -> Result<OvertakingAnalysis, GproError>
where
    R: Rng + ?Sized,
{
    if position == 0 {
        return Err(GproError::InvalidUserInput {
            field: "position".to_string(),
            reason: "positions start at 1".to_string(),
        });
    }
    if total_laps == 0 {
        return Err(GproError::InvalidUserInput {
            field: "total_laps".to_string(),
            reason: "the race needs at least one lap".to_string(),
        });
    }
    if lap > total_laps {
        return Err(GproError::InvalidUserInput {
            field: "lap".to_string(),
            reason: format!("lap {lap} is past the end of a {total_laps} lap race"),
        });
    }
    let driver = snapshot.driver()?;
    let car = snapshot.car()?;
    let track = snapshot.track()?;

    let race = RaceProgress { lap, total_laps };
    let opportunities = opportunities(&driver, &car, &track, position, race, rng);
    let risk_matrix = risk_matrix(&driver, &track, position, lap, rng);
    let optimal_strategy = optimal_strategy(&driver, &opportunities, race);
    let drs_zones = drs_zones(&track, rng);
    let incident_probability = incident_probability(&driver, &track, rng);
    let expected_gains = expected_gains(position, &opportunities, &incident_probability);

    debug!(
        "Overtaking from P{} on lap {}/{}: {} opportunities, incident risk {}%",
        position,
        lap,
        total_laps,
        opportunities.len(),
        incident_probability.total_risk
    );

    Ok(OvertakingAnalysis {
        current_position: position,
        opportunities,
        risk_matrix,
        optimal_strategy,
        drs_zones,
        incident_probability,
        expected_gains,
    })
}

#[derive(Debug, Clone, Copy)]
struct RaceProgress {
    lap: u32,
    total_laps: u32,
}

impl RaceProgress {
    fn completion(&self) -> f64 {
        self.lap as f64 / self.total_laps as f64
    }
}

fn opportunities<R>(
    driver: &DriverData,
    car: &CarData,
    track: &TrackData,
    position: u32,
    race: RaceProgress,
    rng: &mut R,
) -> Vec<OvertakingOpportunity>
where
    R: Rng + ?Sized,
{
    let targets = MAX_TARGETS.min(position - 1);
    let mut opportunities: Vec<OvertakingOpportunity> = (1..=targets)
        .map(|ahead| {
            let target_position = position - ahead;
            let opponent = opponent_strength(target_position, rng);
            let success_probability = success_probability(driver, car, track, opponent);
            let risk_level = assess_risk(success_probability, race, target_position);
            let technique = select_technique(driver, track, race.lap);
            let required_delta = required_delta(car, opponent, technique.kind);
            let recommendation = recommend(success_probability, risk_level, race);
            let reasoning = reasoning(success_probability, risk_level, race, &technique);
            let optimal_lap = (race.lap + (ahead as f64 * 1.5).ceil() as u32)
                .min(race.total_laps.saturating_sub(2));

            OvertakingOpportunity {
                target_position,
                target_driver: format!("Driver P{target_position}"),
                success_probability,
                risk_level,
                optimal_lap,
                optimal_turn: easiest_spot(track).to_string(),
                technique,
                required_delta,
                recommendation,
                reasoning,
            }
        })
        .collect();

    opportunities.sort_by(|a, b| b.success_probability.cmp(&a.success_probability));
    opportunities
}

/// Rating of the car in `position`: front runners are stronger.
fn opponent_strength<R>(position: u32, rng: &mut R) -> f64
where
    R: Rng + ?Sized,
{
    if position <= 3 {
        rng.gen_range(85.0..100.0)
    } else if position <= 10 {
        rng.gen_range(70.0..90.0)
    } else {
        rng.gen_range(50.0..80.0)
    }
}

fn success_probability(driver: &DriverData, car: &CarData, track: &TrackData, opponent: f64) -> u32 {
    let probability = 50.0 + (driver.overall - opponent) * 0.5
        + (car.average_performance() - 75.0) * 0.3
        - track.overtaking_difficulty * 0.3
        + (driver.experience - 50.0) * 0.2;
    probability.round().clamp(5.0, 95.0) as u32
}

fn assess_risk(success_probability: u32, race: RaceProgress, target_position: u32) -> OvertakeRisk {
    let completion = race.completion();
    let p = success_probability;

    if completion > 0.8 && p < 40 {
        OvertakeRisk::VeryHigh
    } else if completion > 0.6 && p < 50 {
        OvertakeRisk::High
    } else if target_position <= 3 && p < 60 {
        // podium fights raise the stakes
        OvertakeRisk::High
    } else if p > 80 {
        OvertakeRisk::VeryLow
    } else if p > 65 {
        OvertakeRisk::Low
    } else if p > 50 {
        OvertakeRisk::Medium
    } else if p > 35 {
        OvertakeRisk::High
    } else {
        OvertakeRisk::VeryHigh
    }
}

fn select_technique(driver: &DriverData, track: &TrackData, lap: u32) -> OvertakingTechnique {
    let (kind, setup_adjustment, fuel_usage, tyre_wear, description) = if track.power_importance
        > 80.0
    {
        (
            TechniqueKind::Slipstream,
            "Lower rear wing for straight line speed",
            1.1,
            1.0,
            "Use the slipstream on the long straight for a speed advantage",
        )
    } else if driver.aggressiveness > 75.0 {
        (
            TechniqueKind::LateBraking,
            "Move brake balance forward",
            1.0,
            1.3,
            "Aggressive late braking manoeuvre",
        )
    } else if lap < 10 {
        (
            TechniqueKind::Undercut,
            "Prepare for an early pit stop",
            1.2,
            1.4,
            "Push hard before the pit stop to gain the position",
        )
    } else {
        (
            TechniqueKind::DrsPass,
            "Standard setup, focus on exit speed",
            1.05,
            1.05,
            "Use the DRS advantage in the designated zone",
        )
    };

    OvertakingTechnique {
        kind,
        setup_adjustment: setup_adjustment.to_string(),
        fuel_usage,
        tyre_wear,
        description: description.to_string(),
    }
}

fn required_delta(car: &CarData, opponent: f64, technique: TechniqueKind) -> u32 {
    let base_delta = match technique {
        TechniqueKind::LateBraking => 5.0,
        TechniqueKind::Slipstream => 8.0,
        TechniqueKind::DrsPass => 10.0,
        TechniqueKind::Undercut => 0.0,
    };
    let performance_gap = car.average_performance() - opponent;
    (base_delta - performance_gap * 0.1).round().max(0.0) as u32
}

fn recommend(success_probability: u32, risk: OvertakeRisk, race: RaceProgress) -> Recommendation {
    // no time left to wait for a better chance
    if race.completion() > 0.9 {
        return if success_probability > 70 {
            Recommendation::Go
        } else {
            Recommendation::Abort
        };
    }

    match risk {
        OvertakeRisk::VeryHigh => Recommendation::Abort,
        OvertakeRisk::High if success_probability < 60 => Recommendation::Wait,
        _ if success_probability > 65 => Recommendation::Go,
        _ if success_probability > 45 => Recommendation::Wait,
        _ => Recommendation::Abort,
    }
}

fn reasoning(
    success_probability: u32,
    risk: OvertakeRisk,
    race: RaceProgress,
    technique: &OvertakingTechnique,
) -> Vec<String> {
    let mut reasoning = Vec::new();

    if success_probability > 70 {
        reasoning.push(format!("High chance of success ({success_probability}%)"));
    } else if success_probability < 40 {
        reasoning.push(format!("Low chance of success ({success_probability}%)"));
    }

    if matches!(risk, OvertakeRisk::High | OvertakeRisk::VeryHigh) {
        reasoning.push(format!(
            "Risk {risk}: possible incident or lost positions"
        ));
    }

    let completion = race.completion() * 100.0;
    if completion > 80.0 {
        reasoning.push(format!(
            "Final phase of the race ({:.0}%): few chances left",
            completion
        ));
    } else if completion < 20.0 {
        reasoning.push(format!(
            "Early in the race ({:.0}%): time for a patient strategy",
            completion
        ));
    }

    reasoning.push(format!("Suggested technique: {}", technique.description));
    if technique.tyre_wear > 1.2 {
        reasoning.push("High tyre wear with this manoeuvre".to_string());
    }
    if technique.fuel_usage > 1.15 {
        reasoning.push("High fuel consumption".to_string());
    }
    reasoning
}

fn risk_matrix<R>(
    driver: &DriverData,
    track: &TrackData,
    position: u32,
    lap: u32,
    rng: &mut R,
) -> RiskMatrix
where
    R: Rng + ?Sized,
{
    let weather = if rng.gen_range(0.0f64..1.0) > 0.8 {
        TrackWeather::Wet
    } else {
        TrackWeather::Dry
    };
    let conditions = RaceConditions {
        weather,
        traffic: if position > 15 {
            Traffic::Heavy
        } else if position > 8 {
            Traffic::Light
        } else {
            Traffic::Clear
        },
        tyre_advantage: (rng.gen_range(0.0f64..1.0) * 10.0 - 5.0).floor() as i32,
        fuel_advantage: rng.gen_range(0.0f64..1.0) * 20.0 - 10.0,
        performance_gap: rng.gen_range(0.0f64..1.0) * 10.0 - 5.0,
    };

    let mut risk = 30.0 + (100.0 - driver.concentration) * 0.3 + driver.aggressiveness * 0.2
        - driver.experience * 0.1
        + track.overtaking_difficulty * 0.3;
    if conditions.weather == TrackWeather::Wet {
        risk += 20.0;
    }
    if conditions.traffic == Traffic::Heavy {
        risk += 15.0;
    }
    if conditions.tyre_advantage < 0 {
        risk += 10.0;
    }

    // points positions are worth more
    let mut reward = if position <= 10 {
        80.0 - position as f64 * 5.0
    } else {
        30.0 - (position as f64 - 10.0)
    };
    if conditions.tyre_advantage > 3 {
        reward += 20.0;
    }
    if conditions.fuel_advantage > 5.0 {
        reward += 15.0;
    }
    if conditions.performance_gap > 2.0 {
        reward += 25.0;
    }

    let ratio = reward / risk;
    let recommendation = if ratio > 1.5 {
        "Attack aggressively"
    } else if ratio > 1.0 {
        "Look for opportunities"
    } else if ratio > 0.7 {
        "Be patient, wait for mistakes"
    } else {
        "Focus on defence"
    };

    RiskMatrix {
        position,
        lap,
        track_section: format!("Sector {} - {}", lap % 3 + 1, track.name),
        conditions,
        risk_score: risk.round().clamp(0.0, 100.0) as u32,
        reward_score: reward.round().clamp(0.0, 100.0) as u32,
        recommendation: recommendation.to_string(),
    }
}

fn optimal_strategy(
    driver: &DriverData,
    opportunities: &[OvertakingOpportunity],
    race: RaceProgress,
) -> RaceStrategy {
    let completion = race.completion();
    let phase_multiplier = if completion < 0.2 {
        0.7
    } else if completion < 0.7 {
        1.2
    } else {
        0.9
    };

    let push_phases = opportunities
        .iter()
        .filter(|o| o.success_probability > 60)
        .map(|o| PushPhase {
            start_lap: o.optimal_lap.saturating_sub(2),
            end_lap: o.optimal_lap + 1,
            intensity: o.success_probability,
            target: o.target_driver.clone(),
            reason: format!("Overtaking attempt on {}", o.target_driver),
        })
        .collect();

    let laps = race.total_laps as f64;
    let mut conserve_phases = Vec::new();
    if race.total_laps > 50 {
        conserve_phases.push(ConservePhase {
            start_lap: (laps * 0.3).round() as u32,
            end_lap: (laps * 0.5).round() as u32,
            saving_target: SavingTarget::Fuel,
            amount: 15,
        });
    }
    conserve_phases.push(ConservePhase {
        start_lap: (laps * 0.6).round() as u32,
        end_lap: (laps * 0.75).round() as u32,
        saving_target: SavingTarget::Tyres,
        amount: 20,
    });

    RaceStrategy {
        aggressiveness: (driver.aggressiveness * phase_multiplier).min(100.0),
        push_phases,
        conserve_phases,
        overtaking_windows: opportunities
            .iter()
            .filter(|o| o.recommendation == Recommendation::Go)
            .map(|o| o.optimal_lap)
            .collect(),
        estimated_position_gain: opportunities
            .iter()
            .filter(|o| o.success_probability > 50)
            .count() as u32,
    }
}

fn drs_zones<R>(track: &TrackData, rng: &mut R) -> Vec<DrsZoneAnalysis>
where
    R: Rng + ?Sized,
{
    let zone_count = if track.length_km > 5.0 {
        3
    } else if track.length_km > 4.0 {
        2
    } else {
        1
    };

    (1..=zone_count)
        .map(|zone| {
            let location = match zone {
                1 => "Main straight (Start/Finish)",
                2 => "Main straight (Back straight)",
                _ => "Main straight (Secondary)",
            };
            let length = 600.0 + rng.gen_range(0.0f64..1.0) * 400.0;
            let success_rate =
                70.0 - track.overtaking_difficulty * 0.5 + rng.gen_range(0.0f64..1.0) * 20.0;
            DrsZoneAnalysis {
                zone,
                location: location.to_string(),
                length,
                success_rate,
                optimal_entry: "Exit the previous corner at full speed, car on the inside"
                    .to_string(),
                risks: vec![
                    "Late braking from the defender".to_string(),
                    "Lock-up into the braking zone".to_string(),
                    "Side by side through the next corner".to_string(),
                ],
            }
        })
        .collect()
}

fn incident_probability<R>(driver: &DriverData, track: &TrackData, rng: &mut R) -> IncidentAnalysis
where
    R: Rng + ?Sized,
{
    let base_risk = 5.0;
    let driver_factors = (100.0 - driver.concentration) * 0.1
        + (driver.aggressiveness - 50.0) * 0.05
        - driver.experience * 0.03;
    let track_factors = track.overtaking_difficulty * 0.1;
    let weather_factors = if rng.gen_range(0.0f64..1.0) > 0.8 {
        10.0
    } else {
        0.0
    };
    let total = (base_risk + driver_factors + track_factors + weather_factors).clamp(1.0, 50.0);

    IncidentAnalysis {
        base_risk: base_risk as i32,
        driver_factors: driver_factors.round() as i32,
        track_factors: track_factors.round() as i32,
        weather_factors: weather_factors as i32,
        total_risk: total.round() as u32,
        historical_data: format!(
            "Track average: {:.1}% | Your last 5 races: {:.1}%",
            base_risk + track_factors,
            base_risk + driver_factors
        ),
    }
}

fn expected_gains(
    position: u32,
    opportunities: &[OvertakingOpportunity],
    incidents: &IncidentAnalysis,
) -> ExpectedGains {
    let current = position as i32;

    let likely_overtakes = opportunities
        .iter()
        .filter(|o| o.success_probability > 60)
        .count() as i32;
    let best_position = (current - likely_overtakes).max(1);

    let expected_overtakes: f64 = opportunities
        .iter()
        .map(|o| o.success_probability as f64 / 100.0)
        .sum();
    let likely_position = ((current as f64 - expected_overtakes).round() as i32).max(1);

    let worst_position = if incidents.total_risk > 30 {
        30
    } else {
        current + 2
    };

    let points = |position: i32| points_for_position(position as u32);
    let incident = incidents.total_risk as f64 / 100.0;
    let expected_value = points(best_position) as f64 * 0.2
        + points(likely_position) as f64 * (0.8 - incident)
        + points(worst_position) as f64 * incident;

    ExpectedGains {
        best_case: CaseOutcome {
            positions: current - best_position,
            points: points(best_position),
            time: "-15.2s".to_string(),
        },
        likely_case: CaseOutcome {
            positions: current - likely_position,
            points: points(likely_position),
            time: "-8.5s".to_string(),
        },
        worst_case: CaseOutcome {
            positions: worst_position - current,
            points: points(worst_position),
            time: "+45.0s".to_string(),
        },
        expected_value: (expected_value * 10.0).round() / 10.0,
    }
}
