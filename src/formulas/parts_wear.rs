// Parts wear projection and maintenance budget planner

use itertools::Itertools;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::GproError;
use crate::snapshot::{CarData, PartKind, Snapshot, TrackData, TrackType};

/// Team budget assumed when the caller has none configured
pub const DEFAULT_BUDGET: f64 = 5_000_000.0;

/// Wear above which a part is considered at its limit
const CRITICAL_WEAR: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartCosts {
    pub repair: u64,
    pub replace: u64,
    pub upgrade: u64,
}

pub fn part_costs(part: PartKind) -> PartCosts {
    let (repair, replace, upgrade) = match part {
        PartKind::Chassis => (50_000, 500_000, 750_000),
        PartKind::Engine => (75_000, 800_000, 1_200_000),
        PartKind::FrontWing => (30_000, 300_000, 450_000),
        PartKind::RearWing => (35_000, 350_000, 525_000),
        PartKind::Underbody => (40_000, 400_000, 600_000),
        PartKind::Sidepods => (25_000, 250_000, 375_000),
        PartKind::Cooling => (20_000, 200_000, 300_000),
        PartKind::Gearbox => (60_000, 600_000, 900_000),
        PartKind::Brakes => (45_000, 450_000, 675_000),
        PartKind::Suspension => (40_000, 400_000, 600_000),
        PartKind::Electronics => (80_000, 850_000, 1_275_000),
    };
    PartCosts {
        repair,
        replace,
        upgrade,
    }
}

/// Wear added per race, in percent, before track effects.
fn base_wear_rate(part: PartKind) -> f64 {
    match part {
        PartKind::Engine => 4.5,
        PartKind::Gearbox => 3.8,
        PartKind::Brakes => 5.2,
        PartKind::Suspension => 4.0,
        PartKind::FrontWing => 3.5,
        PartKind::RearWing => 3.2,
        PartKind::Chassis => 2.8,
        PartKind::Underbody => 3.0,
        PartKind::Sidepods => 2.5,
        PartKind::Cooling => 3.3,
        PartKind::Electronics => 2.0,
    }
}

/// Worn parts wear faster.
pub fn wear_rate(part: PartKind, current_wear: f64) -> f64 {
    let acceleration = if current_wear > 70.0 {
        1.5
    } else if current_wear > 50.0 {
        1.2
    } else {
        1.0
    };
    base_wear_rate(part) * acceleration
}

pub fn track_wear_multiplier(part: PartKind, track: &TrackData) -> f64 {
    match (track.track_type(), part) {
        (TrackType::Street, PartKind::Engine) => 1.2,
        (TrackType::Street, PartKind::Suspension) => 1.5,
        (TrackType::Street, PartKind::Brakes) => 1.3,
        (TrackType::Speedway, PartKind::Engine) => 1.4,
        (TrackType::Speedway, PartKind::Brakes) => 0.7,
        (TrackType::Speedway, PartKind::Cooling) => 1.3,
        _ => 1.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Excellent,
    Good,
    Warning,
    Critical,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Excellent => write!(f, "excellent"),
            HealthStatus::Good => write!(f, "good"),
            HealthStatus::Warning => write!(f, "warning"),
            HealthStatus::Critical => write!(f, "critical"),
        }
    }
}

pub fn health_status(wear: f64, performance: f64) -> HealthStatus {
    if wear > 80.0 || performance < 60.0 {
        HealthStatus::Critical
    } else if wear > 60.0 || performance < 75.0 {
        HealthStatus::Warning
    } else if wear > 40.0 || performance < 85.0 {
        HealthStatus::Good
    } else {
        HealthStatus::Excellent
    }
}

/// Percentage of performance lost at a given wear. Piecewise linear with a
/// steeper slope at every band.
pub fn performance_loss(wear: f64) -> f64 {
    if wear < 30.0 {
        0.0
    } else if wear < 50.0 {
        (wear - 30.0) * 0.5
    } else if wear < 70.0 {
        10.0 + (wear - 50.0)
    } else if wear < 85.0 {
        30.0 + (wear - 70.0) * 1.5
    } else {
        52.5 + (wear - 85.0) * 2.0
    }
}

/// Percentage chance the part fails during a race.
pub fn failure_risk(wear: f64) -> f64 {
    if wear < 60.0 {
        0.0
    } else if wear < 70.0 {
        5.0
    } else if wear < 80.0 {
        15.0
    } else if wear < 90.0 {
        40.0
    } else if wear < 95.0 {
        75.0
    } else {
        95.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartStatus {
    pub part: PartKind,
    pub current_wear: f64,
    pub performance: f64,
    pub health_status: HealthStatus,
    pub races_until_critical: u32,
    /// Races a new part of this kind lasts at the current rate
    pub estimated_lifespan: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WearPrediction {
    pub part: PartKind,
    /// 1-based race index from now
    pub race_number: u32,
    pub predicted_wear: f64,
    pub performance_loss: f64,
    pub failure_risk: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceKind {
    Repair,
    Replace,
    Monitor,
}

impl std::fmt::Display for MaintenanceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaintenanceKind::Repair => write!(f, "repair"),
            MaintenanceKind::Replace => write!(f, "replace"),
            MaintenanceKind::Monitor => write!(f, "monitor"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceAction {
    pub part: PartKind,
    pub action: MaintenanceKind,
    /// Race the work is due before, 0 = the next race
    pub race: u32,
    pub cost: u64,
    pub priority: Priority,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeRecommendation {
    pub part: PartKind,
    pub current_level: u32,
    pub recommended_level: u32,
    pub optimal_timing: String,
    /// Return on investment, percent
    pub roi: u32,
    /// Performance gain, percent
    pub performance_gain: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenancePlan {
    pub immediate_actions: Vec<MaintenanceAction>,
    pub scheduled_maintenance: Vec<MaintenanceAction>,
    pub optimal_replacement: Vec<UpgradeRecommendation>,
    pub total_cost: u64,
    /// Spend avoided versus repairing and replacing without a plan
    pub cost_savings: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavingsRisk {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsOpportunity {
    pub description: String,
    pub potential_saving: u64,
    pub implementation: String,
    pub risk: SavingsRisk,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAnalysis {
    pub current_budget: f64,
    pub projected_spend: u64,
    pub cost_per_race: u64,
    /// Share of the budget left after the plan, in [0, 100]
    pub efficiency_score: u32,
    pub savings_opportunities: Vec<SavingsOpportunity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Critical => write!(f, "CRITICAL"),
            AlertSeverity::Warning => write!(f, "WARNING"),
            AlertSeverity::Info => write!(f, "INFO"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WearAlert {
    pub severity: AlertSeverity,
    pub part: PartKind,
    pub message: String,
    pub action_required: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTrend {
    Improving,
    Stable,
    Declining,
}

impl std::fmt::Display for PerformanceTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PerformanceTrend::Improving => write!(f, "improving"),
            PerformanceTrend::Stable => write!(f, "stable"),
            PerformanceTrend::Declining => write!(f, "declining"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonProjection {
    pub total_races: u32,
    pub projected_replacements: u32,
    pub estimated_total_cost: u64,
    pub performance_trend: PerformanceTrend,
    pub end_of_season_status: Vec<PartStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartsWearAnalysis {
    /// Parts sorted by wear, most worn first
    pub current_status: Vec<PartStatus>,
    /// One entry per part per race, race-major
    pub predictions: Vec<WearPrediction>,
    pub maintenance_plan: MaintenancePlan,
    pub budget_analysis: BudgetAnalysis,
    /// Sorted critical first
    pub alerts: Vec<WearAlert>,
    pub season_projection: SeasonProjection,
}

/// Project part wear over the rest of the season against the default budget.
pub fn analyze_parts_wear(
    snapshot: &Snapshot,
    remaining_races: u32,
) -> Result<PartsWearAnalysis, GproError> {
    analyze_parts_wear_with_budget(snapshot, remaining_races, DEFAULT_BUDGET)
}

pub fn analyze_parts_wear_with_budget(
    snapshot: &Snapshot,
    remaining_races: u32,
    budget: f64,
) -> Result<PartsWearAnalysis, GproError> {
    if remaining_races == 0 {
        return Err(GproError::InvalidUserInput {
            field: "remaining_races".to_string(),
            reason: "at least one race must remain".to_string(),
        });
    }
    if !(budget > 0.0) {
        return Err(GproError::InvalidUserInput {
            field: "budget".to_string(),
            reason: format!("budget must be positive, got {budget}"),
        });
    }
    let car = snapshot.car()?;
    let track = snapshot.track()?;

    let current_status = current_status(&car);
    let predictions = predict_wear(&car, &track, remaining_races);
    let maintenance_plan = maintenance_plan(&car, &predictions, remaining_races);
    let budget_analysis = analyze_budget(&maintenance_plan, remaining_races, budget);
    let alerts = wear_alerts(&current_status, &predictions);
    let season_projection = project_season(&predictions, remaining_races);

    if budget_analysis.projected_spend as f64 > budget {
        warn!(
            "Maintenance plan costs {} but the budget is only {}",
            budget_analysis.projected_spend, budget
        );
    }
    debug!(
        "Parts wear over {} races: {} alerts, {} immediate actions",
        remaining_races,
        alerts.len(),
        maintenance_plan.immediate_actions.len()
    );

    Ok(PartsWearAnalysis {
        current_status,
        predictions,
        maintenance_plan,
        budget_analysis,
        alerts,
        season_projection,
    })
}

fn current_status(car: &CarData) -> Vec<PartStatus> {
    car.parts()
        .map(|(kind, part)| {
            let rate = wear_rate(kind, part.wear);
            PartStatus {
                part: kind,
                current_wear: part.wear,
                performance: part.performance,
                health_status: health_status(part.wear, part.performance),
                races_until_critical: ((CRITICAL_WEAR - part.wear) / rate).floor().max(0.0) as u32,
                estimated_lifespan: (100.0 / rate).round() as u32,
            }
        })
        .sorted_by(|a, b| b.current_wear.total_cmp(&a.current_wear))
        .collect()
}

fn predict_wear(car: &CarData, track: &TrackData, races: u32) -> Vec<WearPrediction> {
    (1..=races)
        .flat_map(|race| {
            car.parts().map(move |(kind, part)| {
                let rate = wear_rate(kind, part.wear) * track_wear_multiplier(kind, track);
                let predicted_wear = (part.wear + rate * race as f64).min(100.0);
                WearPrediction {
                    part: kind,
                    race_number: race,
                    predicted_wear,
                    performance_loss: performance_loss(predicted_wear),
                    failure_risk: failure_risk(predicted_wear),
                }
            })
        })
        .collect()
}

fn maintenance_plan(
    car: &CarData,
    predictions: &[WearPrediction],
    remaining_races: u32,
) -> MaintenancePlan {
    let mut immediate_actions = Vec::new();
    let mut scheduled_maintenance = Vec::new();
    let mut optimal_replacement = Vec::new();
    let mut total_cost = 0;
    let mut unplanned_cost = 0;
    let mid_season = remaining_races / 2;

    for (kind, part) in car.parts() {
        let costs = part_costs(kind);

        if part.wear > 70.0 {
            let replace = part.wear > 85.0;
            let action = MaintenanceAction {
                part: kind,
                action: if replace {
                    MaintenanceKind::Replace
                } else {
                    MaintenanceKind::Repair
                },
                race: 0,
                cost: if replace { costs.replace } else { costs.repair },
                priority: Priority::High,
                reason: format!("Critical wear: {:.0}%", part.wear),
            };
            total_cost += action.cost;
            immediate_actions.push(action);
        }

        let mid_season_wear = predictions
            .iter()
            .find(|p| p.part == kind && p.race_number == mid_season);
        if let Some(prediction) = mid_season_wear
            && prediction.predicted_wear > 60.0
            && part.wear <= 70.0
        {
            total_cost += costs.repair;
            scheduled_maintenance.push(MaintenanceAction {
                part: kind,
                action: MaintenanceKind::Repair,
                race: mid_season,
                cost: costs.repair,
                priority: Priority::Medium,
                reason: "Preventive maintenance at mid-season".to_string(),
            });
        }

        let performance_gain = (20 - part.level as i64) * 5;
        let roi = (performance_gain * 1000) as f64 / costs.upgrade as f64;
        if roi > 0.5 && part.level < 15 {
            optimal_replacement.push(UpgradeRecommendation {
                part: kind,
                current_level: part.level,
                recommended_level: (part.level + 3).min(20),
                optimal_timing: if part.wear > 50.0 {
                    "Immediate".to_string()
                } else {
                    "Next 3 races".to_string()
                },
                roi: (roi * 100.0).round() as u32,
                performance_gain: performance_gain as u32,
            });
        }

        if part.wear > 85.0 {
            unplanned_cost += costs.replace;
        } else if part.wear > 60.0 {
            unplanned_cost += costs.repair * 2;
        }
    }

    MaintenancePlan {
        immediate_actions,
        scheduled_maintenance,
        optimal_replacement,
        total_cost,
        cost_savings: unplanned_cost.saturating_sub(total_cost),
    }
}

fn analyze_budget(plan: &MaintenancePlan, races: u32, budget: f64) -> BudgetAnalysis {
    let projected_spend = plan.total_cost;
    let share = |amount: u64, fraction: f64| (amount as f64 * fraction).round() as u64;

    BudgetAnalysis {
        current_budget: budget,
        projected_spend,
        cost_per_race: (projected_spend as f64 / races as f64).round() as u64,
        efficiency_score: (100.0 * (1.0 - projected_spend as f64 / budget))
            .round()
            .clamp(0.0, 100.0) as u32,
        savings_opportunities: vec![
            SavingsOpportunity {
                description: "Preventive maintenance instead of replacement".to_string(),
                potential_saving: share(plan.cost_savings, 0.3),
                implementation: "Repair parts at 60% wear instead of waiting for 85%".to_string(),
                risk: SavingsRisk::Low,
            },
            SavingsOpportunity {
                description: "Setup tuned to reduce wear".to_string(),
                potential_saving: share(plan.total_cost, 0.15),
                implementation: "More conservative setups on high wear tracks".to_string(),
                risk: SavingsRisk::Medium,
            },
            SavingsOpportunity {
                description: "Strategic multi-season upgrades".to_string(),
                potential_saving: share(plan.total_cost, 0.25),
                implementation: "Invest in higher level parts that last longer".to_string(),
                risk: SavingsRisk::High,
            },
        ],
    }
}

fn wear_alerts(status: &[PartStatus], predictions: &[WearPrediction]) -> Vec<WearAlert> {
    let mut alerts = Vec::new();

    for part in status {
        match part.health_status {
            HealthStatus::Critical => alerts.push(WearAlert {
                severity: AlertSeverity::Critical,
                part: part.part,
                message: format!("{} in critical condition ({:.0}% wear)", part.part, part.current_wear),
                action_required: "Immediate replacement required".to_string(),
            }),
            HealthStatus::Warning => alerts.push(WearAlert {
                severity: AlertSeverity::Warning,
                part: part.part,
                message: format!("{} needs attention ({:.0}% wear)", part.part, part.current_wear),
                action_required: "Plan maintenance within 2 races".to_string(),
            }),
            _ => {}
        }
    }

    for prediction in predictions
        .iter()
        .filter(|p| p.race_number <= 3 && p.failure_risk > 30.0)
    {
        alerts.push(WearAlert {
            severity: AlertSeverity::Warning,
            part: prediction.part,
            message: format!(
                "High failure risk for {} by race {}",
                prediction.part, prediction.race_number
            ),
            action_required: "Consider preventive maintenance".to_string(),
        });
    }

    for part in status.iter().filter(|p| p.performance < 70.0) {
        alerts.push(WearAlert {
            severity: AlertSeverity::Info,
            part: part.part,
            message: format!("{} performance reduced ({:.0}%)", part.part, part.performance),
            action_required: "Evaluate an upgrade to improve performance".to_string(),
        });
    }

    alerts.sort_by_key(|alert| alert.severity);
    alerts
}

fn project_season(predictions: &[WearPrediction], total_races: u32) -> SeasonProjection {
    let end_of_season: Vec<&WearPrediction> = predictions
        .iter()
        .filter(|p| p.race_number == total_races)
        .collect();

    let projected_replacements = end_of_season
        .iter()
        .filter(|p| p.predicted_wear > 85.0)
        .count() as u32;
    let estimated_total_cost = end_of_season
        .iter()
        .map(|p| {
            let costs = part_costs(p.part);
            if p.predicted_wear > 85.0 {
                costs.replace
            } else if p.predicted_wear > 60.0 {
                costs.repair
            } else {
                0
            }
        })
        .sum();

    let average_loss = end_of_season.iter().map(|p| p.performance_loss).sum::<f64>()
        / end_of_season.len().max(1) as f64;
    let performance_trend = if average_loss > 20.0 {
        PerformanceTrend::Declining
    } else if average_loss > 10.0 {
        PerformanceTrend::Stable
    } else {
        PerformanceTrend::Improving
    };

    let end_of_season_status = end_of_season
        .iter()
        .map(|p| {
            let performance = (100.0 - p.performance_loss).max(0.0);
            PartStatus {
                part: p.part,
                current_wear: p.predicted_wear,
                performance,
                health_status: health_status(p.predicted_wear, performance),
                races_until_critical: 0,
                estimated_lifespan: 0,
            }
        })
        .collect();

    SeasonProjection {
        total_races,
        projected_replacements,
        estimated_total_cost,
        performance_trend,
        end_of_season_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::CarPart;
    use crate::snapshot::mock::{arb_snapshot, mock_snapshot};
    use proptest::prelude::*;

    fn snapshot_with_car(car: CarData) -> Snapshot {
        Snapshot {
            car: Some(car),
            ..mock_snapshot()
        }
    }

    #[test]
    fn test_health_status_thresholds() {
        assert_eq!(health_status(90.0, 95.0), HealthStatus::Critical);
        assert_eq!(health_status(10.0, 55.0), HealthStatus::Critical);
        assert_eq!(health_status(65.0, 95.0), HealthStatus::Warning);
        assert_eq!(health_status(45.0, 95.0), HealthStatus::Good);
        assert_eq!(health_status(10.0, 80.0), HealthStatus::Good);
        assert_eq!(health_status(10.0, 95.0), HealthStatus::Excellent);
    }

    #[test]
    fn test_performance_loss_curve() {
        assert_eq!(performance_loss(20.0), 0.0);
        assert_eq!(performance_loss(40.0), 5.0);
        assert_eq!(performance_loss(60.0), 20.0);
        assert_eq!(performance_loss(80.0), 45.0);
        assert_eq!(performance_loss(90.0), 62.5);
        assert_eq!(performance_loss(100.0), 82.5);
    }

    #[test]
    fn test_failure_risk_table() {
        let risks: Vec<f64> = [10.0, 65.0, 75.0, 85.0, 92.0, 99.0]
            .into_iter()
            .map(failure_risk)
            .collect();
        assert_eq!(risks, vec![0.0, 5.0, 15.0, 40.0, 75.0, 95.0]);
    }

    #[test]
    fn test_wear_rate_accelerates() {
        assert_eq!(wear_rate(PartKind::Engine, 10.0), 4.5);
        assert!((wear_rate(PartKind::Engine, 60.0) - 5.4).abs() < 1e-9);
        assert!((wear_rate(PartKind::Engine, 80.0) - 6.75).abs() < 1e-9);
    }

    #[test]
    fn test_track_multipliers() {
        let mut track = mock_snapshot().track.unwrap();
        assert_eq!(track_wear_multiplier(PartKind::Engine, &track), 1.4);
        assert_eq!(track_wear_multiplier(PartKind::Brakes, &track), 0.7);
        assert_eq!(track_wear_multiplier(PartKind::Suspension, &track), 1.0);
        track.power_importance = 40.0;
        track.handling_importance = 90.0;
        assert_eq!(track_wear_multiplier(PartKind::Suspension, &track), 1.5);
        track.handling_importance = 50.0;
        assert_eq!(track_wear_multiplier(PartKind::Engine, &track), 1.0);
    }

    #[test]
    fn test_monza_analysis() {
        let analysis = analyze_parts_wear(&mock_snapshot(), 10).unwrap();

        assert_eq!(analysis.current_status.len(), 11);
        assert_eq!(analysis.current_status[0].part, PartKind::Cooling);
        assert!(
            analysis
                .current_status
                .windows(2)
                .all(|w| w[0].current_wear >= w[1].current_wear)
        );
        assert_eq!(analysis.predictions.len(), 110);
        assert!(analysis.maintenance_plan.immediate_actions.is_empty());
        assert_eq!(analysis.budget_analysis.current_budget, DEFAULT_BUDGET);
        assert_eq!(analysis.season_projection.total_races, 10);
        assert_eq!(analysis.season_projection.end_of_season_status.len(), 11);
    }

    #[test]
    fn test_worn_parts_get_immediate_actions() {
        let mut car = CarData::uniform(CarPart::new(10, 20.0, 90.0));
        car.engine = CarPart::new(10, 90.0, 70.0);
        car.brakes = CarPart::new(10, 75.0, 80.0);
        let analysis = analyze_parts_wear(&snapshot_with_car(car), 10).unwrap();
        let plan = &analysis.maintenance_plan;

        let engine = plan
            .immediate_actions
            .iter()
            .find(|a| a.part == PartKind::Engine)
            .unwrap();
        assert_eq!(engine.action, MaintenanceKind::Replace);
        assert_eq!(engine.cost, 800_000);
        let brakes = plan
            .immediate_actions
            .iter()
            .find(|a| a.part == PartKind::Brakes)
            .unwrap();
        assert_eq!(brakes.action, MaintenanceKind::Repair);
        assert_eq!(brakes.cost, 45_000);
        assert!(plan.immediate_actions.iter().all(|a| a.race == 0));

        assert_eq!(analysis.alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(analysis.alerts[0].part, PartKind::Engine);
        assert!(
            analysis
                .alerts
                .windows(2)
                .all(|w| w[0].severity <= w[1].severity)
        );
    }

    #[test]
    fn test_mid_season_maintenance_is_scheduled() {
        let mut car = CarData::uniform(CarPart::new(16, 10.0, 95.0));
        car.brakes.wear = 45.0;
        let analysis = analyze_parts_wear(&snapshot_with_car(car), 10).unwrap();
        let scheduled = &analysis.maintenance_plan.scheduled_maintenance;
        // 45 + 5.2 * 0.7 * 5 = 63.2 at race 5
        assert!(
            scheduled
                .iter()
                .any(|a| a.part == PartKind::Brakes && a.race == 5)
        );
    }

    #[test]
    fn test_upgrades_need_a_return_above_half() {
        // the cheapest upgrade from level 0 returns 100 * 1000 / 300000 = 0.33
        let car = CarData::uniform(CarPart::new(0, 10.0, 95.0));
        let analysis = analyze_parts_wear(&snapshot_with_car(car), 4).unwrap();
        assert!(analysis.maintenance_plan.optimal_replacement.is_empty());
    }

    #[test]
    fn test_budget_efficiency_is_clamped() {
        let car = CarData::uniform(CarPart::new(10, 90.0, 50.0));
        let analysis = analyze_parts_wear_with_budget(&snapshot_with_car(car), 5, 100_000.0).unwrap();
        assert_eq!(analysis.budget_analysis.efficiency_score, 0);
        assert_eq!(analysis.budget_analysis.savings_opportunities.len(), 3);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            analyze_parts_wear(&mock_snapshot(), 0),
            Err(GproError::InvalidUserInput { .. })
        ));
        assert!(matches!(
            analyze_parts_wear_with_budget(&mock_snapshot(), 5, 0.0),
            Err(GproError::InvalidUserInput { .. })
        ));
        let snapshot = Snapshot {
            track: None,
            ..mock_snapshot()
        };
        assert!(matches!(
            analyze_parts_wear(&snapshot, 5),
            Err(GproError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_driver_and_weather_are_optional() {
        let snapshot = Snapshot {
            driver: None,
            weather: None,
            ..mock_snapshot()
        };
        assert!(analyze_parts_wear(&snapshot, 3).is_ok());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_performance_loss_non_decreasing(a in 0.0f64..100.0, b in 0.0f64..100.0) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(performance_loss(high) >= performance_loss(low));
            prop_assert!(failure_risk(high) >= failure_risk(low));
        }

        #[test]
        fn prop_wear_analysis_ranges(snapshot in arb_snapshot(), races in 1u32..20) {
            let analysis = analyze_parts_wear(&snapshot, races).unwrap();
            prop_assert!(analysis.budget_analysis.efficiency_score <= 100);
            prop_assert_eq!(analysis.predictions.len() as u32, races * 11);
            for prediction in &analysis.predictions {
                prop_assert!(prediction.predicted_wear <= 100.0);
                prop_assert!((0.0..=95.0).contains(&prediction.failure_risk));
            }
        }
    }
}
