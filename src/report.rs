// Plain text rendering of formula results for the terminal

use itertools::Itertools;

use crate::formulas::{
    overtaking::OvertakingAnalysis,
    parts_wear::PartsWearAnalysis,
    post_race::PostRaceAnalysis,
    qualifying::QualifyingResult,
    setup::{SetupConfiguration, SetupResult},
    strategy::{
        FuelCalculation, PitWindowAnalysis, StrategyResult, StrategyScenario, TyreRecommendation,
    },
};
use crate::writer::ReportRecord;

fn section(title: &str) -> String {
    format!("{title}\n{}", "=".repeat(title.len()))
}

fn bullets<'a>(items: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    items.into_iter().map(|item| format!("  - {item}")).collect()
}

fn format_configuration(config: &SetupConfiguration) -> Vec<String> {
    let mut lines = vec![format!("{} setup", config.focus)];
    lines.extend(
        config
            .dials()
            .iter()
            .map(|(name, value)| format!("  {name:<12} {value:>4}")),
    );
    lines.push(format!("  {:<12} {}", "Risk", config.risk));
    lines.push(format!("  {:<12} {}", "Tyres", config.tyre_compound));
    lines
}

pub fn format_setup(setup: &SetupResult) -> String {
    let mut lines = vec![section("Car setup")];
    lines.extend(format_configuration(&setup.qualifying));
    lines.extend(format_configuration(&setup.race));
    lines.push(format!("Expected lap time: {}", setup.expected_lap_time));
    lines.push(format!("Confidence: {}%", setup.confidence));
    if !setup.notes.is_empty() {
        lines.push("Notes:".to_string());
        lines.extend(bullets(&setup.notes));
    }
    lines.join("\n")
}

pub fn format_strategy(strategy: &StrategyResult) -> String {
    let fuel = &strategy.fuel_strategy;
    let pits = &strategy.pit_strategy;
    let tyres = &strategy.tyre_strategy;

    let mut lines = vec![
        section("Race strategy"),
        format!(
            "Fuel: qualifying {} L, race {} L (buffer {} L), total {} L",
            fuel.qualifying_fuel, fuel.race_fuel, fuel.safety_buffer, fuel.total_fuel
        ),
        format!(
            "Tyres: {} for qualifying, {} for the race ({:.1}% expected wear)",
            tyres.qualifying_compound, tyres.race_compound, tyres.expected_wear
        ),
        format!(
            "Pit stops: {} ({:.1}s in the pit lane)",
            pits.recommended_stops, pits.total_pit_time
        ),
    ];
    lines.extend(pits.pit_windows.iter().map(|stop| match stop.compound_change {
        Some(compound) => format!("  lap {:>3}: {} -> {}", stop.lap, stop.reason, compound),
        None => format!("  lap {:>3}: {}", stop.lap, stop.reason),
    }));
    lines.push(format!(
        "Estimated race time: {}",
        strategy.estimated_race_time
    ));
    lines.push(format!("Confidence: {}%", strategy.confidence));
    if !strategy.notes.is_empty() {
        lines.push("Notes:".to_string());
        lines.extend(bullets(&strategy.notes));
    }
    lines.join("\n")
}

pub fn format_fuel(fuel: &FuelCalculation) -> String {
    [
        section("Fuel"),
        format!("Per lap: {:.2} L", fuel.per_lap),
        format!("Race total: {:.1} L", fuel.total),
        format!("With safety margin: {:.1} L", fuel.safety),
        format!("Efficiency: {}", fuel.efficiency),
        fuel.recommendation.clone(),
    ]
    .join("\n")
}

/// Tyre choice, pit window and the canned race plans shown next to the fuel figures.
pub fn format_tyre_plan(
    tyres: &TyreRecommendation,
    pit_window: &PitWindowAnalysis,
    scenarios: &[StrategyScenario],
) -> String {
    let mut lines = vec![
        section("Tyres and pit window"),
        format!(
            "Tyres: {} (fallback {}), {}% confidence, {}% degradation",
            tyres.primary, tyres.secondary, tyres.confidence, tyres.expected_degradation
        ),
        tyres.reason.clone(),
        format!(
            "Pit on lap {} (alternatives {}), traffic {:.1}, weather risk {:.1}",
            pit_window.optimal,
            pit_window.alternatives.iter().join(", "),
            pit_window.traffic_factor,
            pit_window.weather_risk
        ),
    ];
    lines.extend(scenarios.iter().map(|scenario| {
        format!(
            "  {:<14} {:<10} P{:<2} {:>3}% risk {:<6} {}",
            scenario.name,
            scenario.estimated_time,
            scenario.position,
            scenario.probability,
            scenario.risk.to_string(),
            scenario.strategy
        )
    }));
    lines.join("\n")
}

pub fn format_qualifying_report(qualifying: &QualifyingResult) -> String {
    let plan = &qualifying.strategy;
    let mut lines = vec![
        section("Qualifying"),
        format!(
            "Predicted grid position: P{}{}",
            qualifying.predicted_position,
            if qualifying.grid_penalty > 0 {
                format!(" (+{} penalty)", qualifying.grid_penalty)
            } else {
                String::new()
            }
        ),
        format!(
            "Q1 {}  Q2 {}  (confidence {}%)",
            qualifying.q1_time, qualifying.q2_time, qualifying.confidence
        ),
    ];
    for (name, session) in [("Q1", &plan.q1), ("Q2", &plan.q2)] {
        lines.push(format!(
            "{name}: {} L, {} tyres, push {}%, best lap {}",
            session.fuel_load, session.tyre_compound, session.push_level, session.optimal_lap_window
        ));
    }
    lines.push(format!(
        "Track evolution {:.1}%, traffic risk {}",
        plan.track_evolution, plan.traffic_risk
    ));
    if !qualifying.risk_factors.is_empty() {
        lines.push("Risk factors:".to_string());
        lines.extend(bullets(&qualifying.risk_factors));
    }
    lines.push("Competitors:".to_string());
    lines.extend(qualifying.competitors.iter().map(|c| {
        format!(
            "  P{:<2} {}  threat {:<6} {}",
            c.position,
            c.expected_time,
            c.threat_level.to_string(),
            c.weakness
        )
    }));
    lines.join("\n")
}

pub fn format_wear_report(wear: &PartsWearAnalysis) -> String {
    let mut lines = vec![section("Parts wear")];
    lines.extend(wear.current_status.iter().map(|status| {
        format!(
            "  {:<12} wear {:>5.1}%  perf {:>5.1}%  {:<9} {} races to critical",
            status.part.to_string(),
            status.current_wear,
            status.performance,
            status.health_status.to_string(),
            status.races_until_critical
        )
    }));

    if !wear.alerts.is_empty() {
        lines.push("Alerts:".to_string());
        lines.extend(wear.alerts.iter().map(|alert| {
            format!(
                "  [{}] {}: {} ({})",
                alert.severity, alert.part, alert.message, alert.action_required
            )
        }));
    }

    let plan = &wear.maintenance_plan;
    let actions = plan
        .immediate_actions
        .iter()
        .chain(&plan.scheduled_maintenance)
        .collect_vec();
    if !actions.is_empty() {
        lines.push("Maintenance:".to_string());
        lines.extend(actions.iter().map(|action| {
            format!(
                "  race {:>2}: {} {} ({}, {} priority) {}",
                action.race, action.action, action.part, action.cost, action.priority, action.reason
            )
        }));
    }

    let budget = &wear.budget_analysis;
    lines.push(format!(
        "Budget: {:.0} available, {} projected, {} per race, efficiency {}",
        budget.current_budget, budget.projected_spend, budget.cost_per_race, budget.efficiency_score
    ));
    lines.push(format!(
        "Season: {} races, {} replacements, {} total, trend {}",
        wear.season_projection.total_races,
        wear.season_projection.projected_replacements,
        wear.season_projection.estimated_total_cost,
        wear.season_projection.performance_trend
    ));
    lines.join("\n")
}

pub fn format_overtaking_report(overtaking: &OvertakingAnalysis) -> String {
    let mut lines = vec![
        section("Overtaking"),
        format!("Running P{}", overtaking.current_position),
    ];

    if overtaking.opportunities.is_empty() {
        lines.push("No cars ahead".to_string());
    }
    for opportunity in &overtaking.opportunities {
        lines.push(format!(
            "  {} {:>2}% {:<9} lap {:>3} at {}: {}",
            opportunity.target_driver,
            opportunity.success_probability,
            opportunity.risk_level.to_string(),
            opportunity.optimal_lap,
            opportunity.optimal_turn,
            opportunity.recommendation
        ));
        lines.extend(
            opportunity
                .reasoning
                .iter()
                .map(|reason| format!("      {reason}")),
        );
    }

    let matrix = &overtaking.risk_matrix;
    lines.push(format!(
        "Risk {} / reward {} in {}: {}",
        matrix.risk_score, matrix.reward_score, matrix.track_section, matrix.recommendation
    ));
    lines.push(format!(
        "Aggressiveness {:.0}%, overtaking windows: {}",
        overtaking.optimal_strategy.aggressiveness,
        overtaking
            .optimal_strategy
            .overtaking_windows
            .iter()
            .map(|lap| format!("lap {lap}"))
            .join(", ")
    ));
    lines.extend(overtaking.drs_zones.iter().map(|zone| {
        format!(
            "DRS {}: {} {:.0} m, {:.0}% success",
            zone.zone, zone.location, zone.length, zone.success_rate
        )
    }));
    lines.push(format!(
        "Incident risk {}% ({})",
        overtaking.incident_probability.total_risk, overtaking.incident_probability.historical_data
    ));

    let gains = &overtaking.expected_gains;
    lines.push(format!(
        "Best +{} ({} pts), likely +{} ({} pts), worst -{} ({} pts), expected {:.1} pts",
        gains.best_case.positions,
        gains.best_case.points,
        gains.likely_case.positions,
        gains.likely_case.points,
        gains.worst_case.positions,
        gains.worst_case.points,
        gains.expected_value
    ));
    lines.join("\n")
}

pub fn format_post_race_report(analysis: &PostRaceAnalysis) -> String {
    let setup = &analysis.setup_analysis;
    let strategy = &analysis.strategy_analysis;
    let overall = &analysis.overall_performance;

    let mut lines = vec![
        section("Post-race analysis"),
        format!(
            "Lap time: predicted {}, actual {} ({:+.3}s, {})",
            setup.predicted_lap_time, setup.actual_best_lap, setup.time_difference, setup.accuracy
        ),
        format!("Setup effectiveness: {}", setup.setup_effectiveness),
        format!(
            "Stops: {} planned, {} made. {}",
            strategy.predicted_stops, strategy.actual_stops, strategy.strategy_deviation
        ),
        format!(
            "Fuel: {:.1} L planned, {:.1} L used ({})",
            strategy.fuel_efficiency.predicted,
            strategy.fuel_efficiency.actual,
            strategy.fuel_efficiency.accuracy
        ),
        format!(
            "Pit laps: planned [{}], actual [{}] ({})",
            strategy.pit_timing.predicted_laps.iter().join(", "),
            strategy.pit_timing.actual_laps.iter().join(", "),
            strategy.pit_timing.timing_accuracy
        ),
        format!("Race score: {}", overall.race_score),
    ];
    for (title, items) in [
        ("Strengths", &overall.strengths),
        ("Improvements", &overall.improvements),
        ("Lessons", &overall.lessons),
    ] {
        if !items.is_empty() {
            lines.push(format!("{title}:"));
            lines.extend(bullets(items));
        }
    }
    lines.push(format!(
        "Reliability {}%, data completeness {}%",
        analysis.analysis_reliability, analysis.data_completeness
    ));
    lines.join("\n")
}

/// Render any logged record with its matching formatter.
pub fn format_report(record: &ReportRecord) -> String {
    match record {
        ReportRecord::Setup(setup) => format_setup(setup),
        ReportRecord::Strategy(strategy) => format_strategy(strategy),
        ReportRecord::Fuel(fuel) => format_fuel(fuel),
        ReportRecord::Qualifying(qualifying) => format_qualifying_report(qualifying),
        ReportRecord::Wear(wear) => format_wear_report(wear),
        ReportRecord::Overtaking(overtaking) => format_overtaking_report(overtaking),
        ReportRecord::PostRace(analysis) => format_post_race_report(analysis),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formulas::{
        overtaking::analyze_overtaking, parts_wear::analyze_parts_wear,
        post_race::analyze_race_performance, qualifying::simulate_qualifying,
        setup::calculate_optimal_setup, strategy::calculate_race_strategy,
    };
    use crate::snapshot::mock::{mock_race_result, mock_snapshot};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_setup_report_lists_both_configurations() {
        let setup = calculate_optimal_setup(&mock_snapshot()).unwrap();
        let report = format_setup(&setup);
        assert!(report.starts_with("Car setup\n========="));
        assert!(report.contains("Qualifying setup"));
        assert!(report.contains("Race setup"));
        assert!(report.contains(&format!("Expected lap time: {}", setup.expected_lap_time)));
    }

    #[test]
    fn test_strategy_report_lists_pit_stops() {
        let strategy = calculate_race_strategy(&mock_snapshot()).unwrap();
        let report = format_strategy(&strategy);
        for stop in &strategy.pit_strategy.pit_windows {
            assert!(report.contains(&format!("lap {:>3}", stop.lap)));
        }
        assert!(report.contains(&strategy.estimated_race_time));
    }

    #[test]
    fn test_reports_render_for_every_formula() {
        let snapshot = mock_snapshot();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let qualifying = simulate_qualifying(&snapshot, &mut rng).unwrap();
        assert!(format_qualifying_report(&qualifying).contains("Competitors:"));

        let wear = analyze_parts_wear(&snapshot, 10).unwrap();
        assert!(format_wear_report(&wear).contains("Season: 10 races"));

        let overtaking = analyze_overtaking(&snapshot, 8, 20, 53, &mut rng).unwrap();
        assert!(format_overtaking_report(&overtaking).contains("Running P8"));

        let leader = analyze_overtaking(&snapshot, 1, 20, 53, &mut rng).unwrap();
        assert!(format_overtaking_report(&leader).contains("No cars ahead"));
    }

    #[test]
    fn test_tyre_plan_lists_scenarios() {
        use crate::formulas::strategy::{
            calculate_pit_window, strategy_scenarios, tyre_recommendation,
        };
        let snapshot = mock_snapshot();
        let track = snapshot.track().unwrap();
        let weather = snapshot.weather().unwrap();
        let tyres = tyre_recommendation(&track, &weather.race, 85.0, 80.0);
        let window = calculate_pit_window(track.laps, 30, 70.0);
        let scenarios = strategy_scenarios(&track, &tyres, track.laps);

        let report = format_tyre_plan(&tyres, &window, &scenarios);
        assert!(report.contains(&format!("Pit on lap {}", window.optimal)));
        assert_eq!(report.lines().count(), 5 + scenarios.len());
    }

    #[test]
    fn test_format_report_dispatches_by_kind() {
        let setup = calculate_optimal_setup(&mock_snapshot()).unwrap();
        let record = ReportRecord::Setup(setup.clone());
        assert_eq!(format_report(&record), format_setup(&setup));
    }

    #[test]
    fn test_post_race_report() {
        let snapshot = mock_snapshot();
        let setup = calculate_optimal_setup(&snapshot).unwrap();
        let strategy = calculate_race_strategy(&snapshot).unwrap();
        let analysis = analyze_race_performance(&setup, &strategy, &mock_race_result()).unwrap();

        let report = format_post_race_report(&analysis);
        assert!(report.contains("actual 1:21.234"));
        assert!(report.contains("Pit laps: planned ["));
        assert!(report.contains("actual [21, 37]"));
    }
}
