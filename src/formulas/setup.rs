use log::debug;
use serde::{Deserialize, Serialize};

use super::{LapTime, RiskLevel, SetupFocus, TyreCompound, clamp_round};
use crate::errors::GproError;
use crate::snapshot::{CarData, DriverData, Snapshot, TrackData, WeatherCondition, WeatherData};

/// The six setup dials plus the discrete race choices.
///
/// Every dial is an integer in [0, 1000].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupConfiguration {
    pub front_wing: u32,
    pub rear_wing: u32,
    pub engine: u32,
    pub brakes: u32,
    pub gear: u32,
    pub suspension: u32,
    pub risk: RiskLevel,
    pub tyre_compound: TyreCompound,
    pub focus: SetupFocus,
}

impl SetupConfiguration {
    pub fn dials(&self) -> [(&'static str, u32); 6] {
        [
            ("Front Wing", self.front_wing),
            ("Rear Wing", self.rear_wing),
            ("Engine", self.engine),
            ("Brakes", self.brakes),
            ("Gear", self.gear),
            ("Suspension", self.suspension),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupResult {
    pub qualifying: SetupConfiguration,
    pub race: SetupConfiguration,
    /// Percentage in [30, 95]
    pub confidence: u32,
    /// Lap time expected with the race setup
    pub expected_lap_time: LapTime,
    pub notes: Vec<String>,
}

/// Compute qualifying and race setups for the snapshot's weekend.
pub fn calculate_optimal_setup(snapshot: &Snapshot) -> Result<SetupResult, GproError> {
    let driver = snapshot.driver()?;
    let car = snapshot.car()?;
    let track = snapshot.track()?;
    let weather = snapshot.weather()?;

    let qualifying = qualifying_setup(&driver, &track, &weather.qualifying);
    let race = race_setup(&driver, &track, &weather.race);
    let confidence = setup_confidence(&driver, &car, &track);
    let expected_lap_time = estimate_lap_time(&driver, &car, &track, &race);
    let notes = setup_notes(&driver, &car, &track, &weather);

    debug!(
        "Setup for {}: qualifying {:?}, race {:?}, confidence {}",
        track.name, qualifying, race, confidence
    );

    Ok(SetupResult {
        qualifying,
        race,
        confidence,
        expected_lap_time,
        notes,
    })
}

/// Single lap setup driven by the track's importance weights.
fn qualifying_setup(
    driver: &DriverData,
    track: &TrackData,
    weather: &WeatherCondition,
) -> SetupConfiguration {
    let power = track.power_importance / 100.0;
    let handling = track.handling_importance / 100.0;
    let acceleration = track.acceleration_importance / 100.0;
    let downforce = track.downforce_importance;

    let risk = if driver.aggressiveness > 70.0 {
        RiskLevel::High
    } else if driver.aggressiveness > 50.0 {
        RiskLevel::Normal
    } else {
        RiskLevel::Low
    };
    let tyre_compound = if weather.temperature > 25.0 {
        TyreCompound::Soft
    } else {
        TyreCompound::ExtraSoft
    };

    SetupConfiguration {
        front_wing: clamp_round(downforce * 8.0 + handling * 200.0 - power * 150.0, 0.0, 1000.0),
        rear_wing: clamp_round(downforce * 10.0 + handling * 150.0 - power * 100.0, 0.0, 1000.0),
        engine: clamp_round(500.0 + power * 400.0 + acceleration * 200.0, 200.0, 1000.0),
        brakes: clamp_round(
            300.0 + track.overtaking_difficulty * 4.0 + handling * 300.0,
            100.0,
            1000.0,
        ),
        gear: clamp_round(600.0 - acceleration * 200.0 + power * 150.0, 200.0, 1000.0),
        suspension: clamp_round(400.0 + handling * 400.0 + track.grip_level * 2.0, 100.0, 1000.0),
        risk,
        tyre_compound,
        focus: SetupFocus::Qualifying,
    }
}

/// Race setup: the single lap setup for race weather made more conservative.
fn race_setup(
    driver: &DriverData,
    track: &TrackData,
    weather: &WeatherCondition,
) -> SetupConfiguration {
    let base = qualifying_setup(driver, track, weather);
    let mut race = SetupConfiguration {
        front_wing: base.front_wing.saturating_sub(50),
        rear_wing: (base.rear_wing + 30).min(1000),
        engine: base.engine.saturating_sub(100).max(100),
        brakes: base.brakes.saturating_sub(50).max(50),
        gear: base.gear,
        suspension: base.suspension.saturating_sub(30).max(50),
        risk: base.risk.lower(1),
        tyre_compound: base.tyre_compound.harder(1),
        focus: SetupFocus::Race,
    };

    if track.tyre_wear > 70.0 {
        race.tyre_compound = race.tyre_compound.harder(1);
        race.risk = race.risk.lower(1);
    }
    if track.fuel_consumption > 80.0 {
        race.engine = race.engine.saturating_sub(50).max(50);
    }
    race
}

fn setup_confidence(driver: &DriverData, car: &CarData, track: &TrackData) -> u32 {
    let mut confidence = 70.0;
    confidence += (driver.experience - 50.0) * 0.3;
    confidence += (driver.technical_insight - 50.0) * 0.2;
    confidence -= car.average_wear() * 0.2;
    if track.overtaking_difficulty > 70.0 {
        confidence -= 10.0;
    }
    confidence.round().clamp(30.0, 95.0) as u32
}

fn estimate_lap_time(
    driver: &DriverData,
    car: &CarData,
    track: &TrackData,
    setup: &SetupConfiguration,
) -> LapTime {
    let base_lap = 60.0 + track.length_km * 12.0;
    let driver_factor = 1.0 - (driver.overall - 50.0) / 200.0;
    let car_factor = 1.0 - (car.average_performance() - 50.0) / 300.0;
    LapTime::from_seconds(base_lap * driver_factor * car_factor * setup_efficiency(setup))
}

/// Penalty factor for unbalanced wings and for a high engine mode paired with
/// a lot of drag.
fn setup_efficiency(setup: &SetupConfiguration) -> f64 {
    let mut efficiency = 1.0;
    let wing_balance = setup.rear_wing as i64 - setup.front_wing as i64;
    if wing_balance.abs() > 200 {
        efficiency *= 0.98;
    }
    if setup.engine > 800 && setup.front_wing + setup.rear_wing > 1500 {
        efficiency *= 0.96;
    }
    efficiency
}

fn setup_notes(
    driver: &DriverData,
    car: &CarData,
    track: &TrackData,
    weather: &WeatherData,
) -> Vec<String> {
    let checks = [
        (
            track.power_importance > 80.0,
            "High speed track: setup tuned for maximum power",
        ),
        (
            track.handling_importance > 80.0,
            "Technical track: focus on handling and downforce",
        ),
        (
            track.tyre_wear > 70.0,
            "High tyre wear: conservative race setup recommended",
        ),
        (
            track.fuel_consumption > 80.0,
            "High fuel consumption: engine turned down for the race",
        ),
        (
            weather.race.rain_probability > 30.0,
            "Rain risk: consider intermediate tyres",
        ),
        (
            weather.race.temperature > 30.0,
            "High temperature: watch for tyre overheating",
        ),
        (
            car.average_wear() > 50.0,
            "Worn car: reduced performance, setup kept conservative",
        ),
        (
            driver.technical_insight < 60.0,
            "Low technical insight: results are less precise",
        ),
        (
            driver.aggressiveness > 80.0,
            "Aggressive style: higher risk with a higher potential reward",
        ),
    ];

    checks
        .into_iter()
        .filter(|(applies, _)| *applies)
        .map(|(_, note)| note.to_string())
        .collect()
}
