// Race weekend snapshot: the driver, car, track and weather records every
// formula consumes.

pub mod mock;
pub mod provider;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::errors::GproError;

pub use provider::{FileSnapshotProvider, MockSnapshotProvider, ProviderKind, SnapshotProvider};

/// Names the top-level records of a [`Snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotField {
    Driver,
    Car,
    Track,
    Weather,
}

impl std::fmt::Display for SnapshotField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotField::Driver => write!(f, "driver"),
            SnapshotField::Car => write!(f, "car"),
            SnapshotField::Track => write!(f, "track"),
            SnapshotField::Weather => write!(f, "weather"),
        }
    }
}

/// Clamp a [0,100] rating, warning when the source value was out of range.
pub(crate) fn clamp_rating(record: &str, field: &str, value: f64) -> f64 {
    let clamped = value.clamp(0.0, 100.0);
    if clamped != value {
        warn!(
            "{}.{} = {} is outside [0, 100], clamping to {}",
            record, field, value, clamped
        );
    }
    clamped
}

/// Driver skill attributes. Skills are ratings in [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverData {
    #[serde(default)]
    pub name: String,
    pub overall: f64,
    pub concentration: f64,
    pub talent: f64,
    pub aggressiveness: f64,
    pub experience: f64,
    pub technical_insight: f64,
    pub stamina: f64,
    pub charisma: f64,
    pub motivation: f64,
    /// Driver weight in kg
    pub weight: f64,
    pub age: u32,
}

impl DriverData {
    /// Copy of this record with every skill clamped into [0, 100].
    pub fn clamped(&self) -> Self {
        let c = |field: &str, value: f64| clamp_rating("driver", field, value);
        Self {
            name: self.name.clone(),
            overall: c("overall", self.overall),
            concentration: c("concentration", self.concentration),
            talent: c("talent", self.talent),
            aggressiveness: c("aggressiveness", self.aggressiveness),
            experience: c("experience", self.experience),
            technical_insight: c("technical_insight", self.technical_insight),
            stamina: c("stamina", self.stamina),
            charisma: c("charisma", self.charisma),
            motivation: c("motivation", self.motivation),
            weight: self.weight,
            age: self.age,
        }
    }
}

/// The eleven parts that make up a car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartKind {
    Chassis,
    Engine,
    FrontWing,
    RearWing,
    Underbody,
    Sidepods,
    Cooling,
    Gearbox,
    Brakes,
    Suspension,
    Electronics,
}

impl PartKind {
    pub const ALL: [PartKind; 11] = [
        PartKind::Chassis,
        PartKind::Engine,
        PartKind::FrontWing,
        PartKind::RearWing,
        PartKind::Underbody,
        PartKind::Sidepods,
        PartKind::Cooling,
        PartKind::Gearbox,
        PartKind::Brakes,
        PartKind::Suspension,
        PartKind::Electronics,
    ];
}

impl std::fmt::Display for PartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartKind::Chassis => write!(f, "Chassis"),
            PartKind::Engine => write!(f, "Engine"),
            PartKind::FrontWing => write!(f, "Front Wing"),
            PartKind::RearWing => write!(f, "Rear Wing"),
            PartKind::Underbody => write!(f, "Underbody"),
            PartKind::Sidepods => write!(f, "Sidepods"),
            PartKind::Cooling => write!(f, "Cooling"),
            PartKind::Gearbox => write!(f, "Gearbox"),
            PartKind::Brakes => write!(f, "Brakes"),
            PartKind::Suspension => write!(f, "Suspension"),
            PartKind::Electronics => write!(f, "Electronics"),
        }
    }
}

/// State of a single car part.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarPart {
    /// Upgrade tier, unbounded
    pub level: u32,
    /// Wear percentage, 0 = brand new
    pub wear: f64,
    /// Performance percentage, 100 = perfect
    pub performance: f64,
}

impl CarPart {
    pub fn new(level: u32, wear: f64, performance: f64) -> Self {
        Self {
            level,
            wear,
            performance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarData {
    pub chassis: CarPart,
    pub engine: CarPart,
    pub front_wing: CarPart,
    pub rear_wing: CarPart,
    pub underbody: CarPart,
    pub sidepods: CarPart,
    pub cooling: CarPart,
    pub gearbox: CarPart,
    pub brakes: CarPart,
    pub suspension: CarPart,
    pub electronics: CarPart,
}

impl CarData {
    /// Build a car where every part has the same state.
    pub fn uniform(part: CarPart) -> Self {
        Self {
            chassis: part,
            engine: part,
            front_wing: part,
            rear_wing: part,
            underbody: part,
            sidepods: part,
            cooling: part,
            gearbox: part,
            brakes: part,
            suspension: part,
            electronics: part,
        }
    }

    pub fn part(&self, kind: PartKind) -> &CarPart {
        match kind {
            PartKind::Chassis => &self.chassis,
            PartKind::Engine => &self.engine,
            PartKind::FrontWing => &self.front_wing,
            PartKind::RearWing => &self.rear_wing,
            PartKind::Underbody => &self.underbody,
            PartKind::Sidepods => &self.sidepods,
            PartKind::Cooling => &self.cooling,
            PartKind::Gearbox => &self.gearbox,
            PartKind::Brakes => &self.brakes,
            PartKind::Suspension => &self.suspension,
            PartKind::Electronics => &self.electronics,
        }
    }

    pub fn part_mut(&mut self, kind: PartKind) -> &mut CarPart {
        match kind {
            PartKind::Chassis => &mut self.chassis,
            PartKind::Engine => &mut self.engine,
            PartKind::FrontWing => &mut self.front_wing,
            PartKind::RearWing => &mut self.rear_wing,
            PartKind::Underbody => &mut self.underbody,
            PartKind::Sidepods => &mut self.sidepods,
            PartKind::Cooling => &mut self.cooling,
            PartKind::Gearbox => &mut self.gearbox,
            PartKind::Brakes => &mut self.brakes,
            PartKind::Suspension => &mut self.suspension,
            PartKind::Electronics => &mut self.electronics,
        }
    }

    /// Iterate the parts in their fixed order.
    pub fn parts(&self) -> impl Iterator<Item = (PartKind, &CarPart)> {
        PartKind::ALL.into_iter().map(move |kind| (kind, self.part(kind)))
    }

    /// Mean performance over all parts.
    pub fn average_performance(&self) -> f64 {
        self.parts().map(|(_, p)| p.performance).sum::<f64>() / PartKind::ALL.len() as f64
    }

    /// Mean wear over all parts.
    pub fn average_wear(&self) -> f64 {
        self.parts().map(|(_, p)| p.wear).sum::<f64>() / PartKind::ALL.len() as f64
    }

    /// Copy of this record with wear and performance clamped into [0, 100].
    pub fn clamped(&self) -> Self {
        let mut car = self.clone();
        for kind in PartKind::ALL {
            let record = format!("car.{kind}");
            let part = car.part_mut(kind);
            part.wear = clamp_rating(&record, "wear", part.wear);
            part.performance = clamp_rating(&record, "performance", part.performance);
        }
        car
    }
}

/// Overall difficulty class of a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackDifficulty {
    Easy,
    Medium,
    Hard,
    VeryHard,
}

/// Circuit family, used to scale part wear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackType {
    Speedway,
    Street,
    Road,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackData {
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(alias = "length")]
    pub length_km: f64,
    pub laps: u32,
    pub power_importance: f64,
    pub handling_importance: f64,
    pub acceleration_importance: f64,
    pub overtaking_difficulty: f64,
    pub fuel_consumption: f64,
    pub tyre_wear: f64,
    pub grip_level: f64,
    pub downforce_importance: f64,
}

impl TrackData {
    pub fn difficulty(&self) -> TrackDifficulty {
        match self.overtaking_difficulty {
            d if d > 80.0 => TrackDifficulty::VeryHard,
            d if d > 60.0 => TrackDifficulty::Hard,
            d if d > 35.0 => TrackDifficulty::Medium,
            _ => TrackDifficulty::Easy,
        }
    }

    pub fn track_type(&self) -> TrackType {
        if self.power_importance > 80.0 {
            TrackType::Speedway
        } else if self.handling_importance > 80.0 {
            TrackType::Street
        } else {
            TrackType::Road
        }
    }

    /// Copy of this record with importance, difficulty and rating fields
    /// clamped into [0, 100].
    pub fn clamped(&self) -> Self {
        let c = |field: &str, value: f64| clamp_rating("track", field, value);
        Self {
            name: self.name.clone(),
            country: self.country.clone(),
            length_km: self.length_km.max(0.0),
            laps: self.laps,
            power_importance: c("power_importance", self.power_importance),
            handling_importance: c("handling_importance", self.handling_importance),
            acceleration_importance: c("acceleration_importance", self.acceleration_importance),
            overtaking_difficulty: c("overtaking_difficulty", self.overtaking_difficulty),
            fuel_consumption: c("fuel_consumption", self.fuel_consumption),
            tyre_wear: c("tyre_wear", self.tyre_wear),
            grip_level: c("grip_level", self.grip_level),
            downforce_importance: c("downforce_importance", self.downforce_importance),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conditions {
    Sunny,
    Cloudy,
    Overcast,
    LightRain,
    HeavyRain,
}

impl Conditions {
    pub fn is_rain(&self) -> bool {
        matches!(self, Conditions::LightRain | Conditions::HeavyRain)
    }
}

impl std::fmt::Display for Conditions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Conditions::Sunny => write!(f, "Sunny"),
            Conditions::Cloudy => write!(f, "Cloudy"),
            Conditions::Overcast => write!(f, "Overcast"),
            Conditions::LightRain => write!(f, "Light Rain"),
            Conditions::HeavyRain => write!(f, "Heavy Rain"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
    /// Air temperature in Celsius
    pub temperature: f64,
    /// Relative humidity percentage
    pub humidity: f64,
    /// Chance of rain percentage
    pub rain_probability: f64,
    /// Wind speed in km/h
    pub wind_speed: f64,
    pub conditions: Conditions,
}

impl WeatherCondition {
    pub fn clamped(&self, session: &str) -> Self {
        let record = format!("weather.{session}");
        Self {
            humidity: clamp_rating(&record, "humidity", self.humidity),
            rain_probability: clamp_rating(&record, "rain_probability", self.rain_probability),
            wind_speed: self.wind_speed.max(0.0),
            ..*self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub qualifying: WeatherCondition,
    pub race: WeatherCondition,
    /// Forecast accuracy percentage
    pub forecast_accuracy: f64,
}

impl WeatherData {
    pub fn clamped(&self) -> Self {
        Self {
            qualifying: self.qualifying.clamped("qualifying"),
            race: self.race.clamped("race"),
            forecast_accuracy: clamp_rating("weather", "forecast_accuracy", self.forecast_accuracy),
        }
    }
}

/// Immutable bundle of race weekend data fed to the formulas.
///
/// Every record is optional so that a partial sync can still be represented;
/// the accessors fail with [`GproError::InsufficientData`] when a formula
/// needs a record that is absent, and return a copy whose ratings are clamped
/// into their documented ranges otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, alias = "driver_data")]
    pub driver: Option<DriverData>,
    #[serde(default, alias = "car_data")]
    pub car: Option<CarData>,
    #[serde(default, alias = "track_data")]
    pub track: Option<TrackData>,
    #[serde(default, alias = "weather_data")]
    pub weather: Option<WeatherData>,
}

impl Snapshot {
    pub fn new(driver: DriverData, car: CarData, track: TrackData, weather: WeatherData) -> Self {
        Self {
            driver: Some(driver),
            car: Some(car),
            track: Some(track),
            weather: Some(weather),
        }
    }

    pub fn driver(&self) -> Result<DriverData, GproError> {
        self.driver
            .as_ref()
            .map(DriverData::clamped)
            .ok_or(GproError::InsufficientData {
                field: SnapshotField::Driver,
            })
    }

    pub fn car(&self) -> Result<CarData, GproError> {
        self.car
            .as_ref()
            .map(CarData::clamped)
            .ok_or(GproError::InsufficientData {
                field: SnapshotField::Car,
            })
    }

    pub fn track(&self) -> Result<TrackData, GproError> {
        self.track
            .as_ref()
            .map(TrackData::clamped)
            .ok_or(GproError::InsufficientData {
                field: SnapshotField::Track,
            })
    }

    pub fn weather(&self) -> Result<WeatherData, GproError> {
        self.weather
            .as_ref()
            .map(WeatherData::clamped)
            .ok_or(GproError::InsufficientData {
                field: SnapshotField::Weather,
            })
    }
}
