//! Racing analytics formulas.
//!
//! Every calculator is a pure function over a [`Snapshot`](crate::snapshot::Snapshot).
//! Calculators that sample synthetic rivals take the random source as an
//! argument so that a seeded generator reproduces the same output.

pub mod overtaking;
pub mod parts_wear;
pub mod post_race;
pub mod qualifying;
pub mod setup;
pub mod strategy;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::GproError;

/// Tyre compound of a setup, from softest (1) to hardest (5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TyreCompound {
    ExtraSoft = 1,
    Soft = 2,
    Medium = 3,
    Hard = 4,
    ExtraHard = 5,
}

impl TyreCompound {
    pub fn index(self) -> i32 {
        self as i32
    }

    /// Compound for an index, saturating at ExtraSoft and ExtraHard.
    pub fn from_index(index: i32) -> Self {
        match index {
            i32::MIN..=1 => TyreCompound::ExtraSoft,
            2 => TyreCompound::Soft,
            3 => TyreCompound::Medium,
            4 => TyreCompound::Hard,
            _ => TyreCompound::ExtraHard,
        }
    }

    pub fn harder(self, steps: i32) -> Self {
        Self::from_index(self.index() + steps)
    }

    pub fn softer(self, steps: i32) -> Self {
        Self::from_index(self.index() - steps)
    }
}

impl std::fmt::Display for TyreCompound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TyreCompound::ExtraSoft => write!(f, "Extra Soft"),
            TyreCompound::Soft => write!(f, "Soft"),
            TyreCompound::Medium => write!(f, "Medium"),
            TyreCompound::Hard => write!(f, "Hard"),
            TyreCompound::ExtraHard => write!(f, "Extra Hard"),
        }
    }
}

/// Risk the driver is told to take, from 1 (very low) to 5 (very high).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    VeryLow = 1,
    Low = 2,
    Normal = 3,
    High = 4,
    VeryHigh = 5,
}

impl RiskLevel {
    pub fn index(self) -> i32 {
        self as i32
    }

    pub fn from_index(index: i32) -> Self {
        match index {
            i32::MIN..=1 => RiskLevel::VeryLow,
            2 => RiskLevel::Low,
            3 => RiskLevel::Normal,
            4 => RiskLevel::High,
            _ => RiskLevel::VeryHigh,
        }
    }

    pub fn lower(self, steps: i32) -> Self {
        Self::from_index(self.index() - steps)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::VeryLow => write!(f, "Very Low"),
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Normal => write!(f, "Normal"),
            RiskLevel::High => write!(f, "High"),
            RiskLevel::VeryHigh => write!(f, "Very High"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupFocus {
    Qualifying,
    Race,
}

impl std::fmt::Display for SetupFocus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupFocus::Qualifying => write!(f, "Qualifying"),
            SetupFocus::Race => write!(f, "Race"),
        }
    }
}

/// A lap time with millisecond resolution, rendered as `M:SS.mmm`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LapTime {
    millis: u64,
}

impl LapTime {
    pub fn from_seconds(seconds: f64) -> Self {
        Self {
            millis: (seconds.max(0.0) * 1000.0).round() as u64,
        }
    }

    pub fn seconds(&self) -> f64 {
        self.millis as f64 / 1000.0
    }
}

impl std::fmt::Display for LapTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let minutes = self.millis / 60_000;
        let seconds = (self.millis % 60_000) / 1000;
        let millis = self.millis % 1000;
        write!(f, "{}:{:02}.{:03}", minutes, seconds, millis)
    }
}

impl FromStr for LapTime {
    type Err = GproError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || GproError::InvalidLapTime {
            value: value.to_string(),
        };
        let (minutes, seconds) = value.trim().split_once(':').ok_or_else(invalid)?;
        let minutes: u64 = minutes.parse().map_err(|_| invalid())?;
        let seconds: f64 = seconds.parse().map_err(|_| invalid())?;
        if !(0.0..60.0).contains(&seconds) {
            return Err(invalid());
        }
        Ok(Self::from_seconds(minutes as f64 * 60.0 + seconds))
    }
}

impl TryFrom<String> for LapTime {
    type Error = GproError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LapTime> for String {
    fn from(value: LapTime) -> Self {
        value.to_string()
    }
}

/// Render a race duration in seconds as `H:MM:SS`.
pub fn format_race_time(total_seconds: f64) -> String {
    let total = total_seconds.max(0.0).floor() as u64;
    format!(
        "{}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Round a derived value and clamp it into a dial range.
pub(crate) fn clamp_round(value: f64, min: f64, max: f64) -> u32 {
    value.clamp(min, max).round() as u32
}

/// Championship points for a finishing position.
pub fn points_for_position(position: u32) -> u32 {
    const POINTS_SYSTEM: [u32; 10] = [25, 18, 15, 12, 10, 8, 6, 4, 2, 1];
    match position {
        1..=10 => POINTS_SYSTEM[(position - 1) as usize],
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lap_time_formatting() {
        assert_eq!(LapTime::from_seconds(81.234).to_string(), "1:21.234");
        assert_eq!(LapTime::from_seconds(65.0).to_string(), "1:05.000");
        assert_eq!(LapTime::from_seconds(59.9996).to_string(), "1:00.000");
        assert_eq!(LapTime::from_seconds(-3.0).to_string(), "0:00.000");
    }

    #[test]
    fn test_lap_time_parsing() {
        let lap: LapTime = "1:21.234".parse().unwrap();
        assert!((lap.seconds() - 81.234).abs() < 1e-9);
        assert!("81.234".parse::<LapTime>().is_err());
        assert!("1:75.000".parse::<LapTime>().is_err());
        assert!("x:10.0".parse::<LapTime>().is_err());
    }

    #[test]
    fn test_lap_time_serializes_as_text() {
        let json = serde_json::to_string(&LapTime::from_seconds(92.5)).unwrap();
        assert_eq!(json, "\"1:32.500\"");
        let lap: LapTime = serde_json::from_str(&json).unwrap();
        assert_eq!(lap, LapTime::from_seconds(92.5));
    }

    #[test]
    fn test_compound_steps_saturate() {
        assert_eq!(TyreCompound::Hard.harder(3), TyreCompound::ExtraHard);
        assert_eq!(TyreCompound::Soft.softer(4), TyreCompound::ExtraSoft);
        assert_eq!(TyreCompound::Medium.harder(1), TyreCompound::Hard);
        assert_eq!(RiskLevel::Low.lower(2), RiskLevel::VeryLow);
    }

    #[test]
    fn test_race_time_formatting() {
        assert_eq!(format_race_time(4472.9), "1:14:32");
        assert_eq!(format_race_time(59.0), "0:00:59");
    }

    #[test]
    fn test_points_table() {
        assert_eq!(points_for_position(1), 25);
        assert_eq!(points_for_position(10), 1);
        assert_eq!(points_for_position(11), 0);
        assert_eq!(points_for_position(0), 0);
    }
}
