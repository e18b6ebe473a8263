// Development data served by the mock snapshot provider

use super::{
    CarData, CarPart, Conditions, DriverData, Snapshot, TrackData, WeatherCondition, WeatherData,
};
use crate::formulas::post_race::{RaceResult, RaceWeather, TyreWearReading};

pub fn mock_driver() -> DriverData {
    DriverData {
        name: "Test Driver".to_string(),
        overall: 78.0,
        concentration: 85.0,
        talent: 72.0,
        aggressiveness: 65.0,
        experience: 90.0,
        technical_insight: 75.0,
        stamina: 88.0,
        charisma: 70.0,
        motivation: 82.0,
        weight: 68.0,
        age: 28,
    }
}

pub fn mock_car() -> CarData {
    CarData {
        chassis: CarPart::new(15, 25.0, 85.0),
        engine: CarPart::new(18, 15.0, 92.0),
        front_wing: CarPart::new(12, 35.0, 78.0),
        rear_wing: CarPart::new(14, 20.0, 88.0),
        underbody: CarPart::new(16, 10.0, 95.0),
        sidepods: CarPart::new(13, 30.0, 82.0),
        cooling: CarPart::new(11, 40.0, 75.0),
        gearbox: CarPart::new(17, 5.0, 98.0),
        brakes: CarPart::new(15, 25.0, 85.0),
        suspension: CarPart::new(14, 20.0, 88.0),
        electronics: CarPart::new(19, 0.0, 100.0),
    }
}

pub fn mock_track() -> TrackData {
    TrackData {
        name: "Monza".to_string(),
        country: "Italy".to_string(),
        length_km: 5.793,
        laps: 53,
        power_importance: 95.0,
        handling_importance: 60.0,
        acceleration_importance: 85.0,
        overtaking_difficulty: 30.0,
        fuel_consumption: 85.0,
        tyre_wear: 40.0,
        grip_level: 75.0,
        downforce_importance: 25.0,
    }
}

pub fn mock_weather() -> WeatherData {
    WeatherData {
        qualifying: WeatherCondition {
            temperature: 24.0,
            humidity: 65.0,
            rain_probability: 10.0,
            wind_speed: 8.0,
            conditions: Conditions::Sunny,
        },
        race: WeatherCondition {
            temperature: 26.0,
            humidity: 60.0,
            rain_probability: 15.0,
            wind_speed: 12.0,
            conditions: Conditions::Sunny,
        },
        forecast_accuracy: 85.0,
    }
}

/// The Monza pre-race snapshot.
pub fn mock_snapshot() -> Snapshot {
    Snapshot::new(mock_driver(), mock_car(), mock_track(), mock_weather())
}

/// Results of the Monza race, as the post-race endpoint would report them.
pub fn mock_race_result() -> RaceResult {
    RaceResult {
        position: 8,
        lap_time: "1:21.234".to_string(),
        total_time: "1:14:32.567".to_string(),
        points_scored: 4,
        actual_pit_stops: 2,
        pit_stop_laps: vec![21, 37],
        fuel_used: 108.5,
        tyre_wear: TyreWearReading {
            front_left: 85.0,
            front_right: 82.0,
            rear_left: 78.0,
            rear_right: 80.0,
        },
        incidents: 0,
        penalties: Vec::new(),
        actual_weather: RaceWeather {
            temperature: 26.0,
            rain_occurred: false,
            conditions_changed: false,
        },
    }
}

/// Snapshots with every rating inside its documented range.
#[cfg(test)]
pub(crate) fn arb_snapshot() -> impl proptest::strategy::Strategy<Value = Snapshot> {
    use super::PartKind;
    use proptest::prelude::*;

    let rating = || 0.0f64..=100.0;
    let driver = proptest::collection::vec(rating(), 9).prop_map(|skills| DriverData {
        name: "Generated".to_string(),
        overall: skills[0],
        concentration: skills[1],
        talent: skills[2],
        aggressiveness: skills[3],
        experience: skills[4],
        technical_insight: skills[5],
        stamina: skills[6],
        charisma: skills[7],
        motivation: skills[8],
        ..mock_driver()
    });
    let car = proptest::collection::vec((1u32..20, rating(), rating()), 11).prop_map(|parts| {
        let mut car = mock_car();
        for (kind, (level, wear, performance)) in PartKind::ALL.into_iter().zip(parts) {
            *car.part_mut(kind) = CarPart::new(level, wear, performance);
        }
        car
    });
    let track = (
        2.0f64..7.5,
        20u32..80,
        proptest::collection::vec(rating(), 8),
    )
        .prop_map(|(length_km, laps, ratings)| TrackData {
            name: "Generated".to_string(),
            country: String::new(),
            length_km,
            laps,
            power_importance: ratings[0],
            handling_importance: ratings[1],
            acceleration_importance: ratings[2],
            overtaking_difficulty: ratings[3],
            fuel_consumption: ratings[4],
            tyre_wear: ratings[5],
            grip_level: ratings[6],
            downforce_importance: ratings[7],
        });
    let condition = || {
        (
            -5.0f64..45.0,
            rating(),
            rating(),
            0.0f64..60.0,
            prop_oneof![
                Just(Conditions::Sunny),
                Just(Conditions::Cloudy),
                Just(Conditions::Overcast),
                Just(Conditions::LightRain),
                Just(Conditions::HeavyRain),
            ],
        )
            .prop_map(
                |(temperature, humidity, rain_probability, wind_speed, conditions)| {
                    WeatherCondition {
                        temperature,
                        humidity,
                        rain_probability,
                        wind_speed,
                        conditions,
                    }
                },
            )
    };
    let weather = (condition(), condition(), rating()).prop_map(
        |(qualifying, race, forecast_accuracy)| WeatherData {
            qualifying,
            race,
            forecast_accuracy,
        },
    );

    (driver, car, track, weather)
        .prop_map(|(driver, car, track, weather)| Snapshot::new(driver, car, track, weather))
}
