//! Reading Context
//!
//! Location, weather, and seasonal awareness folded into recommendations.
//! Everything here except the weather lookup is pure and clock-driven.

pub mod weather;

pub use weather::WeatherClient;

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeOfDay {
    #[serde(rename = "Early Morning")]
    EarlyMorning,
    Morning,
    Afternoon,
    Evening,
    Night,
    #[serde(rename = "Late Night")]
    LateNight,
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TimeOfDay::EarlyMorning => "Early Morning",
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Afternoon => "Afternoon",
            TimeOfDay::Evening => "Evening",
            TimeOfDay::Night => "Night",
            TimeOfDay::LateNight => "Late Night",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weather {
    pub condition: String,
    pub temp: i32,
    #[serde(default)]
    pub description: String,
}

/// The full reading context attached to a request or derived server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<Weather>,
    pub season: Season,
    pub time_of_day: TimeOfDay,
    pub reading_mood: String,
}

/// Season for a date, hemisphere-aware.
pub fn season_for(date: DateTime<Utc>, hemisphere: &Hemisphere) -> Season {
    let month = date.month();
    match hemisphere {
        Hemisphere::North => match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Fall,
        },
        Hemisphere::South => match month {
            6..=8 => Season::Winter,
            9..=11 => Season::Spring,
            12 | 1 | 2 => Season::Summer,
            _ => Season::Fall,
        },
    }
}

/// Time-of-day bucket for an hour of the day.
pub fn time_of_day_for(hour: u32) -> TimeOfDay {
    match hour {
        4..=6 => TimeOfDay::EarlyMorning,
        7..=11 => TimeOfDay::Morning,
        12..=16 => TimeOfDay::Afternoon,
        17..=20 => TimeOfDay::Evening,
        21..=23 => TimeOfDay::Night,
        _ => TimeOfDay::LateNight,
    }
}

/// Reading mood from weather first, then season and time of day.
pub fn reading_mood(
    weather: Option<&Weather>,
    season: Season,
    time_of_day: TimeOfDay,
) -> String {
    if let Some(weather) = weather {
        let condition = weather.condition.to_lowercase();
        if condition.contains("rain") || condition.contains("drizzle") {
            return "Cozy, introspective".to_string();
        }
        if condition.contains("snow") {
            return "Quiet, contemplative".to_string();
        }
        if condition.contains("storm") || condition.contains("thunder") {
            return "Atmospheric, immersive".to_string();
        }
        if condition.contains("cloud") || condition.contains("overcast") {
            return "Gentle, reflective".to_string();
        }
        if condition.contains("clear") || condition.contains("sun") {
            if weather.temp > 24 {
                return "Light, breezy".to_string();
            }
            return "Bright, energizing".to_string();
        }
    }

    match season {
        Season::Winter => {
            if matches!(time_of_day, TimeOfDay::Evening | TimeOfDay::Night) {
                return "Cozy, intimate".to_string();
            }
            return "Contemplative, grounded".to_string();
        }
        Season::Summer => {
            if time_of_day == TimeOfDay::Afternoon {
                return "Light, leisurely".to_string();
            }
            return "Expansive, adventurous".to_string();
        }
        Season::Fall => return "Reflective, transitional".to_string(),
        Season::Spring => return "Fresh, hopeful".to_string(),
    }
}

/// Hemisphere guess from a free-text location.
pub fn detect_hemisphere(location: &str) -> Hemisphere {
    let lower = location.to_lowercase();
    const SOUTHERN: &[&str] = &[
        "australia",
        "new zealand",
        "argentina",
        "chile",
        "south africa",
        "brazil",
        "uruguay",
        "paraguay",
        "bolivia",
        "peru",
    ];
    if SOUTHERN.iter().any(|c| lower.contains(c)) {
        Hemisphere::South
    } else {
        Hemisphere::North
    }
}

/// Assembles a full reading context for a moment in time.
pub fn reading_context(
    location: Option<String>,
    weather: Option<Weather>,
    now: DateTime<Utc>,
) -> ReadingContext {
    let hemisphere = location
        .as_deref()
        .map(detect_hemisphere)
        .unwrap_or(Hemisphere::North);
    let season = season_for(now, &hemisphere);
    let time_of_day = time_of_day_for(now.hour());
    let mood = reading_mood(weather.as_ref(), season, time_of_day);

    ReadingContext {
        location,
        weather,
        season,
        time_of_day,
        reading_mood: mood,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(month: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, month, 15, hour, 0, 0).unwrap()
    }

    #[test]
    fn seasons_flip_by_hemisphere() {
        assert_eq!(season_for(at(1, 12), &Hemisphere::North), Season::Winter);
        assert_eq!(season_for(at(1, 12), &Hemisphere::South), Season::Summer);
        assert_eq!(season_for(at(7, 12), &Hemisphere::North), Season::Summer);
        assert_eq!(season_for(at(7, 12), &Hemisphere::South), Season::Winter);
        assert_eq!(season_for(at(4, 12), &Hemisphere::North), Season::Spring);
        assert_eq!(season_for(at(10, 12), &Hemisphere::North), Season::Fall);
    }

    #[test]
    fn time_of_day_buckets() {
        assert_eq!(time_of_day_for(5), TimeOfDay::EarlyMorning);
        assert_eq!(time_of_day_for(9), TimeOfDay::Morning);
        assert_eq!(time_of_day_for(14), TimeOfDay::Afternoon);
        assert_eq!(time_of_day_for(19), TimeOfDay::Evening);
        assert_eq!(time_of_day_for(22), TimeOfDay::Night);
        assert_eq!(time_of_day_for(2), TimeOfDay::LateNight);
    }

    #[test]
    fn weather_moods_take_priority() {
        let rain = Weather {
            condition: "Rain".to_string(),
            temp: 18,
            description: "light rain".to_string(),
        };
        assert_eq!(
            reading_mood(Some(&rain), Season::Summer, TimeOfDay::Afternoon),
            "Cozy, introspective"
        );

        let warm_sun = Weather {
            condition: "Clear".to_string(),
            temp: 30,
            description: "clear sky".to_string(),
        };
        assert_eq!(
            reading_mood(Some(&warm_sun), Season::Winter, TimeOfDay::Morning),
            "Light, breezy"
        );
    }

    #[test]
    fn seasonal_moods_without_weather() {
        assert_eq!(
            reading_mood(None, Season::Winter, TimeOfDay::Evening),
            "Cozy, intimate"
        );
        assert_eq!(
            reading_mood(None, Season::Fall, TimeOfDay::Morning),
            "Reflective, transitional"
        );
    }

    #[test]
    fn hemisphere_detection() {
        assert_eq!(detect_hemisphere("Melbourne, Australia"), Hemisphere::South);
        assert_eq!(detect_hemisphere("Mumbai, India"), Hemisphere::North);
    }
}
