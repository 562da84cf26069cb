use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt};

use crate::weather_code;

/// A geocoded candidate place.
///
/// Two places are equal when name and coordinates match; the upstream
/// service has no stable id we can rely on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub country: String,
    pub admin1: Option<String>,
    pub country_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub feature_code: Option<String>,
}

impl Place {
    /// Human-readable label, e.g. "Springfield, Illinois, United States".
    pub fn label(&self) -> String {
        let mut parts: Vec<&str> = vec![self.name.as_str()];

        if let Some(admin) = self.admin1.as_deref() {
            if !admin.is_empty() && admin != self.name {
                parts.push(admin);
            }
        }
        if !self.country.is_empty() && !parts.contains(&self.country.as_str()) {
            parts.push(self.country.as_str());
        }

        parts.join(", ")
    }
}

impl PartialEq for Place {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.latitude == other.latitude
            && self.longitude == other.longitude
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub const fn all() -> &'static [UnitSystem] {
        &[UnitSystem::Metric, UnitSystem::Imperial]
    }

    /// Value of the forecast API `temperature_unit` parameter.
    pub fn temperature_param(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "celsius",
            UnitSystem::Imperial => "fahrenheit",
        }
    }

    /// Value of the forecast API `windspeed_unit` parameter.
    pub fn windspeed_param(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "kmh",
            UnitSystem::Imperial => "mph",
        }
    }

    pub fn temperature_label(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    pub fn wind_speed_label(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "km/h",
            UnitSystem::Imperial => "mph",
        }
    }

    pub fn toggled(&self) -> UnitSystem {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UnitSystem {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

impl std::str::FromStr for UnitSystem {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitSystem::try_from(s)
    }
}

/// Current weather at a place, in the units it was requested with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub wind_speed: f64,
    /// Degrees, 0-360.
    pub wind_direction: f64,
    pub weather_code: i32,
    pub observed_at: DateTime<Utc>,
    /// IANA zone id resolved by the forecast service.
    pub timezone: String,
    pub units: UnitSystem,
}

impl CurrentConditions {
    pub fn condition(&self) -> &'static str {
        weather_code::describe(self.weather_code)
    }

    /// Observation time in the place's own zone. Unknown zone ids fall back to UTC.
    pub fn local_observation_time(&self) -> DateTime<Tz> {
        let tz: Tz = self.timezone.parse().unwrap_or(Tz::UTC);
        self.observed_at.with_timezone(&tz)
    }
}

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Nearest of the 16 compass points for a bearing in degrees.
pub fn compass_point(degrees: f64) -> &'static str {
    let normalized = degrees.rem_euclid(360.0);
    let index = ((normalized / 22.5).round() as usize) % COMPASS_POINTS.len();
    COMPASS_POINTS[index]
}
