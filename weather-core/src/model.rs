use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A point on the globe, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Returns `None` when either component is outside its valid range.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return None;
        }
        Some(Self { latitude, longitude })
    }
}

/// A place produced by forward or reverse geocoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedPlace {
    pub name: String,
    pub country: String,
    pub region: Option<String>,
    pub coordinate: Coordinate,
}

impl GeocodedPlace {
    /// "name, region, country", with the region omitted when absent.
    pub fn display_name(&self) -> String {
        match self.region.as_deref().filter(|r| !r.is_empty()) {
            Some(region) => format!("{}, {}, {}", self.name, region, self.country),
            None => format!("{}, {}", self.name, self.country),
        }
    }

    /// Short "name, country" label used in replies.
    pub fn label(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

/// What the caller wants weather for.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Name(String),
    Coordinate(Coordinate),
}

impl From<&str> for LocationQuery {
    fn from(value: &str) -> Self {
        LocationQuery::Name(value.to_string())
    }
}

impl From<Coordinate> for LocationQuery {
    fn from(value: Coordinate) -> Self {
        LocationQuery::Coordinate(value)
    }
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationQuery::Name(name) => f.write_str(name),
            LocationQuery::Coordinate(c) => write!(f, "{:.4}, {:.4}", c.latitude, c.longitude),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Units {
    #[default]
    Celsius,
    Fahrenheit,
}

impl Units {
    /// Converts a Celsius reading into this unit.
    pub fn convert(self, celsius: f64) -> f64 {
        match self {
            Units::Celsius => celsius,
            Units::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }

    /// Converted and rounded to a whole degree, as shown to the user.
    pub fn whole(self, celsius: f64) -> i64 {
        self.convert(celsius).round() as i64
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Units::Celsius => "°C",
            Units::Fahrenheit => "°F",
        }
    }
}

/// Condition family selected by the two leading digits of a provider icon code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionFamily {
    Clear,
    Clouds,
    Rain,
    Thunderstorm,
    Snow,
    Mist,
    Unknown,
}

impl ConditionFamily {
    pub fn from_icon(icon: &str) -> Self {
        match icon.get(..2) {
            Some("01") => Self::Clear,
            Some("02" | "03" | "04") => Self::Clouds,
            Some("09" | "10") => Self::Rain,
            Some("11") => Self::Thunderstorm,
            Some("13") => Self::Snow,
            Some("50") => Self::Mist,
            _ => Self::Unknown,
        }
    }
}

/// One day of the daily forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub temp_min: f64,
    pub temp_max: f64,
    pub day_temp: f64,
    pub condition: String,
}

/// Provider-agnostic weather snapshot. Temperatures are Celsius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedWeather {
    pub location: GeocodedPlace,
    pub observed_at: DateTime<Utc>,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    /// True when `temp_min`/`temp_max` were synthesized rather than reported.
    pub range_synthesized: bool,
    pub condition: String,
    pub icon: String,
    pub humidity_pct: u8,
    pub wind_speed_kmh: f64,
    pub pressure_hpa: f64,
    pub visibility_km: Option<f64>,
    /// Index 0 is today; at most seven entries.
    pub daily: Vec<DailyForecast>,
    pub distance_from_user_km: Option<f64>,
    pub is_near: bool,
}

impl NormalizedWeather {
    pub fn condition_family(&self) -> ConditionFamily {
        ConditionFamily::from_icon(&self.icon)
    }

    pub fn is_night(&self) -> bool {
        self.icon.ends_with('n')
    }

    pub fn is_raining(&self) -> bool {
        let condition = self.condition.to_lowercase();
        condition.contains("rain")
            || condition.contains("drizzle")
            || matches!(self.condition_family(), ConditionFamily::Rain)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into(), timestamp: Utc::now() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: Role::Assistant, text: text.into(), timestamp: Utc::now() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_omits_missing_region() {
        let mut place = GeocodedPlace {
            name: "Springfield".into(),
            country: "US".into(),
            region: Some("Illinois".into()),
            coordinate: Coordinate { latitude: 39.8, longitude: -89.6 },
        };
        assert_eq!(place.display_name(), "Springfield, Illinois, US");

        place.region = None;
        assert_eq!(place.display_name(), "Springfield, US");
    }

    #[test]
    fn coordinate_rejects_out_of_range() {
        assert!(Coordinate::new(91.0, 0.0).is_none());
        assert!(Coordinate::new(0.0, -180.5).is_none());
        assert!(Coordinate::new(-90.0, 180.0).is_some());
    }

    #[test]
    fn fahrenheit_conversion_rounds() {
        assert_eq!(Units::Fahrenheit.whole(15.0), 59);
        assert_eq!(Units::Celsius.whole(14.6), 15);
    }

    #[test]
    fn icon_family_and_night_suffix() {
        assert_eq!(ConditionFamily::from_icon("10n"), ConditionFamily::Rain);
        assert_eq!(ConditionFamily::from_icon("04d"), ConditionFamily::Clouds);
        assert_eq!(ConditionFamily::from_icon(""), ConditionFamily::Unknown);
    }
}
