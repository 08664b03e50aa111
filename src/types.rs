use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the city search dataset.
///
/// Only the three displayed columns are typed; every other field the search
/// API returns is carried along untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CityRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "cou_name_en")]
    pub country: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CityRecord {
    #[cfg(test)]
    pub fn new(name: &str, country: &str, timezone: &str) -> Self {
        Self {
            name: name.to_string(),
            country: country.to_string(),
            timezone: timezone.to_string(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Weather condition entry (e.g. main = "Clouds", description = "broken clouds")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub main: String,
    pub description: String,
}

/// Current conditions for a city
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWeather {
    pub city_id: Option<u64>,
    pub location: String,
    pub temperature: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub conditions: Vec<Condition>,
}

impl CurrentWeather {
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.conditions.first()
    }
}

/// One timestamped point of a forecast
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEntry {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub conditions: Vec<Condition>,
}

impl ForecastEntry {
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.conditions.first()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub entries: Vec<ForecastEntry>,
}
