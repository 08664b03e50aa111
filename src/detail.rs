//! State of one weather detail screen.

use crate::error::AppError;
use crate::types::{CurrentWeather, Forecast, ForecastEntry};

pub const NOT_FOUND_MESSAGE: &str = "City not found. Please enter a valid city name.";
pub const GENERIC_ERROR_MESSAGE: &str = "Failed to fetch weather data. Please try again later.";

pub const FORECAST_CARDS: usize = 5;

/// Combined outcome of the current + forecast requests
pub type WeatherResult = std::result::Result<(CurrentWeather, Forecast), WeatherFailure>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherFailure {
    NotFound,
    Other,
}

impl WeatherFailure {
    pub fn classify(err: &AppError) -> Self {
        match err {
            AppError::NotFound(_) => WeatherFailure::NotFound,
            _ => WeatherFailure::Other,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            WeatherFailure::NotFound => NOT_FOUND_MESSAGE,
            WeatherFailure::Other => GENERIC_ERROR_MESSAGE,
        }
    }
}

/// Icon for a forecast condition label
pub fn condition_icon(label: &str) -> &'static str {
    match label {
        "Clear" => "☀️",
        "Clouds" => "☁️",
        "Rain" => "🌧️",
        _ => "🌍",
    }
}

#[derive(Debug, Clone, Default)]
pub struct WeatherDetail {
    city: Option<String>,
    current: Option<CurrentWeather>,
    forecast: Option<Forecast>,
    error: Option<&'static str>,
    load_id: u64,
    loading: bool,
}

impl WeatherDetail {
    pub fn new(city: Option<String>) -> Self {
        Self {
            city,
            ..Self::default()
        }
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn current(&self) -> Option<&CurrentWeather> {
        self.current.as_ref()
    }

    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Begin a load. Returns the load id and city to fetch, or `None` when the
    /// screen has no city, in which case nothing happens.
    pub fn begin_load(&mut self) -> Option<(u64, String)> {
        let city = self.city.clone()?;
        self.load_id += 1;
        self.loading = true;
        Some((self.load_id, city))
    }

    /// Apply a finished load; results of superseded loads are ignored.
    /// Returns whether the result was applied.
    pub fn apply(&mut self, load_id: u64, result: WeatherResult) -> bool {
        if load_id != self.load_id {
            tracing::debug!(load_id, current = self.load_id, "discarding stale weather");
            return false;
        }
        self.loading = false;

        match result {
            Ok((current, forecast)) => {
                self.current = Some(current);
                self.forecast = Some(forecast);
                self.error = None;
            }
            Err(failure) => {
                self.current = None;
                self.forecast = None;
                self.error = Some(failure.message());
            }
        }
        true
    }

    /// The forecast entries shown as cards, in original order
    pub fn forecast_cards(&self) -> &[ForecastEntry] {
        match &self.forecast {
            Some(forecast) => {
                let n = forecast.entries.len().min(FORECAST_CARDS);
                &forecast.entries[..n]
            }
            None => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Condition;
    use chrono::{TimeZone, Utc};

    fn current(temp: f64) -> CurrentWeather {
        CurrentWeather {
            city_id: Some(1),
            location: "Tokyo".to_string(),
            temperature: temp,
            humidity: 50,
            wind_speed: 2.0,
            conditions: vec![Condition {
                main: "Clear".to_string(),
                description: "clear sky".to_string(),
            }],
        }
    }

    fn forecast(n: usize) -> Forecast {
        Forecast {
            entries: (0..n)
                .map(|i| ForecastEntry {
                    time: Utc.timestamp_opt(1_700_000_000 + i as i64 * 10_800, 0).unwrap(),
                    temperature: i as f64,
                    humidity: 40,
                    wind_speed: 1.0,
                    conditions: vec![],
                })
                .collect(),
        }
    }

    #[test]
    fn absent_city_does_nothing() {
        let mut detail = WeatherDetail::new(None);
        assert_eq!(detail.begin_load(), None);
        assert!(!detail.is_loading());
        assert_eq!(detail.error(), None);
    }

    #[test]
    fn success_stores_payloads_and_truncates_forecast() {
        let mut detail = WeatherDetail::new(Some("Tokyo".to_string()));
        let (id, city) = detail.begin_load().unwrap();
        assert_eq!(city, "Tokyo");
        assert!(detail.apply(id, Ok((current(20.0), forecast(8)))));

        let cards = detail.forecast_cards();
        assert_eq!(cards.len(), 5);
        let temps: Vec<f64> = cards.iter().map(|c| c.temperature).collect();
        assert_eq!(temps, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert!(cards.windows(2).all(|w| w[0].time < w[1].time));
        assert_eq!(detail.current().unwrap().temperature, 20.0);
    }

    #[test]
    fn short_forecast_shows_all_entries() {
        let mut detail = WeatherDetail::new(Some("Tokyo".to_string()));
        let (id, _) = detail.begin_load().unwrap();
        detail.apply(id, Ok((current(20.0), forecast(3))));
        assert_eq!(detail.forecast_cards().len(), 3);
    }

    #[test]
    fn failure_clears_previous_data() {
        let mut detail = WeatherDetail::new(Some("Tokyo".to_string()));
        let (id, _) = detail.begin_load().unwrap();
        detail.apply(id, Ok((current(20.0), forecast(8))));

        let (id, _) = detail.begin_load().unwrap();
        detail.apply(id, Err(WeatherFailure::Other));
        assert_eq!(detail.error(), Some(GENERIC_ERROR_MESSAGE));
        assert!(detail.current().is_none());
        assert!(detail.forecast_cards().is_empty());
    }

    #[test]
    fn success_clears_previous_error() {
        let mut detail = WeatherDetail::new(Some("Tokyo".to_string()));
        let (id, _) = detail.begin_load().unwrap();
        detail.apply(id, Err(WeatherFailure::NotFound));
        assert_eq!(detail.error(), Some(NOT_FOUND_MESSAGE));

        let (id, _) = detail.begin_load().unwrap();
        detail.apply(id, Ok((current(1.0), forecast(1))));
        assert_eq!(detail.error(), None);
    }

    #[test]
    fn stale_load_is_ignored() {
        let mut detail = WeatherDetail::new(Some("Tokyo".to_string()));
        let (old, _) = detail.begin_load().unwrap();
        let (new, _) = detail.begin_load().unwrap();
        assert!(!detail.apply(old, Ok((current(1.0), forecast(1)))));
        assert!(detail.current().is_none());
        assert!(detail.is_loading());
        assert!(detail.apply(new, Err(WeatherFailure::NotFound)));
    }

    #[test]
    fn classify_errors() {
        assert_eq!(
            WeatherFailure::classify(&AppError::NotFound("x".into())),
            WeatherFailure::NotFound
        );
        assert_eq!(
            WeatherFailure::classify(&AppError::Transport("timeout".into())),
            WeatherFailure::Other
        );
        assert_eq!(
            WeatherFailure::classify(&AppError::Malformed("bad json".into())),
            WeatherFailure::Other
        );
    }

    #[test]
    fn icon_lookup_has_default() {
        assert_eq!(condition_icon("Clear"), "☀️");
        assert_eq!(condition_icon("Clouds"), "☁️");
        assert_eq!(condition_icon("Rain"), "🌧️");
        assert_eq!(condition_icon("Snow"), "🌍");
    }
}
