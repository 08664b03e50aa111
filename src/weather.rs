use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::cities::truncate_body;
use crate::error::{AppError, Result};
use crate::types::{Condition, CurrentWeather, Forecast, ForecastEntry};

pub const UNITS: &str = "metric";

#[async_trait]
pub trait WeatherProvider: Send + Sync + std::fmt::Debug {
    async fn current(&self, city: &str) -> Result<CurrentWeather>;
    async fn forecast(&self, city: &str) -> Result<Forecast>;

    /// Public web page for a provider city id, if the provider has one
    fn city_page_url(&self, _city_id: u64) -> Option<String> {
        None
    }
}

/// OpenWeatherMap 2.5 API (current weather + 5 day / 3 hour forecast)
pub struct OpenWeather {
    client: Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for OpenWeather {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeather")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

// OpenWeather response types

#[derive(Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Deserialize)]
struct OwCondition {
    main: String,
    description: String,
}

#[derive(Deserialize)]
struct OwCurrent {
    id: Option<u64>,
    #[serde(default)]
    name: String,
    main: OwMain,
    wind: OwWind,
    weather: Vec<OwCondition>,
}

#[derive(Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    wind: OwWind,
    weather: Vec<OwCondition>,
}

#[derive(Deserialize)]
struct OwForecast {
    list: Vec<OwForecastEntry>,
}

fn conditions(weather: Vec<OwCondition>) -> Vec<Condition> {
    weather
        .into_iter()
        .map(|w| Condition {
            main: w.main,
            description: w.description,
        })
        .collect()
}

fn parse_current(body: &str) -> Result<CurrentWeather> {
    let parsed: OwCurrent = serde_json::from_str(body)?;
    Ok(CurrentWeather {
        city_id: parsed.id,
        location: parsed.name,
        temperature: parsed.main.temp,
        humidity: parsed.main.humidity,
        wind_speed: parsed.wind.speed,
        conditions: conditions(parsed.weather),
    })
}

fn parse_forecast(body: &str) -> Result<Forecast> {
    let parsed: OwForecast = serde_json::from_str(body)?;
    let entries = parsed
        .list
        .into_iter()
        .map(|entry| {
            let time = DateTime::<Utc>::from_timestamp(entry.dt, 0).ok_or_else(|| {
                AppError::Malformed(format!("forecast timestamp out of range: {}", entry.dt))
            })?;
            Ok(ForecastEntry {
                time,
                temperature: entry.main.temp,
                humidity: entry.main.humidity,
                wind_speed: entry.wind.speed,
                conditions: conditions(entry.weather),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Forecast { entries })
}

impl OpenWeather {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Endpoint URL with the city percent-encoded into `q`
    fn endpoint_url(&self, endpoint: &str, city: &str) -> String {
        format!(
            "{}/{}?q={}&appid={}&units={}",
            self.base_url,
            endpoint,
            urlencoding::encode(city),
            urlencoding::encode(&self.api_key),
            UNITS
        )
    }

    async fn get_body(&self, endpoint: &str, city: &str) -> Result<String> {
        let url = self.endpoint_url(endpoint, city);
        tracing::debug!(endpoint, city, "requesting weather");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        check_status(status, city, &body)?;
        Ok(body)
    }
}

fn check_status(status: StatusCode, city: &str, body: &str) -> Result<()> {
    if status == StatusCode::NOT_FOUND {
        return Err(AppError::NotFound(city.to_string()));
    }
    if !status.is_success() {
        return Err(AppError::Transport(format!(
            "OpenWeather {}: {}",
            status,
            truncate_body(body)
        )));
    }
    Ok(())
}

#[async_trait]
impl WeatherProvider for OpenWeather {
    async fn current(&self, city: &str) -> Result<CurrentWeather> {
        let body = self.get_body("weather", city).await?;
        parse_current(&body)
    }

    async fn forecast(&self, city: &str) -> Result<Forecast> {
        let body = self.get_body("forecast", city).await?;
        parse_forecast(&body)
    }

    fn city_page_url(&self, city_id: u64) -> Option<String> {
        Some(format!("https://openweathermap.org/city/{}", city_id))
    }
}

/// Stands in for a provider that could not be configured, so the city list
/// stays usable. Every request fails with the configuration error.
#[derive(Debug)]
pub struct Unconfigured {
    reason: String,
}

impl Unconfigured {
    pub fn new(err: &AppError) -> Self {
        Self {
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl WeatherProvider for Unconfigured {
    async fn current(&self, _city: &str) -> Result<CurrentWeather> {
        Err(AppError::Config(self.reason.clone()))
    }

    async fn forecast(&self, _city: &str) -> Result<Forecast> {
        Err(AppError::Config(self.reason.clone()))
    }
}
