use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, Result};

pub const DEFAULT_CITIES_URL: &str = "https://public.opendatasoft.com/api/records/1.0/search/";
pub const DEFAULT_DATASET: &str = "geonames-all-cities-with-a-population-1000";
pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CitiesConfig {
    pub base_url: String,
    pub dataset: String,
}

impl Default for CitiesConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CITIES_URL.to_string(),
            dataset: DEFAULT_DATASET.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub api_key_env: String,
    pub api_key_command: Option<String>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WEATHER_URL.to_string(),
            api_key: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key_command: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cities: CitiesConfig,
    pub weather: WeatherConfig,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cities: CitiesConfig::default(),
            weather: WeatherConfig::default(),
            request_timeout_secs: 15,
        }
    }
}

fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("cityscope").join("config.toml"))
}

impl Config {
    /// Load the config from `path`, or from the platform config dir when no
    /// path is given. A missing default file yields the defaults; an explicit
    /// path that cannot be read or parsed is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                Self::parse(&content)
            }
            None => {
                let Some(path) = config_path() else {
                    return Ok(Config::default());
                };
                let Ok(content) = std::fs::read_to_string(&path) else {
                    return Ok(Config::default());
                };
                Self::parse(&content)
            }
        }
    }

    fn parse(content: &str) -> Result<Self> {
        toml::from_str::<Config>(content).map_err(|e| AppError::Config(e.to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

impl WeatherConfig {
    /// Resolve the provider API key, trying in order:
    /// 1. The environment variable named by `api_key_env`
    /// 2. `api_key` from the config file
    /// 3. stdout of `api_key_command`
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Ok(key) = std::env::var(&self.api_key_env) {
            let key = key.trim().to_string();
            if !key.is_empty() {
                return Ok(key);
            }
        }

        if let Some(key) = self.api_key.as_deref().map(str::trim) {
            if !key.is_empty() {
                return Ok(key.to_string());
            }
        }

        if let Some(command) = &self.api_key_command {
            if let Some(key) = try_cli_key(command) {
                return Ok(key);
            }
            tracing::warn!(command, "api_key_command produced no key");
        }

        Err(AppError::Config(format!(
            "No weather API key found. Set {} or add `api_key` under [weather] in the config file",
            self.api_key_env
        )))
    }
}

/// Run a shell command and capture its trimmed stdout as a key
fn try_cli_key(command: &str) -> Option<String> {
    let output = std::process::Command::new("sh")
        .args(["-c", command])
        .output()
        .ok()?;

    if output.status.success() {
        let key = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !key.is_empty() {
            return Some(key);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
request_timeout_secs = 5

[cities]
base_url = "http://localhost:8080/search"
dataset = "tiny-cities"

[weather]
base_url = "http://localhost:9090"
api_key = "abc"
api_key_env = "MY_WEATHER_KEY"
"#;
        let config = Config::parse(toml_str).unwrap();
        assert_eq!(config.cities.base_url, "http://localhost:8080/search");
        assert_eq!(config.cities.dataset, "tiny-cities");
        assert_eq!(config.weather.base_url, "http://localhost:9090");
        assert_eq!(config.weather.api_key.as_deref(), Some("abc"));
        assert_eq!(config.weather.api_key_env, "MY_WEATHER_KEY");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn parse_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.cities.dataset, DEFAULT_DATASET);
        assert_eq!(config.weather.base_url, DEFAULT_WEATHER_URL);
        assert_eq!(config.weather.api_key_env, DEFAULT_API_KEY_ENV);
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn parse_partial_section_fills_defaults() {
        let config = Config::parse("[weather]\napi_key = \"k\"\n").unwrap();
        assert_eq!(config.weather.base_url, DEFAULT_WEATHER_URL);
        assert_eq!(config.cities.base_url, DEFAULT_CITIES_URL);
    }

    #[test]
    fn parse_invalid_config_is_error() {
        let err = Config::parse("request_timeout_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn resolve_api_key_from_config_value() {
        let weather = WeatherConfig {
            api_key: Some("  from-file  ".to_string()),
            api_key_env: "CITYSCOPE_TEST_UNSET_KEY_1".to_string(),
            ..WeatherConfig::default()
        };
        assert_eq!(weather.resolve_api_key().unwrap(), "from-file");
    }

    #[test]
    fn resolve_api_key_from_command() {
        let weather = WeatherConfig {
            api_key_env: "CITYSCOPE_TEST_UNSET_KEY_2".to_string(),
            api_key_command: Some("echo from-command".to_string()),
            ..WeatherConfig::default()
        };
        assert_eq!(weather.resolve_api_key().unwrap(), "from-command");
    }

    #[test]
    fn resolve_api_key_missing_everywhere() {
        let weather = WeatherConfig {
            api_key_env: "CITYSCOPE_TEST_UNSET_KEY_3".to_string(),
            ..WeatherConfig::default()
        };
        let err = weather.resolve_api_key().unwrap_err();
        assert!(err.to_string().contains("CITYSCOPE_TEST_UNSET_KEY_3"));
    }
}
