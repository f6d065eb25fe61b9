//! Static configuration supplied by the host at startup.
//!
//! Compiled defaults are merged with an optional TOML document; the host
//! usually bundles one with the app or passes nothing at all.

use std::path::Path;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::model::{Location, ViewportDelta};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Invalid(e.to_string())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NearbyConfig {
    pub api: ApiConfig,
    pub location: LocationConfig,
    pub places: PlacesConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    /// Sent as `limit` on nearby queries
    pub result_limit: u32,
    pub max_rate_limit_retries: u32,
    /// Used when a 429 carries no usable `Retry-After`; doubles per attempt
    pub rate_limit_delay_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".into(),
            timeout_ms: 10_000,
            result_limit: 20,
            max_rate_limit_retries: 3,
            rate_limit_delay_ms: 1_000,
            max_backoff_ms: 30_000,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_delay_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub default_latitude: f64,
    pub default_longitude: f64,
    pub default_latitude_delta: f64,
    pub default_longitude_delta: f64,
    /// One-shot high accuracy fetch
    pub position_timeout_ms: u64,
    pub maximum_age_ms: u64,
    /// Short fetches used for status inference and GPS availability
    pub probe_timeout_ms: u64,
    pub distance_filter_m: f64,
    pub watch_interval_ms: u64,
    pub fastest_interval_ms: u64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            default_latitude: 37.7749,
            default_longitude: -122.4194,
            default_latitude_delta: 0.0922,
            default_longitude_delta: 0.0421,
            position_timeout_ms: 20_000,
            maximum_age_ms: 10_000,
            probe_timeout_ms: 5_000,
            distance_filter_m: 10.0,
            watch_interval_ms: 5_000,
            fastest_interval_ms: 2_000,
        }
    }
}

impl LocationConfig {
    pub fn default_location(&self) -> Location {
        Location::new(self.default_latitude, self.default_longitude).with_viewport(ViewportDelta {
            latitude_delta: self.default_latitude_delta,
            longitude_delta: self.default_longitude_delta,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacesConfig {
    pub default_radius_m: u32,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            default_radius_m: 5_000,
        }
    }
}

impl NearbyConfig {
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config: NearbyConfig = Figment::new()
            .merge(Serialized::defaults(NearbyConfig::default()))
            .merge(Toml::string(toml))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let config: NearbyConfig = Figment::new()
            .merge(Serialized::defaults(NearbyConfig::default()))
            .merge(Toml::file(path))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url must not be empty".into()));
        }
        if self.api.timeout_ms == 0 {
            return Err(ConfigError::Invalid("api.timeout_ms must be positive".into()));
        }
        if !(-90.0..=90.0).contains(&self.location.default_latitude)
            || !(-180.0..=180.0).contains(&self.location.default_longitude)
        {
            return Err(ConfigError::Invalid(
                "default coordinate is out of range".into(),
            ));
        }
        Ok(())
    }
}
