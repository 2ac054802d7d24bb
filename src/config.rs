//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.boipeba.toml` files.

use crate::models::Coordinate;
use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".boipeba.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where conditions are reported for.
    #[serde(default)]
    pub location: LocationConfig,

    /// Remote forecast endpoints.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// The deployment's fixed location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Display name.
    #[serde(default = "default_location_name")]
    pub name: String,

    #[serde(default = "default_latitude")]
    pub latitude: f64,

    #[serde(default = "default_longitude")]
    pub longitude: f64,

    /// IANA timezone the forecasts are reported in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            name: default_location_name(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            timezone: default_timezone(),
        }
    }
}

impl LocationConfig {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// The configured timezone, which must be a known IANA name.
    pub fn zone(&self) -> Result<Tz> {
        parse_zone(&self.timezone)
    }
}

/// Parse an IANA timezone name such as `America/Bahia`.
pub fn parse_zone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| anyhow!("Unknown timezone '{}': {}", name, e))
}

fn default_location_name() -> String {
    "Ilha de Boipeba, Bahia".to_string()
}

fn default_latitude() -> f64 {
    Coordinate::BOIPEBA.latitude
}

fn default_longitude() -> f64 {
    Coordinate::BOIPEBA.longitude
}

fn default_timezone() -> String {
    "America/Bahia".to_string()
}

/// Open-Meteo endpoints and request settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Marine forecast endpoint.
    #[serde(default = "default_marine_url")]
    pub marine_url: String,

    /// Weather forecast endpoint.
    #[serde(default = "default_weather_url")]
    pub weather_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            marine_url: default_marine_url(),
            weather_url: default_weather_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_marine_url() -> String {
    "https://marine-api.open-meteo.com/v1/marine".to_string()
}

fn default_weather_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_timeout() -> u64 {
    10
}

/// An external tide-table page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TideLink {
    pub label: String,
    pub url: String,
}

/// Report rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Print the tide-table links under the conditions.
    #[serde(default = "default_true")]
    pub show_links: bool,

    /// Tide tables for the location.
    #[serde(default = "default_tide_links")]
    pub tide_links: Vec<TideLink>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            show_links: true,
            tide_links: default_tide_links(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_tide_links() -> Vec<TideLink> {
    vec![
        TideLink {
            label: "Tábua de Marés (tabuademares.com)".to_string(),
            url: "https://tabuademares.com/br/bahia/ilha-de-boipeba".to_string(),
        },
        TideLink {
            label: "Weather and tides widget (tuempo.net)".to_string(),
            url: "https://widgets.tuempo.net/en/weather/ilha-de-boipeba/".to_string(),
        },
    ]
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .location
            .zone()
            .with_context(|| format!("Invalid [location] in {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_optional(Path::new(DEFAULT_CONFIG_FILE))
    }

    fn load_optional(path: &Path) -> Result<Option<Self>> {
        if path.exists() {
            Ok(Some(Self::load(path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when explicitly provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(timeout) = args.timeout {
            self.sources.timeout_seconds = timeout;
        }

        if let Some(ref timezone) = args.timezone {
            self.location.timezone = timezone.clone();
        }

        if args.no_links {
            self.report.show_links = false;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
