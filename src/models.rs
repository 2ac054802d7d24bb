//! Data models for the conditions snapshot.
//!
//! This module contains the core data structures shared between the
//! remote sources, the aggregator and the report renderers.

use crate::astro::MoonPhase;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fixed geographic point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees (south is negative).
    pub latitude: f64,
    /// Longitude in decimal degrees (west is negative).
    pub longitude: f64,
}

impl Coordinate {
    /// Ilha de Boipeba, Bahia.
    pub const BOIPEBA: Coordinate = Coordinate {
        latitude: -13.6167,
        longitude: -38.9333,
    };

    /// Build a coordinate from decimal degrees.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Self::BOIPEBA
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Wave height for the current hour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarineReading {
    /// Significant wave height in meters, `None` when unknown.
    pub wave_height_m: Option<f64>,
}

impl MarineReading {
    /// A reading with the wave height unknown.
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_unknown(&self) -> bool {
        self.wave_height_m.is_none()
    }
}

/// Current weather plus today's sun times.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    /// Air temperature at 2m in °C.
    pub temperature_c: Option<f64>,
    /// Wind speed at 10m in km/h.
    pub wind_speed_kmh: Option<f64>,
    /// Today's sunrise, local civil time.
    pub sunrise: Option<NaiveDateTime>,
    /// Today's sunset, local civil time.
    pub sunset: Option<NaiveDateTime>,
}

impl WeatherReading {
    /// A reading with every field unknown.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// True when every field is unknown.
    pub fn is_unknown(&self) -> bool {
        self.temperature_c.is_none()
            && self.wind_speed_kmh.is_none()
            && self.sunrise.is_none()
            && self.sunset.is_none()
    }
}

/// Lifecycle state of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum FetchState {
    /// An activation is in flight.
    Loading,
    /// At least one source answered.
    Ready,
    /// Both sources failed hard.
    Failed(String),
}

impl FetchState {
    pub fn is_ready(&self) -> bool {
        matches!(self, FetchState::Ready)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchState::Failed(_))
    }
}

impl fmt::Display for FetchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchState::Loading => write!(f, "Loading"),
            FetchState::Ready => write!(f, "Ready"),
            FetchState::Failed(reason) => write!(f, "Failed: {}", reason),
        }
    }
}

/// The complete result of one aggregation cycle.
///
/// Snapshots are published behind an `Arc` and never mutated; a later
/// activation replaces the published value instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub marine: MarineReading,
    pub weather: WeatherReading,
    pub moon_phase: MoonPhase,
    pub fetch_state: FetchState,
    /// Local wall-clock time the readings were keyed to.
    pub observed_at: NaiveDateTime,
    /// User-facing message for each source that failed hard.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_errors: Vec<String>,
}

impl Snapshot {
    /// A snapshot for an activation that has not settled yet.
    ///
    /// The moon phase needs no network, so it is filled in right away.
    pub fn loading(observed_at: NaiveDateTime) -> Self {
        Self {
            marine: MarineReading::unknown(),
            weather: WeatherReading::unknown(),
            moon_phase: crate::astro::phase_for(observed_at.date()),
            fetch_state: FetchState::Loading,
            observed_at,
            source_errors: Vec::new(),
        }
    }
}

/// Parse an Open-Meteo local timestamp (`2024-01-11T05:12`, seconds optional).
pub fn parse_local_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Render a local timestamp as `HH:MM` (24-hour) for display.
pub fn format_clock_time(time: &NaiveDateTime) -> String {
    time.format("%H:%M").to_string()
}
