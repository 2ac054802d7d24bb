//! Merging two independent source results into one snapshot.
//!
//! Policy:
//! - a missing field becomes an unknown reading, never an error;
//! - a hard failure of one source only blanks that source's readings;
//! - the snapshot is `Failed` only when both sources failed hard.

use crate::astro::MoonPhase;
use crate::models::{parse_local_timestamp, FetchState, MarineReading, Snapshot, WeatherReading};
use crate::sources::{FetchError, HourlySeries, WeatherPayload};
use chrono::{NaiveDateTime, Timelike};
use tracing::{debug, warn};

/// Pick the wave height for the current local hour.
///
/// The hour of the local wall clock is used as-is, without checking it
/// against the offset the response declares.
pub fn extract_marine(series: &HourlySeries, hour: u32) -> MarineReading {
    let wave_height_m = series.wave_height_at(hour as usize);
    if wave_height_m.is_none() {
        debug!(
            "No wave height for hour {} ({} entries)",
            hour,
            series.wave_height.len()
        );
    }
    MarineReading { wave_height_m }
}

/// Read current values and the first daily sun times.
pub fn extract_weather(payload: &WeatherPayload) -> WeatherReading {
    WeatherReading {
        temperature_c: payload.current.temperature_2m,
        wind_speed_kmh: payload.current.wind_speed_10m,
        sunrise: payload.daily.first_sunrise().and_then(parse_local_timestamp),
        sunset: payload.daily.first_sunset().and_then(parse_local_timestamp),
    }
}

/// Join both source outcomes into a settled snapshot.
pub fn merge(
    marine: Result<HourlySeries, FetchError>,
    weather: Result<WeatherPayload, FetchError>,
    observed_at: NaiveDateTime,
    moon_phase: MoonPhase,
) -> Snapshot {
    let mut source_errors = Vec::new();

    let marine = match marine {
        Ok(series) => extract_marine(&series, observed_at.hour()),
        Err(e) => {
            warn!("Marine source failed: {}", e);
            source_errors.push(e.to_string());
            MarineReading::unknown()
        }
    };

    let weather = match weather {
        Ok(payload) => extract_weather(&payload),
        Err(e) => {
            warn!("Weather source failed: {}", e);
            source_errors.push(e.to_string());
            WeatherReading::unknown()
        }
    };

    let fetch_state = if source_errors.len() == 2 {
        FetchState::Failed(format!(
            "Could not load conditions ({})",
            source_errors.join("; ")
        ))
    } else {
        FetchState::Ready
    };

    Snapshot {
        marine,
        weather,
        moon_phase,
        fetch_state,
        observed_at,
        source_errors,
    }
}
