//! Open-Meteo marine forecast: hourly wave height for today.

use super::{build_client, get_json, FetchError, SourceKind, SourceSettings};
use crate::models::Coordinate;
use anyhow::Result;
use serde::Deserialize;
use std::future::Future;
use tracing::info;

/// Anything that can provide today's hourly wave heights.
pub trait MarineSource: Send + Sync {
    fn fetch_wave_heights(
        &self,
        at: Coordinate,
    ) -> impl Future<Output = Result<HourlySeries, FetchError>> + Send;
}

/// Hourly values for the requested forecast window.
///
/// Index 0 is local midnight. Upstream may send fewer entries than hours
/// in the day, `null` for individual hours, or no usable array at all.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HourlySeries {
    #[serde(default, deserialize_with = "crate::sources::lenient::labels")]
    pub time: Vec<String>,
    #[serde(default, deserialize_with = "crate::sources::lenient::numbers")]
    pub wave_height: Vec<Option<f64>>,
}

impl HourlySeries {
    /// Wave height at a given hour-of-day, if present.
    pub fn wave_height_at(&self, hour: usize) -> Option<f64> {
        self.wave_height.get(hour).copied().flatten()
    }
}

#[derive(Debug, Deserialize)]
struct MarineResponse {
    hourly: HourlySeries,
}

/// Client for `marine-api.open-meteo.com`.
pub struct OpenMeteoMarine {
    client: reqwest::Client,
    url: String,
    timezone: String,
}

impl OpenMeteoMarine {
    pub fn new(settings: &SourceSettings) -> Result<Self> {
        Ok(Self {
            client: build_client(settings.timeout)?,
            url: settings.marine_url.clone(),
            timezone: settings.timezone.clone(),
        })
    }

    fn query(&self, at: Coordinate) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", at.latitude.to_string()),
            ("longitude", at.longitude.to_string()),
            ("hourly", "wave_height".to_string()),
            ("timezone", self.timezone.clone()),
            ("forecast_days", "1".to_string()),
        ]
    }
}

impl MarineSource for OpenMeteoMarine {
    async fn fetch_wave_heights(&self, at: Coordinate) -> Result<HourlySeries, FetchError> {
        let response: MarineResponse =
            get_json(&self.client, SourceKind::Marine, &self.url, &self.query(at)).await?;

        info!(
            "Marine forecast: {} hourly wave heights",
            response.hourly.wave_height.len()
        );
        Ok(response.hourly)
    }
}
