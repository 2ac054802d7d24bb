//! Open-Meteo weather forecast: current conditions and today's sun times.

use super::{build_client, get_json, FetchError, SourceKind, SourceSettings};
use crate::models::Coordinate;
use anyhow::Result;
use serde::Deserialize;
use std::future::Future;
use tracing::info;

/// Anything that can provide current weather and today's almanac.
pub trait WeatherSource: Send + Sync {
    fn fetch_current(
        &self,
        at: Coordinate,
    ) -> impl Future<Output = Result<WeatherPayload, FetchError>> + Send;
}

/// The `current` block. Every field may be missing, `null` or mistyped.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CurrentConditions {
    #[serde(default, deserialize_with = "crate::sources::lenient::text")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "crate::sources::lenient::number")]
    pub temperature_2m: Option<f64>,
    #[serde(default, deserialize_with = "crate::sources::lenient::number")]
    pub wind_speed_10m: Option<f64>,
}

/// The `daily` block; arrays are indexed by day offset from today.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DailyAlmanac {
    #[serde(default, deserialize_with = "crate::sources::lenient::labels")]
    pub time: Vec<String>,
    #[serde(default, deserialize_with = "crate::sources::lenient::texts")]
    pub sunrise: Vec<Option<String>>,
    #[serde(default, deserialize_with = "crate::sources::lenient::texts")]
    pub sunset: Vec<Option<String>>,
}

impl DailyAlmanac {
    pub fn first_sunrise(&self) -> Option<&str> {
        self.sunrise.first().and_then(|s| s.as_deref())
    }

    pub fn first_sunset(&self) -> Option<&str> {
        self.sunset.first().and_then(|s| s.as_deref())
    }
}

/// Decoded weather response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WeatherPayload {
    pub current: CurrentConditions,
    pub daily: DailyAlmanac,
}

/// Client for `api.open-meteo.com/v1/forecast`.
pub struct OpenMeteoWeather {
    client: reqwest::Client,
    url: String,
    timezone: String,
}

impl OpenMeteoWeather {
    pub fn new(settings: &SourceSettings) -> Result<Self> {
        Ok(Self {
            client: build_client(settings.timeout)?,
            url: settings.weather_url.clone(),
            timezone: settings.timezone.clone(),
        })
    }

    fn query(&self, at: Coordinate) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", at.latitude.to_string()),
            ("longitude", at.longitude.to_string()),
            ("current", "temperature_2m,wind_speed_10m".to_string()),
            ("daily", "sunrise,sunset".to_string()),
            ("timezone", self.timezone.clone()),
            ("forecast_days", "1".to_string()),
        ]
    }
}

impl WeatherSource for OpenMeteoWeather {
    async fn fetch_current(&self, at: Coordinate) -> Result<WeatherPayload, FetchError> {
        let payload: WeatherPayload =
            get_json(&self.client, SourceKind::Weather, &self.url, &self.query(at)).await?;

        info!(
            "Weather forecast: current at {}",
            payload.current.time.as_deref().unwrap_or("unknown time")
        );
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::test_server::{closed_port, serve_once};
    use std::time::Duration;

    fn settings(url: String) -> SourceSettings {
        SourceSettings {
            weather_url: url,
            timeout: Duration::from_secs(5),
            ..SourceSettings::default()
        }
    }

    const FULL_BODY: &str = r#"{
        "latitude": -13.625, "longitude": -38.875,
        "timezone": "America/Bahia",
        "current_units": {"temperature_2m": "°C", "wind_speed_10m": "km/h"},
        "current": {"time": "2024-01-11T14:00", "interval": 900, "temperature_2m": 29.4, "wind_speed_10m": 14.2},
        "daily_units": {"sunrise": "iso8601", "sunset": "iso8601"},
        "daily": {"time": ["2024-01-11"], "sunrise": ["2024-01-11T05:12"], "sunset": ["2024-01-11T17:55"]}
    }"#;

    #[tokio::test]
    async fn test_fetch_parses_current_and_daily() {
        let (url, request) = serve_once(200, FULL_BODY).await;
        let source = OpenMeteoWeather::new(&settings(url)).unwrap();

        let payload = source.fetch_current(Coordinate::BOIPEBA).await.unwrap();
        assert_eq!(payload.current.temperature_2m, Some(29.4));
        assert_eq!(payload.current.wind_speed_10m, Some(14.2));
        assert_eq!(payload.daily.first_sunrise(), Some("2024-01-11T05:12"));
        assert_eq!(payload.daily.first_sunset(), Some("2024-01-11T17:55"));

        let head = request.await.unwrap();
        assert!(head.contains("current=temperature_2m%2Cwind_speed_10m"));
        assert!(head.contains("daily=sunrise%2Csunset"));
        assert!(head.contains("forecast_days=1"));
    }

    #[tokio::test]
    async fn test_missing_fields_inside_blocks_are_tolerated() {
        let body = r#"{"current": {"time": "2024-01-11T14:00"}, "daily": {"time": ["2024-01-11"]}}"#;
        let (url, _request) = serve_once(200, body).await;
        let source = OpenMeteoWeather::new(&settings(url)).unwrap();

        let payload = source.fetch_current(Coordinate::BOIPEBA).await.unwrap();
        assert_eq!(payload.current.temperature_2m, None);
        assert_eq!(payload.daily.first_sunrise(), None);
    }

    #[tokio::test]
    async fn test_null_sunrise_keeps_other_fields() {
        let body = r#"{
            "current": {"time": "2024-01-11T14:00", "temperature_2m": 29.4, "wind_speed_10m": 14.2},
            "daily": {"time": ["2024-01-11"], "sunrise": null, "sunset": ["2024-01-11T17:55"]}
        }"#;
        let (url, _request) = serve_once(200, body).await;
        let source = OpenMeteoWeather::new(&settings(url)).unwrap();

        let payload = source.fetch_current(Coordinate::BOIPEBA).await.unwrap();
        assert_eq!(payload.current.temperature_2m, Some(29.4));
        assert_eq!(payload.current.wind_speed_10m, Some(14.2));
        assert_eq!(payload.daily.first_sunrise(), None);
        assert_eq!(payload.daily.first_sunset(), Some("2024-01-11T17:55"));
    }

    #[test]
    fn test_mistyped_current_value_is_unknown() {
        let payload: WeatherPayload = serde_json::from_str(
            r#"{
                "current": {"time": 1704992400, "temperature_2m": "n/a", "wind_speed_10m": 14.2},
                "daily": {"time": ["2024-01-11"], "sunrise": ["2024-01-11T05:12"], "sunset": [false]}
            }"#,
        )
        .unwrap();
        assert_eq!(payload.current.time, None);
        assert_eq!(payload.current.temperature_2m, None);
        assert_eq!(payload.current.wind_speed_10m, Some(14.2));
        assert_eq!(payload.daily.first_sunrise(), Some("2024-01-11T05:12"));
        assert_eq!(payload.daily.first_sunset(), None);
    }

    #[test]
    fn test_non_object_blocks_are_rejected() {
        let body = r#"{"current": null, "daily": {"sunrise": []}}"#;
        assert!(serde_json::from_str::<WeatherPayload>(body).is_err());

        let body = r#"{"current": {}, "daily": "none"}"#;
        assert!(serde_json::from_str::<WeatherPayload>(body).is_err());
    }

    #[tokio::test]
    async fn test_missing_daily_block_is_malformed() {
        let body = r#"{"current": {"temperature_2m": 29.4}}"#;
        let (url, _request) = serve_once(200, body).await;
        let source = OpenMeteoWeather::new(&settings(url)).unwrap();

        let err = source.fetch_current(Coordinate::BOIPEBA).await.unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse { origin: SourceKind::Weather, .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network() {
        let source = OpenMeteoWeather::new(&settings(closed_port().await)).unwrap();

        let err = source.fetch_current(Coordinate::BOIPEBA).await.unwrap_err();
        assert!(matches!(err, FetchError::Network { origin: SourceKind::Weather, .. }));
    }

    #[test]
    fn test_almanac_null_entries() {
        let daily: DailyAlmanac =
            serde_json::from_str(r#"{"time": ["2024-01-11"], "sunrise": [null], "sunset": []}"#)
                .unwrap();
        assert_eq!(daily.first_sunrise(), None);
        assert_eq!(daily.first_sunset(), None);
    }
}
