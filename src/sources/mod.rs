//! Remote forecast sources.
//!
//! Each source issues exactly one HTTP GET per activation and classifies
//! failures into the two hard error kinds of [`FetchError`]. There are no
//! retries: a failed attempt is final for the activation.

mod lenient;
pub mod marine;
pub mod weather;

pub use marine::{HourlySeries, MarineSource, OpenMeteoMarine};
pub use weather::{CurrentConditions, DailyAlmanac, OpenMeteoWeather, WeatherPayload, WeatherSource};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Which remote source produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Marine,
    Weather,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Marine => write!(f, "marine forecast"),
            SourceKind::Weather => write!(f, "weather forecast"),
        }
    }
}

/// Hard failure of a remote source.
///
/// A missing field inside an otherwise usable response is not an error;
/// it surfaces as an unknown reading instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport failure, timeout or non-success HTTP status.
    #[error("{origin} unavailable: {reason}")]
    Network { origin: SourceKind, reason: String },

    /// A response arrived but does not have the expected shape.
    #[error("{origin} returned an unusable response: {reason}")]
    MalformedResponse { origin: SourceKind, reason: String },
}

impl FetchError {
    pub fn network(origin: SourceKind, reason: impl Into<String>) -> Self {
        FetchError::Network {
            origin,
            reason: reason.into(),
        }
    }

    pub fn malformed(origin: SourceKind, reason: impl Into<String>) -> Self {
        FetchError::MalformedResponse {
            origin,
            reason: reason.into(),
        }
    }

    pub fn origin(&self) -> SourceKind {
        match self {
            FetchError::Network { origin, .. } | FetchError::MalformedResponse { origin, .. } => {
                *origin
            }
        }
    }
}

/// Connection settings shared by both Open-Meteo sources.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub marine_url: String,
    pub weather_url: String,
    /// IANA timezone the API should report local times in.
    pub timezone: String,
    pub timeout: Duration,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self::from(&crate::config::Config::default())
    }
}

impl From<&crate::config::Config> for SourceSettings {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            marine_url: config.sources.marine_url.clone(),
            weather_url: config.sources.weather_url.clone(),
            timezone: config.location.timezone.clone(),
            timeout: Duration::from_secs(config.sources.timeout_seconds),
        }
    }
}

/// Build the HTTP client used by a source.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("boipeba-conditions/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")
}

/// Issue one GET and decode the JSON body, classifying every failure.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    origin: SourceKind,
    url: &str,
    query: &[(&str, String)],
) -> std::result::Result<T, FetchError> {
    debug!("GET {} {:?}", url, query);

    let response = client.get(url).query(query).send().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::network(origin, "request timed out")
        } else if e.is_connect() {
            FetchError::network(origin, format!("cannot connect to {}", url))
        } else {
            FetchError::network(origin, format!("request failed: {}", e))
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let reason = api_error_reason(&body).unwrap_or_else(|| body.trim().to_string());
        return Err(FetchError::network(
            origin,
            format!("HTTP {}: {}", status, reason),
        ));
    }

    let body = response
        .text()
        .await
        .map_err(|e| FetchError::network(origin, format!("failed to read body: {}", e)))?;

    serde_json::from_str(&body).map_err(|e| FetchError::malformed(origin, e.to_string()))
}

/// Open-Meteo reports errors as `{"error": true, "reason": "..."}`.
fn api_error_reason(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value["reason"].as_str().map(String::from)
}

#[cfg(test)]
pub(crate) mod test_server {
    //! One-shot HTTP server for exercising the sources.

    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve a single response and hand back the raw request head.
    pub async fn serve_once(status: u16, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = vec![0u8; 8192];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let _ = tx.send(String::from_utf8_lossy(&buf[..n]).into_owned());

                let response = format!(
                    "HTTP/1.1 {} Status\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}", addr), rx)
    }

    /// Accept a connection and never answer.
    pub async fn serve_silence() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            if let Ok((socket, _)) = listener.accept().await {
                tokio::time::sleep(Duration::from_secs(30)).await;
                drop(socket);
            }
        });

        format!("http://{}", addr)
    }

    /// An address nothing listens on.
    pub async fn closed_port() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }
}
