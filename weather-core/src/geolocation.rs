//! Sources of the user's own position.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::{
    fmt::Debug,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{error::GeolocationError, model::Coordinate};

pub const DEFAULT_IP_LOOKUP_URL: &str = "http://ip-api.com/json";

/// Options for a position request.
#[derive(Debug, Clone, Copy)]
pub struct PositionOptions {
    /// Ask for the most precise fix available. IP lookups ignore it.
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// A previously obtained position younger than this is reused.
    pub max_cached_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            max_cached_age: Duration::from_secs(600),
        }
    }
}

#[async_trait]
pub trait PositionSource: Send + Sync + Debug {
    async fn current_position(&self, options: &PositionOptions)
    -> Result<Coordinate, GeolocationError>;
}

/// A position known up front (command-line flags or the config file).
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPosition(pub Option<Coordinate>);

#[async_trait]
impl PositionSource for FixedPosition {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinate, GeolocationError> {
        self.0.ok_or(GeolocationError::PositionUnavailable)
    }
}

/// Approximate position from the public IP address.
#[derive(Debug)]
pub struct IpLocator {
    http: Client,
    url: String,
    cached: Mutex<Option<(Instant, Coordinate)>>,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    #[serde(default)]
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

impl IpLocator {
    pub fn new() -> Self {
        Self::with_url(DEFAULT_IP_LOOKUP_URL)
    }

    pub fn with_url(url: &str) -> Self {
        Self { http: Client::new(), url: url.to_string(), cached: Mutex::new(None) }
    }

    async fn lookup(&self, timeout: Duration) -> Result<Coordinate, GeolocationError> {
        let res = self.http.get(&self.url).timeout(timeout).send().await.map_err(|e| {
            debug!("IP geolocation request failed: {}", e);
            if e.is_timeout() {
                GeolocationError::Timeout
            } else {
                GeolocationError::PositionUnavailable
            }
        })?;

        match res.status() {
            s if s.is_success() => {}
            StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
                return Err(GeolocationError::PermissionDenied);
            }
            s => {
                debug!("IP geolocation returned status {}", s);
                return Err(GeolocationError::Unknown);
            }
        }

        let body: IpLookupResponse = res.json().await.map_err(|e| {
            debug!("IP geolocation parse error: {}", e);
            GeolocationError::Unknown
        })?;

        if !body.status.is_empty() && body.status != "success" {
            debug!("IP geolocation refused: {}", body.message.as_deref().unwrap_or("no message"));
            return Err(GeolocationError::PositionUnavailable);
        }

        body.lat
            .zip(body.lon)
            .and_then(|(lat, lon)| Coordinate::new(lat, lon))
            .ok_or(GeolocationError::PositionUnavailable)
    }
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PositionSource for IpLocator {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinate, GeolocationError> {
        let mut cached = self.cached.lock().await;
        if let Some((at, coordinate)) = *cached {
            if at.elapsed() <= options.max_cached_age {
                return Ok(coordinate);
            }
        }

        let coordinate = self.lookup(options.timeout).await?;
        *cached = Some((Instant::now(), coordinate));
        Ok(coordinate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_position_reports_unavailable_when_empty() {
        let err = FixedPosition(None).current_position(&PositionOptions::default()).await;
        assert_eq!(err, Err(GeolocationError::PositionUnavailable));

        let here = Coordinate { latitude: 51.5, longitude: -0.12 };
        let ok = FixedPosition(Some(here)).current_position(&PositionOptions::default()).await;
        assert_eq!(ok, Ok(here));
    }

    #[test]
    fn default_options_match_browser_request() {
        let options = PositionOptions::default();
        assert!(options.high_accuracy);
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.max_cached_age, Duration::from_secs(600));
    }
}
