use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::ProviderError,
    model::{Coordinate, GeocodedPlace, LocationQuery},
    provider::{Geocoder, ProviderResponse, WeatherProvider},
};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

const CURRENT_PATH: &str = "/data/2.5/weather";
const ONE_CALL_PATH: &str = "/data/3.0/onecall";
const GEO_DIRECT_PATH: &str = "/geo/1.0/direct";
const GEO_REVERSE_PATH: &str = "/geo/1.0/reverse";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String, ProviderError> {
        let url = format!("{}{}", self.base_url, path);

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                ProviderError::Unavailable(format!("Failed to send request to OpenWeather ({path}): {e}"))
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            ProviderError::Unavailable(format!("Failed to read OpenWeather response body ({path}): {e}"))
        })?;

        if !status.is_success() {
            return Err(ProviderError::Unavailable(format!(
                "OpenWeather request {path} failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        Ok(body)
    }

    async fn geocode_request(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<GeocodedPlace>> {
        let body = self.get(path, query).await?;
        let entries: Vec<OwGeoEntry> =
            serde_json::from_str(&body).context("Failed to parse OpenWeather geocoding JSON")?;

        Ok(entries.into_iter().map(GeocodedPlace::from).collect())
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_plus_daily(&self, at: Coordinate) -> Result<ProviderResponse, ProviderError> {
        debug!("Requesting current+daily weather at {:?}", at);
        let body = self
            .get(
                ONE_CALL_PATH,
                &[
                    ("lat", at.latitude.to_string()),
                    ("lon", at.longitude.to_string()),
                    ("exclude", "minutely,hourly,alerts".to_string()),
                    ("units", "metric".to_string()),
                ],
            )
            .await?;

        let parsed: CurrentPlusDaily = serde_json::from_str(&body).map_err(|e| {
            ProviderError::Malformed(format!("Failed to parse OpenWeather one-call JSON: {e}"))
        })?;

        Ok(ProviderResponse::CurrentPlusDaily(parsed))
    }

    async fn current(&self, query: &LocationQuery) -> Result<ProviderResponse, ProviderError> {
        debug!("Requesting current conditions for {}", query);
        let mut params = match query {
            LocationQuery::Name(name) => vec![("q", name.clone())],
            LocationQuery::Coordinate(at) => {
                vec![("lat", at.latitude.to_string()), ("lon", at.longitude.to_string())]
            }
        };
        params.push(("units", "metric".to_string()));

        let body = self.get(CURRENT_PATH, &params).await?;

        let parsed: CurrentConditions = serde_json::from_str(&body).map_err(|e| {
            ProviderError::Malformed(format!("Failed to parse OpenWeather current JSON: {e}"))
        })?;

        Ok(ProviderResponse::CurrentOnly(parsed))
    }
}

#[async_trait]
impl Geocoder for OpenWeatherProvider {
    async fn search(&self, name: &str, limit: u8) -> Result<Vec<GeocodedPlace>> {
        self.geocode_request(GEO_DIRECT_PATH, &[("q", name.to_string()), ("limit", limit.to_string())])
            .await
    }

    async fn reverse(&self, at: Coordinate, limit: u8) -> Result<Vec<GeocodedPlace>> {
        self.geocode_request(
            GEO_REVERSE_PATH,
            &[
                ("lat", at.latitude.to_string()),
                ("lon", at.longitude.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwCondition {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub main: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwCoord {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwSys {
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwMain {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwWind {
    /// Metres per second.
    pub speed: Option<f64>,
}

/// Body of the "current conditions" endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentConditions {
    pub coord: Option<OwCoord>,
    #[serde(default)]
    pub name: String,
    pub sys: Option<OwSys>,
    pub dt: Option<i64>,
    pub main: Option<OwMain>,
    /// Metres.
    pub visibility: Option<f64>,
    pub wind: Option<OwWind>,
    #[serde(default)]
    pub weather: Vec<OwCondition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwCurrentBlock {
    pub dt: Option<i64>,
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub visibility: Option<f64>,
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub weather: Vec<OwCondition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwDailyTemp {
    pub min: f64,
    pub max: f64,
    pub day: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwDaily {
    pub dt: i64,
    pub temp: OwDailyTemp,
    #[serde(default)]
    pub weather: Vec<OwCondition>,
}

/// Body of the "current + daily" endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentPlusDaily {
    pub lat: f64,
    pub lon: f64,
    /// IANA zone such as "Europe/Paris".
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub timezone_offset: i64,
    pub current: Option<OwCurrentBlock>,
    #[serde(default)]
    pub daily: Vec<OwDaily>,
}

#[derive(Debug, Deserialize)]
struct OwGeoEntry {
    name: String,
    #[serde(default)]
    country: String,
    state: Option<String>,
    lat: f64,
    lon: f64,
}

impl From<OwGeoEntry> for GeocodedPlace {
    fn from(entry: OwGeoEntry) -> Self {
        GeocodedPlace {
            name: entry.name,
            country: entry.country,
            region: entry.state,
            coordinate: Coordinate { latitude: entry.lat, longitude: entry.lon },
        }
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
