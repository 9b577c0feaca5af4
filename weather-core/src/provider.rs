use crate::{
    Config,
    error::ProviderError,
    intent::remote::CompletionClient,
    model::{Coordinate, GeocodedPlace, LocationQuery},
    provider::openweather::{CurrentConditions, CurrentPlusDaily, OpenWeatherProvider},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug, sync::Arc};

pub mod openweather;

/// Services that need credentials in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    Completion,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::Completion => "completion",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::Completion]
    }

    /// Environment variable that overrides the configured API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "OPENWEATHER_API_KEY",
            ProviderId::Completion => "COMPLETION_API_KEY",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "completion" => Ok(ProviderId::Completion),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, completion."
            )),
        }
    }
}

/// The two response shapes the weather provider can answer with.
#[derive(Debug, Clone)]
pub enum ProviderResponse {
    CurrentOnly(CurrentConditions),
    CurrentPlusDaily(CurrentPlusDaily),
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Richer "current + daily" endpoint, by coordinate only.
    async fn current_plus_daily(&self, at: Coordinate) -> Result<ProviderResponse, ProviderError>;

    /// Simpler "current conditions" endpoint, by name or coordinate.
    async fn current(&self, query: &LocationQuery) -> Result<ProviderResponse, ProviderError>;
}

/// Forward and reverse geocoding. An empty result means "not found".
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn search(&self, name: &str, limit: u8) -> anyhow::Result<Vec<GeocodedPlace>>;

    async fn reverse(&self, at: Coordinate, limit: u8) -> anyhow::Result<Vec<GeocodedPlace>>;
}

/// Construct the OpenWeather client (weather and geocoding) from config.
pub fn weather_provider_from_config(config: &Config) -> anyhow::Result<Arc<OpenWeatherProvider>> {
    let id = ProviderId::OpenWeather;
    let api_key = config.provider_api_key(id).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for provider '{id}'.\n\
                 Hint: run `weather configure {id}` and enter your API key."
        )
    })?;

    let provider = match config.provider_base_url(id) {
        Some(base_url) => OpenWeatherProvider::with_base_url(api_key.to_owned(), base_url),
        None => OpenWeatherProvider::new(api_key.to_owned()),
    };

    Ok(Arc::new(provider))
}

/// Construct the completion-service client, or `None` when no key is configured.
pub fn completion_client_from_config(config: &Config) -> Option<CompletionClient> {
    let id = ProviderId::Completion;
    let api_key = config.provider_api_key(id)?;
    let provider = config.provider_config(id);

    let mut client = CompletionClient::new(api_key.to_owned());
    if let Some(base_url) = provider.and_then(|p| p.base_url.as_deref()) {
        client = client.with_base_url(base_url);
    }
    if let Some(model) = provider.and_then(|p| p.model.as_deref()) {
        client = client.with_model(model);
    }
    Some(client)
}
