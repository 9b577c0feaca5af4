//! Weather fetch orchestration: resolve a location, try the richer endpoint,
//! fall back to the simpler one, normalize, and annotate with distance.

use futures::future::join_all;
use std::{fmt, sync::Arc};
use tracing::{debug, warn};

use crate::{
    error::{FetchError, ProviderError},
    geo::{distance_km, is_near},
    geocoding::{find_closest_match, geocode, reverse_geocode},
    model::{Coordinate, GeocodedPlace, LocationQuery, NormalizedWeather},
    normalize::{fallback_place, normalize},
    provider::{Geocoder, ProviderResponse, WeatherProvider, openweather::OpenWeatherProvider},
};

#[derive(Debug, Clone, Copy)]
enum Endpoint {
    CurrentPlusDaily,
    CurrentOnly,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::CurrentPlusDaily => f.write_str("current+daily"),
            Endpoint::CurrentOnly => f.write_str("current conditions"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    geocoder: Arc<dyn Geocoder>,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { provider, geocoder }
    }

    /// OpenWeather serves both weather and geocoding.
    pub fn from_openweather(provider: Arc<OpenWeatherProvider>) -> Self {
        Self::new(provider.clone(), provider)
    }

    pub fn geocoder(&self) -> &dyn Geocoder {
        self.geocoder.as_ref()
    }

    pub async fn fetch_weather(
        &self,
        query: &LocationQuery,
        user: Option<Coordinate>,
    ) -> Result<NormalizedWeather, FetchError> {
        let (at, place) = self.resolve(query, user).await?;

        let mut saw_malformed = false;
        for endpoint in [Endpoint::CurrentPlusDaily, Endpoint::CurrentOnly] {
            let response = match endpoint {
                Endpoint::CurrentPlusDaily => self.provider.current_plus_daily(at).await,
                Endpoint::CurrentOnly => {
                    self.provider.current(&LocationQuery::Coordinate(at)).await
                }
            };

            match response.and_then(|r| normalize_at(r, place.as_ref(), at)) {
                Ok(weather) => {
                    debug!("Weather for {} served by {} endpoint", query, endpoint);
                    return Ok(with_distance(weather, user));
                }
                Err(e) => {
                    warn!("{} endpoint failed for {}: {}", endpoint, query, e);
                    saw_malformed |= matches!(e, ProviderError::Malformed(_));
                }
            }
        }

        Err(if saw_malformed { FetchError::MalformedResponse } else { FetchError::ProviderUnavailable })
    }

    /// Fetch several places concurrently; results keep the input order.
    pub async fn fetch_many(
        &self,
        names: &[String],
        user: Option<Coordinate>,
    ) -> Vec<Result<NormalizedWeather, FetchError>> {
        let queries: Vec<LocationQuery> =
            names.iter().map(|n| LocationQuery::Name(n.clone())).collect();
        join_all(queries.iter().map(|q| self.fetch_weather(q, user))).await
    }

    async fn resolve(
        &self,
        query: &LocationQuery,
        user: Option<Coordinate>,
    ) -> Result<(Coordinate, Option<GeocodedPlace>), FetchError> {
        match query {
            LocationQuery::Coordinate(at) => {
                Ok((*at, reverse_geocode(self.geocoder.as_ref(), *at).await))
            }
            LocationQuery::Name(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(FetchError::location_not_found(name));
                }

                // Same-name places are told apart by distance when the user's
                // position is known; otherwise the provider's top hit wins.
                let found = if user.is_some() {
                    find_closest_match(self.geocoder.as_ref(), name, user).await
                } else {
                    geocode(self.geocoder.as_ref(), name).await
                };

                match found {
                    Some(place) => Ok((place.coordinate, Some(place))),
                    None => Err(FetchError::location_not_found(name)),
                }
            }
        }
    }
}

fn normalize_at(
    response: ProviderResponse,
    place: Option<&GeocodedPlace>,
    at: Coordinate,
) -> Result<NormalizedWeather, ProviderError> {
    let place = match place {
        Some(p) => p.clone(),
        None => fallback_place(&response, at),
    };
    normalize(response, place)
}

fn with_distance(mut weather: NormalizedWeather, user: Option<Coordinate>) -> NormalizedWeather {
    if let Some(user) = user {
        let distance = distance_km(user, weather.location.coordinate);
        weather.distance_from_user_km = Some(distance);
        weather.is_near = is_near(distance);
    }
    weather
}
