//! Core library for the `weather` assistant.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client (weather and geocoding) behind provider traits
//! - Intent extraction from free text, rule-based with an optional remote primary
//! - Fetch orchestration, normalization and reply formatting
//! - The conversation controller that ties one user turn together
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod conversation;
pub mod error;
pub mod fetch;
pub mod format;
pub mod geo;
pub mod geocoding;
pub mod geolocation;
pub mod intent;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod region;
pub mod suggest;

pub use config::{Config, ProviderConfig};
pub use conversation::{Assistant, Session, TurnOutcome};
pub use error::{FetchError, GeolocationError, ProviderError};
pub use fetch::WeatherService;
pub use intent::{IntentPipeline, QueryIntent, QueryType, is_weather_related};
pub use model::{Coordinate, GeocodedPlace, LocationQuery, NormalizedWeather, Units};
pub use provider::{Geocoder, ProviderId, WeatherProvider};
pub use region::RegionCode;
