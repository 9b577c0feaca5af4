//! Typed failures surfaced by the weather pipeline.

use thiserror::Error;

/// Why a user position could not be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("User denied the request for geolocation")]
    PermissionDenied,
    #[error("Location information is unavailable")]
    PositionUnavailable,
    #[error("The request to get user location timed out")]
    Timeout,
    #[error("An unknown geolocation error occurred")]
    Unknown,
}

/// Outcome of a single provider endpoint call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport failure or non-success status.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    /// The endpoint answered but the body had no usable shape.
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

/// Terminal failure of a weather fetch for the current turn.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("location not found: {query}")]
    LocationNotFound { query: String },
    #[error("weather provider unavailable")]
    ProviderUnavailable,
    #[error("weather provider returned no usable data")]
    MalformedResponse,
}

impl FetchError {
    pub fn location_not_found(query: impl Into<String>) -> Self {
        Self::LocationNotFound { query: query.into() }
    }

    /// Text shown to the user in place of a weather reply.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::LocationNotFound { query } => format!(
                "I couldn't find that place: \"{query}\". Please check the spelling or try a different city name."
            ),
            FetchError::ProviderUnavailable | FetchError::MalformedResponse => {
                "I couldn't get weather data right now. Please try again later.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_query() {
        let err = FetchError::location_not_found("Atlantis");
        assert!(err.user_message().contains("\"Atlantis\""));
    }

    #[test]
    fn provider_failures_share_a_retry_message() {
        let a = FetchError::ProviderUnavailable.user_message();
        let b = FetchError::MalformedResponse.user_message();
        assert_eq!(a, b);
        assert!(a.contains("try again later"));
    }
}
