//! OpenWeather client behaviour against a mock HTTP server.

mod common;

use common::{API_KEY, current_body, geo_entry};
use serde_json::json;
use weather_core::{
    Coordinate, Geocoder, LocationQuery, ProviderError, WeatherProvider,
    provider::{ProviderResponse, openweather::OpenWeatherProvider},
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> OpenWeatherProvider {
    OpenWeatherProvider::with_base_url(API_KEY.to_string(), &server.uri())
}

#[tokio::test]
async fn current_by_name_sends_key_and_metric_units() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Paris"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", API_KEY))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_body("Paris", "FR", 48.8566, 2.3522, 15.0, "clear sky")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server).current(&LocationQuery::from("Paris")).await.unwrap();

    match response {
        ProviderResponse::CurrentOnly(body) => {
            assert_eq!(body.name, "Paris");
            assert_eq!(body.main.and_then(|m| m.temp), Some(15.0));
        }
        other => panic!("expected current conditions, got {other:?}"),
    }
}

#[tokio::test]
async fn one_call_sends_coordinates_and_excludes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/3.0/onecall"))
        .and(query_param("lat", "48.8566"))
        .and(query_param("lon", "2.3522"))
        .and(query_param("exclude", "minutely,hourly,alerts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::one_call_body(
            48.8566,
            2.3522,
            "Europe/Paris",
            15.0,
            "clear sky",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let at = Coordinate { latitude: 48.8566, longitude: 2.3522 };
    let response = client(&server).current_plus_daily(at).await.unwrap();

    match response {
        ProviderResponse::CurrentPlusDaily(body) => {
            assert_eq!(body.timezone, "Europe/Paris");
            assert_eq!(body.daily.len(), 8);
        }
        other => panic!("expected current+daily, got {other:?}"),
    }
}

#[tokio::test]
async fn error_status_is_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/3.0/onecall"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"cod":401,"message":"Invalid API key"}"#))
        .mount(&server)
        .await;

    let at = Coordinate { latitude: 1.0, longitude: 2.0 };
    let err = client(&server).current_plus_daily(at).await.unwrap_err();

    match err {
        ProviderError::Unavailable(msg) => {
            assert!(msg.contains("401"));
            assert!(msg.contains("Invalid API key"));
        }
        other => panic!("expected Unavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn unparseable_body_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client(&server).current(&LocationQuery::from("Paris")).await.unwrap_err();
    assert!(matches!(err, ProviderError::Malformed(_)));
}

#[tokio::test]
async fn geocoding_maps_entries_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "Portland"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            geo_entry("Portland", "US", Some("Oregon"), 45.52, -122.68),
            geo_entry("Portland", "US", Some("Maine"), 43.66, -70.26),
        ])))
        .mount(&server)
        .await;

    let places = client(&server).search("Portland", 5).await.unwrap();

    assert_eq!(places.len(), 2);
    assert_eq!(places[0].display_name(), "Portland, Oregon, US");
    assert_eq!(places[1].region.as_deref(), Some("Maine"));
}

#[tokio::test]
async fn reverse_geocoding_empty_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/reverse"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let at = Coordinate { latitude: 0.0, longitude: -160.0 };
    assert!(client(&server).reverse(at, 1).await.unwrap().is_empty());
}
