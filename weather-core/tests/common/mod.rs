//! Shared fixtures for the wiremock integration tests.

#![allow(dead_code)]

use serde_json::{Value, json};
use std::sync::Arc;
use weather_core::{WeatherService, provider::openweather::OpenWeatherProvider};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "TEST_KEY";

pub fn service(server: &MockServer) -> WeatherService {
    WeatherService::from_openweather(Arc::new(OpenWeatherProvider::with_base_url(
        API_KEY.to_string(),
        &server.uri(),
    )))
}

pub fn geo_entry(name: &str, country: &str, state: Option<&str>, lat: f64, lon: f64) -> Value {
    let mut entry = json!({ "name": name, "country": country, "lat": lat, "lon": lon });
    if let Some(state) = state {
        entry["state"] = json!(state);
    }
    entry
}

/// Body of the current-conditions endpoint with identical min and max.
pub fn current_body(name: &str, country: &str, lat: f64, lon: f64, temp: f64, condition: &str) -> Value {
    json!({
        "coord": { "lat": lat, "lon": lon },
        "name": name,
        "sys": { "country": country },
        "dt": 1_760_000_000,
        "main": {
            "temp": temp,
            "feels_like": temp - 1.0,
            "temp_min": temp,
            "temp_max": temp,
            "humidity": 60,
            "pressure": 1012
        },
        "visibility": 10000,
        "wind": { "speed": 3.0 },
        "weather": [{ "description": condition, "main": "Clear", "icon": "01d" }]
    })
}

/// Body of the one-call endpoint with a week of daily entries.
pub fn one_call_body(lat: f64, lon: f64, timezone: &str, temp: f64, condition: &str) -> Value {
    let daily: Vec<Value> = (0..8)
        .map(|i| {
            json!({
                "dt": 1_760_000_000 + i * 86_400,
                "temp": { "min": temp - 4.0, "max": temp + 4.0, "day": temp },
                "weather": [{ "description": condition, "main": "Clear", "icon": "01d" }]
            })
        })
        .collect();

    json!({
        "lat": lat,
        "lon": lon,
        "timezone": timezone,
        "timezone_offset": 3600,
        "current": {
            "dt": 1_760_000_000,
            "temp": temp,
            "feels_like": temp - 1.0,
            "humidity": 60,
            "pressure": 1012,
            "visibility": 10000,
            "wind_speed": 3.0,
            "weather": [{ "description": condition, "main": "Clear", "icon": "01d" }]
        },
        "daily": daily
    })
}

pub async fn mount_geocode(server: &MockServer, name: &str, limit: &str, entries: Value) {
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", name))
        .and(query_param("limit", limit))
        .respond_with(ResponseTemplate::new(200).set_body_json(entries))
        .mount(server)
        .await;
}

pub async fn mount_current_at(server: &MockServer, lat: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", lat))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}
