//! Converges both provider response shapes on [`NormalizedWeather`].

use chrono::{DateTime, Utc};

use crate::{
    error::ProviderError,
    model::{Coordinate, DailyForecast, GeocodedPlace, NormalizedWeather},
    provider::{
        ProviderResponse,
        openweather::{CurrentConditions, CurrentPlusDaily, OwCondition},
    },
};

const MPS_TO_KMH: f64 = 3.6;
const MAX_FORECAST_DAYS: usize = 7;

pub fn normalize(
    response: ProviderResponse,
    place: GeocodedPlace,
) -> Result<NormalizedWeather, ProviderError> {
    match response {
        ProviderResponse::CurrentOnly(body) => from_current_only(body, place),
        ProviderResponse::CurrentPlusDaily(body) => from_current_plus_daily(body, place),
    }
}

/// Best-effort place label when geocoding could not name a coordinate.
pub fn fallback_place(response: &ProviderResponse, at: Coordinate) -> GeocodedPlace {
    let (name, country) = match response {
        ProviderResponse::CurrentOnly(body) => (
            body.name.clone(),
            body.sys.as_ref().map(|s| s.country.clone()).unwrap_or_default(),
        ),
        ProviderResponse::CurrentPlusDaily(body) => {
            // "America/New_York" -> ("New York", "America")
            let mut parts = body.timezone.splitn(2, '/');
            let area = parts.next().unwrap_or_default().to_string();
            let city = parts.next().map(|c| c.replace('_', " ")).unwrap_or_default();
            (city, area)
        }
    };

    let name = if name.trim().is_empty() {
        format!("{:.4}, {:.4}", at.latitude, at.longitude)
    } else {
        name
    };

    GeocodedPlace { name, country, region: None, coordinate: at }
}

/// Reported min/max when they differ, otherwise a spread of
/// `clamp(|temp| * 0.1, 3, 8)` either side of `temp`. The flag marks synthesis.
pub fn temperature_range(temp: f64, min: Option<f64>, max: Option<f64>) -> (f64, f64, bool) {
    match (min, max) {
        (Some(lo), Some(hi)) if (hi - lo).abs() > f64::EPSILON => (lo.min(hi), lo.max(hi), false),
        _ => {
            let spread = (temp.abs() * 0.1).clamp(3.0, 8.0);
            (temp - spread, temp + spread, true)
        }
    }
}

fn from_current_only(
    body: CurrentConditions,
    place: GeocodedPlace,
) -> Result<NormalizedWeather, ProviderError> {
    let main = body
        .main
        .ok_or_else(|| ProviderError::Malformed("current conditions without main block".into()))?;
    let temperature = main
        .temp
        .ok_or_else(|| ProviderError::Malformed("current conditions without temperature".into()))?;

    let (temp_min, temp_max, range_synthesized) =
        temperature_range(temperature, main.temp_min, main.temp_max);
    let (condition, icon) = describe(&body.weather);

    Ok(NormalizedWeather {
        location: place,
        observed_at: timestamp(body.dt),
        temperature,
        feels_like: main.feels_like.unwrap_or(temperature),
        temp_min,
        temp_max,
        range_synthesized,
        condition,
        icon,
        humidity_pct: humidity(main.humidity),
        wind_speed_kmh: body.wind.and_then(|w| w.speed).unwrap_or(0.0) * MPS_TO_KMH,
        pressure_hpa: main.pressure.unwrap_or(0.0),
        visibility_km: body.visibility.map(|m| m / 1000.0),
        daily: Vec::new(),
        distance_from_user_km: None,
        is_near: false,
    })
}

fn from_current_plus_daily(
    body: CurrentPlusDaily,
    place: GeocodedPlace,
) -> Result<NormalizedWeather, ProviderError> {
    let current = body
        .current
        .ok_or_else(|| ProviderError::Malformed("one-call response without current block".into()))?;
    let temperature = current
        .temp
        .ok_or_else(|| ProviderError::Malformed("one-call response without temperature".into()))?;

    let daily: Vec<DailyForecast> = body
        .daily
        .iter()
        .take(MAX_FORECAST_DAYS)
        .filter_map(|day| {
            let date = DateTime::from_timestamp(day.dt + body.timezone_offset, 0)?.date_naive();
            Some(DailyForecast {
                date,
                temp_min: day.temp.min,
                temp_max: day.temp.max,
                day_temp: day.temp.day.unwrap_or(day.temp.max),
                condition: describe(&day.weather).0,
            })
        })
        .collect();

    let today = daily.first();
    let (temp_min, temp_max, range_synthesized) =
        temperature_range(temperature, today.map(|d| d.temp_min), today.map(|d| d.temp_max));
    let (condition, icon) = describe(&current.weather);

    Ok(NormalizedWeather {
        location: place,
        observed_at: timestamp(current.dt),
        temperature,
        feels_like: current.feels_like.unwrap_or(temperature),
        temp_min,
        temp_max,
        range_synthesized,
        condition,
        icon,
        humidity_pct: humidity(current.humidity),
        wind_speed_kmh: current.wind_speed.unwrap_or(0.0) * MPS_TO_KMH,
        pressure_hpa: current.pressure.unwrap_or(0.0),
        visibility_km: current.visibility.map(|m| m / 1000.0),
        daily,
        distance_from_user_km: None,
        is_near: false,
    })
}

fn describe(conditions: &[OwCondition]) -> (String, String) {
    conditions
        .first()
        .map(|c| {
            let description = if c.description.is_empty() { c.main.to_lowercase() } else { c.description.clone() };
            (description, c.icon.clone())
        })
        .unwrap_or_else(|| ("unknown".to_string(), String::new()))
}

fn humidity(raw: Option<f64>) -> u8 {
    raw.unwrap_or(0.0).clamp(0.0, 100.0).round() as u8
}

fn timestamp(ts: Option<i64>) -> DateTime<Utc> {
    ts.and_then(|t| DateTime::from_timestamp(t, 0)).unwrap_or_else(Utc::now)
}
