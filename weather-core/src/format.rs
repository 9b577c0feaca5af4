//! Human-readable replies built from normalized weather.

use chrono::NaiveDate;

use crate::{
    intent::ComparisonType,
    model::{NormalizedWeather, Units},
};

/// Within this distance the reply names how far away the place is.
pub const PROXIMITY_NOTE_KM: f64 = 50.0;

/// Forecast days available after today.
pub const FORECAST_HORIZON_DAYS: i64 = 6;

pub const INSUFFICIENT_COMPARISON: &str = "I couldn't get weather data for enough of those places to compare them. Try asking about different cities.";

fn degrees(units: Units, celsius: f64) -> String {
    format!("{}{}", units.whole(celsius), units.symbol())
}

fn place_with_context(weather: &NormalizedWeather) -> String {
    let label = weather.location.label();
    match weather.distance_from_user_km {
        Some(d) if weather.is_near && d < PROXIMITY_NOTE_KM => {
            format!("{label} ({} km from your location)", d.round() as i64)
        }
        _ => {
            let full = weather.location.display_name();
            if full != label { format!("{label} (Found: {full})") } else { label }
        }
    }
}

/// One-place reply. The question's keywords pick the headline attribute.
pub fn format_single(weather: &NormalizedWeather, question: &str, units: Units) -> String {
    let place = place_with_context(weather);
    let q = question.to_lowercase();
    let temp = degrees(units, weather.temperature);
    let feels = degrees(units, weather.feels_like);
    let condition = &weather.condition;
    let wind = weather.wind_speed_kmh.round() as i64;
    let pressure = weather.pressure_hpa.round() as i64;

    if ["temperature", "temp", "hot", "cold"].iter().any(|k| q.contains(k)) {
        return format!("Temperature in {place}: {temp} (feels like {feels}). Currently {condition}.");
    }

    if q.contains("rain") || q.contains("precipitation") {
        return if weather.is_raining() {
            format!("Yes, it's {condition} in {place}. Temperature: {temp}.")
        } else {
            format!("No rain in {place}. Currently {condition}, {temp}.")
        };
    }

    if q.contains("wind") {
        return format!("Wind in {place}: {wind} km/h. Temperature: {temp}, {condition}.");
    }

    if q.contains("humidity") {
        return format!(
            "Humidity in {place}: {}%. Temperature: {temp}, {condition}.",
            weather.humidity_pct
        );
    }

    if q.contains("pressure") {
        return format!("Atmospheric pressure in {place}: {pressure} hPa. Temperature: {temp}, {condition}.");
    }

    let mut reply = format!(
        "Weather in {place}: {condition}, {temp} (feels like {feels}). Humidity: {}%, Wind: {wind} km/h, Pressure: {pressure} hPa.",
        weather.humidity_pct
    );
    if weather.is_near {
        reply.push_str(" This location is close to you!");
    }
    reply
}

/// Entries without a usable temperature or condition are left out of comparisons.
fn is_comparable(weather: &NormalizedWeather) -> bool {
    weather.temperature.is_finite() && !weather.condition.trim().is_empty()
}

struct Entry<'a> {
    name: &'a str,
    temp: i64,
    condition: &'a str,
    raining: bool,
}

/// Side-by-side reply for several places. Missing entries are dropped.
pub fn format_comparison(
    weather: &[Option<NormalizedWeather>],
    names: &[String],
    comparison: ComparisonType,
    units: Units,
) -> String {
    let entries: Vec<Entry<'_>> = weather
        .iter()
        .zip(names)
        .filter_map(|(w, name)| {
            w.as_ref().filter(|w| is_comparable(w)).map(|w| Entry {
                name: name.as_str(),
                temp: units.whole(w.temperature),
                condition: w.condition.as_str(),
                raining: w.is_raining(),
            })
        })
        .collect();

    if entries.len() < 2 {
        return INSUFFICIENT_COMPARISON.to_string();
    }

    let symbol = units.symbol();
    let mut lines = vec!["Weather comparison:".to_string()];
    lines.extend(entries.iter().map(|e| format!("- {}: {}{symbol}, {}", e.name, e.temp, e.condition)));
    lines.push(String::new());

    match comparison {
        ComparisonType::Temperature => {
            let coldest = entries.iter().min_by_key(|e| e.temp);
            let warmest = entries.iter().rev().max_by_key(|e| e.temp);
            if let (Some(coldest), Some(warmest)) = (coldest, warmest) {
                if coldest.temp == warmest.temp {
                    lines.push(format!("All of them are around {}{symbol}.", coldest.temp));
                } else {
                    lines.push(format!("Coldest: {} at {}{symbol}", coldest.name, coldest.temp));
                    lines.push(format!("Warmest: {} at {}{symbol}", warmest.name, warmest.temp));
                    lines.push(format!("Temperature difference: {}{symbol}", warmest.temp - coldest.temp));
                }
            }
        }
        ComparisonType::Rain => {
            let raining: Vec<&str> = entries.iter().filter(|e| e.raining).map(|e| e.name).collect();
            if raining.is_empty() {
                lines.push("It isn't raining in any of them right now.".to_string());
            } else {
                lines.push(format!("Raining now: {}", raining.join(", ")));
            }
        }
        ComparisonType::General => {
            let (a, b) = (&entries[0], &entries[1]);
            let gap = (a.temp - b.temp).abs();
            if gap > 5 {
                let (warmer, cooler) = if a.temp > b.temp { (a, b) } else { (b, a) };
                lines.push(format!("{} is significantly warmer ({gap}{symbol} difference).", warmer.name));
                lines.push(format!("{} feels cooler with {}.", cooler.name, cooler.condition));
            } else {
                lines.push(format!("Both have similar temperatures, only {gap}{symbol} apart."));
            }
        }
    }

    lines.join("\n")
}

fn day_phrase(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        _ => format!("on {}", date.format("%A, %b %-d")),
    }
}

/// Reply for a specific day or a date range, read from the daily forecast.
pub fn format_dated(
    weather: &NormalizedWeather,
    city: &str,
    date: NaiveDate,
    units: Units,
    date_range: Option<(NaiveDate, NaiveDate)>,
    today: NaiveDate,
) -> String {
    if let Some((start, end)) = date_range {
        return format_range(weather, city, start, end, units, today);
    }

    let offset = (date - today).num_days().max(0);
    if offset > FORECAST_HORIZON_DAYS {
        return format!("I can only provide weather forecasts up to 7 days in advance for {city}.");
    }

    let phrase = day_phrase(today + chrono::Days::new(offset as u64), today);

    if weather.daily.is_empty() {
        let current = format!(
            "{}, {}",
            weather.condition,
            degrees(units, weather.temperature)
        );
        return if offset == 0 {
            format!("It's {current} in {city} {phrase}.")
        } else {
            format!("I don't have a forecast for {city} {phrase}. Right now it's {current}.")
        };
    }

    let (condition, high, low) = match weather.daily.get(offset as usize) {
        Some(day) if offset > 0 => (day.condition.as_str(), day.temp_max, day.temp_min),
        _ if offset == 0 => (weather.condition.as_str(), weather.temp_max, weather.temp_min),
        _ => return format!("I can only provide weather forecasts up to 7 days in advance for {city}."),
    };

    let mut reply = format!("It will be {condition} in {city} {phrase}");
    if units.whole(high) != units.whole(low) {
        reply.push_str(&format!(" with a high of {} and a low of {}", degrees(units, high), degrees(units, low)));
    } else {
        reply.push_str(&format!(" with a temperature of {}", degrees(units, high)));
    }
    reply.push('.');
    reply
}

fn format_range(
    weather: &NormalizedWeather,
    city: &str,
    start: NaiveDate,
    end: NaiveDate,
    units: Units,
    today: NaiveDate,
) -> String {
    let lines: Vec<String> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter_map(|d| {
            let offset = (d - today).num_days();
            if !(0..=FORECAST_HORIZON_DAYS).contains(&offset) {
                return None;
            }
            weather.daily.get(offset as usize).map(|day| {
                format!(
                    "{}: {}, high {}, low {}",
                    d.format("%A"),
                    day.condition,
                    degrees(units, day.temp_max),
                    degrees(units, day.temp_min)
                )
            })
        })
        .collect();

    if lines.is_empty() {
        return if weather.daily.is_empty() {
            format!(
                "The daily forecast is unavailable for {city} right now. Currently it's {}, {}.",
                weather.condition,
                degrees(units, weather.temperature)
            )
        } else {
            format!("I can only provide weather forecasts up to 7 days in advance for {city}.")
        };
    }

    format!("Weekend weather for {city}:\n{}", lines.join("\n"))
}
