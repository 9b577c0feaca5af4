//! Text rendering of the weather card.

use weather_core::{
    NormalizedWeather, Units,
    model::ConditionFamily,
};

fn family_label(weather: &NormalizedWeather) -> String {
    let family = match weather.condition_family() {
        ConditionFamily::Clear => "clear",
        ConditionFamily::Clouds => "clouds",
        ConditionFamily::Rain => "rain",
        ConditionFamily::Thunderstorm => "thunderstorm",
        ConditionFamily::Snow => "snow",
        ConditionFamily::Mist => "mist",
        ConditionFamily::Unknown => "unknown",
    };
    if weather.is_night() { format!("{family}, night") } else { family.to_string() }
}

pub fn render(weather: &NormalizedWeather, units: Units) -> String {
    let deg = |c: f64| format!("{}{}", units.whole(c), units.symbol());

    let mut lines = vec![
        format!("{} [{}]", weather.location.display_name(), family_label(weather)),
        format!(
            "  {}  {} (feels like {})",
            deg(weather.temperature),
            weather.condition,
            deg(weather.feels_like)
        ),
        format!(
            "  H {} / L {}{}",
            deg(weather.temp_max),
            deg(weather.temp_min),
            if weather.range_synthesized { " (estimated)" } else { "" }
        ),
    ];

    let mut details = format!(
        "  Humidity {}%  Wind {} km/h  Pressure {} hPa",
        weather.humidity_pct,
        weather.wind_speed_kmh.round() as i64,
        weather.pressure_hpa.round() as i64
    );
    if let Some(km) = weather.visibility_km {
        details.push_str(&format!("  Visibility {km:.1} km"));
    }
    lines.push(details);

    if let Some(km) = weather.distance_from_user_km {
        let near = if weather.is_near { ", near you" } else { "" };
        lines.push(format!("  {} km from your location{near}", km.round() as i64));
    }

    lines.push(format!("  Observed {}", weather.observed_at.format("%Y-%m-%d %H:%M UTC")));
    lines.join("\n")
}
