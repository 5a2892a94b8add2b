//! Text rendering of the search and detail views.

use std::fmt::Write;

use localwx_core::{AsyncState, Phase};
use localwx_weather::{LocalityRecord, WeatherReading};

fn value(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_else(|| "N/A".to_string())
}

/// Numbered suggestion list; empty string when there is nothing to show.
pub fn render_suggestions(suggestions: &[&LocalityRecord]) -> String {
    let mut out = String::new();
    for (i, record) in suggestions.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {} ({}) [{}]",
            i + 1,
            record.locality_name,
            record.city_name,
            record.locality_id
        );
    }
    out
}

/// Catalog status line shown above the search prompt, if any.
pub fn render_catalog_status(state: &AsyncState<Vec<LocalityRecord>>) -> Option<String> {
    match state.phase() {
        Phase::Pending => Some("Loading localities...".to_string()),
        Phase::Failure => Some(format!(
            "Error: {}",
            state.error.as_deref().unwrap_or("An error occurred")
        )),
        Phase::Idle | Phase::Success => None,
    }
}

/// Detail view for one locality. Loading and error states hide any reading.
pub fn render_weather(locality_id: &str, state: &AsyncState<WeatherReading>) -> String {
    if state.is_loading() {
        return "Loading...".to_string();
    }
    if let Some(error) = &state.error {
        return format!("Error: {}", error);
    }

    let Some(reading) = &state.data else {
        return format!("No weather data for {}", locality_id);
    };

    let w = &reading.locality_weather;
    let mut out = String::new();
    let _ = writeln!(out, "Weather for {}", reading.locality_id);
    let _ = writeln!(out, "  Temperature:       {}°C", value(w.temperature));
    let _ = writeln!(out, "  Humidity:          {}%", value(w.humidity));
    let _ = writeln!(out, "  Wind Speed:        {} m/s", value(w.wind_speed));
    let _ = writeln!(out, "  Wind Direction:    {}°", value(w.wind_direction));
    let _ = writeln!(out, "  Rain Intensity:    {} mm/hr", value(w.rain_intensity));
    let _ = writeln!(out, "  Rain Accumulation: {} mm", value(w.rain_accumulation));
    let _ = writeln!(out, "  Device Type:       {}", reading.device_kind().description());
    let _ = write!(
        out,
        "  Updated:           {}",
        reading.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    out
}
