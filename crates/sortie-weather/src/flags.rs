//! Weather-flag derivation.
//!
//! Flags look at the next [`FLAG_WINDOW_HOURS`] local hours so an evening
//! request judges the evening, not the morning that already happened.

use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};
use sortie_core::{WeatherFlags, WeatherReport};

use crate::client::Forecast;

/// How far ahead the flags look.
pub const FLAG_WINDOW_HOURS: usize = 6;

const PRECIP_PROBABILITY_PCT: f64 = 40.0;
const PRECIP_AMOUNT_MM: f64 = 0.3;
const COLD_C: f64 = 8.0;
const VERY_COLD_C: f64 = 0.0;
const WINDY_KMH: f64 = 30.0;
const VERY_WINDY_KMH: f64 = 50.0;

/// Derives the request's weather flags from a forecast.
///
/// The hourly arrays start at local midnight; the window starts at the
/// current local hour. A truncated or empty series yields neutral flags.
#[must_use]
pub fn derive_flags(forecast: &Forecast, now: DateTime<Utc>) -> WeatherFlags {
    let offset = FixedOffset::east_opt(forecast.utc_offset_seconds).unwrap_or_else(|| Utc.fix());
    let local_hour = now.with_timezone(&offset).hour() as usize;

    let hourly = &forecast.hourly;
    let end = (local_hour + FLAG_WINDOW_HOURS).min(hourly.temperature_2m.len());
    if local_hour >= end {
        return WeatherFlags::default();
    }
    let window = local_hour..end;

    let min_temp = hourly.temperature_2m[window.clone()]
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);
    let min_temp_c = min_temp.is_finite().then_some(min_temp);

    let precip = window.clone().any(|i| {
        let probable = hourly
            .precipitation_probability
            .get(i)
            .copied()
            .flatten()
            .is_some_and(|p| p > PRECIP_PROBABILITY_PCT);
        let falling = hourly
            .precipitation
            .get(i)
            .is_some_and(|mm| *mm > PRECIP_AMOUNT_MM);
        probable || falling
    });

    let max_wind = window
        .clone()
        .filter_map(|i| hourly.wind_speed_10m.get(i).copied())
        .fold(0.0_f64, f64::max);

    WeatherFlags {
        precip,
        cold: min_temp_c.is_some_and(|t| t < COLD_C),
        very_cold: min_temp_c.is_some_and(|t| t < VERY_COLD_C),
        windy: max_wind > WINDY_KMH,
        very_windy: max_wind > VERY_WINDY_KMH,
        min_temp_c,
    }
}

/// Builds the response weather block from a forecast.
#[must_use]
pub fn report_from_forecast(forecast: &Forecast, now: DateTime<Utc>) -> WeatherReport {
    let flags = derive_flags(forecast, now);
    WeatherReport {
        available: true,
        summary: summarize(&flags),
        flags,
    }
}

fn summarize(flags: &WeatherFlags) -> String {
    let sky = if flags.precip { "Rain likely" } else { "Dry" };
    let feel = if flags.very_cold {
        "freezing"
    } else if flags.cold {
        "chilly"
    } else {
        "mild"
    };
    let mut summary = format!("{sky} and {feel}");
    if flags.very_windy {
        summary.push_str(", stormy wind");
    } else if flags.windy {
        summary.push_str(", breezy");
    }
    if let Some(t) = flags.min_temp_c {
        summary.push_str(&format!(", around {t:.0}\u{b0}C"));
    }
    summary
}
