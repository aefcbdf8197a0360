//! Forecast provider client and derived weather flags.
//!
//! The forecast is consumed as normalized hourly series plus the location's
//! UTC offset; everything downstream works off [`sortie_core::WeatherFlags`]
//! derived once per request so all filtering and scoring decisions share one
//! consistent weather judgment.

pub mod client;
pub mod flags;

use thiserror::Error;

pub use client::{Forecast, HourlySeries, WeatherClient};
pub use flags::{derive_flags, report_from_forecast, FLAG_WINDOW_HOURS};

/// Errors returned by the forecast provider client.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured base URL does not parse.
    #[error("invalid base URL: {0}")]
    BadUrl(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
}
