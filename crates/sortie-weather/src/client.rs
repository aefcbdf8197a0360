//! HTTP client for the forecast provider.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;

use crate::WeatherError;

/// Hourly forecast series. Arrays are aligned and start at local midnight of
/// the current day.
#[derive(Debug, Clone, Deserialize)]
pub struct HourlySeries {
    pub temperature_2m: Vec<f64>,
    #[serde(default)]
    pub precipitation_probability: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation: Vec<f64>,
    #[serde(default)]
    pub wind_speed_10m: Vec<f64>,
}

/// Normalized forecast for one location.
#[derive(Debug, Clone, Deserialize)]
pub struct Forecast {
    pub utc_offset_seconds: i32,
    pub hourly: HourlySeries,
}

/// Client for the forecast provider.
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: Url,
}

impl WeatherClient {
    /// Creates a new client for the provider at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`WeatherError::BadUrl`] if `base_url` does
    /// not parse.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(3))
            .user_agent("sortie/0.1 (venue-recommendations)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| WeatherError::BadUrl(format!("'{base_url}': {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Fetches a two-day hourly forecast for the given coordinates.
    ///
    /// # Errors
    ///
    /// - [`WeatherError::Http`] on network failure or non-2xx HTTP status.
    /// - [`WeatherError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn forecast(&self, lat: f64, lng: f64) -> Result<Forecast, WeatherError> {
        let mut url = self
            .base_url
            .join("v1/forecast")
            .map_err(|e| WeatherError::BadUrl(e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("latitude", &lat.to_string());
            pairs.append_pair("longitude", &lng.to_string());
            pairs.append_pair(
                "hourly",
                "temperature_2m,precipitation_probability,precipitation,wind_speed_10m",
            );
            pairs.append_pair("forecast_days", "2");
            pairs.append_pair("timezone", "auto");
        }

        let response = self.client.get(url).send().await?.error_for_status()?;
        let body: serde_json::Value = response.json().await?;
        let forecast: Forecast = serde_json::from_value(body)?;
        Ok(forecast)
    }
}
