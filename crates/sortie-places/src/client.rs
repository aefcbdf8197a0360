//! HTTP client for the place-search provider.
//!
//! Wraps `reqwest` with provider-specific error handling, API key
//! management, and typed response deserialization. Every endpoint checks the
//! `"status"` field in the JSON envelope; `ZERO_RESULTS` is an empty result,
//! not an error.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::PlacesError;
use crate::types::{OpeningPeriod, PlaceDetails, SearchCandidate};

const DETAIL_FIELDS: &str = "place_id,name,rating,user_ratings_total,price_level,types,\
business_status,opening_hours,formatted_address,geometry,utc_offset,photos";

/// Client for the place-search provider.
///
/// Use [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Clone)]
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<RawSearchResult>,
}

#[derive(Debug, Deserialize)]
struct RawSearchResult {
    place_id: String,
    name: String,
    geometry: RawGeometry,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    location: RawLocation,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct DetailsEnvelope {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    result: Option<RawDetails>,
}

#[derive(Debug, Deserialize)]
struct RawDetails {
    place_id: String,
    name: String,
    rating: Option<f64>,
    user_ratings_total: Option<u32>,
    price_level: Option<u8>,
    #[serde(default)]
    types: Vec<String>,
    business_status: Option<String>,
    opening_hours: Option<RawHours>,
    formatted_address: Option<String>,
    geometry: RawGeometry,
    /// Minutes east of UTC.
    utc_offset: Option<i32>,
    #[serde(default)]
    photos: Vec<RawPhoto>,
}

#[derive(Debug, Deserialize)]
struct RawHours {
    open_now: Option<bool>,
    #[serde(default)]
    periods: Vec<OpeningPeriod>,
}

#[derive(Debug, Deserialize)]
struct RawPhoto {
    photo_reference: String,
}

impl PlacesClient {
    /// Creates a new client pointed at the production provider.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, "https://maps.googleapis.com")
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::Api`] if `base_url` is not a
    /// valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent("sortie/0.1 (venue-recommendations)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| PlacesError::Api {
            status: "BAD_BASE_URL".to_owned(),
            message: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Runs one text-search lane around a center point.
    ///
    /// Returns geocoded candidates; `ZERO_RESULTS` yields an empty vec.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Api`] if the provider reports a non-OK status.
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn text_search(
        &self,
        query: &str,
        lat: f64,
        lng: f64,
        radius_m: u32,
    ) -> Result<Vec<SearchCandidate>, PlacesError> {
        let url = self.build_url(
            "maps/api/place/textsearch/json",
            &[
                ("query", query),
                ("location", &format!("{lat},{lng}")),
                ("radius", &radius_m.to_string()),
            ],
        )?;

        let body = self.request_json(&url).await?;
        let envelope: SearchEnvelope =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("textsearch(query={query})"),
                source: e,
            })?;

        match envelope.status.as_str() {
            "OK" | "ZERO_RESULTS" => Ok(envelope
                .results
                .into_iter()
                .map(|r| SearchCandidate {
                    place_id: r.place_id,
                    name: r.name,
                    lat: r.geometry.location.lat,
                    lng: r.geometry.location.lng,
                })
                .collect()),
            status => Err(PlacesError::Api {
                status: status.to_owned(),
                message: envelope.error_message.unwrap_or_default(),
            }),
        }
    }

    /// Fetches structured details for one place.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Api`] if the provider reports a non-OK status or an
    ///   empty result.
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        let url = self.build_url(
            "maps/api/place/details/json",
            &[("place_id", place_id), ("fields", DETAIL_FIELDS)],
        )?;

        let body = self.request_json(&url).await?;
        let envelope: DetailsEnvelope =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("details(place_id={place_id})"),
                source: e,
            })?;

        if envelope.status != "OK" {
            return Err(PlacesError::Api {
                status: envelope.status,
                message: envelope.error_message.unwrap_or_default(),
            });
        }

        let raw = envelope.result.ok_or_else(|| PlacesError::Api {
            status: "EMPTY_RESULT".to_owned(),
            message: format!("details(place_id={place_id}) returned no result"),
        })?;

        let (open_now, periods) = raw
            .opening_hours
            .map_or((None, Vec::new()), |h| (h.open_now, h.periods));

        Ok(PlaceDetails {
            place_id: raw.place_id,
            name: raw.name,
            rating: raw.rating,
            user_ratings_total: raw.user_ratings_total,
            price_level: raw.price_level,
            types: raw.types,
            business_status: raw.business_status,
            open_now,
            formatted_address: raw.formatted_address,
            lat: raw.geometry.location.lat,
            lng: raw.geometry.location.lng,
            utc_offset_minutes: raw.utc_offset,
            periods,
            photo_refs: raw.photos.into_iter().map(|p| p.photo_reference).collect(),
        })
    }

    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, PlacesError> {
        let mut url = self.base_url.join(path).map_err(|e| PlacesError::Api {
            status: "BAD_PATH".to_owned(),
            message: format!("invalid path '{path}': {e}"),
        })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in params {
                pairs.append_pair(name, value);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, PlacesError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}
