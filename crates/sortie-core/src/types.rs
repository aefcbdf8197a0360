//! Wire types exchanged with callers.
//!
//! Requests arrive in camelCase JSON; responses go out the same way. The
//! engine-internal desirability score never appears on the wire — options
//! carry only the data a client can render.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::vibes::Category;

/// Maximum number of identifiers retained from each caller-supplied
/// freshness set. Longer lists are truncated, never rejected.
pub const FRESHNESS_ID_CAP: usize = 220;

/// A recommendation request as supplied by the caller.
///
/// Unrecognized `city`, `vibe`, and `with_who` values fall back to fixed
/// defaults during resolution; they are not validation errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    pub city: String,
    pub vibe: String,
    #[serde(default)]
    pub with_who: String,
    #[serde(default)]
    pub veg_friendly: bool,
    /// Venue ids the caller has already been shown (soft novelty penalty).
    #[serde(default)]
    pub seen_ids: Vec<String>,
    /// Venue ids the caller explicitly swapped away (strong avoidance,
    /// hard-excluded from the swap pool).
    #[serde(default)]
    pub swapped_ids: Vec<String>,
}

impl RecommendRequest {
    /// Truncates both freshness sets to [`FRESHNESS_ID_CAP`] entries.
    pub fn truncate_freshness(&mut self) {
        self.seen_ids.truncate(FRESHNESS_ID_CAP);
        self.swapped_ids.truncate(FRESHNESS_ID_CAP);
    }
}

/// A single recommended venue, assembled per request and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueOption {
    /// Provider place identifier.
    pub id: String,
    pub name: String,
    /// Always a member of the active vibe's allowed-category set.
    pub category: Category,
    pub rating: Option<f64>,
    pub rating_count: Option<u32>,
    pub price_tier: Option<u8>,
    pub address: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub distance_km: f64,
    /// Human open-status string, e.g. "Open until 9:30 PM".
    pub open_status: String,
    /// Wall-clock closing label in the venue's local time, when known.
    pub closing_label: Option<String>,
    /// Absolute closing instant; preferred over the label when present.
    pub close_ts: Option<DateTime<Utc>>,
    #[serde(default)]
    pub photo_refs: Vec<String>,
    pub why: Option<String>,
    pub watchouts: Option<String>,
}

/// Derived weather judgment shared by all filtering and scoring decisions
/// within one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherFlags {
    pub precip: bool,
    pub cold: bool,
    pub very_cold: bool,
    pub windy: bool,
    pub very_windy: bool,
    pub min_temp_c: Option<f64>,
}

impl WeatherFlags {
    /// True when conditions categorically rule out outdoor-leaning venues.
    #[must_use]
    pub fn blocks_outdoors(&self) -> bool {
        self.precip || self.very_cold || self.very_windy
    }
}

/// Weather block included in every response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    /// False when the forecast provider was unreachable and the flags are
    /// neutral defaults.
    pub available: bool,
    pub summary: String,
    #[serde(flatten)]
    pub flags: WeatherFlags,
}

impl WeatherReport {
    /// Neutral report used when the forecast provider degrades.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            available: false,
            summary: "Forecast unavailable".to_string(),
            flags: WeatherFlags::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub limited_availability: bool,
    pub reason: Option<String>,
    /// Backup pool for client-side substitution, lenient-filtered and
    /// diversity-capped.
    pub pool: Vec<VenueOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendResponse {
    pub options: Vec<VenueOption>,
    pub weather: WeatherReport,
    pub meta: Meta,
}

/// A substitution request over a previously returned pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub pool: Vec<VenueOption>,
    /// Categories currently on screen; they drive the diversity relaxation
    /// tiers.
    #[serde(default)]
    pub current_categories: Vec<Category>,
    /// Ids that must not be returned (already swapped away or shown).
    #[serde(default)]
    pub excluded_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResponse {
    pub option: Option<VenueOption>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommend_request_parses_minimal_body() {
        let req: RecommendRequest =
            serde_json::from_str(r#"{"city":"Amsterdam","vibe":"Cozy"}"#).expect("parse");
        assert_eq!(req.city, "Amsterdam");
        assert!(!req.veg_friendly);
        assert!(req.seen_ids.is_empty());
        assert!(req.swapped_ids.is_empty());
    }

    #[test]
    fn recommend_request_truncates_oversized_freshness_sets() {
        let mut req = RecommendRequest {
            city: "Amsterdam".into(),
            vibe: "Cozy".into(),
            with_who: String::new(),
            veg_friendly: false,
            seen_ids: (0..500).map(|i| format!("id-{i}")).collect(),
            swapped_ids: (0..300).map(|i| format!("sw-{i}")).collect(),
        };
        req.truncate_freshness();
        assert_eq!(req.seen_ids.len(), FRESHNESS_ID_CAP);
        assert_eq!(req.swapped_ids.len(), FRESHNESS_ID_CAP);
    }

    #[test]
    fn venue_option_serializes_camel_case_without_score() {
        let opt = VenueOption {
            id: "abc".into(),
            name: "Cafe Example".into(),
            category: Category::Cafe,
            rating: Some(4.5),
            rating_count: Some(120),
            price_tier: Some(2),
            address: Some("Somewhere 1".into()),
            lat: 52.37,
            lng: 4.9,
            distance_km: 1.2,
            open_status: "Open until 9:30 PM".into(),
            closing_label: Some("9:30 PM".into()),
            close_ts: None,
            photo_refs: vec![],
            why: None,
            watchouts: None,
        };
        let json = serde_json::to_string(&opt).expect("serialize");
        assert!(json.contains("\"ratingCount\":120"));
        assert!(json.contains("\"distanceKm\":1.2"));
        assert!(!json.contains("score"));
    }

    #[test]
    fn weather_report_flattens_flags() {
        let report = WeatherReport {
            available: true,
            summary: "Dry and mild".into(),
            flags: WeatherFlags {
                precip: true,
                ..WeatherFlags::default()
            },
        };
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["precip"], true);
        assert_eq!(json["available"], true);
    }
}
