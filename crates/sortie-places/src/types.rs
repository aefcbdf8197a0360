//! Normalized provider records.
//!
//! These are the shapes the rest of the system (and the detail cache) works
//! with; the client maps the provider's raw JSON into them.

use serde::{Deserialize, Serialize};

/// One search hit: just enough to dedupe, sort by distance, and decide
/// whether a detail fetch is worth spending budget on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCandidate {
    pub place_id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// One endpoint of an opening period, in the provider's convention:
/// `day` 0 = Sunday through 6 = Saturday, `time` as "HHMM" local.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodPoint {
    pub day: u32,
    pub time: String,
}

/// A weekly opening period. `close` is absent for always-open venues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpeningPeriod {
    pub open: PeriodPoint,
    pub close: Option<PeriodPoint>,
}

/// Structured details for one place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub place_id: String,
    pub name: String,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u32>,
    pub price_level: Option<u8>,
    /// Provider's freeform type tags, e.g. `["cafe", "food", "establishment"]`.
    pub types: Vec<String>,
    /// e.g. "OPERATIONAL", "CLOSED_TEMPORARILY", "CLOSED_PERMANENTLY".
    pub business_status: Option<String>,
    /// Tri-state: `None` means the provider did not report it.
    pub open_now: Option<bool>,
    pub formatted_address: Option<String>,
    pub lat: f64,
    pub lng: f64,
    /// The place's own UTC offset in minutes, when reported.
    pub utc_offset_minutes: Option<i32>,
    pub periods: Vec<OpeningPeriod>,
    pub photo_refs: Vec<String>,
}

impl PlaceDetails {
    /// True when the provider marks the business as not operating at all.
    #[must_use]
    pub fn is_defunct(&self) -> bool {
        matches!(
            self.business_status.as_deref(),
            Some("CLOSED_PERMANENTLY" | "CLOSED_TEMPORARILY")
        )
    }
}
