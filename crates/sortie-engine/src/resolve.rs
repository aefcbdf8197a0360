//! Budgeted detail resolution.
//!
//! Detail fetches are the expensive, quota-sensitive calls, so candidates
//! are distance-sorted and truncated to the per-request budget before any
//! fetch happens — when the budget binds, nearby venues win. Fetches run
//! under a narrower worker pool than the lane fan-out, cache-first.
//! Permanently closed venues and venues the provider reports as closed
//! right now are dropped immediately; an unknown open-state is kept for the
//! context-dependent filters downstream.

use futures::stream::{self, StreamExt};
use sortie_core::CityCenter;
use sortie_kv::{detail_key, TtlCache};
use sortie_places::{haversine_km, PlaceDetails, PlacesClient, SearchCandidate};

pub(crate) struct ResolveContext<'a> {
    pub places: &'a PlacesClient,
    pub cache: Option<&'a TtlCache>,
    pub center: &'a CityCenter,
    pub detail_budget: usize,
    pub detail_concurrency: usize,
    pub detail_cache_ttl_secs: u64,
    /// Request-level timezone offset; keys the detail cache.
    pub tz_offset_secs: i32,
}

/// Resolves details for the closest candidates within the call budget.
pub(crate) async fn resolve_details(
    ctx: &ResolveContext<'_>,
    mut candidates: Vec<SearchCandidate>,
) -> Vec<PlaceDetails> {
    let center = ctx.center;
    candidates.sort_by(|a, b| {
        let da = haversine_km(center.lat, center.lng, a.lat, a.lng);
        let db = haversine_km(center.lat, center.lng, b.lat, b.lng);
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates.truncate(ctx.detail_budget);

    let resolved: Vec<Option<PlaceDetails>> = stream::iter(candidates)
        .map(|candidate| fetch_one(ctx, candidate))
        .buffer_unordered(ctx.detail_concurrency.max(1))
        .collect()
        .await;

    resolved
        .into_iter()
        .flatten()
        .filter(|details| {
            if details.is_defunct() || details.open_now == Some(false) {
                tracing::debug!(place_id = %details.place_id, "dropping closed venue");
                return false;
            }
            true
        })
        .collect()
}

/// One detail fetch: cache hit, or live call stored back on miss. Failure
/// drops the candidate, never the request.
async fn fetch_one(ctx: &ResolveContext<'_>, candidate: SearchCandidate) -> Option<PlaceDetails> {
    let key = detail_key(&candidate.place_id, ctx.tz_offset_secs);

    if let Some(cache) = ctx.cache {
        if let Some(hit) = cache.get_json::<PlaceDetails>(&key).await {
            return Some(hit);
        }
    }

    match ctx.places.details(&candidate.place_id).await {
        Ok(details) => {
            if let Some(cache) = ctx.cache {
                cache.put_json_detached(&key, &details, ctx.detail_cache_ttl_secs);
            }
            Some(details)
        }
        Err(e) => {
            tracing::warn!(place_id = %candidate.place_id, error = %e, "detail fetch failed; dropping candidate");
            None
        }
    }
}
