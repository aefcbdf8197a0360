//! Concurrent search-lane retrieval.
//!
//! One vibe expands into a battery of lanes: a keyword lane per allowed
//! category (plus vegetarian variants for food categories), a companion-aware
//! hint lane, and the vibe's free-text semantic lanes. All lanes of a battery
//! run concurrently under the shared fan-out cap, cache-first. After the
//! primary vibe, up to two fallback vibes run the same battery purely to
//! fatten the swap pool, stopping once the fill target is reached. Results
//! merge deduplicated by place id; first-appearance order carries no rank.

use std::collections::HashSet;

use futures::stream::{self, StreamExt};
use sortie_core::{CityCenter, Companion, Vibe};
use sortie_kv::{search_key, TtlCache};
use sortie_places::{PlacesClient, SearchCandidate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LaneKind {
    Keyword,
    Semantic,
    Hint,
}

impl LaneKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Semantic => "semantic",
            Self::Hint => "hint",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct LanePlan {
    pub kind: LaneKind,
    pub query: String,
}

pub(crate) struct LaneContext<'a> {
    pub places: &'a PlacesClient,
    pub cache: Option<&'a TtlCache>,
    pub center: &'a CityCenter,
    pub radius_m: u32,
    pub lane_concurrency: usize,
    pub search_cache_ttl_secs: u64,
    pub pool_fill_target: usize,
}

/// Builds the lane battery for one vibe.
pub(crate) fn build_lanes(vibe: Vibe, veg_friendly: bool, companion: Companion) -> Vec<LanePlan> {
    let mut lanes = Vec::new();
    for category in vibe.allowed_categories() {
        lanes.push(LanePlan {
            kind: LaneKind::Keyword,
            query: category.keyword().to_owned(),
        });
        if veg_friendly && category.is_food() {
            lanes.push(LanePlan {
                kind: LaneKind::Keyword,
                query: format!("vegetarian {}", category.keyword()),
            });
        }
    }
    lanes.push(LanePlan {
        kind: LaneKind::Hint,
        query: format!("{} {}", vibe.hint_term(), companion.hint_suffix()),
    });
    for query in vibe.semantic_queries() {
        lanes.push(LanePlan {
            kind: LaneKind::Semantic,
            query: (*query).to_owned(),
        });
    }
    lanes
}

/// Runs the primary vibe's battery plus fallback batteries as needed and
/// returns the merged, deduplicated candidate set.
pub(crate) async fn retrieve_candidates(
    ctx: &LaneContext<'_>,
    vibe: Vibe,
    veg_friendly: bool,
    companion: Companion,
) -> Vec<SearchCandidate> {
    let mut merged: Vec<SearchCandidate> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    let mut vibes = vec![vibe];
    vibes.extend_from_slice(vibe.fallback_ladder());

    for (index, battery_vibe) in vibes.into_iter().enumerate() {
        if index > 0 && merged.len() >= ctx.pool_fill_target {
            break;
        }
        if index > 0 {
            tracing::debug!(
                vibe = %battery_vibe,
                have = merged.len(),
                target = ctx.pool_fill_target,
                "running fallback lane battery for pool abundance"
            );
        }

        let lanes = build_lanes(battery_vibe, veg_friendly, companion);
        let results: Vec<Vec<SearchCandidate>> = stream::iter(lanes)
            .map(|lane| run_lane(ctx, lane))
            .buffer_unordered(ctx.lane_concurrency.max(1))
            .collect()
            .await;

        for candidate in results.into_iter().flatten() {
            if seen.insert(candidate.place_id.clone()) {
                merged.push(candidate);
            }
        }
    }

    merged
}

/// One lane: cache hit, or live search stored back on miss. Failure yields
/// an empty lane, never an error.
async fn run_lane(ctx: &LaneContext<'_>, lane: LanePlan) -> Vec<SearchCandidate> {
    let key = search_key(
        lane.kind.as_str(),
        ctx.center.lat,
        ctx.center.lng,
        ctx.radius_m,
        &lane.query,
    );

    if let Some(cache) = ctx.cache {
        if let Some(hit) = cache.get_json::<Vec<SearchCandidate>>(&key).await {
            return hit;
        }
    }

    match ctx
        .places
        .text_search(&lane.query, ctx.center.lat, ctx.center.lng, ctx.radius_m)
        .await
    {
        Ok(candidates) => {
            if let Some(cache) = ctx.cache {
                cache.put_json_detached(&key, &candidates, ctx.search_cache_ttl_secs);
            }
            candidates
        }
        Err(e) => {
            tracing::warn!(query = %lane.query, error = %e, "search lane failed; continuing with fewer candidates");
            Vec::new()
        }
    }
}
