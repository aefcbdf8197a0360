//! Recommendation pipeline orchestration.
//!
//! One request flows: weather → lanes (cached, deduplicated) → distance
//! sort → budgeted detail resolution (cached) → option assembly → one
//! scoring pass → relaxed filter → diversified swap pool, and strict filter
//! → weighted selection → shortlist. Both outputs share the single detail
//! pass. Per-stage failures degrade to fewer candidates.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};
use rand::Rng;

use sortie_core::{
    AppConfig, CityCenter, Companion, Meta, RecommendRequest, RecommendResponse, VenueOption,
    Vibe, WeatherReport,
};
use sortie_kv::TtlCache;
use sortie_places::{closing_time, haversine_km, PlaceDetails, PlacesClient};
use sortie_weather::{report_from_forecast, WeatherClient};

use crate::candidate::Scored;
use crate::category::map_category;
use crate::copywriter::{fallback_annotation, Copywriter};
use crate::error::EngineError;
use crate::feasibility::{self, FilterContext, RejectReason, RELAXED, STRICT};
use crate::lanes::{retrieve_candidates, LaneContext};
use crate::pool;
use crate::resolve::{resolve_details, ResolveContext};
use crate::scoring::{score, ScoreContext};
use crate::selector::{select_shortlist, SHORTLIST_MAX};

const MAX_CITY_LEN: usize = 120;
const MAX_ID_LEN: usize = 256;

/// The supported city table sits in UTC+1 territory; used only when the
/// forecast provider (which normally reports the offset) is down.
const FALLBACK_TZ_OFFSET_SECS: i32 = 3600;

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub search_radius_m: u32,
    pub lane_concurrency: usize,
    pub detail_concurrency: usize,
    pub detail_budget: usize,
    pub search_cache_ttl_secs: u64,
    pub detail_cache_ttl_secs: u64,
    pub pool_fill_target: usize,
    /// Jitter amplitude for scoring; 0 disables.
    pub jitter: f64,
    /// Boltzmann temperature for weighted selection; 0 degenerates to
    /// greedy.
    pub temperature: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            search_radius_m: 8000,
            lane_concurrency: 8,
            detail_concurrency: 4,
            detail_budget: 24,
            search_cache_ttl_secs: 300,
            detail_cache_ttl_secs: 1800,
            pool_fill_target: 40,
            jitter: 1.3,
            temperature: 18.0,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            lane_concurrency: config.lane_concurrency,
            detail_concurrency: config.detail_concurrency,
            detail_budget: config.detail_budget,
            search_cache_ttl_secs: config.search_cache_ttl_secs,
            detail_cache_ttl_secs: config.detail_cache_ttl_secs,
            pool_fill_target: config.pool_fill_target,
            ..Self::default()
        }
    }
}

/// The recommendation engine. Holds the provider clients, the optional
/// cache, the copy seam, and tuning; no per-request state.
pub struct Engine {
    places: PlacesClient,
    weather: WeatherClient,
    cache: Option<TtlCache>,
    copywriter: Arc<dyn Copywriter>,
    config: EngineConfig,
}

impl Engine {
    #[must_use]
    pub fn new(
        places: PlacesClient,
        weather: WeatherClient,
        cache: Option<TtlCache>,
        copywriter: Arc<dyn Copywriter>,
        config: EngineConfig,
    ) -> Self {
        Self {
            places,
            weather,
            cache,
            copywriter,
            config,
        }
    }

    /// Runs the full pipeline for one request.
    ///
    /// `now` and `rng` are injected so tests can pin time and randomness.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] for oversized fields; upstream
    /// trouble degrades to fewer candidates instead of erroring.
    pub async fn recommend<R: Rng + ?Sized>(
        &self,
        request: RecommendRequest,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<RecommendResponse, EngineError> {
        validate(&request)?;
        let mut request = request;
        request.truncate_freshness();

        let city = CityCenter::resolve(&request.city);
        let vibe = Vibe::parse(&request.vibe);
        let companion = Companion::parse(&request.with_who);

        // Weather first: the flags and local-time context feed every later
        // stage, so they must be consistent across the request.
        let (weather_report, tz_offset_secs) =
            match self.weather.forecast(city.lat, city.lng).await {
                Ok(forecast) => (
                    report_from_forecast(&forecast, now),
                    forecast.utc_offset_seconds,
                ),
                Err(e) => {
                    tracing::warn!(error = %e, city = city.name, "forecast unavailable; proceeding with neutral weather");
                    (WeatherReport::unavailable(), FALLBACK_TZ_OFFSET_SECS)
                }
            };
        let flags = weather_report.flags;
        let local_hour = local_hour(now, tz_offset_secs);

        let lane_ctx = LaneContext {
            places: &self.places,
            cache: self.cache.as_ref(),
            center: city,
            radius_m: self.config.search_radius_m,
            lane_concurrency: self.config.lane_concurrency,
            search_cache_ttl_secs: self.config.search_cache_ttl_secs,
            pool_fill_target: self.config.pool_fill_target,
        };
        let candidates = retrieve_candidates(&lane_ctx, vibe, request.veg_friendly, companion).await;
        tracing::info!(
            candidates = candidates.len(),
            vibe = %vibe,
            city = city.name,
            "lane retrieval complete"
        );

        let resolve_ctx = ResolveContext {
            places: &self.places,
            cache: self.cache.as_ref(),
            center: city,
            detail_budget: self.config.detail_budget,
            detail_concurrency: self.config.detail_concurrency,
            detail_cache_ttl_secs: self.config.detail_cache_ttl_secs,
            tz_offset_secs,
        };
        let details = resolve_details(&resolve_ctx, candidates).await;
        tracing::debug!(resolved = details.len(), "detail resolution complete");

        let seen: HashSet<String> = request.seen_ids.iter().cloned().collect();
        let swapped: HashSet<String> = request.swapped_ids.iter().cloned().collect();
        let score_ctx = ScoreContext {
            vibe,
            flags: &flags,
            local_hour,
            seen: &seen,
            swapped: &swapped,
            veg_friendly: request.veg_friendly,
            jitter: self.config.jitter,
        };
        let scored: Vec<Scored> = details
            .into_iter()
            .map(|d| assemble(d, city, vibe, tz_offset_secs, now, &score_ctx, rng))
            .collect();

        let filter_ctx = FilterContext {
            allowed: vibe.allowed_categories(),
            flags: &flags,
            local_hour,
            now,
        };

        let mut reject_counts: HashMap<RejectReason, usize> = HashMap::new();
        let mut strict: Vec<Scored> = Vec::new();
        for candidate in &scored {
            match feasibility::evaluate(candidate, &STRICT, &filter_ctx) {
                Ok(()) => strict.push(candidate.clone()),
                Err(reason) => *reject_counts.entry(reason).or_default() += 1,
            }
        }
        sort_by_score_desc(&mut strict);
        let mut shortlist = select_shortlist(&strict, self.config.temperature, rng);

        let shortlist_ids: HashSet<&str> = shortlist.iter().map(|o| o.id.as_str()).collect();
        let mut relaxed: Vec<&Scored> = scored
            .iter()
            .filter(|c| !shortlist_ids.contains(c.option.id.as_str()))
            .filter(|c| !swapped.contains(&c.option.id))
            .filter(|c| feasibility::evaluate(c, &RELAXED, &filter_ctx).is_ok())
            .collect();
        relaxed.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let mut pool_options = pool::diversify(&relaxed);

        for option in &mut shortlist {
            let annotation = self
                .copywriter
                .annotate(option, &flags, now)
                .await
                .unwrap_or_else(|| fallback_annotation(option, &flags, now));
            option.why = Some(annotation.why);
            option.watchouts = annotation.watchouts;
        }
        for option in &mut pool_options {
            let annotation = fallback_annotation(option, &flags, now);
            option.why = Some(annotation.why);
            option.watchouts = annotation.watchouts;
        }

        let limited_availability = shortlist.len() < SHORTLIST_MAX;
        let reason = limited_availability.then(|| limited_reason(&reject_counts));
        if limited_availability {
            tracing::info!(
                picked = shortlist.len(),
                pool = pool_options.len(),
                "limited availability"
            );
        }

        Ok(RecommendResponse {
            options: shortlist,
            weather: weather_report,
            meta: Meta {
                limited_availability,
                reason,
                pool: pool_options,
            },
        })
    }
}

fn validate(request: &RecommendRequest) -> Result<(), EngineError> {
    if request.city.len() > MAX_CITY_LEN {
        return Err(EngineError::InvalidInput("city name too long".to_owned()));
    }
    let oversized = request
        .seen_ids
        .iter()
        .chain(request.swapped_ids.iter())
        .any(|id| id.len() > MAX_ID_LEN);
    if oversized {
        return Err(EngineError::InvalidInput(
            "venue identifier too long".to_owned(),
        ));
    }
    Ok(())
}

/// Builds the request-scoped option and scores it once.
#[allow(clippy::too_many_arguments)]
fn assemble<R: Rng + ?Sized>(
    details: PlaceDetails,
    city: &CityCenter,
    vibe: Vibe,
    tz_offset_secs: i32,
    now: DateTime<Utc>,
    score_ctx: &ScoreContext<'_>,
    rng: &mut R,
) -> Scored {
    let category = map_category(&details.types, vibe);
    let distance_km = haversine_km(city.lat, city.lng, details.lat, details.lng);

    // The venue's own offset wins when reported; the request-level offset
    // stands in otherwise.
    let venue_tz = details
        .utc_offset_minutes
        .map_or(tz_offset_secs, |minutes| minutes * 60);
    let closing = if details.open_now == Some(true) {
        closing_time(&details.periods, venue_tz, now)
    } else {
        None
    };

    let open_status = match (details.open_now, &closing) {
        (Some(true), Some(c)) => format!("Open until {}", c.label),
        (Some(true), None) => "Open now".to_owned(),
        (Some(false), _) => "Closed".to_owned(),
        (None, _) => "Hours unknown".to_owned(),
    };

    let option = VenueOption {
        id: details.place_id,
        name: details.name,
        category,
        rating: details.rating,
        rating_count: details.user_ratings_total,
        price_tier: details.price_level,
        address: details.formatted_address,
        lat: details.lat,
        lng: details.lng,
        distance_km,
        open_status,
        closing_label: closing.as_ref().map(|c| c.label.clone()),
        close_ts: closing.as_ref().map(|c| c.close_ts),
        photo_refs: details.photo_refs,
        why: None,
        watchouts: None,
    };

    let value = score(&option, score_ctx, rng);
    Scored {
        option,
        score: value,
        open_now: details.open_now,
    }
}

fn sort_by_score_desc(candidates: &mut [Scored]) {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

fn local_hour(now: DateTime<Utc>, tz_offset_secs: i32) -> u32 {
    let offset = FixedOffset::east_opt(tz_offset_secs).unwrap_or_else(|| Utc.fix());
    now.with_timezone(&offset).hour()
}

/// Best-guess reason for a thin shortlist: the most frequent of the
/// reportable rejection causes, with a generic fallback.
fn limited_reason(reject_counts: &HashMap<RejectReason, usize>) -> String {
    let reportable = [
        RejectReason::WeatherBlock,
        RejectReason::ClosingSoon,
        RejectReason::UnknownHours,
    ];
    let top = reportable
        .iter()
        .filter_map(|reason| {
            reject_counts
                .get(reason)
                .copied()
                .filter(|&count| count > 0)
                .map(|count| (count, *reason))
        })
        .max_by_key(|(count, _)| *count);

    match top {
        Some((_, reason)) => format!("Several nearby spots {}.", reason.human()),
        None => "Not many venues matched nearby right now.".to_owned(),
    }
}
