//! Deterministic accept/reject policy over scored options.
//!
//! A pure predicate with two profiles: strict for the shortlist, relaxed for
//! the swap pool. Rejection reasons are checked in a fixed order and the
//! first match wins — the counts feed the "limited availability" reason
//! reported to the caller.

use chrono::{DateTime, Utc};
use sortie_core::{Category, WeatherFlags};
use sortie_places::remaining_minutes;

use crate::candidate::Scored;

/// Why a candidate was rejected, in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    CategoryNotAllowed,
    TooFar,
    ProviderClosed,
    ClosingSoon,
    UnknownHours,
    WeatherBlock,
}

impl RejectReason {
    /// Human-readable reason fragment for the response meta.
    #[must_use]
    pub fn human(self) -> &'static str {
        match self {
            Self::CategoryNotAllowed => "didn't fit the vibe",
            Self::TooFar => "were too far away",
            Self::ProviderClosed => "were closed",
            Self::ClosingSoon => "were closing soon",
            Self::UnknownHours => "had unknown opening hours",
            Self::WeatherBlock => "didn't suit the weather",
        }
    }
}

/// Feasibility policy profile.
#[derive(Debug, Clone, Copy)]
pub struct Profile {
    pub max_distance_km: f64,
    pub min_remaining_minutes: i64,
    pub allow_unknown_hours: bool,
    /// When set, open-now must be explicitly true with a known closing
    /// instant.
    pub require_open_with_close: bool,
}

/// Shortlist policy.
pub const STRICT: Profile = Profile {
    max_distance_km: 10.0,
    min_remaining_minutes: 75,
    allow_unknown_hours: false,
    require_open_with_close: true,
};

/// Swap-pool policy.
pub const RELAXED: Profile = Profile {
    max_distance_km: 14.0,
    min_remaining_minutes: 45,
    allow_unknown_hours: true,
    require_open_with_close: false,
};

/// Request-scoped context shared by every feasibility decision.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    pub allowed: &'a [Category],
    pub flags: &'a WeatherFlags,
    pub local_hour: u32,
    pub now: DateTime<Utc>,
}

/// Evaluates one candidate against a profile. `Ok(())` means feasible.
///
/// # Errors
///
/// Returns the first matching [`RejectReason`].
pub fn evaluate(
    candidate: &Scored,
    profile: &Profile,
    ctx: &FilterContext<'_>,
) -> Result<(), RejectReason> {
    let option = &candidate.option;

    if !ctx.allowed.contains(&option.category) {
        return Err(RejectReason::CategoryNotAllowed);
    }
    if option.distance_km > profile.max_distance_km {
        return Err(RejectReason::TooFar);
    }
    if candidate.open_now == Some(false) {
        return Err(RejectReason::ProviderClosed);
    }

    let remaining = option.close_ts.map(|ts| remaining_minutes(ts, ctx.now));
    if let Some(minutes) = remaining {
        if minutes < profile.min_remaining_minutes {
            return Err(RejectReason::ClosingSoon);
        }
    }
    let hours_unknown = remaining.is_none()
        || (profile.require_open_with_close && candidate.open_now != Some(true));
    if hours_unknown && !profile.allow_unknown_hours {
        return Err(RejectReason::UnknownHours);
    }

    if option.category.is_outdoor_leaning()
        && (ctx.flags.blocks_outdoors() || (ctx.flags.cold && ctx.local_hour >= 17))
    {
        return Err(RejectReason::WeatherBlock);
    }

    Ok(())
}
