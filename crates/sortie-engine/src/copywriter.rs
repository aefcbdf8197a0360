//! Per-venue copy annotation.
//!
//! The external copy generator is a collaborator behind the [`Copywriter`]
//! trait; its annotations are purely cosmetic. When it is absent, fails, or
//! declines, the deterministic fallback composes "why"/"watchouts" text from
//! data the engine already has.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sortie_core::{VenueOption, WeatherFlags};
use sortie_places::remaining_minutes;

/// Generated copy for one option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub why: String,
    pub watchouts: Option<String>,
}

/// Seam for the external copy generator.
#[async_trait]
pub trait Copywriter: Send + Sync {
    /// Returns copy for the option, or `None` to defer to the fallback.
    async fn annotate(
        &self,
        option: &VenueOption,
        flags: &WeatherFlags,
        now: DateTime<Utc>,
    ) -> Option<Annotation>;
}

/// Deterministic copy built from the option's own data.
pub struct FallbackCopywriter;

#[async_trait]
impl Copywriter for FallbackCopywriter {
    async fn annotate(
        &self,
        option: &VenueOption,
        flags: &WeatherFlags,
        now: DateTime<Utc>,
    ) -> Option<Annotation> {
        Some(fallback_annotation(option, flags, now))
    }
}

/// Composes the deterministic fallback copy.
#[must_use]
pub fn fallback_annotation(
    option: &VenueOption,
    flags: &WeatherFlags,
    now: DateTime<Utc>,
) -> Annotation {
    let quality = match option.rating {
        Some(r) if r >= 4.5 => "A standout",
        Some(r) if r >= 4.0 => "A well-rated",
        Some(_) => "A",
        None => "A",
    };
    let why = format!(
        "{quality} {} spot {:.1} km from the center.",
        option.category.label().to_lowercase(),
        option.distance_km
    );

    let mut watchouts: Vec<String> = Vec::new();
    if let (Some(close_ts), Some(label)) = (option.close_ts, option.closing_label.as_ref()) {
        if remaining_minutes(close_ts, now) <= 120 {
            watchouts.push(format!("Closes at {label}."));
        }
    }
    if option.category.is_outdoor_leaning() && (flags.cold || flags.windy) {
        watchouts.push("Dress for the weather.".to_owned());
    }

    Annotation {
        why,
        watchouts: if watchouts.is_empty() {
            None
        } else {
            Some(watchouts.join(" "))
        },
    }
}
