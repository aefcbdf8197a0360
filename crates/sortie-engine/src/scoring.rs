//! Desirability scoring.
//!
//! `score = 10·rating + 6·log10(count+1) + vibe + time-of-day + weather
//! + novelty + veg bonus + jitter`. The jitter keeps repeated identical
//! requests from returning identical sets; its amplitude is configurable so
//! tests can switch it off entirely.

use rand::Rng;
use sortie_core::{
    vibes::{time_of_day_affinity, vibe_affinity, weather_affinity},
    VenueOption, Vibe, WeatherFlags,
};
use std::collections::HashSet;

/// Rating assumed for venues the provider has no rating for.
const DEFAULT_RATING: f64 = 4.2;
const SWAPPED_PENALTY: f64 = -80.0;
const SEEN_PENALTY: f64 = -35.0;
const VEG_BONUS: f64 = 2.5;

/// Request-scoped scoring context.
#[derive(Debug)]
pub struct ScoreContext<'a> {
    pub vibe: Vibe,
    pub flags: &'a WeatherFlags,
    pub local_hour: u32,
    pub seen: &'a HashSet<String>,
    pub swapped: &'a HashSet<String>,
    pub veg_friendly: bool,
    /// Symmetric jitter amplitude; 0 disables jitter.
    pub jitter: f64,
}

/// Scores one option. Computed once per candidate per request.
pub fn score<R: Rng + ?Sized>(option: &VenueOption, ctx: &ScoreContext<'_>, rng: &mut R) -> f64 {
    let rating = option.rating.unwrap_or(DEFAULT_RATING);
    let count = f64::from(option.rating_count.unwrap_or(0));

    let mut total = 10.0 * rating + 6.0 * (count + 1.0).log10();
    total += vibe_affinity(ctx.vibe, option.category);
    total += time_of_day_affinity(ctx.local_hour, option.category);
    total += weather_affinity(ctx.flags, option.category);

    if ctx.swapped.contains(&option.id) {
        total += SWAPPED_PENALTY;
    } else if ctx.seen.contains(&option.id) {
        total += SEEN_PENALTY;
    }

    if ctx.veg_friendly && option.category.is_food() {
        total += VEG_BONUS;
    }

    if ctx.jitter > 0.0 {
        total += rng.random_range(-ctx.jitter..=ctx.jitter);
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use sortie_core::Category;

    fn option(id: &str, category: Category, rating: Option<f64>, count: Option<u32>) -> VenueOption {
        VenueOption {
            id: id.into(),
            name: "Venue".into(),
            category,
            rating,
            rating_count: count,
            price_tier: None,
            address: None,
            lat: 52.37,
            lng: 4.9,
            distance_km: 1.0,
            open_status: "Open".into(),
            closing_label: None,
            close_ts: None,
            photo_refs: vec![],
            why: None,
            watchouts: None,
        }
    }

    fn ctx<'a>(
        flags: &'a WeatherFlags,
        seen: &'a HashSet<String>,
        swapped: &'a HashSet<String>,
        jitter: f64,
    ) -> ScoreContext<'a> {
        ScoreContext {
            vibe: Vibe::Cozy,
            flags,
            local_hour: 14,
            seen,
            swapped,
            veg_friendly: false,
            jitter,
        }
    }

    #[test]
    fn unrated_venue_uses_default_rating() {
        let flags = WeatherFlags::default();
        let (seen, swapped) = (HashSet::new(), HashSet::new());
        let c = ctx(&flags, &seen, &swapped, 0.0);
        let mut rng = StdRng::seed_from_u64(7);

        let unrated = score(&option("a", Category::Cafe, None, None), &c, &mut rng);
        let rated = score(
            &option("a", Category::Cafe, Some(DEFAULT_RATING), None),
            &c,
            &mut rng,
        );
        assert!((unrated - rated).abs() < 1e-9);
    }

    #[test]
    fn higher_rating_and_count_raise_the_score() {
        let flags = WeatherFlags::default();
        let (seen, swapped) = (HashSet::new(), HashSet::new());
        let c = ctx(&flags, &seen, &swapped, 0.0);
        let mut rng = StdRng::seed_from_u64(7);

        let low = score(&option("a", Category::Cafe, Some(3.8), Some(10)), &c, &mut rng);
        let high = score(
            &option("a", Category::Cafe, Some(4.7), Some(2000)),
            &c,
            &mut rng,
        );
        assert!(high > low);
    }

    #[test]
    fn swapped_penalty_outweighs_seen_penalty() {
        let flags = WeatherFlags::default();
        let seen: HashSet<String> = ["seen-id".to_owned()].into();
        let swapped: HashSet<String> = ["swapped-id".to_owned()].into();
        let c = ctx(&flags, &seen, &swapped, 0.0);
        let mut rng = StdRng::seed_from_u64(7);

        let fresh = score(&option("fresh-id", Category::Cafe, Some(4.2), Some(50)), &c, &mut rng);
        let seen_score = score(&option("seen-id", Category::Cafe, Some(4.2), Some(50)), &c, &mut rng);
        let swapped_score = score(
            &option("swapped-id", Category::Cafe, Some(4.2), Some(50)),
            &c,
            &mut rng,
        );
        assert!((fresh - seen_score - 35.0).abs() < 1e-9);
        assert!((fresh - swapped_score - 80.0).abs() < 1e-9);
    }

    #[test]
    fn veg_bonus_applies_to_food_categories_only() {
        let flags = WeatherFlags::default();
        let (seen, swapped) = (HashSet::new(), HashSet::new());
        let mut c = ctx(&flags, &seen, &swapped, 0.0);
        c.veg_friendly = true;
        let mut rng = StdRng::seed_from_u64(7);

        let cafe_plain = {
            let base = ctx(&flags, &seen, &swapped, 0.0);
            score(&option("a", Category::Cafe, Some(4.2), Some(50)), &base, &mut rng)
        };
        let cafe_veg = score(&option("a", Category::Cafe, Some(4.2), Some(50)), &c, &mut rng);
        assert!((cafe_veg - cafe_plain - 2.5).abs() < 1e-9);

        let bookstore_base = {
            let base = ctx(&flags, &seen, &swapped, 0.0);
            score(&option("a", Category::Bookstore, Some(4.2), Some(50)), &base, &mut rng)
        };
        let bookstore_veg = score(&option("a", Category::Bookstore, Some(4.2), Some(50)), &c, &mut rng);
        assert!((bookstore_veg - bookstore_base).abs() < 1e-9);
    }

    #[test]
    fn zero_jitter_makes_scoring_deterministic() {
        let flags = WeatherFlags::default();
        let (seen, swapped) = (HashSet::new(), HashSet::new());
        let c = ctx(&flags, &seen, &swapped, 0.0);
        let opt = option("a", Category::Cafe, Some(4.5), Some(300));

        let mut rng_a = StdRng::seed_from_u64(1);
        let mut rng_b = StdRng::seed_from_u64(999);
        assert_eq!(score(&opt, &c, &mut rng_a), score(&opt, &c, &mut rng_b));
    }

    #[test]
    fn jitter_stays_within_amplitude() {
        let flags = WeatherFlags::default();
        let (seen, swapped) = (HashSet::new(), HashSet::new());
        let plain_ctx = ctx(&flags, &seen, &swapped, 0.0);
        let jitter_ctx = ctx(&flags, &seen, &swapped, 1.3);
        let opt = option("a", Category::Cafe, Some(4.5), Some(300));

        let mut rng = StdRng::seed_from_u64(42);
        let base = score(&opt, &plain_ctx, &mut rng);
        for _ in 0..50 {
            let jittered = score(&opt, &jitter_ctx, &mut rng);
            assert!((jittered - base).abs() <= 1.3 + 1e-9);
        }
    }
}
