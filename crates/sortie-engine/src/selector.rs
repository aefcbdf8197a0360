//! Shortlist selection and swap substitution.
//!
//! The shortlist comes from iterated weighted sampling without replacement:
//! each candidate's score becomes a Boltzmann weight `exp(score/T)`, sampling
//! prefers candidates whose category is still under the per-category cap,
//! and a post-check trades the last pick away if all five share a category.
//! `T → 0` degenerates to greedy argmax, which is what tests pin.
//!
//! Swap substitution walks the score-ordered pool under a three-tier
//! diversity relaxation: per-category cap 2, then 3, then uncapped. The tier
//! order is user-visible substitution behavior; keep it exactly.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use sortie_core::{Category, VenueOption};

use crate::candidate::Scored;

pub const SHORTLIST_MAX: usize = 5;
pub const SHORTLIST_CATEGORY_CAP: usize = 2;

/// Picks up to [`SHORTLIST_MAX`] options from strict-feasible candidates.
///
/// Fewer than the maximum is a valid outcome when supply is thin.
pub fn select_shortlist<R: Rng + ?Sized>(
    candidates: &[Scored],
    temperature: f64,
    rng: &mut R,
) -> Vec<VenueOption> {
    let mut remaining: Vec<&Scored> = candidates.iter().collect();
    let mut picked: Vec<VenueOption> = Vec::new();
    let mut counts: HashMap<Category, usize> = HashMap::new();

    while picked.len() < SHORTLIST_MAX && !remaining.is_empty() {
        let under_cap: Vec<usize> = remaining
            .iter()
            .enumerate()
            .filter(|(_, s)| {
                counts.get(&s.option.category).copied().unwrap_or(0) < SHORTLIST_CATEGORY_CAP
            })
            .map(|(i, _)| i)
            .collect();
        let eligible = if under_cap.is_empty() {
            (0..remaining.len()).collect()
        } else {
            under_cap
        };

        let idx = weighted_pick(&remaining, &eligible, temperature, rng);
        let chosen = remaining.swap_remove(idx);
        *counts.entry(chosen.option.category).or_default() += 1;
        picked.push(chosen.option.clone());
    }

    // Post-check: a full shortlist of one category trades its last pick for
    // the best candidate of any other category, when one exists.
    if picked.len() == SHORTLIST_MAX {
        let first_category = picked[0].category;
        if picked.iter().all(|o| o.category == first_category) {
            let replacement = remaining
                .iter()
                .filter(|s| s.option.category != first_category)
                .max_by(|a, b| {
                    a.score
                        .partial_cmp(&b.score)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            if let Some(replacement) = replacement {
                if let Some(last) = picked.last_mut() {
                    *last = replacement.option.clone();
                }
            }
        }
    }

    picked
}

/// Picks a substitute from the score-ordered pool.
///
/// `current_categories` are the categories currently on screen; the tiers
/// relax the per-category cap 2 → 3 → uncapped so substitution prefers
/// variety but never refuses while supply remains.
#[must_use]
pub fn choose_swap(
    pool: &[VenueOption],
    current_categories: &[Category],
    excluded: &HashSet<String>,
) -> Option<VenueOption> {
    let mut counts: HashMap<Category, usize> = HashMap::new();
    for category in current_categories {
        *counts.entry(*category).or_default() += 1;
    }

    for cap in [2_usize, 3] {
        let hit = pool.iter().find(|o| {
            !excluded.contains(&o.id) && counts.get(&o.category).copied().unwrap_or(0) < cap
        });
        if let Some(option) = hit {
            return Some(option.clone());
        }
    }
    pool.iter().find(|o| !excluded.contains(&o.id)).cloned()
}

/// Samples one index from `eligible` proportionally to `exp(score/T)`.
/// Non-positive temperature degenerates to argmax.
fn weighted_pick<R: Rng + ?Sized>(
    candidates: &[&Scored],
    eligible: &[usize],
    temperature: f64,
    rng: &mut R,
) -> usize {
    debug_assert!(!eligible.is_empty());
    if temperature <= f64::EPSILON {
        return eligible
            .iter()
            .copied()
            .max_by(|a, b| {
                candidates[*a]
                    .score
                    .partial_cmp(&candidates[*b].score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(0);
    }

    let weights: Vec<f64> = eligible
        .iter()
        .map(|&i| (candidates[i].score / temperature).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return eligible[0];
    }

    let mut target = rng.random_range(0.0..total);
    for (weight, &index) in weights.iter().zip(eligible) {
        if target < *weight {
            return index;
        }
        target -= weight;
    }
    *eligible.last().unwrap_or(&0)
}
