//! Swap-pool diversification.
//!
//! Caps per-category representation in the backup pool while preserving
//! score order, then truncates to the overall pool size — a pool of sixty
//! bars is useless for substitution.

use std::collections::HashMap;

use sortie_core::{Category, VenueOption};

use crate::candidate::Scored;

pub const POOL_CATEGORY_CAP: usize = 6;
pub const POOL_MAX: usize = 60;

/// Builds the diversified pool from score-descending candidates.
#[must_use]
pub fn diversify(candidates: &[&Scored]) -> Vec<VenueOption> {
    let mut counts: HashMap<Category, usize> = HashMap::new();
    let mut pool = Vec::new();

    for candidate in candidates {
        if pool.len() >= POOL_MAX {
            break;
        }
        let count = counts.entry(candidate.option.category).or_default();
        if *count >= POOL_CATEGORY_CAP {
            continue;
        }
        *count += 1;
        pool.push(candidate.option.clone());
    }

    pool
}
