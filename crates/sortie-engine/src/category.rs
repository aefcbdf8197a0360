//! Provider-tag to internal-category mapping.
//!
//! A priority-ordered rule table maps freeform provider type tags onto
//! exactly one category from the active vibe's allowed list. Rules whose
//! category the vibe does not allow are skipped, and an unmatched tag set
//! falls back to the vibe's first allowed category — the mapped category is
//! inside the allowed set unconditionally.

use sortie_core::{Category, Vibe};

/// Tag substring → preferred category, in priority order. Earlier rules win
/// when multiple tags match.
const TAG_RULES: &[(&str, Category)] = &[
    ("night_club", Category::Bar),
    ("bar", Category::Bar),
    ("coworking", Category::Coworking),
    ("library", Category::Library),
    ("book_store", Category::Bookstore),
    ("bakery", Category::Dessert),
    ("ice_cream", Category::Dessert),
    ("dessert", Category::Dessert),
    ("cafe", Category::Cafe),
    ("coffee", Category::Cafe),
    ("arcade", Category::Arcade),
    ("amusement_center", Category::Arcade),
    ("park", Category::Park),
    ("market", Category::Market),
    ("museum", Category::Museum),
    ("art_gallery", Category::Museum),
    ("restaurant", Category::Restaurant),
    ("meal_takeaway", Category::Restaurant),
    ("food", Category::Restaurant),
];

/// Maps a provider tag set onto one of `vibe`'s allowed categories.
#[must_use]
pub fn map_category(tags: &[String], vibe: Vibe) -> Category {
    let allowed = vibe.allowed_categories();
    for (tag, category) in TAG_RULES {
        if !allowed.contains(category) {
            continue;
        }
        if tags.iter().any(|t| t.contains(tag)) {
            return *category;
        }
    }
    allowed[0]
}
