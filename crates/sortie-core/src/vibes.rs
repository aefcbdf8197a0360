//! Fixed vibe and category lookup tables.
//!
//! A vibe gates which venue categories are eligible at all; everything else
//! (keywords, fallback ladders, affinity weights) hangs off these tables.
//! All tables are `const` — immutable configuration constructed at compile
//! time and passed by reference, never mutable global state.

use serde::{Deserialize, Serialize};

use crate::types::WeatherFlags;

/// A mood category that gates venue eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vibe {
    Cozy,
    Social,
    Productive,
    Romantic,
    Outdoorsy,
}

/// Internal venue category. Every returned option carries exactly one,
/// always drawn from the active vibe's allowed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Cafe,
    Bar,
    Restaurant,
    Dessert,
    Bookstore,
    Coworking,
    Library,
    Arcade,
    Park,
    Market,
    Museum,
}

/// Companion context. Only shapes the hint lane query and fallback copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Companion {
    Solo,
    Date,
    Friends,
    Family,
}

impl Vibe {
    /// Parses a caller-supplied vibe, falling back to [`Vibe::Cozy`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "social" => Self::Social,
            "productive" => Self::Productive,
            "romantic" => Self::Romantic,
            "outdoorsy" => Self::Outdoorsy,
            _ => Self::Cozy,
        }
    }

    /// Allowed categories, in priority order. The first entry is the
    /// category-mapping fallback.
    #[must_use]
    pub fn allowed_categories(self) -> &'static [Category] {
        match self {
            Self::Cozy => &[
                Category::Cafe,
                Category::Dessert,
                Category::Bookstore,
                Category::Restaurant,
            ],
            Self::Social => &[
                Category::Bar,
                Category::Restaurant,
                Category::Arcade,
                Category::Cafe,
            ],
            Self::Productive => &[
                Category::Cafe,
                Category::Coworking,
                Category::Library,
                Category::Bookstore,
            ],
            Self::Romantic => &[
                Category::Restaurant,
                Category::Dessert,
                Category::Bar,
                Category::Park,
            ],
            Self::Outdoorsy => &[
                Category::Park,
                Category::Market,
                Category::Cafe,
                Category::Restaurant,
            ],
        }
    }

    /// Ordered relaxation ladder used only to top up the swap pool when the
    /// primary vibe's lanes run thin. Never feeds the primary shortlist.
    #[must_use]
    pub fn fallback_ladder(self) -> &'static [Vibe] {
        match self {
            Self::Cozy => &[Self::Romantic, Self::Productive],
            Self::Social => &[Self::Cozy, Self::Romantic],
            Self::Productive => &[Self::Cozy, Self::Social],
            Self::Romantic => &[Self::Cozy, Self::Social],
            Self::Outdoorsy => &[Self::Social, Self::Cozy],
        }
    }

    /// Free-text lane queries. Category keywords alone under-recall for some
    /// vibes (a coworking space rarely tags itself as a cafe).
    #[must_use]
    pub fn semantic_queries(self) -> &'static [&'static str] {
        match self {
            Self::Cozy => &["cozy cafe", "tea house", "reading cafe"],
            Self::Social => &["cocktail bar", "board game cafe", "live music bar"],
            Self::Productive => &["coworking space", "quiet cafe", "wifi cafe"],
            Self::Romantic => &["wine bar", "candlelit restaurant", "rooftop bar"],
            Self::Outdoorsy => &["botanical garden", "city park terrace", "street food market"],
        }
    }

    /// Base term for the generic hint lane.
    #[must_use]
    pub fn hint_term(self) -> &'static str {
        match self {
            Self::Cozy => "cozy hangout",
            Self::Social => "fun night out spot",
            Self::Productive => "place to get work done",
            Self::Romantic => "romantic evening spot",
            Self::Outdoorsy => "outdoor hangout",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cozy => "Cozy",
            Self::Social => "Social",
            Self::Productive => "Productive",
            Self::Romantic => "Romantic",
            Self::Outdoorsy => "Outdoorsy",
        }
    }
}

impl std::fmt::Display for Vibe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Category {
    /// Search keyword for the category's keyword lane.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Cafe => "cafe",
            Self::Bar => "bar",
            Self::Restaurant => "restaurant",
            Self::Dessert => "dessert place",
            Self::Bookstore => "bookstore",
            Self::Coworking => "coworking space",
            Self::Library => "library",
            Self::Arcade => "arcade bar",
            Self::Park => "park",
            Self::Market => "food market",
            Self::Museum => "museum",
        }
    }

    /// Food categories admit vegetarian-qualified lane variants.
    #[must_use]
    pub fn is_food(self) -> bool {
        matches!(self, Self::Cafe | Self::Restaurant | Self::Dessert)
    }

    /// Outdoor-leaning categories are subject to weather blocking.
    #[must_use]
    pub fn is_outdoor_leaning(self) -> bool {
        matches!(self, Self::Park | Self::Market)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Cafe => "Cafe",
            Self::Bar => "Bar",
            Self::Restaurant => "Restaurant",
            Self::Dessert => "Dessert",
            Self::Bookstore => "Bookstore",
            Self::Coworking => "Coworking",
            Self::Library => "Library",
            Self::Arcade => "Arcade",
            Self::Park => "Park",
            Self::Market => "Market",
            Self::Museum => "Museum",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Companion {
    /// Parses a caller-supplied companion context, falling back to `Solo`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "date" => Self::Date,
            "friends" => Self::Friends,
            "family" => Self::Family,
            _ => Self::Solo,
        }
    }

    /// Qualifier appended to the hint lane query.
    #[must_use]
    pub fn hint_suffix(self) -> &'static str {
        match self {
            Self::Solo => "solo",
            Self::Date => "for a date",
            Self::Friends => "with friends",
            Self::Family => "family friendly",
        }
    }
}

/// Per-(vibe, category) desirability bonus. Absent pairs score 0.
const VIBE_AFFINITY: &[(Vibe, Category, f64)] = &[
    (Vibe::Cozy, Category::Cafe, 6.0),
    (Vibe::Cozy, Category::Dessert, 5.0),
    (Vibe::Cozy, Category::Bookstore, 4.0),
    (Vibe::Cozy, Category::Restaurant, 2.0),
    (Vibe::Social, Category::Bar, 6.0),
    (Vibe::Social, Category::Arcade, 5.0),
    (Vibe::Social, Category::Restaurant, 3.0),
    (Vibe::Social, Category::Cafe, 1.0),
    (Vibe::Productive, Category::Coworking, 6.0),
    (Vibe::Productive, Category::Cafe, 5.0),
    (Vibe::Productive, Category::Library, 5.0),
    (Vibe::Productive, Category::Bookstore, 2.0),
    (Vibe::Romantic, Category::Restaurant, 6.0),
    (Vibe::Romantic, Category::Bar, 4.0),
    (Vibe::Romantic, Category::Dessert, 4.0),
    (Vibe::Romantic, Category::Park, 2.0),
    (Vibe::Outdoorsy, Category::Park, 6.0),
    (Vibe::Outdoorsy, Category::Market, 5.0),
    (Vibe::Outdoorsy, Category::Cafe, 2.0),
    (Vibe::Outdoorsy, Category::Restaurant, 2.0),
];

/// Morning favors cafes and study spaces.
const MORNING_AFFINITY: &[(Category, f64)] = &[
    (Category::Cafe, 5.0),
    (Category::Coworking, 4.0),
    (Category::Library, 3.0),
    (Category::Bookstore, 2.0),
    (Category::Dessert, -2.0),
    (Category::Arcade, -4.0),
    (Category::Bar, -8.0),
];

const AFTERNOON_AFFINITY: &[(Category, f64)] = &[
    (Category::Cafe, 3.0),
    (Category::Museum, 3.0),
    (Category::Park, 3.0),
    (Category::Market, 3.0),
    (Category::Restaurant, 2.0),
    (Category::Bar, -3.0),
];

const EVENING_AFFINITY: &[(Category, f64)] = &[
    (Category::Restaurant, 5.0),
    (Category::Bar, 4.0),
    (Category::Dessert, 3.0),
    (Category::Arcade, 2.0),
    (Category::Park, -2.0),
    (Category::Coworking, -3.0),
    (Category::Library, -5.0),
];

/// Late hours favor bars and late kitchens, penalize parks and libraries.
const LATE_AFFINITY: &[(Category, f64)] = &[
    (Category::Bar, 6.0),
    (Category::Arcade, 3.0),
    (Category::Restaurant, 2.0),
    (Category::Dessert, 1.0),
    (Category::Cafe, -2.0),
    (Category::Bookstore, -4.0),
    (Category::Market, -4.0),
    (Category::Museum, -6.0),
    (Category::Coworking, -6.0),
    (Category::Park, -8.0),
    (Category::Library, -9.0),
];

/// Vibe affinity bonus for a category, 0 for unlisted pairs.
#[must_use]
pub fn vibe_affinity(vibe: Vibe, category: Category) -> f64 {
    VIBE_AFFINITY
        .iter()
        .find(|(v, c, _)| *v == vibe && *c == category)
        .map_or(0.0, |(_, _, w)| *w)
}

/// Time-of-day affinity for a category at the given local hour.
#[must_use]
pub fn time_of_day_affinity(local_hour: u32, category: Category) -> f64 {
    let table = match local_hour {
        0..=10 => MORNING_AFFINITY,
        11..=16 => AFTERNOON_AFFINITY,
        17..=20 => EVENING_AFFINITY,
        _ => LATE_AFFINITY,
    };
    table
        .iter()
        .find(|(c, _)| *c == category)
        .map_or(0.0, |(_, w)| *w)
}

/// Weather affinity: outdoor-leaning categories are rewarded in good weather
/// and penalized in bad; indoor categories pick up a small bonus when the
/// weather pushes people inside.
#[must_use]
pub fn weather_affinity(flags: &WeatherFlags, category: Category) -> f64 {
    if category.is_outdoor_leaning() {
        if flags.blocks_outdoors() {
            -10.0
        } else if flags.cold || flags.windy {
            -4.0
        } else {
            5.0
        }
    } else if flags.precip || flags.cold {
        2.0
    } else {
        0.0
    }
}
