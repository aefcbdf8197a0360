//! Request-scoped scored candidate.

use sortie_core::VenueOption;

/// A venue option with its ephemeral desirability score and the provider's
/// open-now tri-state. The score is computed once per candidate and reused
/// by both the strict and relaxed filter passes; it never reaches the wire.
#[derive(Debug, Clone)]
pub struct Scored {
    pub option: VenueOption,
    pub score: f64,
    pub open_now: Option<bool>,
}
