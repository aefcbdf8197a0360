//! Place-search provider client for sortie.
//!
//! Wraps the provider's text-search and place-details endpoints behind typed
//! responses, and carries the closing-time arithmetic that turns a weekly
//! opening-period schedule plus a UTC offset into an absolute closing
//! instant. Also home to the haversine helper used for distance ordering.

pub mod client;
pub mod error;
pub mod geo;
pub mod hours;
pub mod types;

pub use client::PlacesClient;
pub use error::PlacesError;
pub use geo::haversine_km;
pub use hours::{closing_time, remaining_minutes, ClosingTime};
pub use types::{OpeningPeriod, PeriodPoint, PlaceDetails, SearchCandidate};
