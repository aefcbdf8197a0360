//! Shared domain model and configuration for sortie.
//!
//! Holds the wire types exchanged with callers, the fixed vibe/category
//! lookup tables that gate candidate eligibility, the supported city table,
//! and env-driven application configuration. Everything here is passive
//! data — retrieval, filtering, and scoring live in `sortie-engine`.

pub mod app_config;
pub mod cities;
pub mod config;
pub mod types;
pub mod vibes;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use cities::CityCenter;
pub use config::{load_app_config, load_app_config_from_env};
pub use types::{
    Meta, RecommendRequest, RecommendResponse, SwapRequest, SwapResponse, VenueOption,
    WeatherFlags, WeatherReport, FRESHNESS_ID_CAP,
};
pub use vibes::{Category, Companion, Vibe};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
