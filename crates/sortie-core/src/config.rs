use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// The core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("SORTIE_ENV", "development"));

    let places_api_key = require("SORTIE_PLACES_API_KEY")?;
    let places_base_url = or_default("SORTIE_PLACES_BASE_URL", "https://maps.googleapis.com");
    let weather_base_url = or_default("SORTIE_WEATHER_BASE_URL", "https://api.open-meteo.com");

    let kv_rest_url = lookup("SORTIE_KV_REST_URL").ok();
    let kv_rest_token = lookup("SORTIE_KV_REST_TOKEN").ok();

    // The rate limiter and cache cannot run without the counter store; in
    // production that is a startup failure rather than a per-request 500.
    if env == Environment::Production {
        if kv_rest_url.is_none() {
            return Err(ConfigError::MissingEnvVar("SORTIE_KV_REST_URL".to_string()));
        }
        if kv_rest_token.is_none() {
            return Err(ConfigError::MissingEnvVar(
                "SORTIE_KV_REST_TOKEN".to_string(),
            ));
        }
    }

    let bind_addr = parse_addr("SORTIE_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("SORTIE_LOG_LEVEL", "info");

    let places_timeout_secs = parse_u64("SORTIE_PLACES_TIMEOUT_SECS", "10")?;
    let weather_timeout_secs = parse_u64("SORTIE_WEATHER_TIMEOUT_SECS", "5")?;
    let kv_timeout_secs = parse_u64("SORTIE_KV_TIMEOUT_SECS", "3")?;

    let lane_concurrency = parse_usize("SORTIE_LANE_CONCURRENCY", "8")?;
    let detail_concurrency = parse_usize("SORTIE_DETAIL_CONCURRENCY", "4")?;
    let detail_budget = parse_usize("SORTIE_DETAIL_BUDGET", "24")?;
    let search_cache_ttl_secs = parse_u64("SORTIE_SEARCH_CACHE_TTL_SECS", "300")?;
    let detail_cache_ttl_secs = parse_u64("SORTIE_DETAIL_CACHE_TTL_SECS", "1800")?;
    let pool_fill_target = parse_usize("SORTIE_POOL_FILL_TARGET", "40")?;

    let guest_per_minute = parse_u32("SORTIE_RL_GUEST_PER_MINUTE", "3")?;
    let guest_per_day = parse_u32("SORTIE_RL_GUEST_PER_DAY", "20")?;
    let auth_per_minute = parse_u32("SORTIE_RL_AUTH_PER_MINUTE", "10")?;
    let auth_per_day = parse_u32("SORTIE_RL_AUTH_PER_DAY", "120")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        places_api_key,
        places_base_url,
        weather_base_url,
        kv_rest_url,
        kv_rest_token,
        places_timeout_secs,
        weather_timeout_secs,
        kv_timeout_secs,
        lane_concurrency,
        detail_concurrency,
        detail_budget,
        search_cache_ttl_secs,
        detail_cache_ttl_secs,
        pool_fill_target,
        guest_per_minute,
        guest_per_day,
        auth_per_minute,
        auth_per_day,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
