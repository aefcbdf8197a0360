mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};
use crate::middleware::AuthState;
use sortie_engine::{Engine, EngineConfig, FallbackCopywriter};
use sortie_kv::{KvClient, RateLimitCaps, RateLimiter, TtlCache};
use sortie_places::PlacesClient;
use sortie_weather::WeatherClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = sortie_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let is_development = matches!(config.env, sortie_core::Environment::Development);

    let kv = match (&config.kv_rest_url, &config.kv_rest_token) {
        (Some(url), Some(token)) => Some(KvClient::new(url, token, config.kv_timeout_secs)?),
        _ => {
            tracing::warn!(
                "SORTIE_KV_REST_URL/TOKEN not set; cache disabled and rate limiter failing open"
            );
            None
        }
    };
    let cache = kv.clone().map(TtlCache::new);
    let limiter = RateLimiter::new(
        kv.clone(),
        RateLimitCaps {
            guest_per_minute: config.guest_per_minute,
            guest_per_day: config.guest_per_day,
            auth_per_minute: config.auth_per_minute,
            auth_per_day: config.auth_per_day,
        },
        is_development,
    );

    let places = PlacesClient::with_base_url(
        &config.places_api_key,
        config.places_timeout_secs,
        &config.places_base_url,
    )?;
    let weather = WeatherClient::new(&config.weather_base_url, config.weather_timeout_secs)?;
    let engine = Engine::new(
        places,
        weather,
        cache,
        Arc::new(FallbackCopywriter),
        EngineConfig::from_app_config(&config),
    );

    let auth = AuthState::from_env();
    let state = AppState {
        engine: Arc::new(engine),
        limiter,
        kv,
        auth,
    };
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "sortie-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
