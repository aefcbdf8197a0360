mod recommend;
mod swap;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{request_id, AuthState, RequestId};
use sortie_engine::Engine;
use sortie_kv::{KvClient, RateLimiter};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub limiter: RateLimiter,
    pub kv: Option<KvClient>,
    pub auth: AuthState,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    kv_store: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
                retry_after_secs: None,
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    pub fn rate_limited(request_id: impl Into<String>, retry_after_secs: u64) -> Self {
        Self {
            error: ErrorBody {
                code: "rate_limited".to_owned(),
                message: format!("rate limit exceeded; retry in {retry_after_secs}s"),
                retry_after_secs: Some(retry_after_secs),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "invalid_input" | "bad_request" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let retry_after = self.error.retry_after_secs;
        let mut response = (status, Json(self)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route(
            "/api/v1/recommendations",
            post(recommend::create_recommendations),
        )
        .route("/api/v1/recommendations/swap", post(swap::swap_option))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    let kv_store = match &state.kv {
        None => "disabled",
        Some(kv) => match kv.ping().await {
            Ok(()) => "ok",
            Err(e) => {
                tracing::warn!(error = %e, "health check: kv store unavailable");
                "unavailable"
            }
        },
    };

    // A degraded KV store only costs caching and (in development) rate
    // limiting; the engine still serves.
    (
        StatusCode::OK,
        Json(ApiResponse {
            data: HealthData {
                status: "ok",
                kv_store,
            },
            meta,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use sortie_engine::{EngineConfig, FallbackCopywriter};
    use sortie_kv::RateLimitCaps;
    use sortie_places::PlacesClient;
    use sortie_weather::WeatherClient;
    use tower::ServiceExt;

    /// State whose providers point at a dead port: every upstream call
    /// degrades, nothing panics.
    fn test_state(kv: Option<KvClient>, fail_open: bool) -> AppState {
        let places = PlacesClient::with_base_url("test-key", 1, "http://127.0.0.1:59999")
            .expect("places client");
        let weather =
            WeatherClient::new("http://127.0.0.1:59999", 1).expect("weather client");
        let engine = Engine::new(
            places,
            weather,
            kv.clone().map(sortie_kv::TtlCache::new),
            Arc::new(FallbackCopywriter),
            EngineConfig {
                jitter: 0.0,
                temperature: 0.0,
                ..EngineConfig::default()
            },
        );
        AppState {
            engine: Arc::new(engine),
            limiter: RateLimiter::new(kv.clone(), RateLimitCaps::default(), fail_open),
            kv,
            auth: AuthState::from_keys(""),
        }
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_owned()))
            .expect("request")
    }

    #[test]
    fn api_error_codes_map_to_statuses() {
        let bad = ApiError::new("req-1", "invalid_input", "nope").into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
        let limited = ApiError::rate_limited("req-2", 30).into_response();
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            limited.headers().get(header::RETRY_AFTER),
            Some(&HeaderValue::from(30_u64))
        );
        let config = ApiError::new("req-3", "configuration_missing", "no kv").into_response();
        assert_eq!(config.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn health_reports_disabled_kv_store() {
        let app = build_app(test_state(None, true));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["data"]["kv_store"], "disabled");
        assert!(json["meta"]["request_id"].is_string());
    }

    #[tokio::test]
    async fn malformed_body_is_a_400_with_reason() {
        let app = build_app(test_state(None, true));
        let response = app
            .oneshot(post_json("/api/v1/recommendations", "{not json"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["error"]["code"], "invalid_input");
        assert!(json["error"]["message"].as_str().is_some());
    }

    #[tokio::test]
    async fn degraded_upstreams_still_produce_a_success_envelope() {
        let app = build_app(test_state(None, true));
        let response = app
            .oneshot(post_json(
                "/api/v1/recommendations",
                r#"{"city":"Amsterdam","vibe":"Cozy"}"#,
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["data"]["options"].as_array().map(Vec::len), Some(0));
        assert_eq!(json["data"]["meta"]["limitedAvailability"], true);
        assert!(json["data"]["meta"]["reason"].is_string());
        assert_eq!(json["data"]["weather"]["available"], false);
    }

    #[tokio::test]
    async fn unconfigured_store_in_strict_mode_is_a_500() {
        let app = build_app(test_state(None, false));
        let response = app
            .oneshot(post_json(
                "/api/v1/recommendations",
                r#"{"city":"Amsterdam","vibe":"Cozy"}"#,
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["error"]["code"], "configuration_missing");
    }

    #[tokio::test]
    async fn over_cap_guest_gets_429_with_retry_hint() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pipeline"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"result": [4, 21]},
                {"result": [4, 55_000]}
            ])))
            .mount(&server)
            .await;

        let kv = KvClient::new(&server.uri(), "token", 3).expect("kv client");
        let app = build_app(test_state(Some(kv), false));
        let response = app
            .oneshot(post_json(
                "/api/v1/recommendations",
                r#"{"city":"Amsterdam","vibe":"Cozy"}"#,
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER),
            Some(&HeaderValue::from(21_u64))
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["error"]["code"], "rate_limited");
        assert_eq!(json["error"]["retry_after_secs"], 21);
    }

    #[tokio::test]
    async fn swap_returns_a_substitute_from_the_pool() {
        let app = build_app(test_state(None, true));
        let body = serde_json::json!({
            "pool": [{
                "id": "bar-1",
                "name": "Bar One",
                "category": "Bar",
                "rating": 4.5,
                "ratingCount": 120,
                "priceTier": 2,
                "address": null,
                "lat": 52.37,
                "lng": 4.9,
                "distanceKm": 1.0,
                "openStatus": "Open until 11:00 PM",
                "closingLabel": "11:00 PM",
                "closeTs": null,
                "photoRefs": [],
                "why": null,
                "watchouts": null
            }],
            "currentCategories": ["Cafe", "Cafe"],
            "excludedIds": []
        });
        let response = app
            .oneshot(post_json("/api/v1/recommendations/swap", &body.to_string()))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(json["data"]["option"]["id"], "bar-1");
    }

    #[tokio::test]
    async fn swap_with_exhausted_pool_returns_null_option() {
        let app = build_app(test_state(None, true));
        let body = serde_json::json!({
            "pool": [],
            "currentCategories": [],
            "excludedIds": ["anything"]
        });
        let response = app
            .oneshot(post_json("/api/v1/recommendations/swap", &body.to_string()))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert!(json["data"]["option"].is_null());
    }
}
