use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sortie_core::RecommendRequest;
use sortie_engine::EngineError;
use sortie_kv::{Decision, KvError};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::{derive_identity, RequestId};

/// `POST /api/v1/recommendations`
///
/// Validates the body, derives the rate-limit identity, runs the engine, and
/// wraps the result in the response envelope. Upstream degradation inside
/// the engine still comes back as a 200 with fewer options.
pub async fn create_recommendations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            return ApiError::new(
                req_id.0,
                "invalid_input",
                format!("malformed request body: {rejection}"),
            )
            .into_response();
        }
    };

    if let Some(denied) = enforce_rate_limit(&state, &req_id.0, &headers).await {
        return denied;
    }

    let mut rng = StdRng::from_os_rng();
    match state.engine.recommend(request, Utc::now(), &mut rng).await {
        Ok(data) => (
            StatusCode::OK,
            Json(ApiResponse {
                data,
                meta: ResponseMeta::new(req_id.0),
            }),
        )
            .into_response(),
        Err(EngineError::InvalidInput(message)) => {
            ApiError::new(req_id.0, "invalid_input", message).into_response()
        }
    }
}

/// Shared admission check. `None` means admitted; `Some` carries the
/// finished error response.
pub(super) async fn enforce_rate_limit(
    state: &AppState,
    request_id: &str,
    headers: &HeaderMap,
) -> Option<Response> {
    let (identity, mode) = derive_identity(headers, &state.auth);
    match state.limiter.admit(&identity, mode, Utc::now()).await {
        Ok(Decision::Allowed) => None,
        Ok(Decision::Denied { retry_after_secs }) => {
            tracing::info!(mode = ?mode, "request rate limited");
            Some(ApiError::rate_limited(request_id.to_owned(), retry_after_secs).into_response())
        }
        Err(KvError::Unconfigured) => Some(
            ApiError::new(
                request_id.to_owned(),
                "configuration_missing",
                "rate-limit store is not configured",
            )
            .into_response(),
        ),
        Err(e) => {
            tracing::error!(error = %e, "rate-limit store failure");
            Some(
                ApiError::new(
                    request_id.to_owned(),
                    "configuration_missing",
                    "rate-limit store unavailable",
                )
                .into_response(),
            )
        }
    }
}
