use std::collections::HashSet;

use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use sortie_core::{SwapRequest, SwapResponse};
use sortie_engine::choose_swap;

use super::recommend::enforce_rate_limit;
use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

/// `POST /api/v1/recommendations/swap`
///
/// Picks one substitute from a previously returned pool under the diversity
/// relaxation tiers. An exhausted pool is a 200 with a null option — the
/// client decides what to tell the user.
pub async fn swap_option(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    payload: Result<Json<SwapRequest>, JsonRejection>,
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

    let excluded: HashSet<String> = request.excluded_ids.iter().cloned().collect();
    let option = choose_swap(&request.pool, &request.current_categories, &excluded);

    (
        StatusCode::OK,
        Json(ApiResponse {
            data: SwapResponse { option },
            meta: ResponseMeta::new(req_id.0),
        }),
    )
        .into_response()
}
