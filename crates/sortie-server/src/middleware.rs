use std::{collections::HashSet, sync::Arc};

use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, header::USER_AGENT, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use sortie_kv::IdentityMode;
use uuid::Uuid;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Known account bearer tokens. Presenting one of these upgrades the caller
/// to the authenticated rate-limit caps; everyone else is a guest. An empty
/// set simply means every caller is a guest — authentication itself lives
/// outside this service.
#[derive(Debug, Clone)]
pub struct AuthState {
    api_keys: Arc<HashSet<String>>,
}

impl AuthState {
    /// Builds auth config from `SORTIE_API_KEYS` (comma-separated bearer
    /// tokens).
    #[must_use]
    pub fn from_env() -> Self {
        let raw = std::env::var("SORTIE_API_KEYS").unwrap_or_default();
        Self::from_keys(&raw)
    }

    #[must_use]
    pub fn from_keys(raw: &str) -> Self {
        let keys: HashSet<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        Self {
            api_keys: Arc::new(keys),
        }
    }

    fn allows(&self, token: &str) -> bool {
        self.api_keys.contains(token)
    }
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Derives the rate-limit identity for a request.
///
/// A recognized bearer token yields a stable account identity. Guests hash
/// (client network address, user agent) — intentionally coarse, purely for
/// abuse throttling, not identification.
pub fn derive_identity(headers: &HeaderMap, auth: &AuthState) -> (String, IdentityMode) {
    if let Some(token) = extract_bearer_token(headers.get(AUTHORIZATION)) {
        if auth.allows(token) {
            let digest = Sha256::digest(token.as_bytes());
            return (format!("acct:{digest:x}"), IdentityMode::Authenticated);
        }
    }

    let addr = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("unknown");
    let agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    let digest = Sha256::digest(format!("{addr}|{agent}").as_bytes());
    (format!("guest:{digest:x}"), IdentityMode::Guest)
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}
