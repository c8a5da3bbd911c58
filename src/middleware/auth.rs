//! Shared-secret access control.
//!
//! Clients present the secret as the `api_key` query-string parameter.
//! A missing or mismatched key short-circuits with 401 and a JSON
//! error body; the upstream is never contacted. Keys are compared by
//! SHA-256 digest so comparison time does not depend on where the
//! first differing byte sits, or on either key's length.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::server::AppState;

pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    match api_key_from_query(request.uri().query()) {
        Some(key) if keys_match(&key, &state.config.api_key) => next.run(request).await,
        _ => {
            state.stats.unauthorized.fetch_add(1, Ordering::Relaxed);
            tracing::warn!("rejected request with missing or invalid api_key");
            unauthorized()
        }
    }
}

/// Pull `api_key` out of the raw query string, percent-decoded the
/// same way the forwarded parameters are.
fn api_key_from_query(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(name, _)| name == "api_key")
        .map(|(_, value)| value.into_owned())
}

/// Digest-equality comparison. Hashing both sides first keeps the
/// comparison independent of the inputs' contents and lengths.
fn keys_match(provided: &str, expected: &str) -> bool {
    Sha256::digest(provided.as_bytes()) == Sha256::digest(expected.as_bytes())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "unauthorized: missing or invalid api_key" })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_api_key() {
        assert_eq!(
            api_key_from_query(Some("api_key=sesame&page=2")),
            Some("sesame".into())
        );
    }

    #[test]
    fn missing_query_or_key_yields_none() {
        assert_eq!(api_key_from_query(None), None);
        assert_eq!(api_key_from_query(Some("page=2")), None);
    }

    #[test]
    fn api_key_is_percent_decoded() {
        assert_eq!(
            api_key_from_query(Some("api_key=s%C3%A9same%20ouvre")),
            Some("sésame ouvre".into())
        );
    }

    #[test]
    fn matching_keys_accepted() {
        assert!(keys_match("sesame", "sesame"));
    }

    #[test]
    fn wrong_or_truncated_keys_rejected() {
        assert!(!keys_match("sesame", "sesame2"));
        assert!(!keys_match("sesam", "sesame"));
        assert!(!keys_match("", "sesame"));
    }
}
