//! Core request forwarding.
//!
//! [`forward_handler`] serves `GET /proxy-remax`: it fills in the
//! listing query (defaults for anything absent), issues a single GET
//! to the configured upstream under a deadline, normalizes the body to
//! UTF-8, and relays it as `application/xml; charset=utf-8`. Every
//! upstream failure is translated into a client response here — none
//! propagate, none are retried. Submodules handle query defaults and
//! URL construction ([`query`]) and charset normalization
//! ([`encoding`]).

pub mod encoding;
pub mod query;

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use url::Url;

use crate::error::UpstreamError;
use crate::server::{AppState, HttpClient};

/// Content type of every successful relay, regardless of what the
/// upstream declared.
const RELAY_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

pub async fn forward_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let forward_query = query::ForwardQuery::from_params(&params);
    let upstream_url = query::build_upstream_url(&state.config.upstream_url, &forward_query);
    let request_id = uuid::Uuid::new_v4().to_string();

    tracing::info!(
        request_id = %request_id,
        upstream = %upstream_url,
        "forwarding listing request"
    );

    let outcome = fetch_upstream(
        &state.http_client,
        &upstream_url,
        state.config.upstream_timeout,
    )
    .await
    .and_then(|(content_type, body)| {
        let charset = encoding::charset_from_content_type(content_type.as_deref());
        Ok(encoding::normalize_to_utf8(&body, &charset)?)
    });

    match outcome {
        Ok(body) => {
            state.stats.forwarded.fetch_add(1, Ordering::Relaxed);
            tracing::info!(
                request_id = %request_id,
                bytes = body.len(),
                "upstream response relayed"
            );
            ([(header::CONTENT_TYPE, RELAY_CONTENT_TYPE)], body).into_response()
        }
        Err(err) => {
            state.stats.failed.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                request_id = %request_id,
                error = %err,
                "forwarding failed"
            );
            error_response(&err)
        }
    }
}

/// One outbound GET, full body collected before returning. The
/// declared `Content-Type` comes back alongside the raw bytes so the
/// caller can pick a decoder.
async fn fetch_upstream(
    client: &HttpClient,
    url: &Url,
    deadline: Duration,
) -> Result<(Option<String>, Bytes), UpstreamError> {
    let request = hyper::Request::builder()
        .method(hyper::Method::GET)
        .uri(url.as_str())
        .header(
            header::USER_AGENT,
            concat!("relais/", env!("CARGO_PKG_VERSION")),
        )
        .body(Full::new(Bytes::new()))
        .map_err(|e| UpstreamError::Transport {
            source: Box::new(e),
        })?;

    let response = match tokio::time::timeout(deadline, client.request(request)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            return Err(UpstreamError::Transport {
                source: Box::new(e),
            })
        }
        Err(_) => return Err(UpstreamError::Timeout),
    };

    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status { status });
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let body = response
        .into_body()
        .collect()
        .await
        .map_err(|e| UpstreamError::Transport {
            source: Box::new(e),
        })?
        .to_bytes();

    Ok((content_type, body))
}

/// Translate an upstream failure into the client-facing response.
///
/// A non-2xx upstream status is relayed as-is with a diagnostic naming
/// the upstream status text; a blown deadline becomes 504; transport
/// and decoding failures become a generic 500.
fn error_response(err: &UpstreamError) -> Response {
    match err {
        UpstreamError::Status { status } => {
            let reason = status.canonical_reason().unwrap_or("unknown status");
            (
                *status,
                format!("upstream error: {} {reason}", status.as_u16()),
            )
                .into_response()
        }
        UpstreamError::Timeout => (
            StatusCode::GATEWAY_TIMEOUT,
            "upstream request timed out",
        )
            .into_response(),
        UpstreamError::Transport { .. } | UpstreamError::Decode(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal proxy error",
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodingError;

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn upstream_status_is_relayed_with_diagnostic() {
        let response = error_response(&UpstreamError::Status {
            status: StatusCode::NOT_FOUND,
        });
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_text(response).await;
        assert!(body.contains("404"));
        assert!(body.contains("Not Found"));
    }

    #[tokio::test]
    async fn upstream_5xx_is_relayed_too() {
        let response = error_response(&UpstreamError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
        });
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn timeout_maps_to_504() {
        let response = error_response(&UpstreamError::Timeout);
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert!(body_text(response).await.contains("timed out"));
    }

    #[tokio::test]
    async fn transport_failure_maps_to_500() {
        let response = error_response(&UpstreamError::Transport {
            source: "connection reset".into(),
        });
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn decoding_failure_maps_to_500() {
        let response = error_response(&UpstreamError::Decode(DecodingError {
            label: "x-mystery".into(),
        }));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
