//! Unified error types for Relais.
//!
//! [`RelayError`] covers process-level failures: startup configuration,
//! listener binding, and the client side of the `health` subcommand.
//! It is what `main` prints before exiting non-zero.
//!
//! [`UpstreamError`] is request-scoped. It never leaves the forwarding
//! handler, which translates each variant into a client-facing HTTP
//! response. Both use `thiserror` for `Display` and `Error` derives.

use hyper::StatusCode;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RelayError {
    #[error(
        "API_KEY is not set.\n\n  \
         The proxy refuses to serve requests without a shared secret.\n  \
         Export the API_KEY environment variable or pass --api-key <secret>."
    )]
    MissingApiKey,

    #[error("Invalid upstream URL '{url}': {source}")]
    InvalidUpstreamUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Health check failed with status {0}")]
    HealthCheckFailed(StatusCode),
}

/// Failures of the single outbound call, in the order the handler
/// distinguishes them: an upstream status error wins over everything
/// else, then a timeout, then transport noise.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream returned {status}")]
    Status { status: StatusCode },

    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream request failed: {source}")]
    Transport {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(transparent)]
    Decode(#[from] DecodingError),
}

/// The upstream declared a charset the transcoding layer does not know.
///
/// Surfaced instead of guessed at: decoding with the wrong table would
/// hand the client garbled text under a 200 status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized charset label '{label}' in upstream Content-Type")]
pub struct DecodingError {
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoding_error_names_the_label() {
        let err = DecodingError {
            label: "x-mystery".into(),
        };
        assert!(err.to_string().contains("x-mystery"));
    }

    #[test]
    fn upstream_status_displays_code() {
        let err = UpstreamError::Status {
            status: StatusCode::NOT_FOUND,
        };
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn missing_api_key_mentions_the_variable() {
        assert!(RelayError::MissingApiKey.to_string().contains("API_KEY"));
    }
}
