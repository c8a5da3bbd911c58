//! Validated runtime configuration.
//!
//! [`ProxyConfig`] is built once from the parsed CLI/environment by
//! [`ProxyConfig::from_args`] and moved into the shared server state —
//! nothing reads configuration ambiently after startup, so tests can
//! construct as many independent instances as they like.

use std::time::Duration;

use url::Url;

use crate::cli::RunArgs;
use crate::error::RelayError;
use crate::middleware::rate_limit::RateLimitConfig;

/// The fixed listings endpoint this proxy fronts.
pub const DEFAULT_UPSTREAM_URL: &str =
    "https://www.remax-quebec.com/RMXServices/strateo/getInscriptions/call.do";

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Shared secret clients must present as `?api_key=`.
    pub api_key: String,
    /// Upstream endpoint every request is forwarded to.
    pub upstream_url: Url,
    /// Deadline for the single outbound call.
    pub upstream_timeout: Duration,
    pub rate_limit: RateLimitConfig,
}

impl ProxyConfig {
    /// Validate the parsed arguments into a usable configuration.
    ///
    /// The API key must be present and non-empty; the process refuses
    /// to start otherwise, before binding the listener.
    pub fn from_args(args: &RunArgs) -> Result<Self, RelayError> {
        let api_key = match args.api_key.as_deref() {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => return Err(RelayError::MissingApiKey),
        };

        let upstream_url =
            Url::parse(&args.upstream_url).map_err(|source| RelayError::InvalidUpstreamUrl {
                url: args.upstream_url.clone(),
                source,
            })?;

        Ok(Self {
            api_key,
            upstream_url,
            upstream_timeout: Duration::from_millis(args.upstream_timeout),
            rate_limit: RateLimitConfig {
                max_requests: args.rate_limit_max,
                window: Duration::from_secs(args.rate_limit_window),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::LogLevel;

    fn args(api_key: Option<&str>) -> RunArgs {
        RunArgs {
            port: 3000,
            host: "0.0.0.0".into(),
            api_key: api_key.map(String::from),
            log_level: LogLevel::Info,
            pretty: false,
            json: false,
            upstream_url: DEFAULT_UPSTREAM_URL.into(),
            upstream_timeout: 10_000,
            rate_limit_max: 100,
            rate_limit_window: 900,
        }
    }

    #[test]
    fn missing_api_key_refused() {
        assert!(matches!(
            ProxyConfig::from_args(&args(None)),
            Err(RelayError::MissingApiKey)
        ));
    }

    #[test]
    fn empty_api_key_refused() {
        assert!(matches!(
            ProxyConfig::from_args(&args(Some(""))),
            Err(RelayError::MissingApiKey)
        ));
    }

    #[test]
    fn valid_args_accepted() {
        let config = ProxyConfig::from_args(&args(Some("sesame"))).unwrap();
        assert_eq!(config.api_key, "sesame");
        assert_eq!(config.upstream_timeout, Duration::from_millis(10_000));
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.rate_limit.window, Duration::from_secs(900));
        assert_eq!(config.upstream_url.as_str(), DEFAULT_UPSTREAM_URL);
    }

    #[test]
    fn invalid_upstream_url_refused() {
        let mut bad = args(Some("sesame"));
        bad.upstream_url = "not a url".into();
        assert!(matches!(
            ProxyConfig::from_args(&bad),
            Err(RelayError::InvalidUpstreamUrl { .. })
        ));
    }
}
