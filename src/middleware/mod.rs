//! Middleware guarding the client-facing proxy route.
//!
//! Two `axum::middleware::from_fn_with_state` layers wrap
//! `/proxy-remax`: [`rate_limit`] runs first (a flooding client is
//! throttled even with bad credentials), then [`auth`]. `/health`
//! bypasses both.

pub mod auth;
pub mod rate_limit;
