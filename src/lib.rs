//! Relais is an authenticated forwarding proxy for the RE/MAX Québec
//! listings API.
//!
//! It accepts `GET /proxy-remax` requests, validates a shared-secret
//! `api_key`, rate-limits per client IP, forwards a templated query to
//! the fixed upstream endpoint, normalizes the response body to UTF-8,
//! and relays it as `application/xml; charset=utf-8`.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros;
//!   every flag has an environment variable equivalent.
//! - [`cmd`] -- Dispatch: a bare invocation runs the server, `health`
//!   probes a running instance.
//! - [`config`] -- Validated [`ProxyConfig`](config::ProxyConfig)
//!   injected into the server state; no ambient configuration.
//! - [`error`] -- Process-level and request-scoped error types using
//!   `thiserror`.
//! - [`health`] -- `GET /health` endpoint returning runtime counters.
//! - [`logging`] -- Structured tracing setup with JSON and pretty output.
//! - [`middleware`] -- Access control and per-IP rate limiting.
//! - [`proxy`] -- Core forwarding: query defaults, upstream URL
//!   construction, charset normalization, failure mapping.
//! - [`server`] -- Axum router assembly, shared state, pooled HTTPS
//!   client, and graceful shutdown.

// Binary crate — public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod middleware;
pub mod proxy;
pub mod server;
