//! `relais` (no subcommand) — start the proxy server.
//!
//! Validates configuration first (the process refuses to start
//! without an API key, before binding the listener), then builds the
//! shared state and router and serves until Ctrl+C / SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::cli::RunArgs;
use crate::config::ProxyConfig;
use crate::error::RelayError;
use crate::logging;
use crate::server::{self, AppState};

pub async fn execute(args: RunArgs) -> Result<(), RelayError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let config = ProxyConfig::from_args(&args)?;
    let state = Arc::new(AppState::new(config));
    let router = server::build_router(state.clone());

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        upstream = %state.config.upstream_url,
        upstream_timeout_ms = args.upstream_timeout,
        rate_limit_max = state.config.rate_limit.max_requests,
        rate_limit_window_secs = state.config.rate_limit.window.as_secs(),
        "relais started"
    );

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(server::shutdown_signal())
    .await?;

    tracing::info!("relais stopped");
    Ok(())
}
