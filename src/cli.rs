//! Command-line interface definitions using clap derive macros.
//!
//! Invoking the binary with no subcommand starts the proxy. Every flag
//! has an environment variable equivalent so container deployments can
//! configure the process without arguments (`PORT`, `API_KEY`, ...).
//! The one subcommand, `health`, probes a running instance.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::DEFAULT_UPSTREAM_URL;

#[derive(Parser)]
#[command(
    name = "relais",
    version,
    about = "Authenticated forwarding proxy for the RE/MAX Québec listings API",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        API_KEY=secret relais               Start on port 3000\n  \
        relais --api-key secret -p 8080     Explicit flags\n  \
        relais health                       Probe a running instance"
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check health of a running instance
    Health(HealthArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Listen port
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Listen address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Shared secret clients must present as ?api_key=<secret>
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    // -- Tuning --
    /// Upstream endpoint requests are forwarded to
    #[arg(
        long,
        env = "UPSTREAM_URL",
        default_value = DEFAULT_UPSTREAM_URL,
        help_heading = "Tuning"
    )]
    pub upstream_url: String,

    /// Upstream request deadline in milliseconds
    #[arg(
        long,
        env = "UPSTREAM_TIMEOUT_MS",
        default_value_t = 10_000,
        help_heading = "Tuning"
    )]
    pub upstream_timeout: u64,

    /// Max requests per client IP per window
    #[arg(
        long,
        env = "RATE_LIMIT_MAX",
        default_value_t = 100,
        help_heading = "Tuning"
    )]
    pub rate_limit_max: u32,

    /// Rate limit window in seconds
    #[arg(
        long,
        env = "RATE_LIMIT_WINDOW_SECS",
        default_value_t = 900,
        help_heading = "Tuning"
    )]
    pub rate_limit_window: u64,
}

#[derive(Args)]
pub struct HealthArgs {
    /// URL of the running instance
    #[arg(default_value = "http://localhost:3000")]
    pub url: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}
