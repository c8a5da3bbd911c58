//! Subcommand dispatch.
//!
//! With no subcommand the binary starts the server, reading its
//! configuration from flags and environment variables; `health`
//! probes a running instance.

pub mod health;
pub mod run;

use crate::cli::{Cli, Commands};
use crate::error::RelayError;

pub async fn dispatch(cli: Cli) -> Result<(), RelayError> {
    match cli.command {
        Some(Commands::Health(args)) => health::execute(args).await,
        None => run::execute(cli.run).await,
    }
}
