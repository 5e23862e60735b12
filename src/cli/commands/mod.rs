//! Command implementations for the playlog processor CLI.

pub mod run;
pub mod shared;

use crate::cli::args::{Args, Commands};
use crate::error::{EtlError, Result};
use crate::models::RunSummary;

/// Dispatch to the selected subcommand
pub async fn run(args: Args) -> Result<RunSummary> {
    match args.command {
        Some(Commands::Run(run_args)) => run::run_etl(run_args).await,
        None => Err(EtlError::Configuration {
            message: "no command specified".to_string(),
        }),
    }
}
