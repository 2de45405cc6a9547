//! fleetconf: inventory-driven configuration resolution and policy engine
//! for fleets of agent gateways.
//!
//! Parses arguments, sets up tracing, dispatches to the command handler,
//! and maps errors to exit codes.

mod cli;
mod commands;
pub mod context;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod fs;
pub mod inventory;
pub mod layers;
pub mod logging;
pub mod policy;
pub mod render;
pub mod value;

#[cfg(test)]
mod test_support;

use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    logging::init_tracing(cli.log_json, logging::level_for_verbosity(cli.verbose));

    match commands::dispatch(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
