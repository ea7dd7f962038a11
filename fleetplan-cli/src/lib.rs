//! Command-line interface for the fleetplan delivery optimizer.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod plan;

pub use error::CliError;

const ARG_PLAN_INPUT: &str = "input";
const ARG_PLAN_OSRM_BASE_URL: &str = "osrm-base-url";
const ARG_PLAN_PROFILE: &str = "profile";
const ARG_PLAN_TIME_LIMIT: &str = "time-limit-secs";
const ARG_PLAN_SEED: &str = "seed";
const ARG_PLAN_PENALTY: &str = "penalty-per-second";
const ARG_PLAN_TIMEOUT: &str = "timeout-secs";
const ARG_PLAN_OUTPUT: &str = "output";
const ARG_PLAN_WITH_GEOMETRY: &str = "with-geometry";
const ARG_PLAN_OFFLINE: &str = "offline";
const ENV_PLAN_INPUT: &str = "FLEETPLAN_CMDS_PLAN_INPUT_PATH";

/// Run the fleetplan CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns a [`CliError`] when arguments or configuration are invalid, the
/// input cannot be read, the distance service fails or the plan cannot be
/// written.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Plan(args) => plan::run_plan(args),
    }
}

/// Print a clap error and return the process exit status for it.
///
/// Clap reports help and version requests as errors; those print to stdout
/// and exit with status 0. A failed print exits with status 1.
#[must_use]
pub fn report_argument_error(err: &clap::Error) -> u8 {
    if err.print().is_err() || err.use_stderr() {
        1
    } else {
        0
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "fleetplan",
    about = "Plan capacitated, time-windowed deliveries for a vehicle fleet",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Solve a delivery plan from JSON records.
    Plan(plan::PlanArgs),
}

#[cfg(test)]
mod tests;
