//! Entry point for the `fleetplan` command-line interface.
#![forbid(unsafe_code)]

use std::process::ExitCode;

use fleetplan_cli::CliError;

fn main() -> ExitCode {
    match fleetplan_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::ArgumentParsing(err)) => {
            ExitCode::from(fleetplan_cli::report_argument_error(&err))
        }
        Err(err) => {
            eprintln!("fleetplan: {err}");
            ExitCode::FAILURE
        }
    }
}
