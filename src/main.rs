//! Command-line entry point for `dtdiff`.

use std::process::ExitCode;

use clap::Parser;

mod cli;

fn main() -> ExitCode {
    match cli::Cli::parse().run() {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            eprintln!("Error: {e:?}");
            cli::Outcome::Failed.exit_code()
        }
    }
}
