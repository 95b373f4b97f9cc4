//! itest - bring up, seed and tear down check environments
//!
//! A thin CLI over `check-harness-core`, for running a containerized
//! service by hand while developing a check or its tests.

use clap::Parser;

mod commands;
mod util;

use commands::Cli;

fn main() {
    check_harness_core::logging::init();

    let cli = Cli::parse();

    if let Err(e) = cli.execute() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
