//! CLI command dispatch and execution

use anyhow::Result;
use clap::{Parser, Subcommand};

mod config_cmd;
mod down;
mod fixture;
mod gate;
mod seed;
mod up;

/// itest - bring up, seed and tear down check environments
#[derive(Parser, Debug)]
#[command(
    name = "itest",
    version,
    about = "Bring up, seed and tear down check environments",
    long_about = "A thin CLI over check-harness-core for running a containerized service \
                  (CouchDB v1 or v2) the way integration tests do"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the instance configuration for a version
    Config(config_cmd::ConfigArgs),

    /// Print a fixture payload
    Fixture(fixture::FixtureArgs),

    /// Decide whether a gated test runs on this host (exit 3 = skip)
    Gate(gate::GateArgs),

    /// Start, seed and leave the environment running
    Up(up::UpArgs),

    /// Tear the environment down
    Down(down::DownArgs),

    /// Seed an already running service
    Seed(seed::SeedArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Config(args) => config_cmd::execute(args),
            Commands::Fixture(args) => fixture::execute(args),
            Commands::Gate(args) => gate::execute(args),
            Commands::Up(args) => up::execute(args),
            Commands::Down(args) => down::execute(args),
            Commands::Seed(args) => seed::execute(args),
        }
    }
}
