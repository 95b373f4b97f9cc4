//! Down command implementation

use anyhow::{Context, Result};
use check_harness_core::bootstrap::{ComposeRunner, DockerCompose};
use check_harness_core::session;
use clap::Args;

use crate::util::settings::{ServiceArgs, resolve};

/// Tear the environment down
#[derive(Args, Debug)]
pub struct DownArgs {
    #[command(flatten)]
    service: ServiceArgs,
}

/// Execute the down command
pub fn execute(args: DownArgs) -> Result<()> {
    let settings = resolve(&args.service, None)?;
    let descriptor = session::descriptor(&settings);

    DockerCompose
        .down(&descriptor)
        .with_context(|| format!("Failed to stop environment '{}'", descriptor.project))?;

    println!("Stopped {}", descriptor.project);
    Ok(())
}
