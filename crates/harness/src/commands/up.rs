//! Up command implementation

use anyhow::{Context, Result};
use check_harness_core::bootstrap::DockerCompose;
use check_harness_core::seed::HttpTransport;
use check_harness_core::session::{Session, SessionOptions};
use clap::Args;
use tracing::warn;

use crate::util::settings::{ServiceArgs, resolve};

/// Start the environment and leave it running
#[derive(Args, Debug)]
pub struct UpArgs {
    #[command(flatten)]
    service: ServiceArgs,

    /// Skip seeding and the settle period
    #[arg(long)]
    no_seed: bool,
}

/// Execute the up command
pub fn execute(args: UpArgs) -> Result<()> {
    let settings = resolve(&args.service, None)?;
    let transport = HttpTransport::new(HttpTransport::DEFAULT_TIMEOUT)?;

    let session = Session::start_with(
        &settings,
        Box::new(DockerCompose),
        &transport,
        SessionOptions {
            seed: !args.no_seed,
        },
    )
    .with_context(|| format!("Failed to start CouchDB v{} environment", settings.version))?;

    if let Some(report) = session.seed_report() {
        if report.timed_out {
            warn!(
                "Stats not yet available on: {}",
                report.pending().join(", ")
            );
        }
    }

    let (instance, descriptor) = session.detach();
    println!("{}", serde_json::to_string_pretty(&instance.to_json())?);
    eprintln!(
        "Environment '{}' is running. Stop it with: itest down --version {}",
        descriptor.project, settings.version
    );
    Ok(())
}
