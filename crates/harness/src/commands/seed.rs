//! Seed command implementation

use anyhow::{Context, Result};
use check_harness_core::couch;
use check_harness_core::seed::{HttpTransport, Seeder};
use clap::Args;
use serde_json::json;

use crate::util::settings::{ServiceArgs, resolve};

/// Seed an already running service
#[derive(Args, Debug)]
pub struct SeedArgs {
    #[command(flatten)]
    service: ServiceArgs,

    /// Fail if stats never become available
    #[arg(long)]
    strict: bool,

    /// Output the report as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the seed command
pub fn execute(args: SeedArgs) -> Result<()> {
    let strict = args.strict.then_some(true);
    let settings = resolve(&args.service, strict)?;
    let transport = HttpTransport::new(HttpTransport::DEFAULT_TIMEOUT)?;
    let plan = couch::seed_plan(&settings);

    let report = Seeder::new(&transport, &settings.seed)
        .run(&plan)
        .with_context(|| format!("Failed to seed {}", settings.base_url()))?;

    if args.json {
        let output = json!({
            "attempts": report.attempts,
            "timedOut": report.timed_out,
            "ready": report.ready,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Seeded {} on {}", couch::DATABASE, settings.base_url());
    for (url, ready) in &report.ready {
        let status = if *ready { "ready" } else { "pending" };
        println!("  {url}: {status}");
    }
    if report.timed_out {
        println!("Stats still pending after {} attempts", report.attempts);
    }
    Ok(())
}
