//! Gate command implementation

use anyhow::{Result, anyhow};
use check_harness_core::config::EnvSnapshot;
use check_harness_core::gate::{Gate, GateDecision, HostIdentity};
use clap::Args;
use serde_json::json;

/// Exit code signalling that the gated test should be skipped
const SKIP_EXIT_CODE: i32 = 3;

/// Evaluate a platform gate on this host
#[derive(Args, Debug)]
pub struct GateArgs {
    /// Gate to evaluate: windows-ci, not-windows-ci or docker
    gate: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the gate command
pub fn execute(args: GateArgs) -> Result<()> {
    let gate: Gate = args.gate.parse().map_err(|e: String| anyhow!(e))?;
    let host = HostIdentity::detect(&EnvSnapshot::capture());
    let decision = gate.evaluate(&host);

    if args.json {
        let (run, reason) = match decision {
            GateDecision::Run => (true, None),
            GateDecision::Skip { ref reason } => (false, Some(reason.as_str())),
        };
        let output = json!({
            "gate": gate.to_string(),
            "run": run,
            "reason": reason,
            "host": host,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        match decision {
            GateDecision::Run => println!("run"),
            GateDecision::Skip { ref reason } => println!("skip: {reason}"),
        }
    }

    if !decision.should_run() {
        std::process::exit(SKIP_EXIT_CODE);
    }
    Ok(())
}
