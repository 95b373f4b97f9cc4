//! Config command implementation

use anyhow::Result;
use check_harness_core::config::{EnvSnapshot, GLOBAL_CONFIG_PATH, REPO_CONFIG_FILE};
use check_harness_core::couch;
use check_harness_core::home::get_home_dir;
use check_harness_core::session;
use clap::Args;

use crate::util::settings::{ServiceArgs, resolve};

/// Show the instance configuration a check would receive
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    service: ServiceArgs,

    /// Restrict the instance to one cluster node (v2 only)
    #[arg(long)]
    node: Option<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the config command
pub fn execute(args: ConfigArgs) -> Result<()> {
    let settings = resolve(&args.service, None)?;
    let base_url = settings.base_url();

    let instance = match args.node {
        Some(ref node) => couch::node_instance_config(settings.version, &base_url, node)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Node '{node}' is not part of the v{} environment (known: {})",
                    settings.version,
                    couch::CLUSTER_NODES.join(", ")
                )
            })?,
        None => couch::instance_config(settings.version, &base_url),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&instance.to_json())?);
        return Ok(());
    }

    let home_dir = get_home_dir(&EnvSnapshot::capture())?;
    let global_config_path = home_dir.join(GLOBAL_CONFIG_PATH);
    let descriptor = session::descriptor(&settings);

    println!("Configuration:");
    println!("  version: {}", settings.version);
    println!("  server: {}", instance.server);
    if let Some(ref user) = instance.user {
        println!("  user: {user}");
    }
    if let Some(ref name) = instance.name {
        println!("  name: {name}");
    }
    println!("  project: {}", settings.project);
    println!();
    println!("Files:");
    let compose_status = if descriptor.file.exists() { "(found)" } else { "(not found)" };
    println!("  Compose: {} {compose_status}", descriptor.file.display());
    let global_status = if global_config_path.exists() { "(found)" } else { "(not found)" };
    println!("  Global: {} {global_status}", global_config_path.display());
    println!("  Repo: {REPO_CONFIG_FILE} (searched up to git root)");

    Ok(())
}
