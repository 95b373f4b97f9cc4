//! Fixture command implementation

use anyhow::{Result, bail};
use check_harness_core::config::default_testdata_dir;
use check_harness_core::couch;
use check_harness_core::fixtures::FixtureStore;
use clap::Args;
use std::path::PathBuf;

/// Print a fixture payload
#[derive(Args, Debug)]
pub struct FixtureArgs {
    /// Fixture name, with or without the `.json` extension
    name: Option<String>,

    /// List available fixtures instead
    #[arg(long, conflicts_with = "name")]
    list: bool,

    /// Testdata root (defaults to the data shipped with the harness)
    #[arg(long, value_name = "DIR")]
    testdata: Option<PathBuf>,
}

/// Execute the fixture command
pub fn execute(args: FixtureArgs) -> Result<()> {
    let testdata = args.testdata.unwrap_or_else(default_testdata_dir);
    let store = FixtureStore::new(couch::fixtures_dir(&testdata));

    if args.list {
        for name in store.list()? {
            println!("{name}");
        }
        return Ok(());
    }

    let Some(name) = args.name else {
        bail!("Specify a fixture name or --list");
    };
    let file_name = if name.ends_with(".json") {
        name
    } else {
        format!("{name}.json")
    };

    let payload = store.load_json(&file_name)?;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
