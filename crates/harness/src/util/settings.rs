//! Settings resolution helpers

use anyhow::{Context, Result};
use check_harness_core::config::{ConfigOverrides, EnvSnapshot, HarnessSettings, resolve_settings};
use check_harness_core::home::get_home_dir;
use clap::Args;
use std::path::PathBuf;

/// Flags shared by every command that talks to the service
#[derive(Args, Debug, Clone, Default)]
pub struct ServiceArgs {
    /// Service version (e.g. 1, 2, 2.3.1); overrides COUCH_VERSION
    #[arg(long = "version", value_name = "VERSION")]
    pub version: Option<String>,

    /// Host the service is published on; overrides COUCH_HOST
    #[arg(long)]
    pub host: Option<String>,

    /// Host port the service is published on; overrides COUCH_PORT
    #[arg(long)]
    pub port: Option<u16>,

    /// Explicit config file, layered above repo and global config
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl ServiceArgs {
    fn overrides(&self, strict: Option<bool>) -> ConfigOverrides {
        ConfigOverrides {
            version: self.version.clone(),
            host: self.host.clone(),
            port: self.port,
            strict,
            config_path: self.config.clone(),
        }
    }
}

/// Resolve settings from flags, the process environment and config files
pub fn resolve(args: &ServiceArgs, strict: Option<bool>) -> Result<HarnessSettings> {
    let env = EnvSnapshot::capture();
    let home_dir = get_home_dir(&env)?;
    let current_dir = std::env::current_dir().context("Could not determine current directory")?;

    let settings = resolve_settings(&args.overrides(strict), &env, &current_dir, &home_dir)?;
    Ok(settings)
}
