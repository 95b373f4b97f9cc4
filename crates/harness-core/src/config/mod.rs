//! Configuration resolution
//!
//! Resolves configuration from multiple sources with priority:
//! 1. Command-line flags (passed as parameters)
//! 2. Environment variables (from an [`EnvSnapshot`])
//! 3. Explicit config file
//! 4. Repo-local config (.harness.toml)
//! 5. Global config (~/.config/check-harness/config.toml)
//! 6. Defaults

mod discovery;
mod env;
mod settings;
mod types;

pub use discovery::{
    resolve_config, resolve_settings, ConfigError, ConfigOverrides, GLOBAL_CONFIG_PATH,
    REPO_CONFIG_FILE,
};
pub use env::EnvSnapshot;
pub use settings::{default_testdata_dir, HarnessSettings};
pub use types::{BootstrapConfig, HarnessConfig, PathsConfig, SeedConfig, ServiceConfig};
