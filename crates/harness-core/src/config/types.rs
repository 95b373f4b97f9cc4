//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete harness configuration as read from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// How to reach the monitored service
    pub service: ServiceConfig,
    /// Environment startup behavior
    pub bootstrap: BootstrapConfig,
    /// Data seeding behavior
    pub seed: SeedConfig,
    /// Filesystem locations
    pub paths: PathsConfig,
}

/// Monitored service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service version string; only the leading digit selects the variant
    pub version: String,
    /// Host the service is published on
    pub host: String,
    /// Host port the service is published on
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            version: "2".to_string(),
            host: "localhost".to_string(),
            port: 5984,
        }
    }
}

/// Bootstrap configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Overall deadline for all readiness conditions
    pub timeout_secs: u64,
    /// Pause after seeding so node statistics can accumulate
    pub settle_secs: u64,
    /// Compose project name
    pub project: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            settle_secs: 20,
            project: "check-harness-couch".to_string(),
        }
    }
}

/// Seeding configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Maximum stats polling attempts
    pub max_attempts: u32,
    /// Pause between polling attempts in milliseconds
    pub interval_ms: u64,
    /// Fail instead of warning when stats never become ready
    pub strict: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            max_attempts: 120,
            interval_ms: 1000,
            strict: false,
        }
    }
}

/// Path configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding `<service>/compose` and `<service>/fixtures`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub testdata_dir: Option<PathBuf>,
}
