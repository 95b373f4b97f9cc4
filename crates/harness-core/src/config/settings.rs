//! Typed settings resolved from configuration

use super::discovery::ConfigError;
use super::types::HarnessConfig;
use crate::couch::CouchVersion;
use crate::seed::{RetryPolicy, SeedSettings};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything the harness needs for one run, resolved once and passed
/// explicitly into bootstrap, seeding, and fixture loading.
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessSettings {
    /// Service variant under test
    pub version: CouchVersion,
    /// Host the service is published on
    pub host: String,
    /// Host port the service is published on
    pub port: u16,
    /// Compose project name
    pub project: String,
    /// Deadline for all readiness conditions
    pub bootstrap_timeout: Duration,
    /// Pause after seeding
    pub settle: Duration,
    /// Seeding behavior
    pub seed: SeedSettings,
    /// Root of the shipped compose files and fixtures
    pub testdata_dir: PathBuf,
}

impl HarnessSettings {
    /// Convert a resolved config into settings, validating values.
    ///
    /// A relative `paths.testdata_dir` is resolved against `current_dir`.
    pub fn from_config(config: &HarnessConfig, current_dir: &Path) -> crate::Result<Self> {
        let version = CouchVersion::parse(&config.service.version)?;

        let base = format!("http://{}:{}", config.service.host, config.service.port);
        url::Url::parse(&base).map_err(|e| ConfigError::InvalidValue {
            key: "service.host".to_string(),
            value: config.service.host.clone(),
            message: e.to_string(),
        })?;

        if config.seed.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "seed.max_attempts".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            }
            .into());
        }

        let testdata_dir = match config.paths.testdata_dir {
            Some(ref dir) if dir.is_relative() => current_dir.join(dir),
            Some(ref dir) => dir.clone(),
            None => default_testdata_dir(),
        };

        Ok(Self {
            version,
            host: config.service.host.clone(),
            port: config.service.port,
            project: config.bootstrap.project.clone(),
            bootstrap_timeout: Duration::from_secs(config.bootstrap.timeout_secs),
            settle: Duration::from_secs(config.bootstrap.settle_secs),
            seed: SeedSettings {
                policy: RetryPolicy {
                    max_attempts: config.seed.max_attempts,
                    interval: Duration::from_millis(config.seed.interval_ms),
                },
                strict: config.seed.strict,
            },
            testdata_dir,
        })
    }

    /// Base URL of the service, without a trailing slash
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Variables passed to `docker compose`
    pub fn compose_env(&self) -> Vec<(String, String)> {
        vec![
            ("COUCH_PORT".to_string(), self.port.to_string()),
            ("COUCH_VERSION".to_string(), self.version.major().to_string()),
        ]
    }
}

/// Testdata shipped with this crate
pub fn default_testdata_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}
