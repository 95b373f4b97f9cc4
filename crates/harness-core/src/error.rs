//! Error types for harness operations

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the harness library
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Errors that can occur while bootstrapping, seeding, or loading fixtures
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Configuration could not be resolved
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Version string does not name a supported service variant
    #[error("Unsupported service version '{version}' (expected a value starting with 1 or 2)")]
    UnsupportedVersion { version: String },

    /// Compose descriptor does not exist on disk
    #[error("Compose file not found: {path}")]
    ComposeFileMissing { path: PathBuf },

    /// `docker compose` failed to run or exited non-zero
    #[error("docker compose {action} failed: {message}")]
    Compose { action: String, message: String },

    /// Readiness conditions did not complete before the bootstrap deadline
    #[error("Environment not ready after {elapsed_secs}s (waiting on {condition})")]
    BootstrapTimeout { condition: String, elapsed_secs: u64 },

    /// A readiness condition gave up
    #[error("Readiness condition '{condition}' failed: {message}")]
    ConditionFailed { condition: String, message: String },

    /// HTTP request could not be built or sent
    #[error("HTTP error: {0}")]
    Transport(#[from] crate::seed::TransportError),

    /// Service rejected our credentials
    #[error("Unauthorized ({status}) on {url}")]
    Unauthorized { url: String, status: u16 },

    /// Seeding request returned an unexpected status
    #[error("Seeding failed on {url}: HTTP {status}")]
    Seed { url: String, status: u16 },

    /// Strict seeding gave up with endpoints still pending
    #[error("Stats endpoints not ready after {attempts} attempts: {}", .pending.join(", "))]
    SeedTimeout { attempts: u32, pending: Vec<String> },

    /// Fixture file does not exist
    #[error("Fixture not found: {path}")]
    FixtureNotFound { path: PathBuf },

    /// Fixture file is not valid JSON
    #[error("Fixture parse error in {path}: {source}")]
    FixtureParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// File I/O error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl HarnessError {
    /// Whether this error came from the setup phase and must abort the session
    pub fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            HarnessError::ComposeFileMissing { .. }
                | HarnessError::Compose { .. }
                | HarnessError::BootstrapTimeout { .. }
                | HarnessError::ConditionFailed { .. }
        )
    }
}
