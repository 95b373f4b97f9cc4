//! Home directory resolution
//!
//! The global config file lives under the home directory. Tests and CI
//! sandboxes point `HARNESS_HOME` at a scratch directory so a developer's
//! own `~/.config/check-harness/config.toml` never leaks into a run.
//!
//! # Precedence
//!
//! 1. `HARNESS_HOME` (if set and non-empty)
//! 2. `dirs::home_dir()` platform default

use crate::config::EnvSnapshot;
use crate::error::{HarnessError, Result};
use std::path::PathBuf;

/// Environment variable overriding the home directory
pub const HOME_ENV: &str = "HARNESS_HOME";

/// Get the home directory used for global configuration
///
/// # Errors
///
/// Returns an error if `HARNESS_HOME` is unset and the platform home
/// directory cannot be determined.
pub fn get_home_dir(env: &EnvSnapshot) -> Result<PathBuf> {
    if let Some(home) = env.get(HOME_ENV) {
        return Ok(PathBuf::from(home));
    }

    dirs::home_dir().ok_or_else(|| HarnessError::Io {
        path: PathBuf::from("~"),
        source: std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ),
    })
}
