//! Host operating system

use serde::{Deserialize, Serialize};
use std::fmt;

/// OS family a gate can decide on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    MacOS,
    Linux,
    Windows,
}

impl Platform {
    /// OS this binary was built for
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` name. Other Unix flavors count as Linux.
    pub fn from_os(os: &str) -> Self {
        match os {
            "macos" => Platform::MacOS,
            "windows" => Platform::Windows,
            "linux" => Platform::Linux,
            other => {
                tracing::warn!("Unrecognized OS '{other}', gating as linux");
                Platform::Linux
            }
        }
    }

    pub fn is_windows(self) -> bool {
        self == Platform::Windows
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Platform::MacOS => "macos",
            Platform::Linux => "linux",
            Platform::Windows => "windows",
        })
    }
}
