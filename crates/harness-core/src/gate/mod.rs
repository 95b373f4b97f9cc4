//! Platform gates
//!
//! Decide whether a test may run on the current host. A gate looks at a
//! [`HostIdentity`] (OS, CI provider, Docker availability) and answers
//! [`GateDecision::Run`] or [`GateDecision::Skip`] with the reason to print.
//!
//! ```
//! use check_harness_core::gate::{CiProvider, Gate, GateDecision, HostIdentity, Platform};
//!
//! let appveyor = HostIdentity::new(Platform::Windows, CiProvider::AppVeyor, false);
//! assert_eq!(Gate::WindowsCi.evaluate(&appveyor), GateDecision::Run);
//! assert!(!Gate::NotWindowsCi.evaluate(&appveyor).should_run());
//! ```

mod platform;

pub use platform::Platform;

use crate::bootstrap::DockerCompose;
use crate::config::EnvSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Overrides Docker detection when set (`true`/`false`)
pub const DOCKER_ENV: &str = "HARNESS_DOCKER";

/// CI service the process runs under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CiProvider {
    /// AppVeyor, the Windows CI
    AppVeyor,
    GitHubActions,
    /// Azure Pipelines
    Azure,
    /// Some CI that only sets `CI`
    Generic,
    None,
}

impl CiProvider {
    /// Identify the CI provider from well-known variables
    pub fn from_env(env: &EnvSnapshot) -> Self {
        if env.is_truthy("APPVEYOR") {
            CiProvider::AppVeyor
        } else if env.is_truthy("GITHUB_ACTIONS") {
            CiProvider::GitHubActions
        } else if env.is_truthy("TF_BUILD") {
            CiProvider::Azure
        } else if env.is_truthy("CI") {
            CiProvider::Generic
        } else {
            CiProvider::None
        }
    }
}

/// Facts about the host that gates decide on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostIdentity {
    pub platform: Platform,
    pub ci: CiProvider,
    pub docker_available: bool,
}

impl HostIdentity {
    pub fn new(platform: Platform, ci: CiProvider, docker_available: bool) -> Self {
        Self {
            platform,
            ci,
            docker_available,
        }
    }

    /// Identify this host. Docker is probed with `docker info` unless
    /// `HARNESS_DOCKER` is set.
    pub fn detect(env: &EnvSnapshot) -> Self {
        let docker_available = match env.get(DOCKER_ENV) {
            Some(_) => env.is_truthy(DOCKER_ENV),
            None => DockerCompose::is_available(),
        };
        Self::new(Platform::detect(), CiProvider::from_env(env), docker_available)
    }

    /// Running on the Windows CI
    pub fn is_windows_ci(&self) -> bool {
        self.ci == CiProvider::AppVeyor
    }
}

/// Run-or-skip answer for one test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Run,
    Skip { reason: String },
}

impl GateDecision {
    pub fn should_run(&self) -> bool {
        matches!(self, GateDecision::Run)
    }
}

/// Named host predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    /// Only on the Windows CI
    WindowsCi,
    /// Anywhere except the Windows CI
    NotWindowsCi,
    /// Only where a Docker daemon is reachable
    Docker,
}

impl Gate {
    pub const ALL: [Gate; 3] = [Gate::WindowsCi, Gate::NotWindowsCi, Gate::Docker];

    /// Message attached when the gate skips
    pub fn reason(self) -> &'static str {
        match self {
            Gate::WindowsCi => "Test can only be run on Windows CI",
            Gate::NotWindowsCi => "Test cannot be run on Windows CI",
            Gate::Docker => "Test requires a running Docker daemon",
        }
    }

    /// Whether the test may run on `host`
    pub fn allows(self, host: &HostIdentity) -> bool {
        match self {
            Gate::WindowsCi => host.is_windows_ci(),
            Gate::NotWindowsCi => !host.is_windows_ci(),
            Gate::Docker => host.docker_available,
        }
    }

    pub fn evaluate(self, host: &HostIdentity) -> GateDecision {
        if self.allows(host) {
            GateDecision::Run
        } else {
            GateDecision::Skip {
                reason: self.reason().to_string(),
            }
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Gate::WindowsCi => "windows-ci",
            Gate::NotWindowsCi => "not-windows-ci",
            Gate::Docker => "docker",
        };
        f.write_str(name)
    }
}

impl FromStr for Gate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gate::ALL
            .into_iter()
            .find(|gate| gate.to_string() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| {
                let known: Vec<String> = Gate::ALL.iter().map(|g| g.to_string()).collect();
                format!("unknown gate '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

/// Return early from a `#[test]` when a gate skips, printing the reason.
///
/// With one argument the host is detected from the process environment.
///
/// ```
/// use check_harness_core::gate::{CiProvider, Gate, HostIdentity, Platform};
/// use check_harness_core::skip_unless;
///
/// fn windows_only() -> bool {
///     let host = HostIdentity::new(Platform::Linux, CiProvider::None, false);
///     skip_unless!(Gate::WindowsCi, &host);
///     true
/// }
/// assert!(!windows_only());
/// ```
#[macro_export]
macro_rules! skip_unless {
    ($gate:expr) => {
        $crate::skip_unless!(
            $gate,
            &$crate::gate::HostIdentity::detect(&$crate::config::EnvSnapshot::capture())
        )
    };
    ($gate:expr, $host:expr) => {
        if let $crate::gate::GateDecision::Skip { reason } = $gate.evaluate($host) {
            eprintln!("skipped: {reason}");
            return Default::default();
        }
    };
}
