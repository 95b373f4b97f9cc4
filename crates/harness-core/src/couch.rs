//! CouchDB test profile
//!
//! Static data for the CouchDB check environment: which compose file to use
//! per major version, which instance configuration a check receives, and
//! what sample data gets seeded.
//!
//! Version 1 runs a single unauthenticated node. Version 2 runs a
//! three-node cluster behind admin credentials.

use crate::config::HarnessSettings;
use crate::error::{HarnessError, Result};
use crate::instance::{Credentials, InstanceConfig};
use crate::seed::{SeedPlan, SeedRequest};
use serde_json::json;
use std::fmt;
use std::path::{Path, PathBuf};

/// Check name the instances are built for
pub const CHECK_NAME: &str = "couch";

/// Admin user created by the v2 compose file
pub const USER: &str = "dduser";

/// Admin password created by the v2 compose file
pub const PASSWORD: &str = "pawprint";

/// Database created by seeding
pub const DATABASE: &str = "kennel";

/// Design document created by seeding
pub const DESIGN_DOC: &str = "_design/dummy";

/// Cluster nodes started by the v2 compose file
pub const CLUSTER_NODES: [&str; 3] = ["node1@127.0.0.1", "node2@127.0.0.1", "node3@127.0.0.1"];

/// Supported CouchDB major versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CouchVersion {
    V1,
    V2,
}

impl CouchVersion {
    /// Every supported version
    pub const ALL: [CouchVersion; 2] = [CouchVersion::V1, CouchVersion::V2];

    /// Parse from a version string; only the first character matters,
    /// so `"2"`, `"2.3.1"` and `"2-latest"` all select `V2`.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().chars().next() {
            Some('1') => Ok(CouchVersion::V1),
            Some('2') => Ok(CouchVersion::V2),
            _ => Err(HarnessError::UnsupportedVersion {
                version: raw.to_string(),
            }),
        }
    }

    /// Major version number
    pub fn major(self) -> u8 {
        match self {
            CouchVersion::V1 => 1,
            CouchVersion::V2 => 2,
        }
    }

    /// Credentials the environment is set up with, if any
    pub fn credentials(self) -> Option<Credentials> {
        match self {
            CouchVersion::V1 => None,
            CouchVersion::V2 => Some(Credentials {
                user: USER.to_string(),
                password: PASSWORD.to_string(),
            }),
        }
    }
}

impl fmt::Display for CouchVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major())
    }
}

/// Instance configuration for `version` reachable at `base_url`
pub fn instance_config(version: CouchVersion, base_url: &str) -> InstanceConfig {
    let instance = InstanceConfig::new(base_url);
    match version.credentials() {
        Some(creds) => instance.with_credentials(&creds),
        None => instance,
    }
}

/// Parse a version string and select its instance configuration
pub fn select_instance(version: &str, base_url: &str) -> Result<InstanceConfig> {
    Ok(instance_config(CouchVersion::parse(version)?, base_url))
}

/// Instance restricted to one cluster node; `None` for v1 or unknown nodes
pub fn node_instance_config(
    version: CouchVersion,
    base_url: &str,
    node: &str,
) -> Option<InstanceConfig> {
    if version != CouchVersion::V2 || !CLUSTER_NODES.contains(&node) {
        return None;
    }
    Some(instance_config(version, base_url).with_name(node))
}

/// Root of the CouchDB testdata
pub fn testdata_root(testdata_dir: &Path) -> PathBuf {
    testdata_dir.join(CHECK_NAME)
}

/// Compose descriptor for `version`
pub fn compose_file(version: CouchVersion, testdata_dir: &Path) -> PathBuf {
    testdata_root(testdata_dir)
        .join("compose")
        .join(format!("compose_v{}.yaml", version.major()))
}

/// Directory holding CouchDB JSON fixtures
pub fn fixtures_dir(testdata_dir: &Path) -> PathBuf {
    testdata_root(testdata_dir).join("fixtures")
}

/// Statistics endpoints that must report data before tests run
pub fn stats_urls(version: CouchVersion, base_url: &str) -> Vec<String> {
    match version {
        CouchVersion::V1 => vec![format!("{base_url}/_stats")],
        CouchVersion::V2 => CLUSTER_NODES
            .iter()
            .map(|node| format!("{base_url}/_node/{node}/_stats"))
            .collect(),
    }
}

/// View definitions seeded into the design document
pub fn design_document() -> serde_json::Value {
    json!({
        "language": "javascript",
        "views": {
            "all": {"map": "function(doc) { emit(doc._id); }"},
            "by_data": {"map": "function(doc) { emit(doc.data, doc); }"},
        },
    })
}

/// Seeding plan for the configured environment
pub fn seed_plan(settings: &HarnessSettings) -> SeedPlan {
    let base_url = settings.base_url();
    SeedPlan {
        requests: vec![
            SeedRequest {
                url: format!("{base_url}/{DATABASE}"),
                body: None,
            },
            SeedRequest {
                url: format!("{base_url}/{DATABASE}/{DESIGN_DOC}"),
                body: Some(design_document()),
            },
        ],
        stats_urls: stats_urls(settings.version, &base_url),
        credentials: settings.version.credentials(),
    }
}
