//! Configuration discovery and resolution

use super::env::EnvSnapshot;
use super::settings::HarnessSettings;
use super::types::HarnessConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Repo-local config file name
pub const REPO_CONFIG_FILE: &str = ".harness.toml";

/// Global config path relative to the home directory
pub const GLOBAL_CONFIG_PATH: &str = ".config/check-harness/config.toml";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("TOML parsing error in {path}: {source}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A value was present but unusable
    #[error("Invalid value for {key}: '{value}' ({message})")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },

    /// Explicitly requested config file does not exist
    #[error("Configuration not found: {path}")]
    NotFound { path: PathBuf },
}

/// Command-line overrides for configuration
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Override service version
    pub version: Option<String>,
    /// Override service host
    pub host: Option<String>,
    /// Override service port
    pub port: Option<u16>,
    /// Override strict seeding
    pub strict: Option<bool>,
    /// Path to an explicit config file, layered above repo and global files
    pub config_path: Option<PathBuf>,
}

/// Resolve configuration from all sources
///
/// Priority (highest to lowest):
/// 1. Command-line overrides
/// 2. Environment variables (`COUCH_VERSION`, `COUCH_HOST`, `COUCH_PORT`)
/// 3. Explicit config file (`overrides.config_path`)
/// 4. Repo-local config (`.harness.toml` in current dir or up to git root)
/// 5. Global config (`~/.config/check-harness/config.toml`)
/// 6. Defaults
///
/// Files are merged key by key, so a repo file that only sets
/// `service.version` keeps the global file's `service.port`.
pub fn resolve_config(
    overrides: &ConfigOverrides,
    env: &EnvSnapshot,
    current_dir: &Path,
    home_dir: &Path,
) -> Result<HarnessConfig, ConfigError> {
    let mut layered = toml::Table::new();

    // 5. Global config
    let global_config_path = home_dir.join(GLOBAL_CONFIG_PATH);
    if global_config_path.exists() {
        match load_config_table(&global_config_path) {
            Ok(table) => merge_tables(&mut layered, table),
            Err(e) => warn!("Skipping global config: {e}"),
        }
    }

    // 4. Repo-local config
    if let Some(repo_config) = find_repo_local_config(current_dir) {
        match load_config_table(&repo_config) {
            Ok(table) => merge_tables(&mut layered, table),
            Err(e) => warn!("Skipping repo config: {e}"),
        }
    }

    // 3. Explicit config file must exist and parse
    if let Some(ref path) = overrides.config_path {
        if !path.exists() {
            return Err(ConfigError::NotFound { path: path.clone() });
        }
        merge_tables(&mut layered, load_config_table(path)?);
    }

    let mut config: HarnessConfig =
        toml::Value::Table(layered)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::InvalidValue {
                key: "<merged config>".to_string(),
                value: String::new(),
                message: e.to_string(),
            })?;

    // 2. Environment
    apply_env_overrides(&mut config, env)?;

    // 1. Command line
    apply_cli_overrides(&mut config, overrides);

    Ok(config)
}

/// Resolve configuration and convert it into typed settings
pub fn resolve_settings(
    overrides: &ConfigOverrides,
    env: &EnvSnapshot,
    current_dir: &Path,
    home_dir: &Path,
) -> crate::Result<HarnessSettings> {
    let config = resolve_config(overrides, env, current_dir, home_dir)?;
    HarnessSettings::from_config(&config, current_dir)
}

/// Find repo-local config file
///
/// Searches current directory and parent directories up to git root
fn find_repo_local_config(current_dir: &Path) -> Option<PathBuf> {
    let mut dir = current_dir;

    loop {
        let config_path = dir.join(REPO_CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        // Stop at git root
        if dir.join(".git").exists() {
            break;
        }

        dir = dir.parent()?;
    }

    None
}

/// Load a config file as a raw table after checking it deserializes
fn load_config_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str::<HarnessConfig>(&contents).map_err(|source| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source,
    })?;
    let table = contents
        .parse::<toml::Table>()
        .map_err(|source| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("Loaded config layer from {}", path.display());
    Ok(table)
}

/// Recursively merge `overlay` into `base`; overlay wins on conflicts
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        if let toml::Value::Table(incoming) = value {
            if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, incoming);
                continue;
            }
            base.insert(key, toml::Value::Table(incoming));
        } else {
            base.insert(key, value);
        }
    }
}

/// Apply environment variable overrides
fn apply_env_overrides(config: &mut HarnessConfig, env: &EnvSnapshot) -> Result<(), ConfigError> {
    if let Some(version) = env.get("COUCH_VERSION") {
        config.service.version = version.to_string();
    }

    if let Some(host) = env.get("COUCH_HOST") {
        config.service.host = host.to_string();
    }

    if let Some(port) = env.get("COUCH_PORT") {
        config.service.port = port.parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::InvalidValue {
                key: "COUCH_PORT".to_string(),
                value: port.to_string(),
                message: e.to_string(),
            }
        })?;
    }

    Ok(())
}

/// Apply command-line overrides
fn apply_cli_overrides(config: &mut HarnessConfig, overrides: &ConfigOverrides) {
    if let Some(ref version) = overrides.version {
        config.service.version = version.clone();
    }

    if let Some(ref host) = overrides.host {
        config.service.host = host.clone();
    }

    if let Some(port) = overrides.port {
        config.service.port = port;
    }

    if let Some(strict) = overrides.strict {
        config.seed.strict = strict;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_config_defaults() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();

        let config = resolve_config(
            &ConfigOverrides::default(),
            &EnvSnapshot::default(),
            temp.path(),
            temp.path(),
        )
        .unwrap();

        assert_eq!(config, HarnessConfig::default());
    }

    #[test]
    fn test_repo_config_merges_over_global_per_key() {
        let home = TempDir::new().unwrap();
        let repo = TempDir::new().unwrap();
        fs::create_dir(repo.path().join(".git")).unwrap();

        write(
            &home.path().join(GLOBAL_CONFIG_PATH),
            "[service]\nport = 15984\nhost = \"couch.internal\"\n",
        );
        write(
            &repo.path().join(REPO_CONFIG_FILE),
            "[service]\nversion = \"1.6\"\n",
        );

        let config = resolve_config(
            &ConfigOverrides::default(),
            &EnvSnapshot::default(),
            repo.path(),
            home.path(),
        )
        .unwrap();

        assert_eq!(config.service.version, "1.6");
        assert_eq!(config.service.port, 15984);
        assert_eq!(config.service.host, "couch.internal");
    }

    #[test]
    fn test_repo_config_found_in_parent_directory() {
        let repo = TempDir::new().unwrap();
        fs::create_dir(repo.path().join(".git")).unwrap();
        write(
            &repo.path().join(REPO_CONFIG_FILE),
            "[seed]\nmax_attempts = 5\n",
        );
        let nested = repo.path().join("crates/inner");
        fs::create_dir_all(&nested).unwrap();

        let config = resolve_config(
            &ConfigOverrides::default(),
            &EnvSnapshot::default(),
            &nested,
            repo.path(),
        )
        .unwrap();

        assert_eq!(config.seed.max_attempts, 5);
    }

    #[test]
    fn test_unparseable_repo_config_is_skipped() {
        let repo = TempDir::new().unwrap();
        fs::create_dir(repo.path().join(".git")).unwrap();
        write(
            &repo.path().join(REPO_CONFIG_FILE),
            "[service]\nport = \"not a port\"\n",
        );

        let config = resolve_config(
            &ConfigOverrides::default(),
            &EnvSnapshot::default(),
            repo.path(),
            repo.path(),
        )
        .unwrap();

        assert_eq!(config.service.port, 5984);
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        let overrides = ConfigOverrides {
            config_path: Some(temp.path().join("missing.toml")),
            ..Default::default()
        };

        let err = resolve_config(&overrides, &EnvSnapshot::default(), temp.path(), temp.path())
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_env_overrides_files() {
        let repo = TempDir::new().unwrap();
        fs::create_dir(repo.path().join(".git")).unwrap();
        write(
            &repo.path().join(REPO_CONFIG_FILE),
            "[service]\nversion = \"1\"\nport = 1111\n",
        );
        let env = EnvSnapshot::from_pairs([
            ("COUCH_VERSION", "2.3.1"),
            ("COUCH_PORT", "2222"),
            ("COUCH_HOST", "10.0.0.5"),
        ]);

        let config =
            resolve_config(&ConfigOverrides::default(), &env, repo.path(), repo.path()).unwrap();

        assert_eq!(config.service.version, "2.3.1");
        assert_eq!(config.service.port, 2222);
        assert_eq!(config.service.host, "10.0.0.5");
    }

    #[test]
    fn test_invalid_port_in_env_is_an_error() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        let env = EnvSnapshot::from_pairs([("COUCH_PORT", "59840000")]);

        let err = resolve_config(&ConfigOverrides::default(), &env, temp.path(), temp.path())
            .unwrap_err();
        match err {
            ConfigError::InvalidValue { key, value, .. } => {
                assert_eq!(key, "COUCH_PORT");
                assert_eq!(value, "59840000");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cli_overrides_env() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        let env = EnvSnapshot::from_pairs([("COUCH_VERSION", "1"), ("COUCH_PORT", "2222")]);
        let overrides = ConfigOverrides {
            version: Some("2".to_string()),
            port: Some(3333),
            strict: Some(true),
            ..Default::default()
        };

        let config = resolve_config(&overrides, &env, temp.path(), temp.path()).unwrap();

        assert_eq!(config.service.version, "2");
        assert_eq!(config.service.port, 3333);
        assert!(config.seed.strict);
    }
}
