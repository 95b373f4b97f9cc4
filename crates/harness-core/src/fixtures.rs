//! JSON fixture loading
//!
//! Fixtures are read from disk on every call. Each call hands back a new
//! owned `serde_json::Value`, so tests may mutate what they get.

use crate::error::{HarnessError, Result};
use std::path::{Path, PathBuf};

/// Raw `/_active_tasks` response
pub const ACTIVE_TASKS: &str = "_active_tasks.json";

/// Directory of JSON fixture files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureStore {
    dir: PathBuf,
}

impl FixtureStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load and parse `<dir>/<name>`
    pub fn load_json(&self, name: &str) -> Result<serde_json::Value> {
        let path = self.dir.join(name);
        let contents = std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                HarnessError::FixtureNotFound { path: path.clone() }
            } else {
                HarnessError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;
        serde_json::from_str(&contents).map_err(|source| HarnessError::FixtureParse { path, source })
    }

    /// Raw response from `/_active_tasks`
    pub fn active_tasks(&self) -> Result<serde_json::Value> {
        self.load_json(ACTIVE_TASKS)
    }

    /// Names of the `.json` fixtures in the store, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| HarnessError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| path.file_name().and_then(|n| n.to_str()).map(String::from))
            .collect();
        names.sort();
        Ok(names)
    }
}
