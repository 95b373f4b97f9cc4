//! Docker Compose invocation

use crate::error::{HarnessError, Result};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// What to start: a compose file, its project name, and the variables it
/// interpolates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeDescriptor {
    pub file: PathBuf,
    pub project: String,
    pub env: Vec<(String, String)>,
}

impl ComposeDescriptor {
    pub fn new(file: impl Into<PathBuf>, project: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            project: project.into(),
            env: Vec::new(),
        }
    }

    /// Add variables passed to `docker compose`
    pub fn with_env(mut self, env: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env.extend(env);
        self
    }
}

/// Starts and stops a compose environment
pub trait ComposeRunner {
    /// Start every service in the background
    fn up(&self, descriptor: &ComposeDescriptor) -> Result<()>;

    /// Stop and remove every service, volume, and orphan
    fn down(&self, descriptor: &ComposeDescriptor) -> Result<()>;
}

/// Runs the `docker compose` CLI
#[derive(Debug, Clone, Default)]
pub struct DockerCompose;

impl DockerCompose {
    /// Whether a Docker daemon answers `docker info`
    pub fn is_available() -> bool {
        Command::new("docker")
            .args(["info", "--format", "{{.ServerVersion}}"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn run(&self, action: &str, descriptor: &ComposeDescriptor, extra: &[&str]) -> Result<()> {
        let file = descriptor.file.to_string_lossy().to_string();
        let mut args = vec![
            "compose",
            "-f",
            file.as_str(),
            "-p",
            descriptor.project.as_str(),
            action,
        ];
        args.extend_from_slice(extra);
        debug!("docker {}", args.join(" "));

        let output = Command::new("docker")
            .args(&args)
            .envs(descriptor.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .output()
            .map_err(|e| {
                let message = if e.kind() == std::io::ErrorKind::NotFound {
                    "docker CLI not found. Install from https://docs.docker.com/get-docker/"
                        .to_string()
                } else {
                    format!("failed to execute docker: {e}")
                };
                HarnessError::Compose {
                    action: action.to_string(),
                    message,
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HarnessError::Compose {
                action: action.to_string(),
                message: stderr.trim().to_string(),
            });
        }

        Ok(())
    }
}

impl ComposeRunner for DockerCompose {
    fn up(&self, descriptor: &ComposeDescriptor) -> Result<()> {
        info!(
            "Starting {} from {}",
            descriptor.project,
            descriptor.file.display()
        );
        self.run("up", descriptor, &["-d"])
    }

    fn down(&self, descriptor: &ComposeDescriptor) -> Result<()> {
        info!("Stopping {}", descriptor.project);
        self.run("down", descriptor, &["--volumes", "--remove-orphans"])
    }
}

/// Compose action seen by [`RecordingRunner`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeAction {
    Up,
    Down,
}

#[derive(Debug, Default)]
struct RecordingState {
    actions: Vec<(ComposeAction, String)>,
    fail_up: bool,
    fail_down: bool,
}

/// Runner that records calls instead of touching Docker.
///
/// Clones share state, so a test can keep a handle after boxing one.
#[derive(Debug, Clone, Default)]
pub struct RecordingRunner {
    state: Arc<Mutex<RecordingState>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `up` fail
    pub fn failing_up(self) -> Self {
        self.lock().fail_up = true;
        self
    }

    /// Make `down` fail
    pub fn failing_down(self) -> Self {
        self.lock().fail_down = true;
        self
    }

    /// Actions so far, with the project they targeted
    pub fn actions(&self) -> Vec<(ComposeAction, String)> {
        self.lock().actions.clone()
    }

    /// Number of `down` calls so far
    pub fn down_count(&self) -> usize {
        self.lock()
            .actions
            .iter()
            .filter(|(action, _)| *action == ComposeAction::Down)
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RecordingState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ComposeRunner for RecordingRunner {
    fn up(&self, descriptor: &ComposeDescriptor) -> Result<()> {
        let mut state = self.lock();
        state
            .actions
            .push((ComposeAction::Up, descriptor.project.clone()));
        if state.fail_up {
            return Err(HarnessError::Compose {
                action: "up".to_string(),
                message: "simulated failure".to_string(),
            });
        }
        Ok(())
    }

    fn down(&self, descriptor: &ComposeDescriptor) -> Result<()> {
        let mut state = self.lock();
        state
            .actions
            .push((ComposeAction::Down, descriptor.project.clone()));
        if state.fail_down {
            return Err(HarnessError::Compose {
                action: "down".to_string(),
                message: "simulated failure".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_env() {
        let descriptor = ComposeDescriptor::new("/c/compose_v2.yaml", "proj")
            .with_env(vec![("COUCH_PORT".to_string(), "5984".to_string())]);
        assert_eq!(descriptor.env.len(), 1);
        assert_eq!(descriptor.project, "proj");
    }

    #[test]
    fn test_recording_runner_shares_state() {
        let runner = RecordingRunner::new();
        let handle = runner.clone();
        let descriptor = ComposeDescriptor::new("/c/x.yaml", "proj");

        runner.up(&descriptor).unwrap();
        runner.down(&descriptor).unwrap();

        assert_eq!(
            handle.actions(),
            vec![
                (ComposeAction::Up, "proj".to_string()),
                (ComposeAction::Down, "proj".to_string()),
            ]
        );
    }

    #[test]
    fn test_recording_runner_failures() {
        let runner = RecordingRunner::new().failing_up();
        let descriptor = ComposeDescriptor::new("/c/x.yaml", "proj");
        assert!(matches!(
            runner.up(&descriptor),
            Err(HarnessError::Compose { .. })
        ));
        assert!(runner.down(&descriptor).is_ok());
    }
}
