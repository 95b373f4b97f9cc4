//! Scoped environment lifecycle

use super::compose::{ComposeDescriptor, ComposeRunner};
use super::conditions::ReadinessCondition;
use crate::error::{HarnessError, Result};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Starts an environment and waits for its readiness conditions
pub struct Bootstrapper {
    runner: Box<dyn ComposeRunner>,
    timeout: Duration,
}

impl Bootstrapper {
    pub fn new(runner: Box<dyn ComposeRunner>, timeout: Duration) -> Self {
        Self { runner, timeout }
    }

    /// Start `descriptor` and evaluate `conditions` in order.
    ///
    /// The returned [`Environment`] tears the services down when dropped.
    /// If startup or any condition fails, teardown happens before the error
    /// is returned.
    pub fn start<'c>(
        self,
        descriptor: ComposeDescriptor,
        conditions: Vec<Box<dyn ReadinessCondition + 'c>>,
    ) -> Result<Environment> {
        if !descriptor.file.exists() {
            return Err(HarnessError::ComposeFileMissing {
                path: descriptor.file.clone(),
            });
        }

        let started = Instant::now();
        let deadline = started + self.timeout;

        // Built before `up` so every early return below tears down.
        let environment = Environment {
            runner: self.runner,
            descriptor,
            active: true,
        };

        environment.runner.up(&environment.descriptor)?;

        for mut condition in conditions {
            let name = condition.name();
            if Instant::now() >= deadline {
                return Err(HarnessError::BootstrapTimeout {
                    condition: name,
                    elapsed_secs: started.elapsed().as_secs(),
                });
            }
            info!("Waiting on {name}");
            condition.check(deadline)?;
        }

        info!(
            "Environment {} ready after {}s",
            environment.descriptor.project,
            started.elapsed().as_secs()
        );
        Ok(environment)
    }
}

/// Handle to a running environment.
///
/// Dropping the handle runs `docker compose down`; teardown errors are
/// logged, never raised. Use [`Environment::stop`] to observe them, or
/// [`Environment::detach`] to leave the services running.
pub struct Environment {
    runner: Box<dyn ComposeRunner>,
    descriptor: ComposeDescriptor,
    active: bool,
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("descriptor", &self.descriptor)
            .field("active", &self.active)
            .finish()
    }
}

impl Environment {
    pub fn descriptor(&self) -> &ComposeDescriptor {
        &self.descriptor
    }

    /// Tear down now and report the result
    pub fn stop(mut self) -> Result<()> {
        self.active = false;
        self.runner.down(&self.descriptor)
    }

    /// Give up ownership without tearing down
    pub fn detach(mut self) -> ComposeDescriptor {
        self.active = false;
        info!(
            "Leaving {} running; stop it with `docker compose -p {} down`",
            self.descriptor.project, self.descriptor.project
        );
        self.descriptor.clone()
    }
}

impl Drop for Environment {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Err(e) = self.runner.down(&self.descriptor) {
            warn!("Teardown of {} failed: {e}", self.descriptor.project);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::compose::{ComposeAction, RecordingRunner};
    use super::super::conditions::FnCondition;
    use super::*;
    use std::cell::Cell;
    use tempfile::NamedTempFile;

    fn descriptor(file: &NamedTempFile) -> ComposeDescriptor {
        ComposeDescriptor::new(file.path(), "test-proj")
    }

    #[test]
    fn test_missing_compose_file_runs_nothing() {
        let runner = RecordingRunner::new();
        let bootstrapper = Bootstrapper::new(Box::new(runner.clone()), Duration::from_secs(5));

        let err = bootstrapper
            .start(ComposeDescriptor::new("/definitely/not/here.yaml", "p"), vec![])
            .unwrap_err();

        assert!(matches!(err, HarnessError::ComposeFileMissing { .. }));
        assert!(runner.actions().is_empty());
    }

    #[test]
    fn test_conditions_run_in_order_then_teardown_on_drop() {
        let file = NamedTempFile::new().unwrap();
        let runner = RecordingRunner::new();
        let order = std::cell::RefCell::new(Vec::new());

        let env = Bootstrapper::new(Box::new(runner.clone()), Duration::from_secs(5))
            .start(
                descriptor(&file),
                vec![
                    Box::new(FnCondition::new("first", |_| {
                        order.borrow_mut().push("first");
                        Ok(())
                    })),
                    Box::new(FnCondition::new("second", |_| {
                        order.borrow_mut().push("second");
                        Ok(())
                    })),
                ],
            )
            .unwrap();

        assert_eq!(*order.borrow(), vec!["first", "second"]);
        assert_eq!(runner.down_count(), 0);

        drop(env);
        assert_eq!(
            runner.actions(),
            vec![
                (ComposeAction::Up, "test-proj".to_string()),
                (ComposeAction::Down, "test-proj".to_string()),
            ]
        );
    }

    #[test]
    fn test_failed_condition_tears_down_once() {
        let file = NamedTempFile::new().unwrap();
        let runner = RecordingRunner::new();
        let later = Cell::new(false);

        let err = Bootstrapper::new(Box::new(runner.clone()), Duration::from_secs(5))
            .start(
                descriptor(&file),
                vec![
                    Box::new(FnCondition::new("broken", |_| {
                        Err(HarnessError::ConditionFailed {
                            condition: "broken".to_string(),
                            message: "nope".to_string(),
                        })
                    })),
                    Box::new(FnCondition::new("later", |_| {
                        later.set(true);
                        Ok(())
                    })),
                ],
            )
            .unwrap_err();

        assert!(err.is_setup_failure());
        assert!(!later.get());
        assert_eq!(runner.down_count(), 1);
    }

    #[test]
    fn test_failed_up_still_tears_down() {
        let file = NamedTempFile::new().unwrap();
        let runner = RecordingRunner::new().failing_up();

        let err = Bootstrapper::new(Box::new(runner.clone()), Duration::from_secs(5))
            .start(descriptor(&file), vec![])
            .unwrap_err();

        assert!(matches!(err, HarnessError::Compose { .. }));
        assert_eq!(runner.down_count(), 1);
    }

    #[test]
    fn test_expired_deadline_is_timeout() {
        let file = NamedTempFile::new().unwrap();
        let runner = RecordingRunner::new();

        let err = Bootstrapper::new(Box::new(runner.clone()), Duration::ZERO)
            .start(
                descriptor(&file),
                vec![Box::new(FnCondition::new("never", |_| Ok(())))],
            )
            .unwrap_err();

        assert!(matches!(err, HarnessError::BootstrapTimeout { .. }));
        assert_eq!(runner.down_count(), 1);
    }

    #[test]
    fn test_seeding_never_outlives_the_timeout() {
        use super::super::conditions::SeedCondition;
        use crate::seed::mock::MockTransport;
        use crate::seed::{RetryPolicy, SeedPlan, SeedSettings};

        let file = NamedTempFile::new().unwrap();
        let runner = RecordingRunner::new();
        let mock = MockTransport::new();
        let settings = SeedSettings {
            policy: RetryPolicy {
                max_attempts: 5,
                interval: Duration::from_millis(200),
            },
            strict: false,
        };
        let plan = SeedPlan {
            requests: vec![],
            stats_urls: vec!["http://h/_stats".to_string()],
            credentials: None,
        };
        let started = Instant::now();

        let err = Bootstrapper::new(Box::new(runner.clone()), Duration::from_millis(50))
            .start(
                descriptor(&file),
                vec![Box::new(SeedCondition::new(&mock, plan, &settings))],
            )
            .unwrap_err();

        assert!(matches!(err, HarnessError::BootstrapTimeout { .. }));
        assert!(started.elapsed() < Duration::from_millis(400));
        assert_eq!(runner.down_count(), 1);
    }

    #[test]
    fn test_detach_skips_teardown() {
        let file = NamedTempFile::new().unwrap();
        let runner = RecordingRunner::new();

        let env = Bootstrapper::new(Box::new(runner.clone()), Duration::from_secs(5))
            .start(descriptor(&file), vec![])
            .unwrap();
        let descriptor = env.detach();

        assert_eq!(descriptor.project, "test-proj");
        assert_eq!(runner.down_count(), 0);
    }

    #[test]
    fn test_stop_reports_teardown_errors_once() {
        let file = NamedTempFile::new().unwrap();
        let runner = RecordingRunner::new().failing_down();

        let env = Bootstrapper::new(Box::new(runner.clone()), Duration::from_secs(5))
            .start(descriptor(&file), vec![])
            .unwrap();

        assert!(env.stop().is_err());
        assert_eq!(runner.down_count(), 1);
    }
}
