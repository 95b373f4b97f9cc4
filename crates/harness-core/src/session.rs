//! Test session
//!
//! One call that brings up the CouchDB environment for the configured
//! version, seeds it, lets it settle, and hands back the instance
//! configuration a check would be run with. The environment is torn down
//! when the [`Session`] is dropped.
//!
//! ```no_run
//! use check_harness_core::bootstrap::DockerCompose;
//! use check_harness_core::config::{ConfigOverrides, EnvSnapshot, resolve_settings};
//! use check_harness_core::seed::HttpTransport;
//! use check_harness_core::session::Session;
//!
//! let env = EnvSnapshot::capture();
//! let cwd = std::env::current_dir().unwrap();
//! let home = check_harness_core::home::get_home_dir(&env).unwrap();
//! let settings = resolve_settings(&ConfigOverrides::default(), &env, &cwd, &home).unwrap();
//! let transport = HttpTransport::new(HttpTransport::DEFAULT_TIMEOUT).unwrap();
//!
//! let session = Session::start(&settings, Box::new(DockerCompose), &transport).unwrap();
//! println!("{}", session.instance().to_json());
//! ```

use crate::bootstrap::{
    Bootstrapper, CheckEndpoints, ComposeDescriptor, ComposeRunner, Environment,
    ReadinessCondition, SeedCondition, Settle,
};
use crate::config::HarnessSettings;
use crate::couch;
use crate::error::Result;
use crate::instance::InstanceConfig;
use crate::seed::{SeedReport, SeedTransport};
use std::cell::RefCell;
use tracing::info;

/// Optional session steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Seed data and settle after the service answers
    pub seed: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self { seed: true }
    }
}

/// A running, seeded environment plus the instance pointing at it
#[derive(Debug)]
pub struct Session {
    instance: InstanceConfig,
    seed_report: Option<SeedReport>,
    environment: Environment,
}

/// Compose descriptor for the configured version
pub fn descriptor(settings: &HarnessSettings) -> ComposeDescriptor {
    ComposeDescriptor::new(
        couch::compose_file(settings.version, &settings.testdata_dir),
        settings.project.clone(),
    )
    .with_env(settings.compose_env())
}

impl Session {
    /// Start, seed and settle the environment described by `settings`
    pub fn start(
        settings: &HarnessSettings,
        runner: Box<dyn ComposeRunner>,
        transport: &dyn SeedTransport,
    ) -> Result<Self> {
        Self::start_with(settings, runner, transport, SessionOptions::default())
    }

    pub fn start_with(
        settings: &HarnessSettings,
        runner: Box<dyn ComposeRunner>,
        transport: &dyn SeedTransport,
        options: SessionOptions,
    ) -> Result<Self> {
        let base_url = settings.base_url();
        info!(
            "Starting CouchDB v{} session on {base_url}",
            settings.version
        );

        let report = RefCell::new(None);
        let mut conditions: Vec<Box<dyn ReadinessCondition + '_>> = Vec::new();
        conditions.push(Box::new(CheckEndpoints::new(
            transport,
            vec![base_url.clone()],
        )));
        if options.seed {
            conditions.push(Box::new(
                SeedCondition::new(transport, couch::seed_plan(settings), &settings.seed)
                    .reporting_to(&report),
            ));
            conditions.push(Box::new(Settle(settings.settle)));
        }

        let environment = Bootstrapper::new(runner, settings.bootstrap_timeout)
            .start(descriptor(settings), conditions)?;

        Ok(Self {
            instance: couch::instance_config(settings.version, &base_url),
            seed_report: report.into_inner(),
            environment,
        })
    }

    /// Instance configuration for the running service
    pub fn instance(&self) -> &InstanceConfig {
        &self.instance
    }

    /// Seeding outcome; `None` when seeding was skipped
    pub fn seed_report(&self) -> Option<&SeedReport> {
        self.seed_report.as_ref()
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Leave the services running and return what is needed to stop them
    pub fn detach(self) -> (InstanceConfig, ComposeDescriptor) {
        (self.instance, self.environment.detach())
    }

    /// Tear down now and report the result
    pub fn stop(self) -> Result<()> {
        self.environment.stop()
    }
}
