//! Readiness conditions evaluated after `docker compose up`

use crate::error::{HarnessError, Result};
use crate::seed::{SeedPlan, SeedReport, SeedSettings, SeedTransport, Seeder};
use std::cell::RefCell;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A check that blocks until the environment is usable.
///
/// Conditions run in order. Each receives the shared bootstrap deadline and
/// must return [`HarnessError::BootstrapTimeout`] rather than wait past it.
pub trait ReadinessCondition {
    /// Name used in logs and errors
    fn name(&self) -> String;

    /// Block until satisfied, or fail
    fn check(&mut self, deadline: Instant) -> Result<()>;
}

fn timeout_error(condition: String, started: Instant) -> HarnessError {
    HarnessError::BootstrapTimeout {
        condition,
        elapsed_secs: started.elapsed().as_secs(),
    }
}

/// Waits for every URL to answer GET with a 2xx status
pub struct CheckEndpoints<'a> {
    transport: &'a dyn SeedTransport,
    urls: Vec<String>,
    attempts: u32,
    interval: Duration,
}

impl<'a> CheckEndpoints<'a> {
    /// Attempts made per URL before giving up
    pub const DEFAULT_ATTEMPTS: u32 = 60;

    pub fn new(transport: &'a dyn SeedTransport, urls: Vec<String>) -> Self {
        Self {
            transport,
            urls,
            attempts: Self::DEFAULT_ATTEMPTS,
            interval: Duration::from_secs(1),
        }
    }

    pub fn with_attempts(mut self, attempts: u32, interval: Duration) -> Self {
        self.attempts = attempts;
        self.interval = interval;
        self
    }
}

impl ReadinessCondition for CheckEndpoints<'_> {
    fn name(&self) -> String {
        format!("CheckEndpoints({})", self.urls.join(", "))
    }

    fn check(&mut self, deadline: Instant) -> Result<()> {
        let started = Instant::now();

        for url in &self.urls {
            let mut last_failure = String::from("never attempted");
            let mut up = false;

            for attempt in 1..=self.attempts {
                if Instant::now() >= deadline {
                    return Err(timeout_error(self.name(), started));
                }
                match self.transport.get(url, None) {
                    Ok(response) if response.is_success() => {
                        debug!("{url} up after {attempt} attempt(s)");
                        up = true;
                        break;
                    }
                    Ok(response) => last_failure = format!("HTTP {}", response.status),
                    Err(e) => last_failure = e.to_string(),
                }
                if attempt < self.attempts {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    std::thread::sleep(self.interval.min(remaining));
                }
            }

            if !up {
                return Err(HarnessError::ConditionFailed {
                    condition: self.name(),
                    message: format!(
                        "{url} not reachable after {} attempts: {last_failure}",
                        self.attempts
                    ),
                });
            }
        }

        Ok(())
    }
}

/// Sleeps for a fixed period, clipped to the deadline
#[derive(Debug, Clone, Copy)]
pub struct Settle(pub Duration);

impl ReadinessCondition for Settle {
    fn name(&self) -> String {
        format!("Settle({}s)", self.0.as_secs())
    }

    fn check(&mut self, deadline: Instant) -> Result<()> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let wait = self.0.min(remaining);
        if !wait.is_zero() {
            info!("Letting the environment settle for {}s", wait.as_secs());
            std::thread::sleep(wait);
        }
        Ok(())
    }
}

/// Runs the data seeder as a bootstrap step
pub struct SeedCondition<'a> {
    transport: &'a dyn SeedTransport,
    plan: SeedPlan,
    settings: &'a SeedSettings,
    report: Option<&'a RefCell<Option<SeedReport>>>,
}

impl<'a> SeedCondition<'a> {
    pub fn new(transport: &'a dyn SeedTransport, plan: SeedPlan, settings: &'a SeedSettings) -> Self {
        Self {
            transport,
            plan,
            settings,
            report: None,
        }
    }

    /// Store the seed report in `slot` once seeding finishes
    pub fn reporting_to(mut self, slot: &'a RefCell<Option<SeedReport>>) -> Self {
        self.report = Some(slot);
        self
    }
}

impl ReadinessCondition for SeedCondition<'_> {
    fn name(&self) -> String {
        "Seed".to_string()
    }

    fn check(&mut self, deadline: Instant) -> Result<()> {
        let started = Instant::now();
        let report =
            Seeder::new(self.transport, self.settings).run_until(&self.plan, Some(deadline))?;
        let cut_short = report.deadline_reached;
        if let Some(slot) = self.report {
            *slot.borrow_mut() = Some(report);
        }
        if cut_short {
            return Err(timeout_error(self.name(), started));
        }
        Ok(())
    }
}

/// Adapts a closure into a named condition
pub struct FnCondition<F> {
    name: String,
    check: F,
}

impl<F> FnCondition<F>
where
    F: FnMut(Instant) -> Result<()>,
{
    pub fn new(name: impl Into<String>, check: F) -> Self {
        Self {
            name: name.into(),
            check,
        }
    }
}

impl<F> ReadinessCondition for FnCondition<F>
where
    F: FnMut(Instant) -> Result<()>,
{
    fn name(&self) -> String {
        self.name.clone()
    }

    fn check(&mut self, deadline: Instant) -> Result<()> {
        (self.check)(deadline)
    }
}
