//! Data seeding
//!
//! Creates sample data on a freshly started service, then waits until the
//! service exposes internal statistics for it:
//!
//! 1. Issue each PUT in the [`SeedPlan`] (idempotent: "already exists" is fine)
//! 2. Poll the plan's stats endpoints under a [`RetryPolicy`]
//! 3. Report which endpoints became ready
//!
//! Running out of attempts is logged and reported, and only becomes an error
//! when [`SeedSettings::strict`] is set. The same goes for a PUT answered
//! with an unexpected status; rejected credentials always fail.

pub mod mock;
mod poll;
mod transport;

pub use poll::{
    PollOutcome, Probe, RetryPolicy, classify_stats_response, poll_until_ready, poll_until_ready_by,
};
pub use transport::{HttpResponse, HttpTransport, SeedTransport, TransportError};

use crate::error::{HarnessError, Result};
use crate::instance::Credentials;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Seeding behavior
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SeedSettings {
    /// Stats polling bounds
    pub policy: RetryPolicy,
    /// Return [`HarnessError::SeedTimeout`] instead of warning when stats
    /// never become ready, and [`HarnessError::Seed`] when a PUT fails
    pub strict: bool,
}

/// One idempotent PUT
#[derive(Debug, Clone, PartialEq)]
pub struct SeedRequest {
    pub url: String,
    pub body: Option<serde_json::Value>,
}

/// What to create and what to wait for
#[derive(Debug, Clone, PartialEq)]
pub struct SeedPlan {
    /// PUTs issued in order
    pub requests: Vec<SeedRequest>,
    /// Endpoints that must return non-empty JSON
    pub stats_urls: Vec<String>,
    /// Basic-auth credentials for every request
    pub credentials: Option<Credentials>,
}

/// Outcome of a seeding run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    /// Polling attempts made
    pub attempts: u32,
    /// Readiness per stats endpoint
    pub ready: BTreeMap<String, bool>,
    /// Attempts ran out before every endpoint was ready
    pub timed_out: bool,
    /// Polling was cut short by the caller's deadline
    pub deadline_reached: bool,
}

impl SeedReport {
    /// Endpoints that never became ready
    pub fn pending(&self) -> Vec<String> {
        self.ready
            .iter()
            .filter(|(_, ready)| !**ready)
            .map(|(url, _)| url.clone())
            .collect()
    }
}

/// Runs a [`SeedPlan`] over a transport
pub struct Seeder<'a> {
    transport: &'a dyn SeedTransport,
    settings: &'a SeedSettings,
}

impl<'a> Seeder<'a> {
    pub fn new(transport: &'a dyn SeedTransport, settings: &'a SeedSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Create the plan's data, then poll its stats endpoints
    pub fn run(&self, plan: &SeedPlan) -> Result<SeedReport> {
        self.run_until(plan, None)
    }

    /// Like [`Seeder::run`], but stop polling once `deadline` passes.
    ///
    /// A report cut short by the deadline has `deadline_reached` set and is
    /// returned as is; the caller decides how to fail.
    pub fn run_until(&self, plan: &SeedPlan, deadline: Option<Instant>) -> Result<SeedReport> {
        let credentials = plan.credentials.as_ref();

        for request in &plan.requests {
            self.put(request, credentials)?;
        }

        let outcome = poll_until_ready_by(&plan.stats_urls, &self.settings.policy, deadline, |url| {
            classify_stats_response(url, self.transport.get(url, credentials))
        })?;

        let report = SeedReport {
            attempts: outcome.attempts,
            timed_out: !outcome.all_ready(),
            deadline_reached: outcome.deadline_reached,
            ready: outcome.ready,
        };

        if report.deadline_reached {
            debug!("Seeding stopped at deadline after {} attempt(s)", report.attempts);
        } else if report.timed_out {
            let pending = report.pending();
            if self.settings.strict {
                return Err(HarnessError::SeedTimeout {
                    attempts: report.attempts,
                    pending,
                });
            }
            warn!(
                "Stats still empty after {} attempts on: {}",
                report.attempts,
                pending.join(", ")
            );
        } else {
            info!("Seeded data visible after {} attempt(s)", report.attempts);
        }

        Ok(report)
    }

    fn put(&self, request: &SeedRequest, credentials: Option<&Credentials>) -> Result<()> {
        let response = self
            .transport
            .put_json(&request.url, request.body.as_ref(), credentials)?;

        match response.status {
            status if response.is_success() => {
                debug!("PUT {} -> {status}", request.url);
                Ok(())
            }
            // Already exists: the call is idempotent
            409 | 412 => {
                debug!("PUT {} -> {} (already exists)", request.url, response.status);
                Ok(())
            }
            401 | 403 => Err(HarnessError::Unauthorized {
                url: request.url.clone(),
                status: response.status,
            }),
            status if self.settings.strict => Err(HarnessError::Seed {
                url: request.url.clone(),
                status,
            }),
            status => {
                warn!("PUT {} -> {status}, continuing", request.url);
                Ok(())
            }
        }
    }
}
