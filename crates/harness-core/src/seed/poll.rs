//! Bounded readiness polling
//!
//! Each attempt probes every endpoint that is not ready yet. An endpoint
//! answering [`Probe::NotReady`] is retried on the next attempt; an `Err`
//! from the probe is fatal and stops polling immediately.

use super::transport::{HttpResponse, TransportError};
use crate::error::{HarnessError, Result};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// How many times to poll and how long to wait between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Upper bound on polling attempts
    pub max_attempts: u32,
    /// Pause between attempts (not applied after the last one)
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 120,
            interval: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Policy that never sleeps
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            interval: Duration::ZERO,
        }
    }
}

/// Result of probing one endpoint once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    Ready,
    NotReady(String),
}

/// Where polling ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    /// Attempts actually made
    pub attempts: u32,
    /// Readiness per endpoint
    pub ready: BTreeMap<String, bool>,
    /// Polling stopped because the deadline passed, not because attempts ran out
    pub deadline_reached: bool,
}

impl PollOutcome {
    /// True when every endpoint became ready (vacuously true for none)
    pub fn all_ready(&self) -> bool {
        self.ready.values().all(|r| *r)
    }

    /// Endpoints that never became ready
    pub fn pending(&self) -> Vec<String> {
        self.ready
            .iter()
            .filter(|(_, ready)| !**ready)
            .map(|(endpoint, _)| endpoint.clone())
            .collect()
    }
}

/// Poll `endpoints` until all are ready or `policy.max_attempts` is spent.
///
/// Never makes more than `max_attempts` attempts. A probe returning `Err`
/// aborts polling and the error is returned.
pub fn poll_until_ready<F>(
    endpoints: &[String],
    policy: &RetryPolicy,
    probe: F,
) -> Result<PollOutcome>
where
    F: FnMut(&str) -> Result<Probe>,
{
    poll_until_ready_by(endpoints, policy, None, probe)
}

/// Like [`poll_until_ready`], but also stops once `deadline` has passed.
/// Sleeps between attempts never extend past the deadline.
pub fn poll_until_ready_by<F>(
    endpoints: &[String],
    policy: &RetryPolicy,
    deadline: Option<Instant>,
    mut probe: F,
) -> Result<PollOutcome>
where
    F: FnMut(&str) -> Result<Probe>,
{
    let mut ready: BTreeMap<String, bool> =
        endpoints.iter().map(|e| (e.clone(), false)).collect();
    let mut attempts = 0;
    let expired = || deadline.is_some_and(|d| Instant::now() >= d);

    while !ready.values().all(|r| *r) && attempts < policy.max_attempts {
        if expired() {
            debug!("Deadline passed after {attempts} attempt(s)");
            return Ok(PollOutcome {
                attempts,
                ready,
                deadline_reached: true,
            });
        }
        attempts += 1;
        info!(
            "Waiting for stats to be generated on the nodes (attempt {attempts}/{})",
            policy.max_attempts
        );

        for (endpoint, is_ready) in ready.iter_mut() {
            if *is_ready {
                continue;
            }
            match probe(endpoint.as_str())? {
                Probe::Ready => {
                    debug!("{endpoint} ready");
                    *is_ready = true;
                }
                Probe::NotReady(reason) => debug!("{endpoint} not ready: {reason}"),
            }
        }

        if !ready.values().all(|r| *r) && attempts < policy.max_attempts {
            let wait = match deadline {
                Some(d) => policy.interval.min(d.saturating_duration_since(Instant::now())),
                None => policy.interval,
            };
            std::thread::sleep(wait);
        }
    }

    let deadline_reached = !ready.values().all(|r| *r) && expired();
    Ok(PollOutcome {
        attempts,
        ready,
        deadline_reached,
    })
}

/// Classify a stats request: 401/403 and malformed requests are fatal;
/// unreachable hosts, non-2xx statuses, and empty or non-JSON bodies mean
/// the node has not produced statistics yet.
pub fn classify_stats_response(
    url: &str,
    result: std::result::Result<HttpResponse, TransportError>,
) -> Result<Probe> {
    let response = match result {
        Ok(response) => response,
        Err(TransportError::Unreachable { message, .. }) => return Ok(Probe::NotReady(message)),
        Err(e @ TransportError::InvalidRequest { .. }) => return Err(e.into()),
    };

    if response.is_auth_failure() {
        return Err(HarnessError::Unauthorized {
            url: url.to_string(),
            status: response.status,
        });
    }

    if !response.is_success() {
        return Ok(Probe::NotReady(format!("HTTP {}", response.status)));
    }

    match response.json() {
        Some(value) if has_content(&value) => Ok(Probe::Ready),
        Some(_) => Ok(Probe::NotReady("empty stats".to_string())),
        None => Ok(Probe::NotReady("body is not JSON".to_string())),
    }
}

fn has_content(value: &serde_json::Value) -> bool {
    use serde_json::Value;
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
