//! Core library for integration-testing checks against containerized services
//!
//! This crate brings up a Docker Compose environment for the service under
//! test, seeds it with sample data over HTTP, and hands tests the instance
//! configuration and canned payloads they need.
//!
//! The pieces compose linearly:
//! - [`bootstrap`] starts the environment and tears it down on drop
//! - [`seed`] creates data and polls until the service reports it
//! - [`fixtures`] and [`couch`] provide static payloads and instance configs
//! - [`gate`] decides whether a test runs on this host
//! - [`session`] wires the above together for the configured version
//!
//! Settings are resolved once by [`config::resolve_settings`] and passed
//! explicitly; nothing below reads the process environment.

pub mod bootstrap;
pub mod config;
pub mod couch;
pub mod error;
pub mod fixtures;
pub mod gate;
pub mod home;
pub mod instance;
pub mod logging;
pub mod seed;
pub mod session;

pub use error::{HarnessError, Result};
