//! Environment bootstrap
//!
//! Starts a compose environment, blocks on readiness conditions, and hands
//! back an [`Environment`] that tears everything down when it goes out of
//! scope, whether the run succeeded or not.

mod compose;
mod conditions;
mod environment;

pub use compose::{ComposeAction, ComposeDescriptor, ComposeRunner, DockerCompose, RecordingRunner};
pub use conditions::{CheckEndpoints, FnCondition, ReadinessCondition, SeedCondition, Settle};
pub use environment::{Bootstrapper, Environment};
