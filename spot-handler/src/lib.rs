//! Spot instance interruption handling.
//!
//! [`SpotHandler`] polls a provider specific [`InterruptChecker`]. On the
//! first reclaim notice it reports the interruption to CAST AI and cordons
//! the Kubernetes Node it runs on, exactly once per process lifetime.

use spot_handler_ext as k8s;

pub use backoff::{Backoff, RetryError};
pub use checker::{
    AzureChecker, CheckError, Checker, GcpChecker, InterruptChecker, Provider, UnknownProvider,
};
pub use error::{HandlerError, TaintError};
pub use handler::{InterruptionState, SpotHandler};
pub use mutator::NodeMutator;

pub mod backoff;
pub mod checker;
pub mod merge_patch;

mod error;
mod handler;
mod mutator;

#[cfg(test)]
mod fake;
