//! Azure CLI interaction.
//!
//! This module handles all Azure-related operations:
//! - [`runner`] - process execution
//! - [`command`] - structured `az` command construction
//! - [`executor`] - running commands and classifying results
//! - [`context`] - switching and restoring the active subscription
//! - [`operations`] - single-shot lookups

pub mod command;
mod context;
mod executor;
mod operations;
mod runner;

// Re-export public types and functions
pub use context::{ContextGuard, GuardOutcome};
pub use executor::{CommandResult, Executor};
pub use operations::{list_subscriptions, Operation};
pub use runner::{CommandRunner, Invocation, ProcessRunner, RawOutput};
