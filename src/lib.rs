//! Azure CLI helper.
//!
//! Runs `az` commands against the current login session and renders the
//! results. The main feature is a cross-subscription audit of NSG rules
//! ("DSMC rules") that switches the active subscription for each query and
//! always switches back.
//!
//! # Modules
//! - [`azure`] - `az` execution, command building, active subscription guard
//! - [`audit`] - keyword filter and the NSG rule audit
//! - [`models`] - subscriptions, NSGs, audit records
//! - [`output`] - terminal and JSON rendering
//! - [`cli`] - command-line front-end

pub mod audit;
pub mod azure;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;

pub use audit::{audit, compile, CancelFlag, SubscriptionFilter};
pub use azure::{CommandResult, ContextGuard, Executor};
pub use error::{AuditError, CommandError, FilterError, GuardError};
