//! Active subscription handling.
//!
//! `az` keeps one process-wide "current subscription". Every query issued
//! without switching first targets whatever that happens to be. The
//! [`ContextGuard`] is the only code that changes it: it captures the
//! original value once, switches around each guarded body and always switches
//! back afterwards.

use super::command::{self, AzCommand};
use super::executor::Executor;
use super::runner::CommandRunner;
use crate::error::{CommandError, GuardError};
use colored::Colorize;

fn account_set(subscription_id: &str) -> AzCommand {
    AzCommand::new(["account", "set"]).param("subscription", subscription_id)
}

/// Result of a guarded body plus the outcome of switching back.
#[derive(Debug)]
pub struct GuardOutcome<T, E> {
    pub result: Result<T, E>,
    pub restored: Result<(), GuardError>,
}

/// Owns the active-subscription state for the duration of one run.
pub struct ContextGuard<'a, R: CommandRunner> {
    executor: &'a Executor<R>,
    original: String,
}

impl<'a, R: CommandRunner> ContextGuard<'a, R> {
    /// Read the active subscription id. This is the restoration target for
    /// every [`ContextGuard::with_subscription`] call on the returned guard.
    pub fn capture(executor: &'a Executor<R>) -> Result<ContextGuard<'a, R>, GuardError> {
        let original = executor
            .text(&command::account_show_id())
            .map_err(GuardError::Capture)?
            .trim()
            .to_string();
        if original.is_empty() {
            return Err(GuardError::NoActiveSubscription);
        }
        log::info!("Captured active subscription {}", original.bold());
        Ok(ContextGuard { executor, original })
    }

    /// The subscription id that will be restored.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Make `subscription_id` active, run `body`, then restore the original.
    ///
    /// Returns `Err` only when the switch fails; `body` is not run then, and
    /// a failure to switch back is carried inside the returned
    /// [`GuardError::Switch`]. Restoration happens after a failed switch, a
    /// failed body and a panicking body too.
    pub fn with_subscription<T, E, F>(
        &self,
        subscription_id: &str,
        body: F,
    ) -> Result<GuardOutcome<T, E>, GuardError>
    where
        F: FnOnce(&Executor<R>) -> Result<T, E>,
    {
        log::debug!("switch subscription -> {subscription_id}");
        if let Err(source) = self.switch_to(subscription_id) {
            let restore_failure = self.restore().err().map(|e| {
                log::error!("{e}");
                Box::new(e)
            });
            return Err(GuardError::Switch {
                subscription: subscription_id.to_string(),
                source,
                restore_failure,
            });
        }

        let result = {
            let _on_panic = RestoreOnPanic { guard: self };
            body(self.executor)
        };

        let restored = self.restore();
        if let Err(e) = &restored {
            log::error!("{e}");
        }
        Ok(GuardOutcome { result, restored })
    }

    fn switch_to(&self, subscription_id: &str) -> Result<(), CommandError> {
        self.executor.text(&account_set(subscription_id)).map(|_| ())
    }

    /// Switch back to the captured subscription.
    pub fn restore(&self) -> Result<(), GuardError> {
        log::debug!("restore subscription -> {}", self.original);
        self.switch_to(&self.original)
            .map_err(|source| GuardError::Restore {
                original: self.original.clone(),
                source,
            })
    }
}

/// Restores the original subscription when a guarded body unwinds.
struct RestoreOnPanic<'g, 'a, R: CommandRunner> {
    guard: &'g ContextGuard<'a, R>,
}

impl<R: CommandRunner> Drop for RestoreOnPanic<'_, '_, R> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            log::error!("guarded body panicked, restoring {}", self.guard.original);
            if let Err(e) = self.guard.restore() {
                log::error!("{e}");
            }
        }
    }
}
