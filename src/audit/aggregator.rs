//! Cross-subscription DSMC rule audit.
//!
//! For every selected subscription, inside a [`ContextGuard`]:
//! list NSGs, resolve each NSG's resource group, query its rules for
//! `ipv4` + prefix matches, and keep a record with the table listing when
//! anything matched. A failure stops the current subscription only.

use crate::azure::command::{self, OutputFormat};
use crate::azure::{CommandRunner, ContextGuard, Executor};
use crate::error::{AuditError, GuardError};
use crate::models::{
    AuditRecord, AuditReport, AuditWarning, NetworkSecurityGroup, ResourceGroup, Subscription,
};
use colored::Colorize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative stop request, checked between subscriptions and between groups.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> CancelFlag {
        CancelFlag::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Why a subscription stopped early.
enum Interrupted {
    Failed {
        nsg: Option<NetworkSecurityGroup>,
        error: AuditError,
    },
    Cancelled,
}

impl From<AuditError> for Interrupted {
    fn from(error: AuditError) -> Self {
        Interrupted::Failed { nsg: None, error }
    }
}

/// Audit `subscriptions` for rules starting with `rule_prefix`.
///
/// Fails only when the active subscription cannot be captured up front;
/// everything else ends up as an [`AuditWarning`] in the report.
pub fn audit<R: CommandRunner>(
    executor: &Executor<R>,
    subscriptions: &[Subscription],
    rule_prefix: &str,
) -> Result<AuditReport, GuardError> {
    audit_with_cancel(executor, subscriptions, rule_prefix, &CancelFlag::new())
}

/// [`audit`] that stops at the next subscription/group boundary once `cancel` is set.
pub fn audit_with_cancel<R: CommandRunner>(
    executor: &Executor<R>,
    subscriptions: &[Subscription],
    rule_prefix: &str,
    cancel: &CancelFlag,
) -> Result<AuditReport, GuardError> {
    let guard = ContextGuard::capture(executor)?;
    let mut report = AuditReport::new();

    log::info!(
        "#Start audit of {} subscription(s) prefix='{rule_prefix}'",
        subscriptions.len()
    );

    for subscription in subscriptions {
        if cancel.is_cancelled() {
            report.cancelled = true;
            break;
        }
        log::info!("Auditing subscription {}", subscription.to_string().bold());

        let mut records = Vec::new();
        let outcome = guard.with_subscription(&subscription.id, |executor| {
            audit_subscription(executor, subscription, rule_prefix, cancel, &mut records)
        });
        let found = records.len();
        report.records.append(&mut records);

        match outcome {
            Err(mut e) => {
                let restore_failure = e.take_restore_failure();
                report.warnings.push(AuditWarning::new(subscription, None, e));
                if let Some(restore) = restore_failure {
                    report
                        .warnings
                        .push(AuditWarning::new(subscription, None, restore));
                }
            }
            Ok(outcome) => {
                match outcome.result {
                    Ok(()) => log::info!("{} matching NSG(s) in {}", found, subscription.name),
                    Err(Interrupted::Cancelled) => report.cancelled = true,
                    Err(Interrupted::Failed { nsg, error }) => {
                        log::warn!("{} {subscription}: {error}", "audit failed".on_red());
                        report
                            .warnings
                            .push(AuditWarning::new(subscription, nsg.as_ref(), error));
                    }
                }
                if let Err(e) = outcome.restored {
                    report.warnings.push(AuditWarning::new(subscription, None, e));
                }
            }
        }
    }

    log::info!(
        "#End audit: {} record(s), {} warning(s){}",
        report.records.len(),
        report.warnings.len(),
        if report.cancelled { ", cancelled" } else { "" }
    );
    Ok(report)
}

/// Walk the NSGs of the active subscription, appending matches to `records`.
fn audit_subscription<R: CommandRunner>(
    executor: &Executor<R>,
    subscription: &Subscription,
    rule_prefix: &str,
    cancel: &CancelFlag,
    records: &mut Vec<AuditRecord>,
) -> Result<(), Interrupted> {
    let names: Vec<String> = executor
        .query(&command::nsg_names())
        .map_err(AuditError::from)?;
    if names.is_empty() {
        log::info!("No NSGs in {}", subscription.name);
        return Ok(());
    }

    for name in names {
        if cancel.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }
        let nsg = NetworkSecurityGroup::new(name);
        match audit_group(executor, subscription, &nsg, rule_prefix) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(AuditError::ResolutionGap { nsg }) => {
                log::debug!("Skipping NSG '{nsg}': no resource group");
            }
            Err(error) => {
                return Err(Interrupted::Failed {
                    nsg: Some(nsg),
                    error,
                })
            }
        }
    }
    Ok(())
}

/// Audit one NSG. `Ok(None)` when no rule matched.
fn audit_group<R: CommandRunner>(
    executor: &Executor<R>,
    subscription: &Subscription,
    nsg: &NetworkSecurityGroup,
    rule_prefix: &str,
) -> Result<Option<AuditRecord>, AuditError> {
    let resource_group = resolve_resource_group(executor, nsg)?;

    let rules: Vec<Value> = executor.query(&command::nsg_rules(
        &resource_group,
        nsg,
        rule_prefix,
        OutputFormat::Json,
    ))?;
    if rules.is_empty() {
        log::debug!("No matching rules in {nsg} ({resource_group})");
        return Ok(None);
    }
    log::info!(
        "{} matching rule(s) in {nsg} ({resource_group})",
        rules.len()
    );

    let listing = executor.text(&command::nsg_rules(
        &resource_group,
        nsg,
        rule_prefix,
        OutputFormat::Table,
    ))?;

    Ok(Some(AuditRecord::new(
        subscription,
        nsg,
        &resource_group,
        listing,
    )))
}

/// Look the NSG up again by name and take the first resource group found.
fn resolve_resource_group<R: CommandRunner>(
    executor: &Executor<R>,
    nsg: &NetworkSecurityGroup,
) -> Result<ResourceGroup, AuditError> {
    let groups: Vec<Option<String>> = executor.query(&command::nsg_resource_group(nsg))?;
    groups
        .into_iter()
        .flatten()
        .find(|rg| !rg.is_empty())
        .map(ResourceGroup::new)
        .ok_or_else(|| AuditError::ResolutionGap {
            nsg: nsg.name().to_string(),
        })
}
