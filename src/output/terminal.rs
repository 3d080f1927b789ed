//! Terminal output with colors.

use super::json::to_pretty_json;
use crate::azure::CommandResult;
use crate::models::{AuditRecord, AuditReport};
use colored::Colorize;
use itertools::Itertools;

/// Message shown when an audit found nothing.
pub const NO_MATCHES: &str = "No matching DSMC rules found.";

/// Print a single-shot result: pretty JSON, verbatim text, or an error line.
pub fn print_result(title: &str, result: &CommandResult) {
    println!("{}", format!("# {title}").bold());
    match result {
        CommandResult::Structured(value) => match to_pretty_json(value) {
            Ok(text) => println!("{text}"),
            Err(_) => println!("{value}"),
        },
        CommandResult::Raw(text) => print!("{text}"),
        CommandResult::Failed(e) => {
            log::warn!("{title} failed: {e}");
            eprintln!("{} {}", "Error:".on_red(), e.diagnostic().red());
        }
    }
}

/// Header line plus the rule listing for one record.
pub fn format_record(record: &AuditRecord) -> String {
    let header = [
        format!("Subscription: {}", record.subscription.bold()),
        format!("Network Security Group: {}", record.network_security_group.bold()),
        format!("Resource Group: {}", record.resource_group.bold()),
    ]
    .iter()
    .join("  ");
    format!("{header}\n{}", record.rules.trim_end())
}

/// Print records, then warnings, then a summary line.
pub fn print_report(report: &AuditReport) {
    for record in &report.records {
        println!("{}\n", format_record(record));
    }

    for warning in &report.warnings {
        eprintln!("{} {}", "WARN".on_yellow(), warning.to_string().yellow());
    }
    if report.cancelled {
        eprintln!("{}", "Audit cancelled before all subscriptions were checked".yellow());
    }

    if report.records.is_empty() {
        println!("{}", NO_MATCHES.yellow());
    } else {
        let subscriptions = report
            .records
            .iter()
            .map(|r| r.subscription.as_str())
            .unique()
            .join(", ");
        println!(
            "{} NSG(s) with matching rules in: {}",
            report.records.len().to_string().green(),
            subscriptions
        );
    }
}
