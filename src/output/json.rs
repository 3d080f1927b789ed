//! Pretty JSON rendering.

use crate::models::AuditReport;
use serde::Serialize;

/// Serialize any value with two-space indentation.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// The whole audit report: records, warnings, start time and cancel flag.
pub fn report_to_json(report: &AuditReport) -> Result<String, serde_json::Error> {
    to_pretty_json(report)
}
