//! Output formatting.
//!
//! This module handles presenting results:
//! - [`terminal`] - colored terminal output for command results and audit reports
//! - [`json`] - pretty JSON rendering

mod json;
mod terminal;

pub use json::{report_to_json, to_pretty_json};
pub use terminal::{format_record, print_report, print_result, NO_MATCHES};
