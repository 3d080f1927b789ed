//! DSMC rule audit.
//!
//! - [`filter`] - subscription keyword filter
//! - [`aggregator`] - the cross-subscription NSG walk

mod aggregator;
mod filter;

pub use aggregator::{audit, audit_with_cancel, CancelFlag};
pub use filter::{compile, parse_keywords, SubscriptionFilter, MATCH_ALL};
