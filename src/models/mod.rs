//! Domain models for the NSG audit.
//!
//! This module contains the data structures passed between the layers:
//! - [`Subscription`] - an Azure subscription as listed by `az account list`
//! - [`NetworkSecurityGroup`] and [`ResourceGroup`] - audit traversal levels
//! - [`AuditRecord`], [`AuditWarning`] and [`AuditReport`] - audit output

mod nsg;
mod record;
mod subscription;

// Re-export public types
pub use nsg::{NetworkSecurityGroup, ResourceGroup};
pub use record::{AuditRecord, AuditReport, AuditWarning};
pub use subscription::Subscription;
