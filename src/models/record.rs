//! Audit output records.

use super::{NetworkSecurityGroup, ResourceGroup, Subscription};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// One NSG with at least one matching rule.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    #[serde(rename = "Subscription")]
    pub subscription: String,
    #[serde(rename = "Subscription Id")]
    pub subscription_id: String,
    #[serde(rename = "Network Security Group")]
    pub network_security_group: String,
    #[serde(rename = "Resource Group")]
    pub resource_group: String,
    /// `az ... --output table` listing of the matching rules, display only.
    #[serde(rename = "Rules")]
    pub rules: String,
}

impl AuditRecord {
    pub fn new(
        subscription: &Subscription,
        nsg: &NetworkSecurityGroup,
        resource_group: &ResourceGroup,
        rules: String,
    ) -> AuditRecord {
        AuditRecord {
            subscription: subscription.name.clone(),
            subscription_id: subscription.id.clone(),
            network_security_group: nsg.name().to_string(),
            resource_group: resource_group.name().to_string(),
            rules,
        }
    }
}

/// A subscription (or one of its groups) that could not be fully audited.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AuditWarning {
    pub subscription: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_security_group: Option<String>,
    pub message: String,
}

impl AuditWarning {
    pub fn new(
        subscription: &Subscription,
        nsg: Option<&NetworkSecurityGroup>,
        message: impl fmt::Display,
    ) -> AuditWarning {
        AuditWarning {
            subscription: subscription.name.clone(),
            network_security_group: nsg.map(|n| n.name().to_string()),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for AuditWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.network_security_group {
            Some(nsg) => write!(f, "{} / {}: {}", self.subscription, nsg, self.message),
            None => write!(f, "{}: {}", self.subscription, self.message),
        }
    }
}

/// Everything an audit run produced.
#[derive(Serialize, Debug, Clone)]
pub struct AuditReport {
    pub started_at: DateTime<Utc>,
    /// Subscription-major, group order within a subscription.
    pub records: Vec<AuditRecord>,
    pub warnings: Vec<AuditWarning>,
    /// Set when the run stopped early on request.
    pub cancelled: bool,
}

impl AuditReport {
    pub fn new() -> AuditReport {
        AuditReport {
            started_at: Utc::now(),
            records: Vec::new(),
            warnings: Vec::new(),
            cancelled: false,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && !self.cancelled
    }
}

impl Default for AuditReport {
    fn default() -> Self {
        Self::new()
    }
}
