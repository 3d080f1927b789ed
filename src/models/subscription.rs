//! Azure subscription data model.

use serde::{Deserialize, Serialize};

/// One entry of `az account list --output json`.
///
/// Only the fields the audit needs are decoded; the rest are ignored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Subscription id (GUID). Stable, used to switch context.
    pub id: String,
    /// Display name, matched by the keyword filter.
    pub name: String,
    /// Whether this is the subscription `az` currently targets.
    #[serde(default)]
    pub is_default: bool,
    /// `Enabled`, `Disabled`, `Warned`, ...
    #[serde(default)]
    pub state: Option<String>,
}

impl Subscription {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Subscription {
        Subscription {
            id: id.into(),
            name: name.into(),
            is_default: false,
            state: None,
        }
    }
}

impl std::fmt::Display for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
