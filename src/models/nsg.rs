//! Network security group and resource group names.

use std::fmt;

/// A network security group, identified by name within the active subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NetworkSecurityGroup(String);

impl NetworkSecurityGroup {
    pub fn new(name: impl Into<String>) -> NetworkSecurityGroup {
        NetworkSecurityGroup(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// The resource group owning a [`NetworkSecurityGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceGroup(String);

impl ResourceGroup {
    pub fn new(name: impl Into<String>) -> ResourceGroup {
        ResourceGroup(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NetworkSecurityGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ResourceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
