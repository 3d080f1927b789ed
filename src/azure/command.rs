//! Structured `az` command construction.
//!
//! Commands are argument vectors, never interpolated shell strings. Values
//! that end up inside a JMESPath `--query` go through [`jmespath_literal`].

use crate::models::{NetworkSecurityGroup, ResourceGroup};

/// Marker every audited rule name must contain.
pub const IPV4_MARKER: &str = "ipv4";

/// Value passed to `az --output`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Table,
    Tsv,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Table => "table",
            OutputFormat::Tsv => "tsv",
        }
    }
}

/// One `az` invocation, without the program itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzCommand {
    words: Vec<String>,
    params: Vec<(String, String)>,
    output: Option<OutputFormat>,
}

impl AzCommand {
    /// Start a command from its group/verb words, e.g. `["network", "nsg", "list"]`.
    pub fn new<I, S>(words: I) -> AzCommand
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AzCommand {
            words: words.into_iter().map(Into::into).collect(),
            params: Vec::new(),
            output: None,
        }
    }

    /// Add `--<flag> <value>`.
    pub fn param(mut self, flag: &str, value: impl Into<String>) -> AzCommand {
        self.params.push((format!("--{flag}"), value.into()));
        self
    }

    /// Add `--query <jmespath>`.
    pub fn query(self, jmespath: impl Into<String>) -> AzCommand {
        self.param("query", jmespath)
    }

    pub fn output(mut self, format: OutputFormat) -> AzCommand {
        self.output = Some(format);
        self
    }

    pub fn output_format(&self) -> Option<OutputFormat> {
        self.output
    }

    /// Whether stdout is expected to be JSON.
    pub fn is_decodable(&self) -> bool {
        self.output == Some(OutputFormat::Json)
    }

    /// Full argument vector, `--output` last.
    pub fn args(&self) -> Vec<String> {
        let mut args = self.words.clone();
        for (flag, value) in &self.params {
            args.push(flag.clone());
            args.push(value.clone());
        }
        if let Some(format) = self.output {
            args.push("--output".to_string());
            args.push(format.as_str().to_string());
        }
        args
    }
}

impl std::fmt::Display for AzCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "az")?;
        for arg in self.args() {
            if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == '\'') {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Quote `value` as a JMESPath raw string literal: `'...'`.
///
/// Only `'` is escaped. Inside raw literals JMESPath unescapes `\'` and
/// nothing else, so a backslash is passed through as-is.
pub fn jmespath_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "\\'"))
}

/// JMESPath filter selecting rules whose name contains `ipv4` and starts with `prefix`.
pub fn dsmc_rule_query(prefix: &str) -> String {
    format!(
        "[?contains(name,{marker}) && starts_with(name,{prefix})]",
        marker = jmespath_literal(IPV4_MARKER),
        prefix = jmespath_literal(prefix)
    )
}

/// `az account list --output json`
pub fn account_list() -> AzCommand {
    AzCommand::new(["account", "list"]).output(OutputFormat::Json)
}

/// `az account show --output json`
pub fn account_show() -> AzCommand {
    AzCommand::new(["account", "show"]).output(OutputFormat::Json)
}

/// `az account show --query id --output tsv`
pub fn account_show_id() -> AzCommand {
    AzCommand::new(["account", "show"])
        .query("id")
        .output(OutputFormat::Tsv)
}

/// Names of all NSGs in the active subscription.
pub fn nsg_names() -> AzCommand {
    AzCommand::new(["network", "nsg", "list"])
        .query("[].name")
        .output(OutputFormat::Json)
}

/// Resource group(s) of the NSGs called `nsg` in the active subscription.
pub fn nsg_resource_group(nsg: &NetworkSecurityGroup) -> AzCommand {
    AzCommand::new(["network", "nsg", "list"])
        .query(format!(
            "[?name=={}].resourceGroup",
            jmespath_literal(nsg.name())
        ))
        .output(OutputFormat::Json)
}

/// Rules of one NSG matching [`dsmc_rule_query`].
pub fn nsg_rules(
    resource_group: &ResourceGroup,
    nsg: &NetworkSecurityGroup,
    rule_prefix: &str,
    format: OutputFormat,
) -> AzCommand {
    AzCommand::new(["network", "nsg", "rule", "list"])
        .param("resource-group", resource_group.name())
        .param("nsg-name", nsg.name())
        .query(dsmc_rule_query(rule_prefix))
        .output(format)
}
