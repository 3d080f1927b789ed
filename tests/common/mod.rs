//! Scripted stand-in for the Azure CLI.
//!
//! Keeps its own "active subscription" so tests can check that the audit
//! leaves it where it found it.

#![allow(dead_code)]

use azure_nsg_audit::azure::{CommandRunner, Invocation, RawOutput};
use std::cell::RefCell;

#[derive(Debug, Clone, Default)]
pub struct FakeNsg {
    pub name: String,
    pub resource_group: Option<String>,
    pub rules: Vec<String>,
    pub fail_rules: bool,
    /// The by-name lookup of this group's resource group fails.
    pub fail_resolve: bool,
    /// The `--output table` rule listing fails, the JSON query still works.
    pub fail_table: bool,
}

impl FakeNsg {
    pub fn new(name: &str, resource_group: &str, rules: &[&str]) -> FakeNsg {
        FakeNsg {
            name: name.to_string(),
            resource_group: Some(resource_group.to_string()),
            rules: rules.iter().map(|r| r.to_string()).collect(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeSubscription {
    pub id: String,
    pub name: String,
    pub nsgs: Vec<FakeNsg>,
    pub fail_nsg_list: bool,
    /// The NSG listing exits zero with a body that is not JSON.
    pub garbage_nsg_list: bool,
    pub fail_switch: bool,
}

impl FakeSubscription {
    pub fn new(id: &str, name: &str, nsgs: Vec<FakeNsg>) -> FakeSubscription {
        FakeSubscription {
            id: id.to_string(),
            name: name.to_string(),
            nsgs,
            ..Default::default()
        }
    }
}

pub struct FakeAz {
    /// Subscription active before the test, always a valid switch target.
    pub home: String,
    pub active: RefCell<String>,
    pub subscriptions: Vec<FakeSubscription>,
    pub calls: RefCell<Vec<String>>,
    /// Every command except `account ...` fails.
    pub fail_queries: bool,
    /// Switching back to `home` fails.
    pub fail_restore: bool,
}

impl FakeAz {
    pub fn new(active: &str, subscriptions: Vec<FakeSubscription>) -> FakeAz {
        FakeAz {
            home: active.to_string(),
            active: RefCell::new(active.to_string()),
            subscriptions,
            calls: RefCell::new(Vec::new()),
            fail_queries: false,
            fail_restore: false,
        }
    }

    pub fn active(&self) -> String {
        self.active.borrow().clone()
    }

    pub fn calls_matching(&self, needle: &str) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.contains(needle))
            .cloned()
            .collect()
    }

    fn current(&self) -> Option<&FakeSubscription> {
        let active = self.active.borrow();
        self.subscriptions.iter().find(|s| s.id == *active)
    }

    fn account_list(&self) -> String {
        let entries: Vec<serde_json::Value> = self
            .subscriptions
            .iter()
            .map(|s| {
                serde_json::json!({
                    "id": s.id,
                    "name": s.name,
                    "isDefault": s.id == *self.active.borrow(),
                    "state": "Enabled",
                })
            })
            .collect();
        serde_json::Value::Array(entries).to_string()
    }

    fn nsg_rule_list(&self, args: &[&str]) -> RawOutput {
        let (Some(rg), Some(nsg_name), Some(query), Some(format)) = (
            flag(args, "--resource-group"),
            flag(args, "--nsg-name"),
            flag(args, "--query"),
            flag(args, "--output"),
        ) else {
            return fail("ERROR: the following arguments are required");
        };
        let Some(nsg) = self.current().and_then(|s| {
            s.nsgs
                .iter()
                .find(|n| n.name == nsg_name && n.resource_group.as_deref() == Some(rg))
        }) else {
            return fail(&format!("ERROR: (ResourceNotFound) '{nsg_name}' was not found."));
        };
        if nsg.fail_rules {
            return fail("ERROR: (AuthorizationFailed) rule list denied");
        }
        if nsg.fail_table && format == "table" {
            return fail("ERROR: table denied");
        }
        let prefix = quoted_after(query, "starts_with(name,").unwrap_or_default();
        let matching: Vec<&String> = nsg
            .rules
            .iter()
            .filter(|r| r.contains("ipv4") && r.starts_with(&prefix))
            .collect();
        match format {
            "json" => ok(serde_json::Value::Array(
                matching
                    .iter()
                    .map(|r| serde_json::json!({ "name": r, "priority": 100 }))
                    .collect(),
            )
            .to_string()),
            _ => {
                let mut table = String::from("Name    Priority\n------  ----------\n");
                for rule in matching {
                    table.push_str(&format!("{rule}  100\n"));
                }
                ok(table)
            }
        }
    }
}

impl CommandRunner for FakeAz {
    fn run(&self, invocation: &Invocation) -> std::io::Result<RawOutput> {
        let args: Vec<&str> = invocation.args.iter().map(String::as_str).collect();
        self.calls.borrow_mut().push(args.join(" "));

        let out = match args.as_slice() {
            ["account", "show", "--query", "id", "--output", "tsv"] => {
                ok(format!("{}\n", self.active.borrow()))
            }
            ["account", "set", "--subscription", id] if self.fail_restore && *id == self.home => {
                fail("ERROR: restore refused")
            }
            ["account", "set", "--subscription", id] => {
                match self.subscriptions.iter().find(|s| s.id == *id) {
                    Some(s) if s.fail_switch => fail("ERROR: switch refused"),
                    Some(_) => {
                        *self.active.borrow_mut() = id.to_string();
                        ok(String::new())
                    }
                    None if *id == self.home => {
                        *self.active.borrow_mut() = id.to_string();
                        ok(String::new())
                    }
                    None => fail(&format!(
                        "ERROR: The subscription of '{id}' doesn't exist in cloud 'AzureCloud'."
                    )),
                }
            }
            ["account", "list", "--output", "json"] => ok(self.account_list()),
            _ if self.fail_queries => fail("ERROR: (InternalServerError) try again later"),
            ["network", "nsg", "list", "--query", "[].name", "--output", "json"] => {
                match self.current() {
                    Some(s) if s.fail_nsg_list => fail("ERROR: (AuthorizationFailed) nsg list denied"),
                    Some(s) if s.garbage_nsg_list => ok("<html>oops</html>".to_string()),
                    Some(s) => ok(serde_json::to_string(
                        &s.nsgs.iter().map(|n| n.name.clone()).collect::<Vec<_>>(),
                    )
                    .unwrap()),
                    None => ok("[]".to_string()),
                }
            }
            ["network", "nsg", "list", "--query", query, "--output", "json"] => {
                let name = quoted_after(query, "[?name==").unwrap_or_default();
                let denied = self
                    .current()
                    .is_some_and(|s| s.nsgs.iter().any(|n| n.name == name && n.fail_resolve));
                if denied {
                    return Ok(fail("ERROR: (AuthorizationFailed) nsg show denied"));
                }
                let groups: Vec<Option<String>> = self
                    .current()
                    .map(|s| {
                        s.nsgs
                            .iter()
                            .filter(|n| n.name == name)
                            .map(|n| n.resource_group.clone())
                            .collect()
                    })
                    .unwrap_or_default();
                let groups: Vec<String> = groups.into_iter().flatten().collect();
                ok(serde_json::to_string(&groups).unwrap())
            }
            ["network", "nsg", "rule", "list", ..] => self.nsg_rule_list(&args),
            _ => fail(&format!("ERROR: unexpected command: {}", args.join(" "))),
        };
        Ok(out)
    }
}

pub fn ok(stdout: String) -> RawOutput {
    RawOutput {
        code: Some(0),
        stdout: stdout.into_bytes(),
        stderr: String::new(),
    }
}

pub fn fail(stderr: &str) -> RawOutput {
    RawOutput {
        code: Some(1),
        stdout: Vec::new(),
        stderr: stderr.to_string(),
    }
}

fn flag<'a>(args: &[&'a str], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| *a == name)
        .and_then(|i| args.get(i + 1).copied())
}

/// The JMESPath raw string literal following `marker`. Only `\'` is unescaped.
fn quoted_after(query: &str, marker: &str) -> Option<String> {
    let start = query.find(marker)? + marker.len();
    let rest = query[start..].strip_prefix('\'')?;
    let mut value = String::new();
    let mut chars = rest.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next()? {
                '\'' => value.push('\''),
                other => {
                    value.push('\\');
                    value.push(other);
                }
            },
            '\'' => return Some(value),
            c => value.push(c),
        }
    }
    None
}
