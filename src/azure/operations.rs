//! Single-shot lookups.
//!
//! Each [`Operation`] maps to one `az` command, or to a short chain of them
//! for the group-member and managed-identity listings. Every operation ends
//! in a [`CommandResult`]; failures of follow-up lookups degrade to
//! placeholder values instead of failing the whole listing.

use super::command::{self, AzCommand, OutputFormat};
use super::executor::{CommandResult, Executor};
use super::runner::CommandRunner;
use crate::error::CommandError;
use crate::models::Subscription;
use serde_json::{json, Value};

/// Display-name prefix of API managed identities.
pub const MANAGED_IDENTITY_PREFIX: &str = "umid-";

const ID_AND_NAME: &str = "{id:id, displayName:displayName}";
const NAME_AND_OBJECT_ID: &str = "{displayName:displayName, objectId:id}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    ShowAccount,
    ListSubscriptions,
    ShowServicePrincipal { id: String },
    FindServicePrincipalByName { name: String },
    FindServicePrincipalById { id: String },
    ListGroupMembers { team: String },
    ListManagedIdentities { api: String },
}

impl Operation {
    pub fn title(&self) -> &'static str {
        match self {
            Operation::ShowAccount => "Show Current Azure Account",
            Operation::ListSubscriptions => "List Subscriptions",
            Operation::ShowServicePrincipal { .. } => "Show Service Principal Details",
            Operation::FindServicePrincipalByName { .. } => "Find Service Principal ID by Name",
            Operation::FindServicePrincipalById { .. } => "Find Service Principal Name by ID",
            Operation::ListGroupMembers { .. } => "List Groups and Members in Entra",
            Operation::ListManagedIdentities { .. } => "List API Managed Identities",
        }
    }

    /// The command for single-command operations, `None` for chained ones.
    pub fn command(&self) -> Option<AzCommand> {
        let cmd = match self {
            Operation::ShowAccount => command::account_show(),
            Operation::ListSubscriptions => command::account_list(),
            Operation::ShowServicePrincipal { id } => sp_show(id),
            Operation::FindServicePrincipalByName { name } => sp_find_by_name(name),
            Operation::FindServicePrincipalById { id } => sp_name_by_id(id),
            Operation::ListGroupMembers { .. } | Operation::ListManagedIdentities { .. } => {
                return None
            }
        };
        Some(cmd)
    }

    pub fn run<R: CommandRunner>(&self, executor: &Executor<R>) -> CommandResult {
        log::info!("#Start {}", self.title());
        match self {
            Operation::ShowAccount => executor.execute(&command::account_show()),
            Operation::ListSubscriptions => executor.execute(&command::account_list()),
            Operation::ShowServicePrincipal { id } => executor.execute(&sp_show(id)),
            Operation::FindServicePrincipalByName { name } => {
                executor.execute(&sp_find_by_name(name))
            }
            Operation::FindServicePrincipalById { id } => executor.execute(&sp_name_by_id(id)),
            Operation::ListGroupMembers { team } => listing(group_members(executor, team)),
            Operation::ListManagedIdentities { api } => {
                listing(managed_identities(executor, api))
            }
        }
    }
}

fn listing(items: Result<Vec<Value>, CommandError>) -> CommandResult {
    match items {
        Ok(items) => CommandResult::Structured(Value::Array(items)),
        Err(e) => CommandResult::Failed(e),
    }
}

/// All subscriptions visible to the logged-in account.
pub fn list_subscriptions<R: CommandRunner>(
    executor: &Executor<R>,
) -> Result<Vec<Subscription>, CommandError> {
    let subscriptions: Vec<Subscription> = executor.query(&command::account_list())?;
    log::info!("Got {} subscription(s)", subscriptions.len());
    Ok(subscriptions)
}

fn sp_show(id: &str) -> AzCommand {
    AzCommand::new(["ad", "sp", "show"])
        .param("id", id)
        .output(OutputFormat::Json)
}

fn sp_find_by_name(name: &str) -> AzCommand {
    AzCommand::new(["ad", "sp", "list"])
        .param("display-name", name)
        .query(format!("[].{ID_AND_NAME}"))
        .output(OutputFormat::Json)
}

fn sp_name_by_id(id: &str) -> AzCommand {
    sp_show(id).query(ID_AND_NAME)
}

/// Groups named `team`, each with its member display names.
fn group_members<R: CommandRunner>(
    executor: &Executor<R>,
    team: &str,
) -> Result<Vec<Value>, CommandError> {
    let ids = executor.text(
        &AzCommand::new(["ad", "group", "list"])
            .param("display-name", team)
            .query("[].id")
            .output(OutputFormat::Tsv),
    )?;

    let mut groups = Vec::new();
    for id in ids.split_whitespace() {
        let mut info = executor
            .query::<Value>(
                &AzCommand::new(["ad", "group", "show"])
                    .param("group", id)
                    .query(NAME_AND_OBJECT_ID)
                    .output(OutputFormat::Json),
            )
            .ok()
            .filter(Value::is_object)
            .unwrap_or_else(|| json!({ "displayName": "Unknown", "objectId": id }));

        let members = executor
            .query::<Value>(
                &AzCommand::new(["ad", "group", "member", "list"])
                    .param("group", id)
                    .query("[].displayName")
                    .output(OutputFormat::Json),
            )
            .unwrap_or_else(|e| {
                log::warn!("members of group {id}: {e}");
                json!(["Error retrieving members"])
            });

        info["members"] = members;
        groups.push(info);
    }
    Ok(groups)
}

/// Service principals named `umid-<api>` with their subscription name.
fn managed_identities<R: CommandRunner>(
    executor: &Executor<R>,
    api: &str,
) -> Result<Vec<Value>, CommandError> {
    let ids: Vec<String> = executor.query(
        &AzCommand::new(["ad", "sp", "list"])
            .param("display-name", format!("{MANAGED_IDENTITY_PREFIX}{api}"))
            .query("[].id")
            .output(OutputFormat::Json),
    )?;

    let mut identities = Vec::new();
    for id in &ids {
        let mut info = executor
            .query::<Value>(&sp_show(id).query(NAME_AND_OBJECT_ID))
            .ok()
            .filter(Value::is_object)
            .unwrap_or_else(|| json!({ "displayName": "Unknown", "objectId": id }));

        let subscription = identity_subscription_name(executor, id).unwrap_or_else(|| {
            log::warn!("no subscription found for managed identity {id}");
            "Unknown".to_string()
        });
        info["subscription"] = Value::String(subscription);
        identities.push(info);
    }
    Ok(identities)
}

/// Subscription name of a managed identity, from the resource id stored in
/// its second alternative name: `/subscriptions/<id>/resourcegroups/...`.
fn identity_subscription_name<R: CommandRunner>(
    executor: &Executor<R>,
    sp_id: &str,
) -> Option<String> {
    let resource_id: String = executor
        .query(&sp_show(sp_id).query("alternativeNames[1]"))
        .ok()?;
    let subscription_id = subscription_id_from_resource_id(&resource_id)?;
    executor
        .query(
            &AzCommand::new(["account", "show"])
                .param("name", subscription_id)
                .query("name")
                .output(OutputFormat::Json),
        )
        .ok()
}

fn subscription_id_from_resource_id(resource_id: &str) -> Option<&str> {
    resource_id.split('/').nth(2).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::runner::{Invocation, RawOutput};
    use crate::config::Config;

    /// Answers by joined argument string.
    struct Table(Vec<(&'static str, i32, &'static str)>);

    impl CommandRunner for Table {
        fn run(&self, invocation: &Invocation) -> std::io::Result<RawOutput> {
            let line = invocation.args.join(" ");
            let (code, stdout) = self
                .0
                .iter()
                .find(|(args, _, _)| *args == line)
                .map(|(_, code, out)| (*code, *out))
                .unwrap_or((2, ""));
            Ok(RawOutput {
                code: Some(code),
                stdout: stdout.as_bytes().to_vec(),
                stderr: if code == 0 { String::new() } else { format!("no answer for: {line}") },
            })
        }
    }

    fn executor(rows: Vec<(&'static str, i32, &'static str)>) -> Executor<Table> {
        Executor::new(Table(rows), Config::default())
    }

    #[test]
    fn test_single_command_operations() {
        let op = Operation::FindServicePrincipalByName {
            name: "my app".to_string(),
        };
        assert_eq!(
            op.command().unwrap().args(),
            vec![
                "ad",
                "sp",
                "list",
                "--display-name",
                "my app",
                "--query",
                "[].{id:id, displayName:displayName}",
                "--output",
                "json"
            ]
        );
        assert!(Operation::ListGroupMembers { team: "x".into() }.command().is_none());
    }

    #[test]
    fn test_run_issues_the_described_command() {
        let ops = [
            Operation::ShowAccount,
            Operation::ListSubscriptions,
            Operation::ShowServicePrincipal { id: "sp-1".into() },
            Operation::FindServicePrincipalByName { name: "app".into() },
            Operation::FindServicePrincipalById { id: "sp-2".into() },
        ];
        for op in ops {
            let line = op.command().unwrap().args().join(" ");
            let leaked: &'static str = Box::leak(line.into_boxed_str());
            let ex = executor(vec![(leaked, 0, "{}")]);
            assert!(
                matches!(op.run(&ex), CommandResult::Structured(_)),
                "{} did not run '{leaked}'",
                op.title()
            );
        }
    }

    #[test]
    fn test_show_account_structured() {
        let ex = executor(vec![("account show --output json", 0, r#"{"name":"sub-A"}"#)]);
        match Operation::ShowAccount.run(&ex) {
            CommandResult::Structured(v) => assert_eq!(v["name"], "sub-A"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_failed_lookup_is_failed_result() {
        let ex = executor(vec![]);
        let result = Operation::ShowServicePrincipal { id: "nope".into() }.run(&ex);
        match result {
            CommandResult::Failed(e) => assert!(e.diagnostic().contains("ad sp show --id nope")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_group_members_degrade() {
        let ex = executor(vec![
            ("ad group list --display-name ace --query [].id --output tsv", 0, "g1\ng2\n"),
            (
                "ad group show --group g1 --query {displayName:displayName, objectId:id} --output json",
                0,
                r#"{"displayName":"ACE One","objectId":"g1"}"#,
            ),
            (
                "ad group member list --group g1 --query [].displayName --output json",
                0,
                r#"["Alice","Bob"]"#,
            ),
        ]);
        let result = Operation::ListGroupMembers { team: "ace".into() }.run(&ex);
        let CommandResult::Structured(Value::Array(groups)) = result else {
            panic!("expected array");
        };
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0]["displayName"], "ACE One");
        assert_eq!(groups[0]["members"], json!(["Alice", "Bob"]));
        assert_eq!(groups[1]["displayName"], "Unknown");
        assert_eq!(groups[1]["objectId"], "g2");
        assert_eq!(groups[1]["members"], json!(["Error retrieving members"]));
    }

    #[test]
    fn test_managed_identities_subscription_lookup() {
        let ex = executor(vec![
            (
                "ad sp list --display-name umid-orders --query [].id --output json",
                0,
                r#"["sp1"]"#,
            ),
            (
                "ad sp show --id sp1 --query {displayName:displayName, objectId:id} --output json",
                0,
                r#"{"displayName":"umid-orders","objectId":"sp1"}"#,
            ),
            (
                "ad sp show --id sp1 --query alternativeNames[1] --output json",
                0,
                r#""/subscriptions/sub-guid/resourcegroups/rg/providers/x/umid-orders""#,
            ),
            (
                "account show --name sub-guid --query name --output json",
                0,
                r#""p1234-prod""#,
            ),
        ]);
        let result = Operation::ListManagedIdentities { api: "orders".into() }.run(&ex);
        let CommandResult::Structured(Value::Array(items)) = result else {
            panic!("expected array");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["displayName"], "umid-orders");
        assert_eq!(items[0]["subscription"], "p1234-prod");
    }

    #[test]
    fn test_subscription_id_from_resource_id() {
        assert_eq!(
            subscription_id_from_resource_id("/subscriptions/abc/resourcegroups/rg"),
            Some("abc")
        );
        assert_eq!(subscription_id_from_resource_id("isolated"), None);
    }

    #[test]
    fn test_list_subscriptions() {
        let ex = executor(vec![(
            "account list --output json",
            0,
            r#"[{"id":"1","name":"sub-A"},{"id":"2","name":"sub-B"}]"#,
        )]);
        let subs = list_subscriptions(&ex).unwrap();
        assert_eq!(subs, vec![Subscription::new("1", "sub-A"), Subscription::new("2", "sub-B")]);
    }
}
