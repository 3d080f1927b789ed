//! Command-line front-end.
//!
//! One subcommand per single-shot [`Operation`], plus `dsmc` for the
//! cross-subscription rule audit with an interactive subscription picker.

use crate::audit::{audit, compile, parse_keywords};
use crate::azure::{list_subscriptions, CommandResult, CommandRunner, Executor, Operation};
use crate::config::Config;
use crate::models::Subscription;
use crate::output::{print_report, print_result, report_to_json, NO_MATCHES};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, MultiSelect};
use std::error::Error;

#[derive(Parser, Debug)]
#[command(
    name = "azure-nsg-audit",
    version,
    about = "Azure CLI helper using the current 'az login' session"
)]
pub struct Cli {
    /// Program line used to run the Azure CLI (overrides AZ_CLI)
    #[arg(long, global = true)]
    pub az: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the current Azure account
    Account,
    /// List subscriptions
    Subscriptions,
    /// Show service principal details
    SpShow {
        /// Service principal id or object id
        #[arg(long)]
        id: String,
    },
    /// Find service principal ids by display name
    SpFind {
        #[arg(long)]
        name: String,
    },
    /// Find a service principal's display name by id
    SpName {
        #[arg(long)]
        id: String,
    },
    /// List Entra groups with a display name and their members
    GroupMembers {
        #[arg(long)]
        team: String,
    },
    /// List the managed identities (umid-<api>) of an API
    ManagedIdentities {
        #[arg(long)]
        api: String,
    },
    /// Audit NSG rules starting with a DSMC prefix across subscriptions
    Dsmc(DsmcArgs),
}

#[derive(Args, Debug, Default)]
pub struct DsmcArgs {
    /// Rule name prefix; prompted for when missing
    #[arg(long)]
    pub prefix: Option<String>,

    /// Comma-separated subscription name keywords (regex fragments)
    #[arg(long, default_value = "")]
    pub keywords: String,

    /// Audit every subscription matching the keywords
    #[arg(long, conflicts_with = "subscriptions")]
    pub all: bool,

    /// Subscription name or id to audit; repeatable
    #[arg(long = "subscription")]
    pub subscriptions: Vec<String>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl Commands {
    /// The single-shot operation behind this subcommand, `None` for `dsmc`.
    pub fn operation(&self) -> Option<Operation> {
        let op = match self {
            Commands::Account => Operation::ShowAccount,
            Commands::Subscriptions => Operation::ListSubscriptions,
            Commands::SpShow { id } => Operation::ShowServicePrincipal { id: id.clone() },
            Commands::SpFind { name } => Operation::FindServicePrincipalByName { name: name.clone() },
            Commands::SpName { id } => Operation::FindServicePrincipalById { id: id.clone() },
            Commands::GroupMembers { team } => Operation::ListGroupMembers { team: team.clone() },
            Commands::ManagedIdentities { api } => {
                Operation::ListManagedIdentities { api: api.clone() }
            }
            Commands::Dsmc(_) => return None,
        };
        Some(op)
    }
}

pub fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = Config::from_env().with_az_cli(cli.az);
    let executor = Executor::system(config);

    match cli.command {
        Commands::Dsmc(args) => run_dsmc(&executor, args),
        command => {
            let op = command
                .operation()
                .ok_or("subcommand has no single-shot operation")?;
            let result = op.run(&executor);
            print_result(op.title(), &result);
            if let CommandResult::Failed(e) = result {
                return Err(format!("{} failed: {}", op.title(), e).into());
            }
            Ok(())
        }
    }
}

fn run_dsmc<R: CommandRunner>(executor: &Executor<R>, args: DsmcArgs) -> Result<(), Box<dyn Error>> {
    let theme = ColorfulTheme::default();

    let prefix = match args.prefix.as_deref().map(str::trim) {
        Some(prefix) if !prefix.is_empty() => prefix.to_string(),
        _ => Input::<String>::with_theme(&theme)
            .with_prompt("Enter DSMC prefix")
            .interact_text()?
            .trim()
            .to_string(),
    };
    if prefix.is_empty() {
        return Err("a DSMC prefix is required".into());
    }

    let filter = compile(&parse_keywords(&args.keywords))?;
    let candidates = filter.apply(&list_subscriptions(executor)?);
    log::info!(
        "{} subscription(s) match filter '{}'",
        candidates.len(),
        filter.pattern()
    );
    if candidates.is_empty() {
        println!("{}", "No subscriptions match the keywords.".yellow());
        return Ok(());
    }

    let selected = if args.all {
        candidates
    } else if !args.subscriptions.is_empty() {
        pick_named(&candidates, &args.subscriptions)
    } else {
        pick_interactive(&candidates, &theme)?
    };
    if selected.is_empty() {
        log::info!("No subscriptions selected");
        println!("{}", NO_MATCHES.yellow());
        return Ok(());
    }

    let report = audit(executor, &selected, &prefix)?;
    if args.json {
        println!("{}", report_to_json(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Candidates named (by display name or id) in `wanted`, in `wanted` order.
pub fn pick_named(candidates: &[Subscription], wanted: &[String]) -> Vec<Subscription> {
    let mut picked: Vec<Subscription> = Vec::new();
    for name in wanted {
        match candidates.iter().find(|s| &s.name == name || &s.id == name) {
            Some(sub) if !picked.contains(sub) => picked.push(sub.clone()),
            Some(_) => log::debug!("'{name}' selected twice"),
            None => {
                log::warn!("Subscription '{name}' not found among filtered subscriptions");
                eprintln!(
                    "{} subscription '{}' not found, skipped",
                    "WARN".on_yellow(),
                    name
                );
            }
        }
    }
    picked
}

fn pick_interactive(
    candidates: &[Subscription],
    theme: &ColorfulTheme,
) -> Result<Vec<Subscription>, dialoguer::Error> {
    let items: Vec<&str> = candidates.iter().map(|s| s.name.as_str()).collect();
    let chosen = MultiSelect::with_theme(theme)
        .with_prompt("Select subscriptions (space toggles, 'a' toggles all, enter confirms)")
        .items(&items)
        .interact()?;
    Ok(chosen.into_iter().map(|i| candidates[i].clone()).collect())
}
