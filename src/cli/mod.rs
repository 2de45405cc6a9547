//! CLI argument parsing for fleetconf.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// fleetconf: inventory-driven configuration for a fleet of agent gateways.
///
/// One YAML inventory describes every gateway instance: ports, paths,
/// config layers, agents and their channel bindings, and allow/deny policy.
/// fleetconf validates it and renders each instance's resolved config.
#[derive(Parser, Debug)]
#[command(name = "fleetconf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Inventory file (default: $FLEETCONF_INVENTORY, then
    /// inventory/instances.local.yaml, then inventory/instances.yaml).
    #[arg(long, global = true)]
    pub inventory: Option<PathBuf>,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as newline-delimited JSON on stderr.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate the inventory and evaluate every agent against its policy.
    Validate,

    /// Render the resolved configuration for one instance.
    ///
    /// Writes the resolved config to the generated dir and to the mounted
    /// config dir, plus a render summary and the effective policy.
    Render(RenderArgs),

    /// Policy inspection and validation.
    Policy(PolicyCommand),

    /// Agent lifecycle commands.
    Agent(AgentCommand),
}

#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Instance identifier.
    #[arg(long)]
    pub instance: String,

    /// Resolve and summarise without writing any files.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Parser, Debug)]
pub struct PolicyCommand {
    #[command(subcommand)]
    pub action: PolicyAction,
}

#[derive(Subcommand, Debug)]
pub enum PolicyAction {
    /// Evaluate every agent against its effective policy.
    #[command(alias = "validate")]
    Check,

    /// Show the effective policy for an instance or one of its agents.
    Effective(PolicyEffectiveArgs),

    /// List the integration catalog by classification.
    Integrations,
}

#[derive(Parser, Debug)]
pub struct PolicyEffectiveArgs {
    #[arg(long)]
    pub instance: String,

    /// Agent identifier; omit for the instance scope.
    #[arg(long, alias = "agent-id")]
    pub agent: Option<String>,
}

#[derive(Parser, Debug)]
pub struct AgentCommand {
    #[command(subcommand)]
    pub action: AgentAction,
}

#[derive(Subcommand, Debug)]
pub enum AgentAction {
    /// Add an agent to an instance.
    Add(AgentAddArgs),

    /// Remove an agent from an instance.
    Remove(AgentRemoveArgs),

    /// List agents of an instance.
    List(AgentListArgs),
}

#[derive(Parser, Debug)]
pub struct AgentAddArgs {
    #[arg(long)]
    pub instance: String,

    /// New agent identifier.
    #[arg(long = "id", alias = "agent-id")]
    pub id: String,

    #[arg(long, default_value = "usecase", value_parser = ["human", "usecase"])]
    pub role: String,

    /// `channel:accountId` to bind (repeatable).
    #[arg(long = "account", required = true)]
    pub accounts: Vec<String>,

    /// Integration identifier (repeatable).
    #[arg(long = "integration")]
    pub integrations: Vec<String>,

    /// Skill identifier (repeatable).
    #[arg(long = "skill")]
    pub skills: Vec<String>,

    /// Model identifier, `provider/model`.
    #[arg(long)]
    pub model: Option<String>,
}

#[derive(Parser, Debug)]
pub struct AgentRemoveArgs {
    #[arg(long)]
    pub instance: String,

    #[arg(long = "id", alias = "agent-id")]
    pub id: String,

    /// Keep channel accounts that no remaining binding uses.
    #[arg(long)]
    pub keep_accounts: bool,
}

#[derive(Parser, Debug)]
pub struct AgentListArgs {
    #[arg(long)]
    pub instance: String,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_validate_with_globals() {
        let cli = Cli::try_parse_from([
            "fleetconf",
            "validate",
            "--inventory",
            "fleet.yaml",
            "-vv",
            "--log-json",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Validate));
        assert_eq!(cli.inventory, Some(PathBuf::from("fleet.yaml")));
        assert_eq!(cli.verbose, 2);
        assert!(cli.log_json);
    }

    #[test]
    fn test_parse_render() {
        let cli =
            Cli::try_parse_from(["fleetconf", "render", "--instance", "core", "--dry-run"]).unwrap();
        if let Command::Render(args) = cli.command {
            assert_eq!(args.instance, "core");
            assert!(args.dry_run);
        } else {
            panic!("Expected Render command");
        }
    }

    #[test]
    fn test_parse_policy_effective_agent() {
        let cli = Cli::try_parse_from([
            "fleetconf",
            "policy",
            "effective",
            "--instance",
            "core",
            "--agent",
            "ops",
        ])
        .unwrap();
        if let Command::Policy(policy) = cli.command
            && let PolicyAction::Effective(args) = policy.action
        {
            assert_eq!(args.instance, "core");
            assert_eq!(args.agent.as_deref(), Some("ops"));
        } else {
            panic!("Expected policy effective");
        }
    }

    #[test]
    fn test_parse_policy_validate_alias() {
        let cli = Cli::try_parse_from(["fleetconf", "policy", "validate"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Policy(PolicyCommand {
                action: PolicyAction::Check
            })
        ));
    }

    #[test]
    fn test_parse_agent_add_repeatable_flags() {
        let cli = Cli::try_parse_from([
            "fleetconf",
            "agent",
            "add",
            "--instance",
            "core",
            "--id",
            "support",
            "--account",
            "slack:T1",
            "--account",
            "telegram:bot",
            "--skill",
            "faq",
            "--model",
            "openai/gpt-5",
        ])
        .unwrap();
        if let Command::Agent(agent) = cli.command
            && let AgentAction::Add(args) = agent.action
        {
            assert_eq!(args.id, "support");
            assert_eq!(args.role, "usecase");
            assert_eq!(args.accounts, vec!["slack:T1", "telegram:bot"]);
            assert_eq!(args.skills, vec!["faq"]);
            assert!(args.integrations.is_empty());
        } else {
            panic!("Expected agent add");
        }
    }

    #[test]
    fn test_agent_add_requires_account() {
        let result =
            Cli::try_parse_from(["fleetconf", "agent", "add", "--instance", "core", "--id", "x"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_agent_add_rejects_unknown_role() {
        let result = Cli::try_parse_from([
            "fleetconf", "agent", "add", "--instance", "core", "--id", "x", "--account", "a:b",
            "--role", "robot",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_agent_remove_keep_accounts() {
        let cli = Cli::try_parse_from([
            "fleetconf",
            "agent",
            "remove",
            "--instance",
            "core",
            "--agent-id",
            "ops",
            "--keep-accounts",
        ])
        .unwrap();
        if let Command::Agent(agent) = cli.command
            && let AgentAction::Remove(args) = agent.action
        {
            assert_eq!(args.id, "ops");
            assert!(args.keep_accounts);
        } else {
            panic!("Expected agent remove");
        }
    }
}
