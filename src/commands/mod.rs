//! Command implementations for fleetconf.
//!
//! Each command resolves the inventory path, loads and validates the
//! inventory, does its work on the typed model, and prints a JSON payload
//! on stdout. The `run_*` functions return that payload so they can be
//! exercised without capturing stdout.

mod agent;
mod policy;
mod render;
mod validate;

use crate::cli::{AgentAction, Cli, Command, PolicyAction};
use crate::error::{FleetError, Result};
use crate::inventory::{Inventory, LoadedInventory, discover_inventory_path};
use crate::policy::evaluate_inventory;
use crate::render::ProcessEnv;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Dispatch a parsed command line.
pub fn dispatch(cli: Cli) -> Result<()> {
    let inventory = discover_inventory_path(cli.inventory.as_deref())?;

    match cli.command {
        Command::Validate => print_json(&validate::run_validate(&inventory)?),
        Command::Render(args) => print_json(&render::run_render(
            &inventory,
            &args.instance,
            args.dry_run,
            &ProcessEnv,
        )?),
        Command::Policy(policy) => match policy.action {
            PolicyAction::Check => print_json(&policy::run_check(&inventory)?),
            PolicyAction::Effective(args) => print_json(&policy::run_effective(
                &inventory,
                &args.instance,
                args.agent.as_deref(),
            )?),
            PolicyAction::Integrations => print_json(&policy::run_integrations()),
        },
        Command::Agent(agent) => match agent.action {
            AgentAction::Add(args) => print_json(&agent::run_add(&inventory, args)?),
            AgentAction::Remove(args) => print_json(&agent::run_remove(&inventory, args)?),
            AgentAction::List(args) => print_json(&agent::run_list(&inventory, &args.instance)?),
        },
    }
}

/// Load the inventory, run inventory validation and policy evaluation.
pub(crate) fn load_and_validate(path: &Path) -> Result<(LoadedInventory, Inventory)> {
    let loaded = LoadedInventory::load(path)?;
    let inventory = loaded.validate()?;
    evaluate_inventory(&inventory)?;
    Ok((loaded, inventory))
}

pub(crate) fn display_path(path: &Path) -> String {
    path.display().to_string()
}

fn print_json<T: Serialize + ?Sized>(payload: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(payload)
        .map_err(|e| FleetError::UserError(format!("failed to serialize output: {}", e)))?;
    println!("{}", text);
    Ok(())
}

/// Directory holding the inventory file.
pub(crate) fn inventory_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
