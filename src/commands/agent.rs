//! Implementation of the `fleetconf agent` commands.
//!
//! Mutations follow one sequence: load and validate, mutate the typed
//! model, re-run inventory validation and policy evaluation on the result,
//! then replace the inventory file atomically and append an event. Any
//! failure before the write leaves the file untouched.

use super::{display_path, inventory_dir};
use crate::cli::{AgentAddArgs, AgentRemoveArgs};
use crate::error::{FleetError, Result};
use crate::events::{Event, EventAction, append_event};
use crate::inventory::{
    AgentRole, AgentSpec, AgentSummary, Inventory, LoadedInventory, add_agent, list_agents,
    remove_agent, save_inventory, validate_inventory,
};
use crate::policy::evaluate_inventory;
use serde::Serialize;
use serde_json::json;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct MutationOutput {
    pub status: &'static str,
    pub instance: String,
    pub agent: String,
    pub inventory: String,
}

#[derive(Debug, Serialize)]
pub struct ListOutput {
    pub instance: String,
    pub agents: Vec<AgentSummary>,
}

pub fn run_add(inventory_path: &Path, args: AgentAddArgs) -> Result<MutationOutput> {
    let role = AgentRole::from_str(&args.role)
        .ok_or_else(|| FleetError::UserError(format!("unknown agent role: {}", args.role)))?;
    let spec = AgentSpec {
        id: args.id.clone(),
        role,
        accounts: args.accounts,
        integrations: args.integrations,
        skills: args.skills,
        model: args.model,
    };

    mutate(inventory_path, |inventory| {
        add_agent(inventory.instance_mut(&args.instance)?, spec)
    })?;

    append_event(
        &inventory_dir(inventory_path),
        &Event::new(EventAction::AgentAdd)
            .with_instance(&args.instance)
            .with_details(json!({ "agent": args.id, "role": role.as_str() })),
    )?;

    Ok(MutationOutput {
        status: "added",
        instance: args.instance,
        agent: args.id,
        inventory: display_path(inventory_path),
    })
}

pub fn run_remove(inventory_path: &Path, args: AgentRemoveArgs) -> Result<MutationOutput> {
    let prune = !args.keep_accounts;
    mutate(inventory_path, |inventory| {
        remove_agent(inventory.instance_mut(&args.instance)?, &args.id, prune).map(|_| ())
    })?;

    append_event(
        &inventory_dir(inventory_path),
        &Event::new(EventAction::AgentRemove)
            .with_instance(&args.instance)
            .with_details(json!({ "agent": args.id, "pruned_accounts": prune })),
    )?;

    Ok(MutationOutput {
        status: "removed",
        instance: args.instance,
        agent: args.id,
        inventory: display_path(inventory_path),
    })
}

pub fn run_list(inventory_path: &Path, instance_id: &str) -> Result<ListOutput> {
    let inventory = LoadedInventory::load(inventory_path)?.validate()?;
    Ok(ListOutput {
        instance: instance_id.to_string(),
        agents: list_agents(inventory.instance(instance_id)?),
    })
}

/// Apply `change` and persist only if the result still validates.
fn mutate<F>(inventory_path: &Path, change: F) -> Result<()>
where
    F: FnOnce(&mut Inventory) -> Result<()>,
{
    let loaded = LoadedInventory::load(inventory_path)?;
    let mut inventory = loaded.validate()?;

    change(&mut inventory)?;

    let revalidated = validate_inventory(&inventory.to_value()?, &loaded.dir())?;
    evaluate_inventory(&revalidated)?;
    save_inventory(inventory_path, &revalidated)
}
