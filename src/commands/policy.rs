//! Implementation of the `fleetconf policy` commands.

use super::load_and_validate;
use crate::error::Result;
use crate::inventory::LoadedInventory;
use crate::policy::{IntegrationCatalog, PolicySummary, effective_summary, supported_integrations};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct CheckOutput {
    pub status: &'static str,
}

/// Evaluate every agent of every instance.
pub fn run_check(inventory_path: &Path) -> Result<CheckOutput> {
    load_and_validate(inventory_path)?;
    Ok(CheckOutput { status: "ok" })
}

/// Effective policy for an instance, or for one agent in it.
///
/// Only inventory validation gates this; an agent that violates its policy
/// can still be inspected.
pub fn run_effective(
    inventory_path: &Path,
    instance_id: &str,
    agent_id: Option<&str>,
) -> Result<PolicySummary> {
    let inventory = LoadedInventory::load(inventory_path)?.validate()?;
    let instance = inventory.instance(instance_id)?;
    let agent = agent_id.map(|id| instance.agent(id)).transpose()?;
    effective_summary(&inventory, instance, agent)
}

pub fn run_integrations() -> IntegrationCatalog {
    supported_integrations()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FleetError;
    use crate::test_support::{create_test_fleet, inventory_path, write_file, FLEET_YAML};

    #[test]
    fn test_effective_instance_scope() {
        let root = create_test_fleet();
        let summary = run_effective(&inventory_path(root.path()), "core", None).unwrap();
        assert_eq!(summary.scope, "instance:core");
        assert_eq!(
            summary.policy.integrations.allow,
            vec!["telegram", "slack", "discord"]
        );
    }

    #[test]
    fn test_effective_agent_scope_and_missing_agent() {
        let root = create_test_fleet();
        let path = inventory_path(root.path());

        let summary = run_effective(&path, "lab", Some("research")).unwrap();
        assert_eq!(summary.scope, "agent:lab/research");

        let err = run_effective(&path, "lab", Some("ghost")).unwrap_err();
        assert!(matches!(err, FleetError::UserError(ref m) if m == "agent not found: lab/ghost"));
    }

    #[test]
    fn test_effective_works_despite_violations() {
        let root = create_test_fleet();
        let yaml = FLEET_YAML.replace("allow: [telegram, slack, discord]", "deny: [telegram]");
        write_file(root.path(), "inventory/instances.yaml", &yaml);
        let path = inventory_path(root.path());

        assert!(matches!(run_check(&path), Err(FleetError::Policy(_))));
        let summary = run_effective(&path, "core", Some("ops")).unwrap();
        assert_eq!(summary.policy.integrations.deny, vec!["telegram"]);
    }

    #[test]
    fn test_integrations_catalog() {
        let catalog = run_integrations();
        assert!(catalog.core.contains(&"telegram".to_string()));
        assert_eq!(catalog.custom_only.len(), 2);
    }
}
