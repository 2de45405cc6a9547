//! Implementation of the `fleetconf validate` command.

use super::{display_path, load_and_validate};
use crate::error::Result;
use serde::Serialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct ValidateOutput {
    pub inventory: String,
    pub instances: usize,
    pub status: &'static str,
}

/// Validate the inventory and every agent's policy.
pub fn run_validate(inventory_path: &Path) -> Result<ValidateOutput> {
    let (_, inventory) = load_and_validate(inventory_path)?;
    info!(instances = inventory.instances.len(), "inventory valid");
    Ok(ValidateOutput {
        inventory: display_path(inventory_path),
        instances: inventory.instances.len(),
        status: "ok",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FleetError;
    use crate::exit_codes;
    use crate::inventory::{LOCAL_INVENTORY, discover_inventory_path};
    use crate::test_support::{DirGuard, FLEET_YAML, create_test_fleet, inventory_path, write_file};
    use serial_test::serial;

    #[test]
    fn test_validate_clean_fleet() {
        let root = create_test_fleet();
        let output = run_validate(&inventory_path(root.path())).unwrap();
        assert_eq!(output.instances, 2);
        assert_eq!(output.status, "ok");
    }

    #[test]
    fn test_validate_reports_policy_violations() {
        let root = create_test_fleet();
        let yaml = FLEET_YAML.replace("allow: [telegram, slack, discord]", "deny: [slack]");
        write_file(root.path(), "inventory/instances.yaml", &yaml);

        let err = run_validate(&inventory_path(root.path())).unwrap_err();
        assert_eq!(err.exit_code(), exit_codes::POLICY_VIOLATION);
        assert_eq!(
            err.to_string(),
            "Policy validation failed:\n- lab/research: integration 'slack' is denied"
        );
    }

    #[test]
    fn test_validate_reports_inventory_issues() {
        let root = create_test_fleet();
        let yaml = FLEET_YAML.replace("gateway_port: 18809", "gateway_port: 18790");
        write_file(root.path(), "inventory/instances.yaml", &yaml);

        let err = run_validate(&inventory_path(root.path())).unwrap_err();
        assert!(matches!(err, FleetError::Validation(_)));
        assert_eq!(err.exit_code(), exit_codes::VALIDATION_FAILURE);
        assert!(err.to_string().contains("port range collision lab(18790-18809)"));
    }

    #[test]
    fn test_validate_missing_inventory() {
        let root = create_test_fleet();
        let err = run_validate(&root.path().join("nope.yaml")).unwrap_err();
        assert!(err.to_string().starts_with("inventory file not found"));
    }

    #[test]
    #[serial]
    fn test_validate_discovers_inventory_from_cwd() {
        let root = create_test_fleet();
        let _guard = DirGuard::new(root.path());

        let path = discover_inventory_path(None).unwrap();
        assert!(path.ends_with("inventory/instances.yaml"));
        assert_eq!(run_validate(&path).unwrap().instances, 2);
    }

    #[test]
    #[serial]
    fn test_validate_prefers_local_inventory() {
        let root = create_test_fleet();
        let yaml = FLEET_YAML.replace("gateway_port: 18809", "gateway_port: 18829");
        write_file(root.path(), LOCAL_INVENTORY, &yaml);
        let _guard = DirGuard::new(root.path());

        let path = discover_inventory_path(None).unwrap();
        assert!(path.ends_with(LOCAL_INVENTORY));
        assert_eq!(run_validate(&path).unwrap().status, "ok");
    }
}
