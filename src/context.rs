//! Per-instance path and host resolution.
//!
//! Every command that touches an instance's files goes through
//! [`InstanceContext`], so host paths are always resolved the same way:
//! relative to the inventory file's directory and lexically normalised.

use crate::error::{FleetError, Result};
use crate::fs::resolve_relative;
use crate::inventory::{Instance, PathRole};
use std::path::{Path, PathBuf};

/// Container-side mount points the rendered configuration refers to.
pub const CONTAINER_STATE_DIR: &str = "/var/lib/gateway/state";
pub const CONTAINER_WORKSPACE_DIR: &str = "/var/lib/gateway/workspaces";

/// Resolved configuration written under the generated-artifacts dir.
pub const RESOLVED_CONFIG_FILE: &str = "gateway.resolved.json";

/// Copy of the resolved configuration the container mounts.
pub const MOUNTED_CONFIG_FILE: &str = "gateway.json";

pub const RENDER_SUMMARY_FILE: &str = "render-summary.json";
pub const EFFECTIVE_POLICY_FILE: &str = "effective-policy.json";

/// Resolved paths and host settings for one instance. All paths are absolute
/// when the inventory path is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceContext {
    pub id: String,
    pub inventory_path: PathBuf,
    pub inventory_dir: PathBuf,
    pub config_dir: PathBuf,
    pub state_dir: PathBuf,
    pub workspace_root: PathBuf,
    pub generated_dir: PathBuf,
    pub gateway_port: u16,
    /// Normalised host bind address, used when publishing the gateway port.
    pub gateway_bind: String,
}

impl InstanceContext {
    pub fn new(instance: &Instance, inventory_path: &Path) -> Self {
        let inventory_dir = inventory_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let resolve = |role| instance.paths.resolve(role, &inventory_dir);

        Self {
            id: instance.id.clone(),
            inventory_path: inventory_path.to_path_buf(),
            config_dir: resolve(PathRole::ConfigDir),
            state_dir: resolve(PathRole::StateDir),
            workspace_root: resolve(PathRole::WorkspaceRoot),
            generated_dir: resolve(PathRole::GeneratedDir),
            gateway_port: instance.host.gateway_port,
            gateway_bind: normalize_bind(instance.host.bind.as_deref()),
            inventory_dir,
        }
    }

    /// Absolute paths of the instance's config layers, in declaration order.
    pub fn layer_paths(&self, instance: &Instance) -> Vec<PathBuf> {
        instance
            .runtime
            .config_layers
            .iter()
            .map(|layer| resolve_relative(&self.inventory_dir, layer))
            .collect()
    }

    pub fn resolved_config_path(&self) -> PathBuf {
        self.generated_dir.join(RESOLVED_CONFIG_FILE)
    }

    pub fn mounted_config_path(&self) -> PathBuf {
        self.config_dir.join(MOUNTED_CONFIG_FILE)
    }

    pub fn render_summary_path(&self) -> PathBuf {
        self.generated_dir.join(RENDER_SUMMARY_FILE)
    }

    pub fn effective_policy_path(&self) -> PathBuf {
        self.generated_dir.join(EFFECTIVE_POLICY_FILE)
    }

    /// Bind mode in the gateway's own vocabulary: `all` when the host address
    /// is the wildcard, `loopback` otherwise.
    pub fn runtime_bind(&self) -> &'static str {
        if self.gateway_bind == "0.0.0.0" {
            "all"
        } else {
            "loopback"
        }
    }

    /// Create all four path-role directories.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [
            &self.generated_dir,
            &self.config_dir,
            &self.state_dir,
            &self.workspace_root,
        ] {
            std::fs::create_dir_all(dir)
                .map_err(|e| FleetError::io("failed to create directory", dir, e))?;
        }
        Ok(())
    }
}

/// `loopback`, `localhost` and empty map to `127.0.0.1`; `all` maps to
/// `0.0.0.0`; anything else is used as written.
pub fn normalize_bind(raw: Option<&str>) -> String {
    match raw.map(str::trim).unwrap_or("") {
        "" | "loopback" | "localhost" => "127.0.0.1".to_string(),
        "all" => "0.0.0.0".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_test_fleet, inventory_path, load_fleet};

    #[test]
    fn test_paths_resolve_against_inventory_dir() {
        let root = create_test_fleet();
        let inventory = load_fleet(root.path());
        let ctx = InstanceContext::new(
            inventory.instance("core").unwrap(),
            &inventory_path(root.path()),
        );

        assert_eq!(ctx.inventory_dir, root.path().join("inventory"));
        assert_eq!(ctx.config_dir, root.path().join("instances/core/config"));
        assert_eq!(
            ctx.resolved_config_path(),
            root.path().join("instances/core/generated/gateway.resolved.json")
        );
        assert_eq!(
            ctx.mounted_config_path(),
            root.path().join("instances/core/config/gateway.json")
        );
        assert_eq!(ctx.gateway_port, 18789);
        assert_eq!(ctx.gateway_bind, "127.0.0.1");
    }

    #[test]
    fn test_layer_paths_keep_order() {
        let root = create_test_fleet();
        let inventory = load_fleet(root.path());
        let core = inventory.instance("core").unwrap();
        let ctx = InstanceContext::new(core, &inventory_path(root.path()));

        assert_eq!(
            ctx.layer_paths(core),
            vec![
                root.path().join("config/base.json5"),
                root.path().join("config/core.json5"),
            ]
        );
    }

    #[test]
    fn test_runtime_bind_uses_gateway_vocabulary() {
        let root = create_test_fleet();
        let inventory = load_fleet(root.path());
        let mut ctx = InstanceContext::new(
            inventory.instance("core").unwrap(),
            &inventory_path(root.path()),
        );
        assert_eq!(ctx.runtime_bind(), "loopback");

        ctx.gateway_bind = normalize_bind(Some("all"));
        assert_eq!(ctx.runtime_bind(), "all");

        ctx.gateway_bind = normalize_bind(Some("10.0.0.5"));
        assert_eq!(ctx.runtime_bind(), "loopback");
    }

    #[test]
    fn test_normalize_bind() {
        assert_eq!(normalize_bind(None), "127.0.0.1");
        assert_eq!(normalize_bind(Some("localhost")), "127.0.0.1");
        assert_eq!(normalize_bind(Some("all")), "0.0.0.0");
        assert_eq!(normalize_bind(Some("10.0.0.5")), "10.0.0.5");
    }

    #[test]
    fn test_ensure_dirs_creates_roles() {
        let root = create_test_fleet();
        let inventory = load_fleet(root.path());
        let ctx = InstanceContext::new(
            inventory.instance("lab").unwrap(),
            &inventory_path(root.path()),
        );
        ctx.ensure_dirs().unwrap();
        assert!(ctx.state_dir.is_dir());
        assert!(ctx.workspace_root.is_dir());
    }
}
