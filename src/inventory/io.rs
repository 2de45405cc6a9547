//! Locating, reading, and writing the inventory document.

use super::model::Inventory;
use super::validate::validate_inventory;
use crate::error::{FleetError, Result};
use crate::fs::{atomic_write_file, normalize_path};
use crate::value::{Map, Value};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the inventory file.
pub const INVENTORY_ENV: &str = "FLEETCONF_INVENTORY";

/// Operator-local inventory, preferred over the shared one when present.
pub const LOCAL_INVENTORY: &str = "inventory/instances.local.yaml";

pub const DEFAULT_INVENTORY: &str = "inventory/instances.yaml";

/// Resolve the inventory path: explicit flag, then `FLEETCONF_INVENTORY`,
/// then the local override, then the shared default.
pub fn discover_inventory_path(explicit: Option<&Path>) -> Result<PathBuf> {
    let cwd = env::current_dir().map_err(|e| {
        FleetError::UserError(format!("failed to get current working directory: {}", e))
    })?;
    let from_env = env::var(INVENTORY_ENV).ok();
    Ok(discover_inventory_path_from(
        explicit,
        from_env.as_deref(),
        &cwd,
    ))
}

/// Discovery with the environment and working directory supplied by the caller.
pub fn discover_inventory_path_from(
    explicit: Option<&Path>,
    from_env: Option<&str>,
    cwd: &Path,
) -> PathBuf {
    let chosen = match (explicit, from_env.map(str::trim)) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(path)) if !path.is_empty() => PathBuf::from(path),
        _ => {
            let local = cwd.join(LOCAL_INVENTORY);
            if local.is_file() {
                local
            } else {
                cwd.join(DEFAULT_INVENTORY)
            }
        }
    };
    normalize_path(&cwd.join(chosen))
}

/// A raw inventory document together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedInventory {
    pub path: PathBuf,
    pub raw: Value,
}

impl LoadedInventory {
    /// Read and parse the YAML document at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(FleetError::Reference {
                kind: "inventory file",
                path,
            });
        }
        let text = std::fs::read_to_string(&path)
            .map_err(|e| FleetError::io("failed to read inventory", &path, e))?;
        let raw = parse_inventory_yaml(&text, &path)?;
        debug!(path = %path.display(), "loaded inventory");
        Ok(Self { path, raw })
    }

    /// Directory relative inventory paths are resolved against.
    pub fn dir(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Run inventory validation and return the typed model.
    pub fn validate(&self) -> Result<Inventory> {
        validate_inventory(&self.raw, &self.dir())
    }
}

/// Parse inventory YAML into the open-shaped value. An empty document is an
/// empty mapping.
pub fn parse_inventory_yaml(text: &str, path: &Path) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    match serde_yaml::from_str::<Value>(text) {
        Ok(Value::Null) => Ok(Value::Object(Map::new())),
        Ok(value) => Ok(value),
        Err(e) => Err(FleetError::Structural(format!(
            "failed to parse inventory YAML {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Serialize the typed model back to YAML and replace the file atomically.
pub fn save_inventory<P: AsRef<Path>>(path: P, inventory: &Inventory) -> Result<()> {
    let path = path.as_ref();
    let yaml = serde_yaml::to_string(inventory).map_err(|e| {
        FleetError::Structural(format!("failed to serialize inventory to YAML: {}", e))
    })?;
    atomic_write_file(path, &yaml)?;
    debug!(path = %path.display(), "saved inventory");
    Ok(())
}
