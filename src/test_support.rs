use crate::inventory::{Inventory, LoadedInventory, validate_inventory};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};
use tempfile::TempDir;

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not thread-safe.
        // Lock it so tests don't race even if a #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

pub(crate) const FLEET_YAML: &str = r#"version: 1
defaults:
  port_stride: 20
  policy:
    integrations:
      allow: [telegram, slack, discord]
instances:
  - id: core
    host:
      gateway_port: 18789
      bind: loopback
    paths:
      config_dir: ../instances/core/config
      state_dir: ../instances/core/state
      workspace_root: ../instances/core/workspaces
      generated_dir: ../instances/core/generated
    runtime:
      image: gateway:2026.1
      config_layers:
        - ../config/base.json5
        - ../config/core.json5
    agents:
      - id: ops
        role: human
        model: anthropic/claude-sonnet
        skills: [triage]
        bindings:
          - match:
              channel: telegram
              accountId: ops-bot
    channels:
      telegram:
        accounts: [ops-bot]
  - id: lab
    host:
      gateway_port: 18809
    paths:
      config_dir: ../instances/lab/config
      state_dir: ../instances/lab/state
      workspace_root: ../instances/lab/workspaces
      generated_dir: ../instances/lab/generated
    runtime:
      config_layers:
        - ../config/base.json5
    agents:
      - id: research
        bindings:
          - match:
              channel: slack
              account_id: lab-ws
"#;

pub(crate) const BASE_LAYER: &str = r#"{
  // shared by every instance
  gateway: {
    mode: "local",
    auth: { token: "${GATEWAY_TOKEN:-dev-token}" },
  },
  tools: ["read"],
}
"#;

pub(crate) const CORE_LAYER: &str = r#"{
  tools: ["exec"],
  logging: { level: "info" },
}
"#;

/// A fleet on disk: `inventory/instances.yaml` plus its config layers.
pub(crate) fn create_test_fleet() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "inventory/instances.yaml", FLEET_YAML);
    write_file(temp_dir.path(), "config/base.json5", BASE_LAYER);
    write_file(temp_dir.path(), "config/core.json5", CORE_LAYER);
    temp_dir
}

pub(crate) fn inventory_path(root: &Path) -> PathBuf {
    root.join("inventory/instances.yaml")
}

pub(crate) fn load_fleet(root: &Path) -> Inventory {
    LoadedInventory::load(inventory_path(root))
        .unwrap()
        .validate()
        .unwrap()
}

pub(crate) fn write_file(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

/// Minimal valid instance record with paths under `<id>/` and one layer
/// `base.json5` next to the inventory.
pub(crate) fn instance_value(id: &str, port: u64) -> Value {
    json!({
        "id": id,
        "host": { "gateway_port": port },
        "paths": {
            "config_dir": format!("{}/config", id),
            "state_dir": format!("{}/state", id),
            "workspace_root": format!("{}/workspaces", id),
            "generated_dir": format!("{}/generated", id),
        },
        "runtime": { "config_layers": ["base.json5"] },
        "agents": [
            {
                "id": "main",
                "bindings": [ { "match": { "channel": "telegram", "accountId": format!("{}-bot", id) } } ],
            }
        ],
    })
}

pub(crate) fn inventory_value(instances: Vec<Value>) -> Value {
    json!({ "version": 1, "instances": instances })
}

/// Temp directory holding the `base.json5` layer referenced by [`instance_value`].
pub(crate) fn layer_dir() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "base.json5", "{}");
    temp_dir
}

/// Validate `raw` against a fresh [`layer_dir`] and return the typed model.
pub(crate) fn decode(raw: &Value) -> Inventory {
    let dir = layer_dir();
    validate_inventory(raw, dir.path()).unwrap()
}
