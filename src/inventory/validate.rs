//! Inventory-wide validation.
//!
//! One pass over the raw document decodes typed records and runs every
//! cross-entity check (port ranges, path roles, identifiers, bindings,
//! layer files). Issues accumulate in a [`ValidationReport`]; the typed
//! [`Inventory`] is only returned when the report is empty.

use super::decode::{
    Fields, decode_agent, decode_channels, decode_defaults, decode_host, decode_paths,
    decode_runtime,
};
use super::model::{Agent, Instance, Inventory, PathRole, SUPPORTED_VERSION};
use super::report::ValidationReport;
use crate::error::{FleetError, Result};
use crate::fs::resolve_relative;
use crate::value::{Map, Value, kind_of};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const INSTANCE_KEYS: &[&str] = &[
    "id", "host", "paths", "runtime", "openclaw", "agents", "channels", "policy",
];

/// Validate a raw inventory document and decode it.
///
/// `inventory_dir` is the directory relative paths (path roles, config
/// layers) are resolved against.
pub fn validate_inventory(raw: &Value, inventory_dir: &Path) -> Result<Inventory> {
    let mut report = ValidationReport::new();
    let inventory = walk(raw, inventory_dir, &mut report);
    debug!(issues = report.len(), "inventory validation finished");
    match inventory {
        Some(inventory) if report.is_empty() => Ok(inventory),
        _ => Err(FleetError::Validation(report)),
    }
}

fn walk(raw: &Value, inventory_dir: &Path, report: &mut ValidationReport) -> Option<Inventory> {
    let Value::Object(root) = raw else {
        report.structural(format!("inventory must be a mapping, got {}", kind_of(raw)));
        return None;
    };
    let root_fields = Fields::new(root, "");

    let version = root.get("version").and_then(Value::as_u64);
    if version != Some(SUPPORTED_VERSION) {
        report.structural(format!("version must be {}", SUPPORTED_VERSION));
    }

    let raw_instances = match root.get("instances") {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => {
            report.structural("instances must be a non-empty list");
            return None;
        }
    };

    let defaults = decode_defaults(root_fields.optional_mapping("defaults", report), report);
    let policy = root_fields.policy("policy", report);
    let stride = defaults.port_stride();

    let mut ids = HashSet::new();
    let mut ports = PortRanges::default();
    let mut paths = PathRoles::default();
    let mut instances = Vec::with_capacity(raw_instances.len());

    for (index, raw_instance) in raw_instances.iter().enumerate() {
        let label = format!("instances[{}]", index);
        let Value::Object(map) = raw_instance else {
            report.structural(format!("{} must be a mapping", label));
            continue;
        };
        let fields = Fields::new(map, &label);

        let id = match map.get("id") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            _ => {
                report.structural(format!("{}.id must be a non-empty string", label));
                continue;
            }
        };
        if !ids.insert(id.clone()) {
            report.collision(format!("duplicate instance id: {}", id));
            continue;
        }

        if let Some(instance) = check_instance(
            &id,
            fields,
            inventory_dir,
            stride,
            &mut ports,
            &mut paths,
            report,
        ) {
            instances.push(instance);
        }
    }

    Some(Inventory {
        version: version.unwrap_or_default(),
        defaults,
        policy,
        instances,
        extra: root_fields.extra(&["version", "defaults", "policy", "instances"]),
    })
}

#[allow(clippy::too_many_arguments)]
fn check_instance(
    id: &str,
    fields: Fields<'_>,
    inventory_dir: &Path,
    stride: u32,
    ports: &mut PortRanges,
    paths: &mut PathRoles,
    report: &mut ValidationReport,
) -> Option<Instance> {
    let host_label = format!("{}.host", fields.label);
    let host = fields
        .mapping("host", report)
        .and_then(|m| decode_host(Fields::new(m, &host_label), report));
    if let Some(host) = &host {
        ports.claim(id, host.gateway_port, stride, report);
    }

    let paths_label = format!("{}.paths", fields.label);
    let instance_paths = fields.mapping("paths", report).and_then(|m| {
        paths.claim(id, m, inventory_dir, report);
        decode_paths(Fields::new(m, &paths_label), report)
    });

    let runtime = decode_runtime(fields, report);
    if let Some(runtime) = &runtime {
        for layer in &runtime.config_layers {
            if !resolve_relative(inventory_dir, layer).is_file() {
                report.reference(format!("missing config layer for {}: {}", id, layer));
            }
        }
    }

    let agents = check_agents(fields, report);
    if agents.is_empty() {
        warn!(instance = %id, "instance declares no agents");
    }

    let channels = decode_channels(fields, report);
    let policy = fields.policy("policy", report);

    Some(Instance {
        id: id.to_string(),
        host: host?,
        paths: instance_paths?,
        runtime: runtime?,
        agents,
        channels,
        policy,
        extra: fields.extra(INSTANCE_KEYS),
    })
}

/// Decode agents and check per-instance uniqueness of ids, workspaces,
/// state directories, and (channel, account) bindings.
fn check_agents(instance: Fields<'_>, report: &mut ValidationReport) -> Vec<Agent> {
    let items = match instance.map.get("agents") {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => {
            report.structural(format!("{}.agents must be a list", instance.label));
            return Vec::new();
        }
    };

    let mut ids = HashSet::new();
    let mut workspaces = HashSet::new();
    let mut agent_dirs = HashSet::new();
    let mut bindings = HashSet::new();
    let mut out = Vec::with_capacity(items.len());

    for (i, item) in items.iter().enumerate() {
        let label = format!("{}.agents[{}]", instance.label, i);
        let Value::Object(map) = item else {
            report.structural(format!("{} must be a mapping", label));
            continue;
        };
        let Some(agent) = decode_agent(Fields::new(map, &label), report) else {
            continue;
        };

        if !ids.insert(agent.id.clone()) {
            report.collision(format!("duplicate agent id in instance: {}", agent.id));
            continue;
        }
        let workspace = agent.workspace_name().to_string();
        if !workspaces.insert(workspace.clone()) {
            report.collision(format!("duplicate workspace in instance: {}", workspace));
        }
        let agent_dir = agent.agent_dir_name();
        if !agent_dirs.insert(agent_dir.clone()) {
            report.collision(format!("duplicate agent_dir in instance: {}", agent_dir));
        }
        for binding in &agent.bindings {
            let key = binding.key();
            if !bindings.insert(key.clone()) {
                report.collision(format!(
                    "duplicate channel/account binding in instance: {}",
                    key
                ));
            }
        }
        out.push(agent);
    }
    out
}

/// Claimed gateway port ranges, `[port, port + stride - 1]` clamped to 65535.
#[derive(Default)]
struct PortRanges {
    claimed: Vec<(u32, u32, String)>,
}

impl PortRanges {
    fn claim(&mut self, id: &str, port: u16, stride: u32, report: &mut ValidationReport) {
        let start = u32::from(port);
        let end = (u64::from(start) + u64::from(stride) - 1).min(65535) as u32;
        for (prev_start, prev_end, prev_id) in &self.claimed {
            if !(end < *prev_start || start > *prev_end) {
                report.collision(format!(
                    "port range collision {}({}-{}) overlaps {}({}-{})",
                    id, start, end, prev_id, prev_start, prev_end
                ));
            }
        }
        self.claimed.push((start, end, id.to_string()));
    }
}

/// Claimed filesystem locations, tracked separately per path role.
#[derive(Default)]
struct PathRoles {
    claimed: HashMap<(PathRole, PathBuf), String>,
}

impl PathRoles {
    fn claim(
        &mut self,
        id: &str,
        raw_paths: &Map<String, Value>,
        inventory_dir: &Path,
        report: &mut ValidationReport,
    ) {
        for role in PathRole::ALL {
            let Some(Value::String(raw)) = raw_paths.get(role.key()) else {
                continue;
            };
            if raw.trim().is_empty() {
                continue;
            }
            let resolved = resolve_relative(inventory_dir, raw);
            if let Some(prev) = self.claimed.get(&(role, resolved.clone())) {
                report.collision(format!(
                    "path collision for {}: {} shares {} with {}",
                    role, id, raw, prev
                ));
                continue;
            }
            self.claimed.insert((role, resolved), id.to_string());
        }
    }
}
