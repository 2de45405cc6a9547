//! Values derived from the inventory that are merged over the layers.

use crate::context::{CONTAINER_STATE_DIR, CONTAINER_WORKSPACE_DIR, InstanceContext};
use crate::error::{FleetError, Result};
use crate::inventory::Instance;
use crate::value::{Map, Value};
use serde_json::json;

/// Build the overlay for `instance`: gateway host settings, agent
/// descriptors, flattened bindings, and channel accounts.
pub fn runtime_overlay(instance: &Instance, ctx: &InstanceContext) -> Result<Value> {
    let mut agents = Vec::with_capacity(instance.agents.len());
    let mut bindings = Vec::new();
    let mut primary_model: Option<&str> = None;

    for agent in &instance.agents {
        let mut descriptor = Map::new();
        descriptor.insert("id".into(), json!(agent.id));
        descriptor.insert(
            "workspace".into(),
            json!(format!("{}/{}", CONTAINER_WORKSPACE_DIR, agent.workspace_name())),
        );
        descriptor.insert(
            "agentDir".into(),
            json!(format!("{}/{}", CONTAINER_STATE_DIR, agent.agent_dir_name())),
        );
        descriptor.insert("role".into(), json!(agent.role.as_str()));
        if let Some(model) = &agent.model {
            descriptor.insert("model".into(), json!(model));
            primary_model.get_or_insert(model.as_str());
        }
        agents.push(Value::Object(descriptor));

        for binding in &agent.bindings {
            let mut bound = to_value(binding)?;
            if let Value::Object(map) = &mut bound {
                map.insert("agentId".into(), json!(agent.id));
            }
            bindings.push(bound);
        }
    }

    let mut agents_block = Map::new();
    if let Some(model) = primary_model {
        agents_block.insert("defaults".into(), json!({ "model": { "primary": model } }));
    }
    agents_block.insert("list".into(), Value::Array(agents));

    Ok(json!({
        "gateway": {
            "port": ctx.gateway_port,
            "bind": ctx.runtime_bind(),
        },
        "agents": agents_block,
        "bindings": bindings,
        "channels": to_value(&instance.channels)?,
    }))
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| FleetError::Structural(format!("failed to build runtime overlay: {}", e)))
}
