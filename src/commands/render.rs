//! Implementation of the `fleetconf render` command.
//!
//! # Steps
//!
//! 1. Load and validate the inventory, evaluate policy
//! 2. Resolve the instance's layers, overlay, and placeholders
//! 3. Unless `--dry-run`: create the instance directories, write both
//!    copies of the resolved config, the render summary, and the effective
//!    policy, then append a `render` event

use super::{display_path, inventory_dir, load_and_validate};
use crate::context::InstanceContext;
use crate::error::Result;
use crate::events::{Event, EventAction, append_event};
use crate::fs::write_json_pretty;
use crate::policy::instance_summaries;
use crate::render::{EnvSource, resolve_instance_config, write_outputs};
use crate::value::Value;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use tracing::info;

/// Counts taken from the resolved configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderCounts {
    pub agents: usize,
    pub bindings: usize,
    pub channels: usize,
}

impl RenderCounts {
    fn of(config: &Value) -> Self {
        Self {
            agents: config
                .pointer("/agents/list")
                .and_then(Value::as_array)
                .map_or(0, Vec::len),
            bindings: config
                .get("bindings")
                .and_then(Value::as_array)
                .map_or(0, Vec::len),
            channels: config
                .get("channels")
                .and_then(Value::as_object)
                .map_or(0, |m| m.len()),
        }
    }
}

/// Written next to the resolved config. The timestamp lives only here so
/// the resolved config itself stays byte-stable.
#[derive(Debug, Serialize)]
struct RenderSummary<'a> {
    instance: &'a str,
    rendered_at: DateTime<Utc>,
    #[serde(flatten)]
    counts: RenderCounts,
}

#[derive(Debug, Serialize)]
pub struct RenderOutput {
    pub instance: String,
    pub dry_run: bool,
    pub generated_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_config_path: Option<String>,
    pub summary: RenderCounts,
}

pub fn run_render(
    inventory_path: &Path,
    instance_id: &str,
    dry_run: bool,
    env: &dyn EnvSource,
) -> Result<RenderOutput> {
    let (_, inventory) = load_and_validate(inventory_path)?;
    let instance = inventory.instance(instance_id)?;
    let ctx = InstanceContext::new(instance, inventory_path);

    let config = resolve_instance_config(&ctx, instance, env)?;
    let counts = RenderCounts::of(&config);

    if dry_run {
        info!(instance = %instance_id, "dry run, nothing written");
        return Ok(RenderOutput {
            instance: instance_id.to_string(),
            dry_run: true,
            generated_path: display_path(&ctx.resolved_config_path()),
            runtime_config_path: None,
            summary: counts,
        });
    }

    ctx.ensure_dirs()?;
    let written = write_outputs(&ctx, &config)?;

    write_json_pretty(
        ctx.render_summary_path(),
        &RenderSummary {
            instance: instance_id,
            rendered_at: Utc::now(),
            counts,
        },
    )?;
    write_json_pretty(
        ctx.effective_policy_path(),
        &instance_summaries(&inventory, instance)?,
    )?;

    append_event(
        &inventory_dir(inventory_path),
        &Event::new(EventAction::Render)
            .with_instance(instance_id)
            .with_details(json!({
                "generated_path": display_path(&written.resolved),
                "agents": counts.agents,
                "bindings": counts.bindings,
            })),
    )?;

    Ok(RenderOutput {
        instance: instance_id.to_string(),
        dry_run: false,
        generated_path: display_path(&written.resolved),
        runtime_config_path: Some(display_path(&written.mounted)),
        summary: counts,
    })
}
