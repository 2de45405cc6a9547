//! Resolved runtime configuration.
//!
//! Layers are loaded in declaration order (each following its own
//! `$include`s) and merged left to right. The runtime overlay derived from
//! the inventory goes on top, then `${NAME}` placeholders are substituted.
//! The result is the container's only configuration input.

mod env;
mod overlay;


pub use env::{EnvSource, ProcessEnv, interpolate, interpolate_str};
pub use overlay::runtime_overlay;

use crate::context::InstanceContext;
use crate::error::Result;
use crate::fs::write_json_pretty;
use crate::inventory::Instance;
use crate::layers::load_layer;
use crate::value::{Value, merge, merge_all};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Load and merge layer files in order.
pub fn resolve_layers<P: AsRef<Path>>(paths: &[P]) -> Result<Value> {
    let layers = paths
        .iter()
        .map(|path| load_layer(path.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    Ok(merge_all(layers))
}

/// Fully resolve the configuration for one instance.
pub fn resolve_instance_config(
    ctx: &InstanceContext,
    instance: &Instance,
    env: &dyn EnvSource,
) -> Result<Value> {
    let layers = ctx.layer_paths(instance);
    debug!(instance = %ctx.id, layers = layers.len(), "resolving config layers");
    let merged = resolve_layers(&layers)?;
    let merged = merge(merged, runtime_overlay(instance, ctx)?);
    interpolate(merged, env)
}

/// Paths a render wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenConfig {
    pub resolved: PathBuf,
    pub mounted: PathBuf,
}

/// Write the resolved configuration to the generated dir and the mounted
/// config dir.
pub fn write_outputs(ctx: &InstanceContext, config: &Value) -> Result<WrittenConfig> {
    let written = WrittenConfig {
        resolved: ctx.resolved_config_path(),
        mounted: ctx.mounted_config_path(),
    };
    write_json_pretty(&written.resolved, config)?;
    write_json_pretty(&written.mounted, config)?;
    info!(instance = %ctx.id, path = %written.resolved.display(), "wrote resolved config");
    Ok(written)
}
