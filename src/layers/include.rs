//! Recursive `$include` resolution.

use super::dialect::parse_layer;
use crate::error::{FleetError, Result};
use crate::fs::{normalize_path, resolve_relative};
use crate::value::{Map, Value, merge};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reserved top-level key naming layers to include.
pub const INCLUDE_KEY: &str = "$include";

/// Load one layer file, following its includes.
///
/// Included layers are merged in declaration order to form the base; the
/// file's own keys are merged on top. A file that reappears in its own
/// inclusion chain fails with [`FleetError::IncludeCycle`]. Siblings that
/// include a common file each get their own copy of its content.
pub fn load_layer(path: &Path) -> Result<Value> {
    let mut chain = Vec::new();
    load_with_chain(&normalize_path(path), &mut chain)
}

fn load_with_chain(path: &Path, chain: &mut Vec<PathBuf>) -> Result<Value> {
    if chain.iter().any(|seen| seen == path) {
        let mut cycle = chain.clone();
        cycle.push(path.to_path_buf());
        return Err(FleetError::IncludeCycle {
            path: path.to_path_buf(),
            chain: cycle,
        });
    }

    if !path.is_file() {
        let kind = if chain.is_empty() {
            "config layer"
        } else {
            "included layer"
        };
        return Err(FleetError::Reference {
            kind,
            path: path.to_path_buf(),
        });
    }

    let text = std::fs::read_to_string(path)
        .map_err(|e| FleetError::io("failed to read config layer", path, e))?;
    let parsed = parse_layer(&text, path)?;

    debug!(
        layer = %path.display(),
        depth = chain.len(),
        includes = parsed.includes.len(),
        "loaded layer"
    );

    let dir = path.parent().unwrap_or(Path::new("/"));
    chain.push(path.to_path_buf());

    let mut base = Value::Object(Map::new());
    for include in &parsed.includes {
        let target = resolve_relative(dir, include);
        let included = load_with_chain(&target, chain)?;
        base = merge(base, included);
    }

    chain.pop();
    Ok(merge(base, Value::Object(parsed.body)))
}
