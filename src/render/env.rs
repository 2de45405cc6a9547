//! `${NAME}` / `${NAME:-fallback}` substitution over a resolved tree.

use crate::error::{FleetError, Result};
use crate::value::Value;
use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").expect("Invalid placeholder regex")
});

/// Where placeholder values come from.
pub trait EnvSource {
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl<S: BuildHasher> EnvSource for HashMap<String, String, S> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Substitute placeholders in every string in `value`. Keys are left alone.
pub fn interpolate(value: Value, env: &dyn EnvSource) -> Result<Value> {
    Ok(match value {
        Value::String(s) => Value::String(interpolate_str(&s, env)?),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| interpolate(item, env))
                .collect::<Result<_>>()?,
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| interpolate(v, env).map(|v| (k, v)))
                .collect::<Result<_>>()?,
        ),
        other => other,
    })
}

/// Substitute placeholders in one string. Substituted text is not rescanned.
///
/// Fails on the first placeholder whose variable is unset and which has no
/// fallback.
pub fn interpolate_str(text: &str, env: &dyn EnvSource) -> Result<String> {
    if !text.contains("${") {
        return Ok(text.to_string());
    }

    let mut missing: Option<String> = None;
    let replaced = PLACEHOLDER.replace_all(text, |caps: &Captures| {
        let name = &caps[1];
        match (env.var(name), caps.get(2)) {
            (Some(value), _) => value,
            (None, Some(fallback)) => fallback.as_str().to_string(),
            (None, None) => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(FleetError::MissingVariable { name }),
        None => Ok(replaced.into_owned()),
    }
}
