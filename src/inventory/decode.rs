//! Field-level decoding from the open-shaped document into typed records.
//!
//! Every helper reports shape problems into the shared [`ValidationReport`]
//! and returns what it could salvage, so one pass surfaces every issue.

use super::model::{
    Agent, AgentRole, Binding, BindingMatch, Channel, Defaults, Host, InstancePaths,
    RuntimeBlock,
};
use super::report::ValidationReport;
use crate::policy::PolicyFragment;
use crate::value::{Map, Value, kind_of};
use std::collections::BTreeMap;

/// Runtime block key, and the older name still accepted on read.
pub const RUNTIME_KEY: &str = "runtime";
pub const LEGACY_RUNTIME_KEY: &str = "openclaw";

/// A mapping plus the dotted label used to name it in messages.
#[derive(Clone, Copy)]
pub(super) struct Fields<'a> {
    pub map: &'a Map<String, Value>,
    pub label: &'a str,
}

impl<'a> Fields<'a> {
    pub fn new(map: &'a Map<String, Value>, label: &'a str) -> Self {
        Self { map, label }
    }

    fn path(&self, key: &str) -> String {
        if self.label.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.label, key)
        }
    }

    /// Required nested mapping.
    pub fn mapping(&self, key: &str, report: &mut ValidationReport) -> Option<&'a Map<String, Value>> {
        match self.map.get(key) {
            Some(Value::Object(m)) => Some(m),
            _ => {
                report.structural(format!("{} must be a mapping", self.path(key)));
                None
            }
        }
    }

    /// Optional nested mapping; `null` counts as absent.
    pub fn optional_mapping(
        &self,
        key: &str,
        report: &mut ValidationReport,
    ) -> Option<&'a Map<String, Value>> {
        match self.map.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::Object(m)) => Some(m),
            Some(other) => {
                report.structural(format!(
                    "{} must be a mapping, got {}",
                    self.path(key),
                    kind_of(other)
                ));
                None
            }
        }
    }

    /// Required non-empty string.
    pub fn string(&self, key: &str, report: &mut ValidationReport) -> Option<String> {
        match self.map.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            _ => {
                report.structural(format!("{} must be a non-empty string", self.path(key)));
                None
            }
        }
    }

    /// Optional string; present values must be non-empty strings.
    pub fn optional_string(&self, key: &str, report: &mut ValidationReport) -> Option<String> {
        match self.map.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(_) => {
                report.structural(format!("{} must be a non-empty string", self.path(key)));
                None
            }
        }
    }

    /// Optional list of strings.
    pub fn optional_string_list(
        &self,
        key: &str,
        report: &mut ValidationReport,
    ) -> Option<Vec<String>> {
        match self.map.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    match item {
                        Value::String(s) => out.push(s.clone()),
                        other => report.structural(format!(
                            "{}[{}] must be a string, got {}",
                            self.path(key),
                            i,
                            kind_of(other)
                        )),
                    }
                }
                Some(out)
            }
            Some(other) => {
                report.structural(format!(
                    "{} must be a list, got {}",
                    self.path(key),
                    kind_of(other)
                ));
                None
            }
        }
    }

    pub fn string_list(&self, key: &str, report: &mut ValidationReport) -> Vec<String> {
        self.optional_string_list(key, report).unwrap_or_default()
    }

    /// Optional policy fragment at `key`.
    pub fn policy(&self, key: &str, report: &mut ValidationReport) -> Option<PolicyFragment> {
        let raw = self.optional_mapping(key, report)?;
        match serde_json::from_value(Value::Object(raw.clone())) {
            Ok(fragment) => Some(fragment),
            Err(e) => {
                report.structural(format!("{} is not a valid policy: {}", self.path(key), e));
                None
            }
        }
    }

    /// Keys not in `known`, copied in document order.
    pub fn extra(&self, known: &[&str]) -> Map<String, Value> {
        self.map
            .iter()
            .filter(|(k, _)| !known.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

pub(super) fn decode_defaults(
    raw: Option<&Map<String, Value>>,
    report: &mut ValidationReport,
) -> Defaults {
    let Some(map) = raw else {
        return Defaults::default();
    };
    let fields = Fields::new(map, "defaults");

    let port_stride = match map.get("port_stride") {
        None | Some(Value::Null) => None,
        Some(value) => match value.as_u64() {
            Some(n) if n >= 1 => Some(u32::try_from(n).unwrap_or(u32::MAX)),
            _ => {
                report.structural("defaults.port_stride must be a positive integer");
                None
            }
        },
    };

    Defaults {
        port_stride,
        policy: fields.policy("policy", report),
        extra: fields.extra(&["port_stride", "policy"]),
    }
}

pub(super) fn decode_host(fields: Fields<'_>, report: &mut ValidationReport) -> Option<Host> {
    let port = match fields.map.get("gateway_port").and_then(Value::as_u64) {
        Some(p) if (1..=65535).contains(&p) => Some(p as u16),
        _ => {
            report.structural(format!(
                "{}.gateway_port must be a valid port integer",
                fields.label
            ));
            None
        }
    };
    let bind = fields.optional_string("bind", report);
    Some(Host {
        gateway_port: port?,
        bind,
        extra: fields.extra(&["gateway_port", "bind"]),
    })
}

pub(super) fn decode_paths(
    fields: Fields<'_>,
    report: &mut ValidationReport,
) -> Option<InstancePaths> {
    let config_dir = fields.string("config_dir", report);
    let state_dir = fields.string("state_dir", report);
    let workspace_root = fields.string("workspace_root", report);
    let generated_dir = fields.string("generated_dir", report);
    Some(InstancePaths {
        config_dir: config_dir?,
        state_dir: state_dir?,
        workspace_root: workspace_root?,
        generated_dir: generated_dir?,
        extra: fields.extra(&["config_dir", "state_dir", "workspace_root", "generated_dir"]),
    })
}

/// Runtime block under `runtime`, falling back to the legacy key.
pub(super) fn decode_runtime(
    instance: Fields<'_>,
    report: &mut ValidationReport,
) -> Option<RuntimeBlock> {
    let key = if !instance.map.contains_key(RUNTIME_KEY)
        && instance.map.contains_key(LEGACY_RUNTIME_KEY)
    {
        LEGACY_RUNTIME_KEY
    } else {
        RUNTIME_KEY
    };
    let map = instance.mapping(key, report)?;
    let label = format!("{}.{}", instance.label, key);
    let fields = Fields::new(map, &label);

    let layers = match map.get("config_layers") {
        Some(Value::Array(items)) if !items.is_empty() => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::String(s) => out.push(s.clone()),
                    _ => report.structural(format!("{}.config_layers[{}] must be a string", label, i)),
                }
            }
            out
        }
        _ => {
            report.structural(format!("{}.config_layers must be a non-empty list", label));
            return None;
        }
    };

    Some(RuntimeBlock {
        config_layers: layers,
        extra: fields.extra(&["config_layers"]),
    })
}

/// Decode one agent. Returns `None` when the id is unusable.
pub(super) fn decode_agent(fields: Fields<'_>, report: &mut ValidationReport) -> Option<Agent> {
    let id = match fields.map.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => {
            report.structural(format!("{}.id must be a non-empty string", fields.label));
            return None;
        }
    };

    let role = match fields.map.get("role") {
        None | Some(Value::Null) => AgentRole::default(),
        Some(Value::String(s)) => AgentRole::from_str(s).unwrap_or_else(|| {
            report.structural(format!(
                "{}.role must be one of: human, usecase (got '{}')",
                fields.label, s
            ));
            AgentRole::default()
        }),
        Some(other) => {
            report.structural(format!(
                "{}.role must be a string, got {}",
                fields.label,
                kind_of(other)
            ));
            AgentRole::default()
        }
    };

    let bindings = decode_bindings(fields, report);

    Some(Agent {
        id,
        role,
        workspace: fields.optional_string("workspace", report),
        agent_dir: fields.optional_string("agent_dir", report),
        bindings,
        integrations: fields.string_list("integrations", report),
        skills: fields.string_list("skills", report),
        skill_sources: fields.optional_string_list("skill_sources", report),
        model: fields.optional_string("model", report),
        policy: fields.policy("policy", report),
        extra: fields.extra(&[
            "id",
            "role",
            "workspace",
            "agent_dir",
            "bindings",
            "integrations",
            "skills",
            "skill_sources",
            "model",
            "policy",
        ]),
    })
}

fn decode_bindings(agent: Fields<'_>, report: &mut ValidationReport) -> Vec<Binding> {
    let items = match agent.map.get("bindings") {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => {
            report.structural(format!("{}.bindings must be a non-empty list", agent.label));
            return Vec::new();
        }
    };

    let mut out = Vec::with_capacity(items.len());
    for (j, item) in items.iter().enumerate() {
        let label = format!("{}.bindings[{}]", agent.label, j);
        let Value::Object(binding) = item else {
            report.structural(format!("{} must be a mapping", label));
            continue;
        };
        let Some(Value::Object(matcher)) = binding.get("match") else {
            report.structural(format!("{}.match must be a mapping", label));
            continue;
        };

        let channel = non_empty_str(matcher.get("channel"));
        let account = non_empty_str(matcher.get("accountId"))
            .or_else(|| non_empty_str(matcher.get("account_id")));
        let (Some(channel), Some(account)) = (channel, account) else {
            report.structural(format!(
                "{}.match requires channel and accountId/account_id for routing",
                label
            ));
            continue;
        };

        let match_fields = Fields::new(matcher, &label);
        let binding_fields = Fields::new(binding, &label);
        out.push(Binding {
            matcher: BindingMatch {
                channel: channel.to_string(),
                account_id: account.to_string(),
                extra: match_fields.extra(&["channel", "accountId", "account_id"]),
            },
            extra: binding_fields.extra(&["match"]),
        });
    }
    out
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}

/// Decode `channels`, accepting a list of account ids or a mapping with
/// `accounts` as either a list or a mapping.
pub(super) fn decode_channels(
    instance: Fields<'_>,
    report: &mut ValidationReport,
) -> BTreeMap<String, Channel> {
    let Some(raw) = instance.optional_mapping("channels", report) else {
        return BTreeMap::new();
    };

    let mut out = BTreeMap::new();
    for (name, value) in raw {
        let label = format!("{}.channels.{}", instance.label, name);
        let channel = match value {
            Value::Null => Channel::default(),
            Value::Array(items) => Channel {
                accounts: account_list(items, &label, report),
                extra: Map::new(),
            },
            Value::Object(map) => {
                let accounts = match map.get("accounts") {
                    None | Some(Value::Null) => BTreeMap::new(),
                    Some(Value::Array(items)) => {
                        account_list(items, &format!("{}.accounts", label), report)
                    }
                    Some(Value::Object(accounts)) => accounts
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect(),
                    Some(other) => {
                        report.structural(format!(
                            "{}.accounts must be a list or mapping, got {}",
                            label,
                            kind_of(other)
                        ));
                        BTreeMap::new()
                    }
                };
                Channel {
                    accounts,
                    extra: Fields::new(map, &label).extra(&["accounts"]),
                }
            }
            other => {
                report.structural(format!(
                    "{} must be a list or mapping, got {}",
                    label,
                    kind_of(other)
                ));
                continue;
            }
        };
        out.insert(name.clone(), channel);
    }
    out
}

fn account_list(
    items: &[Value],
    label: &str,
    report: &mut ValidationReport,
) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();
    for (i, item) in items.iter().enumerate() {
        match item {
            Value::String(id) => {
                out.entry(id.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
            }
            other => report.structural(format!(
                "{}[{}] must be a string, got {}",
                label,
                i,
                kind_of(other)
            )),
        }
    }
    out
}
