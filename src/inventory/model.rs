//! Typed inventory records.
//!
//! These are produced only by the validating decoder and written back with
//! serde. Unknown keys at each level land in `extra` so a load/save cycle
//! does not drop fields this tool does not interpret (image tags, enable
//! flags, per-account metadata).

use crate::error::{FleetError, Result};
use crate::fs::resolve_relative;
use crate::policy::PolicyFragment;
use crate::value::{Map, Value};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// The only inventory schema version understood.
pub const SUPPORTED_VERSION: u64 = 1;

/// Ports reserved per instance when `defaults.port_stride` is unset.
pub const DEFAULT_PORT_STRIDE: u32 = 20;

/// Agent skill sources assumed when an agent declares none.
pub const DEFAULT_AGENT_SKILL_SOURCES: &[&str] = &["workspace"];

/// Root inventory document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inventory {
    pub version: u64,

    #[serde(skip_serializing_if = "Defaults::is_empty")]
    pub defaults: Defaults,

    /// Organization-level policy override, layered over `defaults.policy`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<PolicyFragment>,

    pub instances: Vec<Instance>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Inventory {
    /// Find an instance by identifier.
    pub fn instance(&self, id: &str) -> Result<&Instance> {
        self.instances
            .iter()
            .find(|i| i.id == id)
            .ok_or_else(|| FleetError::UserError(format!("instance not found: {}", id)))
    }

    /// Find an instance by identifier for mutation.
    pub fn instance_mut(&mut self, id: &str) -> Result<&mut Instance> {
        self.instances
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| FleetError::UserError(format!("instance not found: {}", id)))
    }

    /// Convert back to the open-shaped document form.
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| {
            FleetError::Structural(format!("failed to serialize inventory: {}", e))
        })
    }
}

/// Organization-wide defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Defaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_stride: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<PolicyFragment>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Defaults {
    pub fn port_stride(&self) -> u32 {
        self.port_stride.unwrap_or(DEFAULT_PORT_STRIDE)
    }

    fn is_empty(&self) -> bool {
        self.port_stride.is_none() && self.policy.is_none() && self.extra.is_empty()
    }
}

/// One deployed gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instance {
    pub id: String,
    pub host: Host,
    pub paths: InstancePaths,
    pub runtime: RuntimeBlock,
    pub agents: Vec<Agent>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub channels: BTreeMap<String, Channel>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<PolicyFragment>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Instance {
    pub fn agent(&self, id: &str) -> Result<&Agent> {
        self.agents.iter().find(|a| a.id == id).ok_or_else(|| {
            FleetError::UserError(format!("agent not found: {}/{}", self.id, id))
        })
    }

    /// All bindings across agents, each paired with its owning agent.
    pub fn bindings(&self) -> impl Iterator<Item = (&Agent, &Binding)> {
        self.agents
            .iter()
            .flat_map(|agent| agent.bindings.iter().map(move |b| (agent, b)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Host {
    pub gateway_port: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The four filesystem roles an instance owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathRole {
    ConfigDir,
    StateDir,
    WorkspaceRoot,
    GeneratedDir,
}

impl PathRole {
    pub const ALL: [PathRole; 4] = [
        PathRole::ConfigDir,
        PathRole::StateDir,
        PathRole::WorkspaceRoot,
        PathRole::GeneratedDir,
    ];

    /// Key used for this role under `paths`.
    pub fn key(self) -> &'static str {
        match self {
            PathRole::ConfigDir => "config_dir",
            PathRole::StateDir => "state_dir",
            PathRole::WorkspaceRoot => "workspace_root",
            PathRole::GeneratedDir => "generated_dir",
        }
    }
}

impl fmt::Display for PathRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Path roles as written, relative to the inventory file's directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstancePaths {
    pub config_dir: String,
    pub state_dir: String,
    pub workspace_root: String,
    pub generated_dir: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InstancePaths {
    pub fn get(&self, role: PathRole) -> &str {
        match role {
            PathRole::ConfigDir => &self.config_dir,
            PathRole::StateDir => &self.state_dir,
            PathRole::WorkspaceRoot => &self.workspace_root,
            PathRole::GeneratedDir => &self.generated_dir,
        }
    }

    /// Absolute, normalised location of `role`.
    pub fn resolve(&self, role: PathRole, inventory_dir: &Path) -> PathBuf {
        resolve_relative(inventory_dir, self.get(role))
    }
}

/// Runtime container settings: layer list plus keys passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeBlock {
    pub config_layers: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Human,
    #[default]
    Usecase,
}

impl AgentRole {
    /// Parse a role from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "human" => Some(Self::Human),
            "usecase" => Some(Self::Usecase),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgentRole::Human => "human",
            AgentRole::Usecase => "usecase",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One routable identity within an instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Agent {
    pub id: String,
    pub role: AgentRole,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_dir: Option<String>,

    pub bindings: Vec<Binding>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub integrations: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_sources: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<PolicyFragment>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Agent {
    /// Workspace directory name; defaults to the agent id.
    pub fn workspace_name(&self) -> &str {
        self.workspace.as_deref().unwrap_or(&self.id)
    }

    /// State directory name; defaults to `agents/<id>`.
    pub fn agent_dir_name(&self) -> String {
        self.agent_dir
            .clone()
            .unwrap_or_else(|| format!("agents/{}", self.id))
    }

    /// Declared skill sources, or the default when none are declared.
    pub fn skill_sources(&self) -> Vec<String> {
        match &self.skill_sources {
            Some(sources) => sources.clone(),
            None => DEFAULT_AGENT_SKILL_SOURCES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// A (channel, account) routing rule, persisted as `{match: {channel, accountId}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binding {
    #[serde(rename = "match")]
    pub matcher: BindingMatch,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindingMatch {
    pub channel: String,

    #[serde(rename = "accountId")]
    pub account_id: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Binding {
    pub fn new(channel: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            matcher: BindingMatch {
                channel: channel.into(),
                account_id: account_id.into(),
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }

    pub fn channel(&self) -> &str {
        &self.matcher.channel
    }

    pub fn account_id(&self) -> &str {
        &self.matcher.account_id
    }

    /// `channel:account` key, unique within an instance.
    pub fn key(&self) -> String {
        format!("{}:{}", self.matcher.channel, self.matcher.account_id)
    }
}

/// Per-channel record. Accounts are always held (and written) as a mapping
/// from account id to per-account metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Channel {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub accounts: BTreeMap<String, Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
