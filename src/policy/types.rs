//! Policy fragments as declared, and the resolved policy they produce.

use crate::value::{Map, Value};
use serde::{Deserialize, Serialize};

/// Skill source kinds allowed when no scope says otherwise.
pub const DEFAULT_SKILL_SOURCES: &[&str] = &["bundled", "managed", "workspace", "local", "shared"];

/// Allow/deny rules as written at one scope (organization, instance, agent).
///
/// Every list is optional so that an absent key can be told apart from an
/// explicitly empty one when scopes are layered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyFragment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrations: Option<IntegrationRules>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<SkillRules>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub models: Option<ModelRules>,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationRules {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deny: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillRules {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deny: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_sources: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deny_sources: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelRules {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_providers: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deny_providers: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_models: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deny_models: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fully resolved policy for one scope.
///
/// An empty allow list means unrestricted; anything in a deny list is
/// rejected even when it is also allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Policy {
    pub integrations: IntegrationPolicy,
    pub skills: SkillPolicy,
    pub models: ModelPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrationPolicy {
    pub allow: Vec<String>,
    pub deny: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillPolicy {
    pub allow: Vec<String>,
    pub deny: Vec<String>,
    pub allow_sources: Vec<String>,
    pub deny_sources: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModelPolicy {
    pub allow_providers: Vec<String>,
    pub deny_providers: Vec<String>,
    pub allow_models: Vec<String>,
    pub deny_models: Vec<String>,
}

impl Default for SkillPolicy {
    fn default() -> Self {
        Self {
            allow: Vec::new(),
            deny: Vec::new(),
            allow_sources: default_skill_sources(),
            deny_sources: Vec::new(),
        }
    }
}

pub fn default_skill_sources() -> Vec<String> {
    DEFAULT_SKILL_SOURCES.iter().map(|s| s.to_string()).collect()
}

/// Effective policy for one scope, as shown by inspection commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicySummary {
    /// `instance:<id>` or `agent:<instance>/<agent>`.
    pub scope: String,
    pub policy: Policy,
}
