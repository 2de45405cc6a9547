//! Agent list mutations on a decoded instance.

use super::model::{Agent, AgentRole, Binding, Instance};
use crate::error::{FleetError, Result};
use crate::value::{Map, unique_strings};
use serde::Serialize;
use tracing::info;

/// Everything needed to add an agent.
#[derive(Debug, Clone, Default)]
pub struct AgentSpec {
    pub id: String,
    pub role: AgentRole,
    /// `channel:accountId` pairs, one binding each.
    pub accounts: Vec<String>,
    pub integrations: Vec<String>,
    pub skills: Vec<String>,
    pub model: Option<String>,
}

/// One row of `agent list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentSummary {
    pub id: String,
    pub role: AgentRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub integrations: Vec<String>,
    pub skills: Vec<String>,
    pub bindings: usize,
}

/// Split `channel:accountId`, trimming both halves.
pub fn parse_account(raw: &str) -> Result<(String, String)> {
    let bad = || {
        FleetError::UserError(format!(
            "account must follow channel:accountId format, got '{}'",
            raw
        ))
    };
    let (channel, account) = raw.split_once(':').ok_or_else(bad)?;
    let (channel, account) = (channel.trim(), account.trim());
    if channel.is_empty() || account.is_empty() {
        return Err(bad());
    }
    Ok((channel.to_string(), account.to_string()))
}

/// Append a new agent to `instance`.
///
/// Each account becomes a binding, its channel joins the agent's
/// integrations, and the account is registered under the instance channels.
pub fn add_agent(instance: &mut Instance, spec: AgentSpec) -> Result<()> {
    let id = spec.id.trim().to_string();
    if id.is_empty() {
        return Err(FleetError::UserError("agent id must not be empty".to_string()));
    }
    if instance.agents.iter().any(|a| a.id == id) {
        return Err(FleetError::Collision(format!(
            "agent already exists in instance '{}': {}",
            instance.id, id
        )));
    }

    let accounts = spec
        .accounts
        .iter()
        .map(|raw| parse_account(raw))
        .collect::<Result<Vec<_>>>()?;

    let mut integrations = unique_strings(&spec.integrations);
    let mut bindings = Vec::with_capacity(accounts.len());
    for (channel, account) in &accounts {
        if !integrations.contains(channel) {
            integrations.push(channel.clone());
        }
        bindings.push(Binding::new(channel.as_str(), account.as_str()));
    }
    for (channel, account) in &accounts {
        instance.register_account(channel, account);
    }

    let model = spec
        .model
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());

    instance.agents.push(Agent {
        id: id.clone(),
        role: spec.role,
        workspace: Some(id.clone()),
        agent_dir: Some(format!("agents/{}", id)),
        bindings,
        integrations,
        skills: unique_strings(&spec.skills),
        skill_sources: Some(vec!["workspace".to_string()]),
        model,
        policy: None,
        extra: Map::new(),
    });
    info!(instance = %instance.id, agent = %id, "agent added");
    Ok(())
}

/// Remove an agent, optionally pruning accounts nothing else binds.
pub fn remove_agent(instance: &mut Instance, agent_id: &str, prune_accounts: bool) -> Result<Agent> {
    let position = instance
        .agents
        .iter()
        .position(|a| a.id == agent_id)
        .ok_or_else(|| {
            FleetError::UserError(format!("agent not found: {}/{}", instance.id, agent_id))
        })?;
    let removed = instance.agents.remove(position);

    let pruned = if prune_accounts {
        instance.prune_accounts()
    } else {
        0
    };
    info!(instance = %instance.id, agent = %agent_id, pruned, "agent removed");
    Ok(removed)
}

pub fn list_agents(instance: &Instance) -> Vec<AgentSummary> {
    instance
        .agents
        .iter()
        .map(|a| AgentSummary {
            id: a.id.clone(),
            role: a.role,
            model: a.model.clone(),
            integrations: a.integrations.clone(),
            skills: a.skills.clone(),
            bindings: a.bindings.len(),
        })
        .collect()
}
