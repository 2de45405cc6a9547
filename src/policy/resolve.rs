//! Three-tier policy inheritance: organization, instance, agent.
//!
//! Scopes are layered with the shared merge primitive (so allow/deny lists
//! concatenate), then every list is deduplicated keeping first occurrence.

use super::types::{
    IntegrationPolicy, ModelPolicy, Policy, PolicyFragment, PolicySummary, SkillPolicy,
    default_skill_sources,
};
use crate::error::{FleetError, Result};
use crate::inventory::{Agent, Instance, Inventory};
use crate::value::{merge_all, unique_strings};

/// Organization policy (`defaults.policy`, then the inventory-level
/// `policy`) with the instance fragment on top.
pub fn resolve_instance_policy(inventory: &Inventory, instance: &Instance) -> Result<Policy> {
    layer([
        inventory.defaults.policy.as_ref(),
        inventory.policy.as_ref(),
        instance.policy.as_ref(),
    ])
}

/// Instance policy with the agent fragment on top.
pub fn resolve_agent_policy(
    inventory: &Inventory,
    instance: &Instance,
    agent: &Agent,
) -> Result<Policy> {
    layer([
        inventory.defaults.policy.as_ref(),
        inventory.policy.as_ref(),
        instance.policy.as_ref(),
        agent.policy.as_ref(),
    ])
}

/// Effective policy for an instance, or for one agent when `agent` is given.
pub fn effective_summary(
    inventory: &Inventory,
    instance: &Instance,
    agent: Option<&Agent>,
) -> Result<PolicySummary> {
    match agent {
        None => Ok(PolicySummary {
            scope: format!("instance:{}", instance.id),
            policy: resolve_instance_policy(inventory, instance)?,
        }),
        Some(agent) => Ok(PolicySummary {
            scope: format!("agent:{}/{}", instance.id, agent.id),
            policy: resolve_agent_policy(inventory, instance, agent)?,
        }),
    }
}

/// Instance summary followed by one summary per agent, in declaration order.
pub fn instance_summaries(inventory: &Inventory, instance: &Instance) -> Result<Vec<PolicySummary>> {
    let mut out = vec![effective_summary(inventory, instance, None)?];
    for agent in &instance.agents {
        out.push(effective_summary(inventory, instance, Some(agent))?);
    }
    Ok(out)
}

fn layer<'a, I>(fragments: I) -> Result<Policy>
where
    I: IntoIterator<Item = Option<&'a PolicyFragment>>,
{
    let values = fragments
        .into_iter()
        .flatten()
        .map(|fragment| {
            serde_json::to_value(fragment)
                .map_err(|e| FleetError::Structural(format!("invalid policy fragment: {}", e)))
        })
        .collect::<Result<Vec<_>>>()?;
    let merged = merge_all(values);
    let fragment: PolicyFragment = serde_json::from_value(merged)
        .map_err(|e| FleetError::Structural(format!("invalid merged policy: {}", e)))?;
    Ok(normalize(fragment))
}

fn normalize(fragment: PolicyFragment) -> Policy {
    let integrations = fragment.integrations.unwrap_or_default();
    let skills = fragment.skills.unwrap_or_default();
    let models = fragment.models.unwrap_or_default();

    Policy {
        integrations: IntegrationPolicy {
            allow: dedup(integrations.allow),
            deny: dedup(integrations.deny),
        },
        skills: SkillPolicy {
            allow: dedup(skills.allow),
            deny: dedup(skills.deny),
            // An explicit empty list lifts the restriction; only an absent one
            // falls back to the default sources.
            allow_sources: skills
                .allow_sources
                .map_or_else(default_skill_sources, |sources| unique_strings(sources)),
            deny_sources: dedup(skills.deny_sources),
        },
        models: ModelPolicy {
            allow_providers: dedup(models.allow_providers),
            deny_providers: dedup(models.deny_providers),
            allow_models: dedup(models.allow_models),
            deny_models: dedup(models.deny_models),
        },
    }
}

fn dedup(list: Option<Vec<String>>) -> Vec<String> {
    unique_strings(list.unwrap_or_default())
}
