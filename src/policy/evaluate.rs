//! Checks an agent's declared integrations, skills, and model against its
//! resolved policy.

use super::report::{PolicyReport, PolicyViolation};
use super::resolve::resolve_agent_policy;
use super::types::Policy;
use crate::error::{FleetError, Result};
use crate::inventory::{Agent, Inventory};
use crate::value::unique_strings;
use tracing::debug;

/// Explicit integration list, or the channels of the agent's bindings when
/// none is declared.
pub fn agent_integrations(agent: &Agent) -> Vec<String> {
    let explicit = unique_strings(&agent.integrations);
    if !explicit.is_empty() {
        return explicit;
    }
    unique_strings(agent.bindings.iter().map(|b| b.channel()))
}

/// Provider half of `provider/model`, or the whole id when there is no `/`.
pub fn model_provider(model: &str) -> &str {
    model.split_once('/').map_or(model, |(provider, _)| provider)
}

/// Evaluate a single agent, returning every violation found.
pub fn evaluate_agent(instance_id: &str, agent: &Agent, policy: &Policy) -> PolicyReport {
    let mut report = PolicyReport::new();
    let mut emit = |message: String| {
        report.push(PolicyViolation {
            instance: instance_id.to_string(),
            agent: agent.id.clone(),
            message,
        })
    };

    for integration in agent_integrations(agent) {
        if let Some(msg) = check(
            &integration,
            &policy.integrations.allow,
            &policy.integrations.deny,
        ) {
            emit(format!("integration '{}' {}", integration, msg));
        }
    }

    for skill in unique_strings(&agent.skills) {
        if let Some(msg) = check(&skill, &policy.skills.allow, &policy.skills.deny) {
            emit(format!("skill '{}' {}", skill, msg));
        }
    }

    for source in unique_strings(agent.skill_sources()) {
        if let Some(msg) = check(
            &source,
            &policy.skills.allow_sources,
            &policy.skills.deny_sources,
        ) {
            emit(format!("skill source '{}' {}", source, msg));
        }
    }

    if let Some(model) = agent.model.as_deref().map(str::trim)
        && !model.is_empty()
    {
        let provider = model_provider(model);
        match check(
            provider,
            &policy.models.allow_providers,
            &policy.models.deny_providers,
        ) {
            Some(Verdict::Denied) => emit(format!("model provider '{}' is denied", provider)),
            Some(Verdict::NotAllowed) => emit(format!(
                "model provider '{}' for '{}' is not allowlisted",
                provider, model
            )),
            None => {}
        }
        if let Some(msg) = check(
            model,
            &policy.models.allow_models,
            &policy.models.deny_models,
        ) {
            emit(format!("model '{}' {}", model, msg));
        }
    }

    report
}

/// Evaluate every agent of every instance against its resolved policy.
///
/// Violations accumulate across the whole inventory; the call fails only when
/// at least one was found.
pub fn evaluate_inventory(inventory: &Inventory) -> Result<()> {
    let mut report = PolicyReport::new();
    for instance in &inventory.instances {
        for agent in &instance.agents {
            let policy = resolve_agent_policy(inventory, instance, agent)?;
            report.extend(evaluate_agent(&instance.id, agent, &policy));
        }
    }
    debug!(violations = report.len(), "policy evaluation finished");
    if report.is_empty() {
        Ok(())
    } else {
        Err(FleetError::Policy(report))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Denied,
    NotAllowed,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Denied => f.write_str("is denied"),
            Verdict::NotAllowed => f.write_str("is not allowlisted"),
        }
    }
}

/// Deny wins outright; otherwise a non-empty allow list must contain `value`.
fn check(value: &str, allow: &[String], deny: &[String]) -> Option<Verdict> {
    if deny.iter().any(|d| d == value) {
        Some(Verdict::Denied)
    } else if !allow.is_empty() && !allow.iter().any(|a| a == value) {
        Some(Verdict::NotAllowed)
    } else {
        None
    }
}
