//! Organization / instance / agent policy.
//!
//! Fragments declared at each scope are layered into one effective
//! [`Policy`], which is then used to judge an agent's integrations, skills,
//! skill sources, and model.

mod catalog;
mod evaluate;
mod report;
mod resolve;
mod types;

#[cfg(test)]
mod tests;

pub use catalog::{IntegrationCatalog, supported_integrations};
pub use evaluate::{agent_integrations, evaluate_agent, evaluate_inventory, model_provider};
pub use report::{PolicyReport, PolicyViolation};
pub use resolve::{
    effective_summary, instance_summaries, resolve_agent_policy, resolve_instance_policy,
};
pub use types::{
    DEFAULT_SKILL_SOURCES, IntegrationRules, ModelRules, Policy, PolicyFragment, PolicySummary,
    SkillRules,
};
