use super::*;
use crate::error::FleetError;
use crate::inventory::Inventory;
use crate::test_support::{decode, instance_value, inventory_value};
use serde_json::{Value, json};

fn fleet(policy: Value, instance_policy: Value, agent_policy: Value, agent: Value) -> Inventory {
    let mut instance = instance_value("core", 9000);
    instance["policy"] = instance_policy;
    let mut agent = agent;
    agent["policy"] = agent_policy;
    instance["agents"] = json!([agent]);
    let mut raw = inventory_value(vec![instance]);
    raw["defaults"] = json!({ "policy": policy });
    decode(&raw)
}

fn agent(integrations: &[&str]) -> Value {
    json!({
        "id": "ops",
        "integrations": integrations,
        "bindings": [ { "match": { "channel": "telegram", "accountId": "ops-bot" } } ],
    })
}

fn violations(inventory: &Inventory) -> Vec<String> {
    match evaluate_inventory(inventory) {
        Ok(()) => Vec::new(),
        Err(FleetError::Policy(report)) => report.messages(),
        Err(other) => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_deny_wins_over_allow_with_single_violation() {
    let inventory = fleet(
        json!({ "integrations": { "allow": ["whatsapp"], "deny": ["whatsapp"] } }),
        Value::Null,
        Value::Null,
        agent(&["whatsapp"]),
    );
    assert_eq!(
        violations(&inventory),
        vec!["core/ops: integration 'whatsapp' is denied"]
    );
}

#[test]
fn test_allowlist_miss_is_reported() {
    let inventory = fleet(
        json!({ "integrations": { "allow": ["slack"] } }),
        Value::Null,
        Value::Null,
        agent(&["discord"]),
    );
    assert_eq!(
        violations(&inventory),
        vec!["core/ops: integration 'discord' is not allowlisted"]
    );
}

#[test]
fn test_integrations_fall_back_to_binding_channels() {
    let inventory = fleet(
        json!({ "integrations": { "deny": ["telegram"] } }),
        Value::Null,
        Value::Null,
        agent(&[]),
    );
    assert_eq!(
        violations(&inventory),
        vec!["core/ops: integration 'telegram' is denied"]
    );
    let agent = inventory.instances[0].agent("ops").unwrap();
    assert_eq!(agent_integrations(agent), vec!["telegram"]);
}

#[test]
fn test_scopes_layer_and_deduplicate() {
    let inventory = fleet(
        json!({ "integrations": { "allow": ["slack", "telegram"] } }),
        json!({ "integrations": { "allow": ["telegram", "discord"], "deny": ["irc"] } }),
        json!({ "integrations": { "deny": ["irc", "slack"] } }),
        agent(&["discord"]),
    );
    let instance = &inventory.instances[0];
    let ops = instance.agent("ops").unwrap();

    let at_instance = resolve_instance_policy(&inventory, instance).unwrap();
    assert_eq!(at_instance.integrations.allow, vec!["slack", "telegram", "discord"]);
    assert_eq!(at_instance.integrations.deny, vec!["irc"]);

    let at_agent = resolve_agent_policy(&inventory, instance, ops).unwrap();
    assert_eq!(at_agent.integrations.allow, vec!["slack", "telegram", "discord"]);
    assert_eq!(at_agent.integrations.deny, vec!["irc", "slack"]);

    assert!(violations(&inventory).is_empty());
}

#[test]
fn test_inventory_level_policy_layers_over_defaults() {
    let mut raw = inventory_value(vec![instance_value("core", 9000)]);
    raw["defaults"] = json!({ "policy": { "skills": { "deny": ["shell"] } } });
    raw["policy"] = json!({ "skills": { "deny": ["browser", "shell"] } });
    let inventory = decode(&raw);

    let org = resolve_instance_policy(&inventory, &inventory.instances[0]).unwrap();
    assert_eq!(org.skills.deny, vec!["shell", "browser"]);
}

#[test]
fn test_absent_groups_take_defaults() {
    let inventory = fleet(Value::Null, Value::Null, Value::Null, agent(&[]));
    let policy = resolve_instance_policy(&inventory, &inventory.instances[0]).unwrap();

    assert!(policy.integrations.allow.is_empty());
    assert!(policy.integrations.deny.is_empty());
    assert!(policy.models.allow_providers.is_empty());
    assert_eq!(policy.skills.allow_sources, DEFAULT_SKILL_SOURCES.to_vec());
    assert!(violations(&inventory).is_empty());
}

#[test]
fn test_explicit_empty_allow_sources_is_unrestricted() {
    let mut ops = agent(&[]);
    ops["skill_sources"] = json!(["remote"]);
    let inventory = fleet(
        json!({ "skills": { "allow_sources": [] } }),
        Value::Null,
        Value::Null,
        ops,
    );

    let policy = resolve_instance_policy(&inventory, &inventory.instances[0]).unwrap();
    assert!(policy.skills.allow_sources.is_empty());
    assert!(violations(&inventory).is_empty());
}

#[test]
fn test_absent_allow_sources_rejects_unknown_source() {
    let mut ops = agent(&[]);
    ops["skill_sources"] = json!(["remote"]);
    let inventory = fleet(Value::Null, Value::Null, Value::Null, ops);

    assert_eq!(
        violations(&inventory),
        vec!["core/ops: skill source 'remote' is not allowlisted"]
    );
}

#[test]
fn test_skill_and_source_rules_apply() {
    let mut ops = agent(&[]);
    ops["skills"] = json!(["triage", "shell"]);
    ops["skill_sources"] = json!(["workspace", "remote"]);
    let inventory = fleet(
        json!({ "skills": { "deny": ["shell"] } }),
        Value::Null,
        Value::Null,
        ops,
    );
    assert_eq!(
        violations(&inventory),
        vec![
            "core/ops: skill 'shell' is denied",
            "core/ops: skill source 'remote' is not allowlisted",
        ]
    );
}

#[test]
fn test_model_provider_and_id_are_checked() {
    let mut ops = agent(&[]);
    ops["model"] = json!("openai/gpt-5");
    let inventory = fleet(
        json!({ "models": { "allow_providers": ["anthropic"], "deny_models": ["openai/gpt-5"] } }),
        Value::Null,
        Value::Null,
        ops,
    );
    assert_eq!(
        violations(&inventory),
        vec![
            "core/ops: model provider 'openai' for 'openai/gpt-5' is not allowlisted",
            "core/ops: model 'openai/gpt-5' is denied",
        ]
    );
}

#[test]
fn test_provider_is_prefix_before_first_slash() {
    assert_eq!(model_provider("anthropic/claude/opus"), "anthropic");
    assert_eq!(model_provider("local-llama"), "local-llama");
}

#[test]
fn test_violations_accumulate_across_instances() {
    let mut a = instance_value("a", 9000);
    a["agents"][0]["integrations"] = json!(["irc"]);
    let mut b = instance_value("b", 9100);
    b["agents"][0]["integrations"] = json!(["irc", "matrix"]);
    let mut raw = inventory_value(vec![a, b]);
    raw["policy"] = json!({ "integrations": { "deny": ["irc", "matrix"] } });

    let messages = violations(&decode(&raw));
    assert_eq!(
        messages,
        vec![
            "a/main: integration 'irc' is denied",
            "b/main: integration 'irc' is denied",
            "b/main: integration 'matrix' is denied",
        ]
    );
}

#[test]
fn test_report_display_lists_every_violation() {
    let mut report = PolicyReport::new();
    for name in ["irc", "matrix"] {
        report.push(PolicyViolation {
            instance: "core".to_string(),
            agent: "ops".to_string(),
            message: format!("integration '{}' is denied", name),
        });
    }
    assert_eq!(
        report.to_string(),
        "Policy validation failed:\n- core/ops: integration 'irc' is denied\n- core/ops: integration 'matrix' is denied"
    );
}

#[test]
fn test_summary_scopes_are_tagged() {
    let inventory = fleet(Value::Null, Value::Null, Value::Null, agent(&[]));
    let instance = &inventory.instances[0];

    let summaries = instance_summaries(&inventory, instance).unwrap();
    let scopes: Vec<&str> = summaries.iter().map(|s| s.scope.as_str()).collect();
    assert_eq!(scopes, vec!["instance:core", "agent:core/ops"]);

    let value = serde_json::to_value(&summaries[1]).unwrap();
    assert_eq!(value["policy"]["skills"]["allow_sources"][0], json!("bundled"));
}

#[test]
fn test_catalog_tables_are_sorted() {
    let catalog = supported_integrations();
    let mut sorted = catalog.core.clone();
    sorted.sort();
    assert_eq!(catalog.core, sorted);
    assert_eq!(catalog.custom_only, vec!["heygen", "notion"]);
    assert!(catalog.plugin.contains(&"matrix".to_string()));
}
