//! Known integration identifiers, grouped by how the gateway supports them.

use serde::Serialize;

/// Channels built into the gateway runtime.
pub const CORE_INTEGRATIONS: &[&str] = &[
    "whatsapp",
    "telegram",
    "discord",
    "slack",
    "signal",
    "google-chat",
    "irc",
    "imessage",
    "bluebubbles",
    "webchat",
];

/// Channels shipped as runtime plugins.
pub const PLUGIN_INTEGRATIONS: &[&str] = &[
    "mattermost",
    "teams",
    "microsoft-teams",
    "feishu",
    "lark",
    "line",
    "matrix",
    "zalo",
    "zalo-personal",
    "nextcloud-talk",
    "nostr",
    "twitch",
    "tlon",
];

/// Integrations only reachable through custom skills.
pub const CUSTOM_ONLY_INTEGRATIONS: &[&str] = &["notion", "heygen"];

/// Sorted view of the integration tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrationCatalog {
    pub core: Vec<String>,
    pub plugin: Vec<String>,
    pub custom_only: Vec<String>,
}

pub fn supported_integrations() -> IntegrationCatalog {
    IntegrationCatalog {
        core: sorted(CORE_INTEGRATIONS),
        plugin: sorted(PLUGIN_INTEGRATIONS),
        custom_only: sorted(CUSTOM_ONLY_INTEGRATIONS),
    }
}

fn sorted(table: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = table.iter().map(|s| s.to_string()).collect();
    out.sort();
    out
}
