//! Append-only audit log for fleetconf.
//!
//! Each mutating command and each non-dry-run render appends one NDJSON line
//! to `<inventory dir>/.fleetconf/events.ndjson`:
//! - `ts`: RFC3339 timestamp
//! - `action`: `agent_add`, `agent_remove`, or `render`
//! - `actor`: `user@HOST`
//! - `instance`: instance the action touched
//! - `details`: action-specific object
//!
//! The log lives beside the inventory, never under an instance's path
//! roles, so it cannot leak into rendered configuration.

use crate::error::{FleetError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Directory (relative to the inventory file) holding tool state.
pub const STATE_DIR: &str = ".fleetconf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    AgentAdd,
    AgentRemove,
    Render,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::AgentAdd => write!(f, "agent_add"),
            EventAction::AgentRemove => write!(f, "agent_remove"),
            EventAction::Render => write!(f, "render"),
        }
    }
}

/// One audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub ts: DateTime<Utc>,
    pub action: EventAction,
    pub actor: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    pub details: Value,
}

impl Event {
    /// New event stamped with the current time and `USER@HOST`.
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: actor_string(),
            instance: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| FleetError::UserError(format!("failed to serialize event to JSON: {}", e)))
    }
}

fn actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

pub fn events_file_path(inventory_dir: &Path) -> PathBuf {
    inventory_dir.join(STATE_DIR).join("events.ndjson")
}

/// Append `event` as one line, creating the log if needed.
pub fn append_event(inventory_dir: &Path, event: &Event) -> Result<()> {
    let events_file = events_file_path(inventory_dir);
    let json_line = event.to_ndjson_line()?;

    if let Some(dir) = events_file.parent()
        && !dir.exists()
    {
        fs::create_dir_all(dir)
            .map_err(|e| FleetError::io("failed to create events directory", dir, e))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&events_file)
        .map_err(|e| FleetError::io("failed to open events file", &events_file, e))?;

    writeln!(file, "{}", json_line)
        .map_err(|e| FleetError::io("failed to write event", &events_file, e))?;

    file.sync_all()
        .map_err(|e| FleetError::io("failed to sync events file", &events_file, e))?;

    Ok(())
}
