//! The inventory document: typed model, validating decoder, mutations, and
//! persistence.
//!
//! The raw YAML is read into an open-shaped [`Value`](crate::value::Value)
//! and decoded in a single validation pass; everything past that pass works
//! on the typed [`Inventory`].

mod agents;
mod channels;
mod decode;
mod io;
mod model;
mod report;
mod validate;


pub use agents::{AgentSpec, AgentSummary, add_agent, list_agents, parse_account, remove_agent};
pub use io::{
    DEFAULT_INVENTORY, INVENTORY_ENV, LOCAL_INVENTORY, LoadedInventory,
    discover_inventory_path, discover_inventory_path_from, parse_inventory_yaml, save_inventory,
};
pub use model::{
    Agent, AgentRole, Binding, BindingMatch, Channel, DEFAULT_PORT_STRIDE, Defaults, Host,
    Instance, InstancePaths, Inventory, PathRole, RuntimeBlock,
};
pub use report::{IssueKind, ValidationIssue, ValidationReport};
pub use validate::validate_inventory;
