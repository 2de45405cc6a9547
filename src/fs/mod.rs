//! Filesystem utilities for fleetconf.
//!
//! Atomic writes for every persisted artifact, plus lexical path
//! normalisation used to compare inventory path roles.

pub mod atomic;
mod paths;

pub use atomic::{atomic_write, atomic_write_file, write_json_pretty};
pub use paths::{normalize_path, resolve_relative};
