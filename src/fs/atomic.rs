//! Atomic filesystem writes.
//!
//! Every artifact fleetconf writes (the inventory document, resolved configs,
//! render summaries) goes through here so that a reader never observes a
//! half-written file:
//!
//! 1. Write content to `.{filename}.tmp` in the same directory
//! 2. Sync the file to disk
//! 3. Rename it over the target
//!
//! Source and destination share a directory, so the rename stays on one
//! filesystem. On crash a stray `.{filename}.tmp` may remain.

use crate::error::{FleetError, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically write bytes to a file, creating parent directories as needed.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent)
            .map_err(|e| FleetError::io("failed to create parent directory", parent, e))?;
    }

    let temp_path = generate_temp_path(path)?;
    write_and_sync(&temp_path, content)?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        FleetError::io("failed to atomically replace", path, e)
    })?;

    // Persist the directory entry too.
    if let Some(parent) = path.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}

/// Atomically write a string to a file.
pub fn atomic_write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Atomically write `value` as two-space indented JSON with a trailing newline.
///
/// Serialization is deterministic for a given value, so unchanged inputs
/// produce byte-identical files.
pub fn write_json_pretty<P: AsRef<Path>, T: Serialize + ?Sized>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let mut text = serde_json::to_string_pretty(value).map_err(|e| {
        FleetError::Structural(format!(
            "failed to serialize JSON for '{}': {}",
            path.display(),
            e
        ))
    })?;
    text.push('\n');
    atomic_write_file(path, &text)
}

fn generate_temp_path(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| FleetError::UserError(format!("invalid file path: {}", target.display())))?;

    Ok(parent.join(format!(".{}.tmp", filename)))
}

fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file =
        File::create(path).map_err(|e| FleetError::io("failed to create temporary file", path, e))?;

    file.write_all(content).map_err(|e| {
        let _ = fs::remove_file(path);
        FleetError::io("failed to write temporary file", path, e)
    })?;

    file.sync_all().map_err(|e| {
        let _ = fs::remove_file(path);
        FleetError::io("failed to sync temporary file", path, e)
    })?;

    Ok(())
}
