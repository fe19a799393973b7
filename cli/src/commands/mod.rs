//! Command implementations

pub mod address;
pub mod kubeconfig;
pub mod version;

use std::path::Path;

use anyhow::{Context, Result};
use nodeboot_common::Machine;

/// Reads a machine manifest from a YAML or JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse.
pub fn load_machine(path: &Path) -> Result<Machine> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
}
