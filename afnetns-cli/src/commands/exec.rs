//! Exec command implementation

use anyhow::{Context, Result};
use std::path::Path;

use afnetns_core::NamespaceName;
use afnetns_namespace::HandleManager;

pub fn execute(run_dir: &Path, name: &str, command: &[String]) -> Result<i32> {
    tracing::debug!(namespace = name, command = ?command, "executing in namespace");

    let name = NamespaceName::new(name).context("invalid namespace name")?;

    let manager = HandleManager::with_run_dir(run_dir);
    manager
        .exec(&name, command)
        .with_context(|| format!("cannot exec in namespace \"{name}\""))
}
