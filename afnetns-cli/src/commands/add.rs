//! Add command implementation

use anyhow::{Context, Result};
use std::path::Path;

use afnetns_core::NamespaceName;
use afnetns_namespace::HandleManager;

pub fn execute(run_dir: &Path, name: &str) -> Result<()> {
    tracing::debug!(namespace = name, "creating namespace");

    let name = NamespaceName::new(name).context("invalid namespace name")?;

    let manager = HandleManager::with_run_dir(run_dir);
    manager
        .create(&name)
        .with_context(|| format!("cannot create namespace \"{name}\""))?;

    Ok(())
}
