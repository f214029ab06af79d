//! Delete command implementation

use anyhow::{Context, Result, bail};
use std::path::Path;

use afnetns_core::NamespaceName;
use afnetns_namespace::HandleManager;

pub fn execute(run_dir: &Path, name: &str) -> Result<()> {
    tracing::debug!(namespace = name, "deleting namespace");

    let name = NamespaceName::new(name).context("invalid namespace name")?;

    let manager = HandleManager::with_run_dir(run_dir);
    let report = manager.delete(&name);

    // Each phase failure is reported on its own; the handle may be left
    // half-removed and both halves matter to whoever cleans up.
    for err in report.errors() {
        eprintln!("cannot remove namespace \"{name}\": {err}");
    }

    if report.succeeded() {
        Ok(())
    } else {
        bail!("delete of namespace \"{name}\" failed");
    }
}
