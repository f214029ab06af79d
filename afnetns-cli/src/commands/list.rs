//! List command implementation

use anyhow::{Context, Result};
use std::path::Path;

use afnetns_namespace::HandleManager;

pub fn execute(run_dir: &Path) -> Result<()> {
    let manager = HandleManager::with_run_dir(run_dir);

    // One name per line, nothing else: the output is meant for pipes.
    // An absent run directory simply lists nothing.
    for name in manager.list().context("cannot list namespaces")? {
        println!("{name}");
    }

    Ok(())
}
