//! Identify command implementation

use anyhow::{Context, Result};
use std::path::Path;

use afnetns_core::NamespaceInode;
use afnetns_registry::{InodeNameCache, Registry};

pub fn execute(run_dir: &Path, inode: Option<u64>) -> Result<()> {
    let cache = InodeNameCache::new(Registry::with_root(run_dir));

    let inode = match inode {
        Some(raw) => NamespaceInode::from_raw(raw),
        None => cache
            .self_inode()
            .context("cannot resolve the calling process's namespace")?,
    };

    let display = cache
        .lookup(inode)
        .with_context(|| format!("cannot resolve namespace inode {inode}"))?;
    println!("{display}");

    Ok(())
}
