//! Persistent handle registry for afnet namespaces
//!
//! This crate provides the on-disk registry of named namespace handles
//! (bind-mounted nsfs pseudo-files under a fixed run directory) and the
//! process-local cache that resolves namespace inode numbers back to
//! display names.

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod cache;
pub mod registry;

pub use cache::InodeNameCache;
pub use registry::{Registry, RemovalReport};

// Re-export commonly used types
pub use afnetns_core::{NamespaceInode, NamespaceName};

/// Default registry directory for named afnet namespace handles
pub const AFNETNS_RUN_DIR: &str = "/var/run/afnetns";
