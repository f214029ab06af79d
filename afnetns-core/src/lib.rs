//! Afnetns Core - Foundation types and errors
//!
//! This crate provides the core abstractions used throughout afnetns.

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{NamespaceInode, NamespaceName};

/// Reference link for the calling process's afnet namespace.
///
/// The link target encodes the namespace identity as `afnet:[<inode>]`.
pub const PROC_SELF_AFNET: &str = "/proc/self/ns/afnet";
