//! Handle lifecycle for afnet namespaces
//!
//! This crate drives the namespace-handle state machine
//! (`absent → created → mounted → deleted`) on top of the registry:
//! - create - isolate into a fresh afnet namespace and publish it by name
//! - switch - join the calling process into a named namespace
//! - delete - detach and remove a published handle
//! - exec - run a command inside a named namespace

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod exec;
pub mod manager;

pub use manager::HandleManager;
