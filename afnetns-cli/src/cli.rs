//! CLI argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "afnetns")]
#[command(about = "Named persistent handles for afnet namespaces", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Registry directory holding the named handles
    #[arg(long, global = true, default_value = afnetns_registry::AFNETNS_RUN_DIR)]
    pub run_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List registered namespace names
    List,

    /// Create a new afnet namespace and register it under NAME
    Add {
        /// Name to register the namespace under
        name: String,
    },

    /// Detach and unregister the namespace handle NAME
    Delete {
        /// Registered namespace name
        name: String,
    },

    /// Run a command inside the namespace registered as NAME
    Exec {
        /// Registered namespace name
        name: String,

        /// Command and arguments to run
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Resolve a namespace inode number to its display name
    Identify {
        /// Inode number (default: the calling process's own namespace)
        inode: Option<u64>,
    },
}
