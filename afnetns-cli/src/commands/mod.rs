use crate::cli::{Cli, Commands};
use anyhow::Result;

pub mod add;
pub mod delete;
pub mod exec;
pub mod identify;
pub mod list;

/// Dispatch command to appropriate handler
///
/// Returns the process exit code; only `exec` produces anything other
/// than zero on success.
pub fn dispatch(cli: Cli) -> Result<i32> {
    let Cli {
        run_dir, command, ..
    } = cli;

    match command {
        Commands::List => list::execute(&run_dir).map(|()| 0),

        Commands::Add { name } => add::execute(&run_dir, &name).map(|()| 0),

        Commands::Delete { name } => delete::execute(&run_dir, &name).map(|()| 0),

        Commands::Exec { name, command } => exec::execute(&run_dir, &name, &command),

        Commands::Identify { inode } => identify::execute(&run_dir, inode).map(|()| 0),
    }
}
