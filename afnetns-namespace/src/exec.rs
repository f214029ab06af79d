//! Command execution inside a joined namespace
//!
//! This module uses `unsafe` for fork() which is inherently unsafe
//! but necessary to run the command as a child while the parent reports
//! its exit status.

#![allow(unsafe_code)]

use std::ffi::{CString, NulError};

use nix::sys::signal::{Signal, kill};
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, execvp, fork};
use tracing::{debug, warn};

use afnetns_core::{Error, Result};

/// Execute a command in the calling process's current namespace set
///
/// Forks; the child inherits the namespaces the caller has joined and
/// execs the command, the parent waits and returns the child's exit code
/// (`128 + signo` when the child dies to a signal).
///
/// # Errors
/// Returns [`Error::Usage`] for an empty command and [`Error::Resource`]
/// if the fork fails. A command that cannot be exec'd is reported by the
/// child as exit code 127.
pub fn run(command: &[String]) -> Result<i32> {
    if command.is_empty() {
        return Err(Error::usage("no command specified"));
    }

    debug!(command = %command.join(" "), "executing command");

    match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => parent_process(child),
        Ok(ForkResult::Child) => {
            // Never returns to the Rust runtime - it execs or exits
            child_process(command)
        }
        Err(e) => Err(Error::resource("fork", e)),
    }
}

/// Parent process: wait for the child and forward Ctrl+C
fn parent_process(child_pid: Pid) -> Result<i32> {
    // Forward Ctrl+C so the child dies instead of us orphaning it
    let child_pid_for_handler = child_pid;
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = kill(child_pid_for_handler, Signal::SIGTERM);
    }) {
        warn!(error = %e, "could not set signal handler");
    }

    loop {
        match waitpid(child_pid, None) {
            Ok(WaitStatus::Exited(_, exit_code)) => {
                debug!(exit_code, "child exited");
                return Ok(exit_code);
            }
            Ok(WaitStatus::Signaled(_, signal, _)) => {
                warn!(signal = ?signal, "child terminated by signal");
                return Ok(128 + signal as i32);
            }
            Ok(status) => {
                debug!(status = ?status, "child status changed, still waiting");
            }
            Err(nix::errno::Errno::EINTR) => {
                // Interrupted by a signal, keep waiting
            }
            Err(nix::errno::Errno::ECHILD) => {
                warn!("child process no longer exists");
                return Ok(0);
            }
            Err(e) => {
                return Err(Error::resource("waitpid", e));
            }
        }
    }
}

/// Child process: exec the command
fn child_process(command: &[String]) -> ! {
    let argv = match to_exec_argv(command) {
        Ok(argv) => argv,
        Err(e) => {
            eprintln!("invalid command argument: {e}");
            std::process::exit(127);
        }
    };

    // Replaces this process on success
    let err = execvp(&argv[0], &argv);

    eprintln!("cannot execute {}: {:?}", command[0], err);
    std::process::exit(127);
}

/// Marshal a command line into an argv for exec, program name first
fn to_exec_argv(command: &[String]) -> std::result::Result<Vec<CString>, NulError> {
    command
        .iter()
        .map(|arg| CString::new(arg.as_bytes()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_exec_argv() {
        let cmd = vec!["/bin/echo".to_string(), "hello".to_string()];
        let argv = to_exec_argv(&cmd).unwrap();

        assert_eq!(argv.len(), 2);
        assert_eq!(argv[0].to_str().unwrap(), "/bin/echo");
        assert_eq!(argv[1].to_str().unwrap(), "hello");
    }

    #[test]
    fn test_to_exec_argv_rejects_interior_nul() {
        let cmd = vec!["/bin/echo".to_string(), "he\0llo".to_string()];
        assert!(to_exec_argv(&cmd).is_err());
    }

    #[test]
    fn test_run_rejects_empty_command() {
        let result = run(&[]);
        assert!(matches!(result, Err(Error::Usage { .. })));
    }

    #[test]
    fn test_run_reports_child_exit_code() {
        let code = run(&["/bin/sh".to_string(), "-c".to_string(), "exit 7".to_string()])
            .unwrap();
        assert_eq!(code, 7);
    }

    #[test]
    fn test_run_missing_program_is_127() {
        let code = run(&["/bin/definitely-not-a-program".to_string()]).unwrap();
        assert_eq!(code, 127);
    }
}
