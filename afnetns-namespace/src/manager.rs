//! Namespace handle lifecycle management

use std::path::PathBuf;

use nix::mount::{MsFlags, mount};
use nix::sched::{CloneFlags, setns, unshare};
use tracing::{debug, info, warn};

use afnetns_core::{Error, NamespaceName, PROC_SELF_AFNET, Result};
use afnetns_registry::{Registry, RemovalReport};

use crate::exec;

/// Clone flag for afnet namespaces, taken from the kernel's afnetns patch
/// set; neither libc nor nix knows the bit.
const CLONE_NEWAFNET: libc::c_int = 0x0000_1000;

fn afnet_flag() -> CloneFlags {
    CloneFlags::from_bits_retain(CLONE_NEWAFNET)
}

/// Lifecycle driver for named namespace handles
///
/// Every operation is a blocking filesystem or namespace syscall on the
/// calling thread; there is no internal locking. Cross-process mutual
/// exclusion for [`create`](Self::create) rests entirely on the
/// registry's exclusive-create semantics. [`delete`](Self::delete) has no
/// such guard: a concurrent delete and switch on the same name is a
/// use-after-unlink race this tool leaves open.
#[derive(Debug)]
pub struct HandleManager {
    registry: Registry,
}

impl HandleManager {
    /// Manager over the default run directory
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
        }
    }

    /// Manager over an arbitrary run directory
    #[must_use]
    pub fn with_run_dir(root: impl Into<PathBuf>) -> Self {
        Self {
            registry: Registry::with_root(root),
        }
    }

    /// Get the underlying registry
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Create a new afnet namespace and publish it under `name`
    ///
    /// Registers a placeholder with exclusive-create semantics, isolates
    /// the calling process into a freshly allocated afnet namespace, and
    /// bind-mounts the process's namespace pseudo-file onto the
    /// placeholder so the namespace outlives its last member process.
    ///
    /// Note that the calling process itself ends up inside the namespace
    /// it just published; every later operation in this process runs there
    /// unless it switches away again.
    ///
    /// # Errors
    /// Returns [`Error::NameCollision`] if `name` is already registered
    /// (nothing is mutated), or [`Error::Resource`] if isolation or the
    /// bind mount fails - in which case the placeholder is rolled back
    /// and the registry is left as it was.
    pub fn create(&self, name: &NamespaceName) -> Result<()> {
        self.registry.ensure_dir()?;
        self.registry.create_exclusive(name)?;

        // The placeholder exists from here on; every early exit below
        // must take it back out again.
        let guard = PlaceholderGuard {
            registry: &self.registry,
            name,
            armed: true,
        };

        unshare(afnet_flag())
            .map_err(|e| Error::resource(format!("unshare afnet namespace \"{name}\""), e))?;
        debug!(namespace = %name, "entered fresh afnet namespace");

        let path = self.registry.handle_path(name);
        mount(
            Some(PROC_SELF_AFNET),
            &path,
            Some("none"),
            MsFlags::MS_BIND,
            None::<&str>,
        )
        .map_err(|e| {
            Error::resource(
                format!("bind {PROC_SELF_AFNET} -> {}", path.display()),
                e,
            )
        })?;

        guard.disarm();
        info!(namespace = %name, "published namespace handle");
        Ok(())
    }

    /// Join the calling process into the namespace published as `name`
    ///
    /// Replaces the process's current afnet namespace membership. The
    /// handle is closed again on return; a failed join leaves membership
    /// whatever the kernel made of it and is always surfaced.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if `name` is not registered, or
    /// [`Error::Resource`] if the join itself fails.
    pub fn switch(&self, name: &NamespaceName) -> Result<()> {
        let handle = self.registry.open(name)?;

        setns(&handle, afnet_flag())
            .map_err(|e| Error::resource(format!("setns afnet namespace \"{name}\""), e))?;

        debug!(namespace = %name, "joined namespace");
        Ok(())
    }

    /// Detach and remove the handle published as `name`
    ///
    /// Both phases are always attempted and reported separately; a failed
    /// detach does not stop the unlink. Nothing is rolled back - a handle
    /// that unlinked but would not detach (or the reverse) is left in its
    /// partial state for inspection.
    #[must_use]
    pub fn delete(&self, name: &NamespaceName) -> RemovalReport {
        self.registry.unmount_and_remove(name)
    }

    /// Run `command` inside the namespace published as `name`
    ///
    /// Switches the calling process into the namespace, then forks and
    /// executes the command; the child inherits the joined namespace.
    /// Returns the child's exit code (`128 + signo` if it died to a
    /// signal).
    ///
    /// # Errors
    /// Returns [`Error::Usage`] for an empty command (nothing attempted),
    /// [`Error::NotFound`] / [`Error::Resource`] from the switch, or
    /// [`Error::Resource`] if the fork fails.
    pub fn exec(&self, name: &NamespaceName, command: &[String]) -> Result<i32> {
        if command.is_empty() {
            return Err(Error::usage("no command specified"));
        }

        self.switch(name)?;
        exec::run(command)
    }

    /// Names of all published handles, in registry directory order
    ///
    /// Pure passthrough to the registry; an absent run directory is an
    /// empty listing.
    pub fn list(&self) -> Result<Vec<String>> {
        self.registry.list()
    }
}

impl Default for HandleManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Rollback guard for the interval between placeholder creation and a
/// successful bind mount
///
/// Dropping the guard armed removes the placeholder again, so every exit
/// path out of `create` - isolation failure included - restores the
/// registry to its prior state.
struct PlaceholderGuard<'a> {
    registry: &'a Registry,
    name: &'a NamespaceName,
    armed: bool,
}

impl PlaceholderGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PlaceholderGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let report = self.registry.unmount_and_remove(self.name);
        for err in report.errors() {
            warn!(namespace = %self.name, error = %err, "placeholder rollback failed");
        }
    }
}
