//! On-disk registry of named namespace handles

use std::fs::{self, DirBuilder, File, OpenOptions};
use std::io::ErrorKind;
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};
use std::path::{Path, PathBuf};

use nix::mount::{MntFlags, umount2};
use tracing::debug;

use afnetns_core::{Error, NamespaceName, Result};

/// The handle registry directory
///
/// Conceptually a set of name → inode bindings: each entry is a file
/// that, once bind-mounted, pins a kernel namespace under a stable name.
/// The directory is created on demand and never implicitly destroyed.
#[derive(Debug, Clone)]
pub struct Registry {
    /// Root directory holding the handles
    root: PathBuf,
}

impl Registry {
    /// Registry rooted at the default run directory
    #[must_use]
    pub fn new() -> Self {
        Self::with_root(crate::AFNETNS_RUN_DIR)
    }

    /// Registry rooted at an arbitrary directory
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the registry root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of a handle inside the registry
    #[must_use]
    pub fn handle_path(&self, name: &NamespaceName) -> PathBuf {
        self.root.join(name.as_str())
    }

    /// Idempotently create the registry directory, mode `0755`
    ///
    /// Succeeds if the directory already exists.
    ///
    /// # Errors
    /// Returns [`Error::Resource`] for any other creation failure.
    pub fn ensure_dir(&self) -> Result<()> {
        match DirBuilder::new().mode(0o755).create(&self.root) {
            Ok(()) => {
                debug!(dir = %self.root.display(), "created registry directory");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(Error::resource(
                format!("mkdir {}", self.root.display()),
                e,
            )),
        }
    }

    /// Entry names in directory order
    ///
    /// A missing registry directory yields an empty list, not an error:
    /// no namespace has ever been registered on this machine.
    ///
    /// # Errors
    /// Returns [`Error::Resource`] if the directory exists but cannot be
    /// read.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::resource(
                    format!("readdir {}", self.root.display()),
                    e,
                ));
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                Error::resource(format!("readdir {}", self.root.display()), e)
            })?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }

        Ok(names)
    }

    /// Create a zero-length placeholder with exclusive-create semantics
    ///
    /// The placeholder is the mount point the namespace pseudo-file gets
    /// bound onto. Exclusive creation is the only cross-process guard the
    /// registry has: two concurrent registrations of one name cannot both
    /// succeed.
    ///
    /// # Errors
    /// Returns [`Error::NameCollision`] if the name is already registered,
    /// [`Error::Resource`] for any other failure.
    pub fn create_exclusive(&self, name: &NamespaceName) -> Result<()> {
        let path = self.handle_path(name);

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0)
            .open(&path)
        {
            Ok(_) => {
                debug!(handle = %path.display(), "created placeholder");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(Error::collision(name.as_str()))
            }
            Err(e) => Err(Error::resource(format!("create {}", path.display()), e)),
        }
    }

    /// Open a handle read-only for use as a namespace join target
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if the name is not registered,
    /// [`Error::Resource`] for any other failure.
    pub fn open(&self, name: &NamespaceName) -> Result<File> {
        let path = self.handle_path(name);

        match File::open(&path) {
            Ok(file) => Ok(file),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::not_found(name.as_str())),
            Err(e) => Err(Error::resource(format!("open {}", path.display()), e)),
        }
    }

    /// Detach any mount at the handle path, then unlink it
    ///
    /// Best effort on both counts: the unlink is attempted even when the
    /// detach failed, and each phase's outcome is reported separately in
    /// the returned [`RemovalReport`]. The detach is lazy (`MNT_DETACH`)
    /// and a handle that was never mounted counts as detached.
    pub fn unmount_and_remove(&self, name: &NamespaceName) -> RemovalReport {
        let path = self.handle_path(name);

        let unmount = match umount2(&path, MntFlags::MNT_DETACH) {
            Ok(()) => Ok(()),
            // EINVAL: nothing mounted there, which is what we wanted
            Err(nix::errno::Errno::EINVAL) => Ok(()),
            Err(e) => Err(Error::resource(format!("umount {}", path.display()), e)),
        };

        let unlink = fs::remove_file(&path)
            .map_err(|e| Error::resource(format!("unlink {}", path.display()), e));

        debug!(
            handle = %path.display(),
            unmounted = unmount.is_ok(),
            unlinked = unlink.is_ok(),
            "removed handle"
        );

        RemovalReport { unmount, unlink }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a two-phase handle removal
///
/// Both phases are always attempted; a failed detach does not stop the
/// unlink or vice versa. The overall removal counts as failed when either
/// phase failed, and the partial state left behind (still-mounted but
/// unlinked, or the reverse) is inspectable rather than rolled back.
#[derive(Debug)]
pub struct RemovalReport {
    /// Outcome of the lazy detach
    pub unmount: Result<()>,
    /// Outcome of the unlink
    pub unlink: Result<()>,
}

impl RemovalReport {
    /// Whether both phases succeeded
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.unmount.is_ok() && self.unlink.is_ok()
    }

    /// Errors from whichever phases failed
    #[must_use]
    pub fn errors(&self) -> Vec<&Error> {
        self.unmount
            .as_ref()
            .err()
            .into_iter()
            .chain(self.unlink.as_ref().err())
            .collect()
    }
}
