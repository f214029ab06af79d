//! Process-local inode → display-name cache
//!
//! The kernel identifies an afnet namespace only by the inode number of
//! its nsfs pseudo-file. This cache maps those inodes back to the names
//! registered in the run directory, synthesizing `afnet:[<inode>]` names
//! for namespaces nobody registered, and tagging the namespace the
//! calling process currently lives in with a `,self` suffix.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::PathBuf;

use tracing::{debug, warn};

use afnetns_core::{Error, NamespaceInode, PROC_SELF_AFNET, Result};

use crate::registry::Registry;

/// One resolved namespace identity
#[derive(Debug, Clone)]
struct CacheEntry {
    /// Registered name, or the synthesized `afnet:[<inode>]` form
    name: String,
    /// Whether the calling process belonged to this namespace at fill time
    is_self: bool,
}

impl CacheEntry {
    fn render(&self) -> String {
        if self.is_self {
            format!("{},self", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Lazily filled inode → name cache
///
/// Construct one per process and keep it for the process lifetime: the
/// registry is scanned exactly once, on the first lookup, and mutations
/// of the run directory after that scan are not observed. Entries are
/// immutable once inserted, and when two registry names alias the same
/// inode the first one encountered wins the inode slot (both stay
/// listable by name through the registry itself).
#[derive(Debug)]
pub struct InodeNameCache {
    registry: Registry,

    /// Reference link resolved to find the caller's own namespace
    self_link: PathBuf,

    /// Memoized self inode; resolution failures are retried, success is
    /// cached for the process lifetime
    self_inode: Cell<Option<NamespaceInode>>,

    /// Set on the first lookup, whether or not the scan produced entries
    filled: Cell<bool>,

    entries: RefCell<HashMap<NamespaceInode, CacheEntry>>,
}

impl InodeNameCache {
    /// Cache over the given registry, resolving self via `/proc/self/ns/afnet`
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            self_link: PathBuf::from(PROC_SELF_AFNET),
            self_inode: Cell::new(None),
            filled: Cell::new(false),
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Override the reference link used to resolve the caller's namespace
    #[must_use]
    pub fn with_self_link(mut self, link: impl Into<PathBuf>) -> Self {
        self.self_link = link.into();
        self
    }

    /// Inode of the namespace the calling process currently belongs to
    ///
    /// Resolved from the link target of the namespace reference, which
    /// encodes the inode as `afnet:[<inode>]`. Memoized on success for the
    /// lifetime of the process.
    ///
    /// # Errors
    /// Returns [`Error::Resource`] if the reference cannot be read or its
    /// target does not parse. Callers are expected to tolerate this and
    /// degrade to output without a self annotation.
    pub fn self_inode(&self) -> Result<NamespaceInode> {
        if let Some(inode) = self.self_inode.get() {
            return Ok(inode);
        }

        let target = fs::read_link(&self.self_link)
            .map_err(|e| Error::resource(format!("readlink {}", self.self_link.display()), e))?;
        let target = target.to_string_lossy();

        let inode = NamespaceInode::parse_reference(&target).ok_or_else(|| {
            Error::resource(
                format!("parse {}", self.self_link.display()),
                format!("malformed namespace reference {target:?}"),
            )
        })?;

        self.self_inode.set(Some(inode));
        Ok(inode)
    }

    /// Resolve an inode to its display name
    ///
    /// The first call scans the registry once. A hit returns the
    /// registered name (`NAME` or `NAME,self`); a miss synthesizes
    /// `afnet:[<inode>]` (with the `,self` suffix when it is the caller's
    /// own namespace), caches it so repeated lookups return the same
    /// string, and returns it.
    ///
    /// Returns `None` only when the inode has no cached name and the
    /// caller's own namespace cannot be resolved to decide the suffix.
    pub fn lookup(&self, inode: NamespaceInode) -> Option<String> {
        if !self.filled.replace(true) {
            self.fill();
        }

        if let Some(entry) = self.entries.borrow().get(&inode) {
            return Some(entry.render());
        }

        // Not registered: synthesize a name from the inode itself
        let me = match self.self_inode() {
            Ok(me) => me,
            Err(e) => {
                debug!(error = %e, inode = %inode, "cannot synthesize name");
                return None;
            }
        };

        let entry = CacheEntry {
            name: inode.reference(),
            is_self: me == inode,
        };
        let rendered = entry.render();
        self.entries.borrow_mut().insert(inode, entry);

        Some(rendered)
    }

    /// Scan the registry directory into the cache
    ///
    /// Runs at most once per process. Per-entry failures are skipped, not
    /// fatal; an unresolvable self namespace only costs the `,self`
    /// annotation.
    fn fill(&self) {
        let me = match self.self_inode() {
            Ok(me) => Some(me),
            Err(e) => {
                debug!(error = %e, "filling cache without self annotation");
                None
            }
        };

        let names = match self.registry.list() {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "cannot scan registry");
                return;
            }
        };

        let mut entries = self.entries.borrow_mut();
        for name in names {
            let path = self.registry.root().join(&name);
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!(handle = %path.display(), error = %e, "cannot stat handle");
                    continue;
                }
            };

            let inode = NamespaceInode::from_raw(metadata.ino());
            // First name encountered for an inode keeps the slot
            if let Entry::Vacant(slot) = entries.entry(inode) {
                slot.insert(CacheEntry {
                    name,
                    is_self: me == Some(inode),
                });
            }
        }
    }
}
