//! Core type definitions with strong typing and validation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Registered namespace name with validation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(try_from = "String", into = "String")]
pub struct NamespaceName(String);

impl NamespaceName {
    /// Maximum length for namespace names (`NAME_MAX`)
    pub const MAX_LENGTH: usize = 255;

    /// Create a new `NamespaceName` with validation
    ///
    /// # Errors
    /// Returns error if the name is invalid (empty, too long, a directory
    /// dot entry, or contains characters outside alphanumeric, dash,
    /// underscore, and dot)
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Validate a namespace name
    ///
    /// Names become single path components under the registry directory,
    /// so anything that would escape or shadow a directory entry is
    /// rejected.
    fn validate(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::usage("namespace name cannot be empty"));
        }

        if name.len() > Self::MAX_LENGTH {
            return Err(Error::usage(format!(
                "namespace name too long (max {} chars)",
                Self::MAX_LENGTH
            )));
        }

        if name == "." || name == ".." {
            return Err(Error::usage(format!(
                "\"{name}\" is not a valid namespace name"
            )));
        }

        if !name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            return Err(Error::usage(
                "namespace name can only contain alphanumeric, dash, underscore, and dot",
            ));
        }

        Ok(())
    }

    /// Get the name as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NamespaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NamespaceName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for NamespaceName {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl From<NamespaceName> for String {
    fn from(name: NamespaceName) -> Self {
        name.0
    }
}

/// Kernel identity of an afnet namespace
///
/// The kernel exposes no name for a namespace, only the inode number of
/// its nsfs pseudo-file; everything that crosses a process boundary is
/// keyed by this number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct NamespaceInode(u64);

impl NamespaceInode {
    /// Create from a raw inode number
    #[must_use]
    pub const fn from_raw(inode: u64) -> Self {
        Self(inode)
    }

    /// Get the raw inode number
    #[must_use]
    pub const fn as_raw(self) -> u64 {
        self.0
    }

    /// Render the proc reference form, `afnet:[<inode>]`
    ///
    /// This is the link target format of `/proc/<pid>/ns/afnet` and the
    /// display form synthesized for namespaces with no registry entry.
    #[must_use]
    pub fn reference(self) -> String {
        format!("afnet:[{}]", self.0)
    }

    /// Parse the proc reference form, `afnet:[<inode>]`
    #[must_use]
    pub fn parse_reference(reference: &str) -> Option<Self> {
        let inner = reference.strip_prefix("afnet:[")?.strip_suffix(']')?;
        inner.parse().ok().map(Self)
    }
}

impl fmt::Display for NamespaceInode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NamespaceInode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.parse()
            .map(Self)
            .map_err(|_| Error::usage(format!("\"{s}\" is not a valid inode number")))
    }
}
