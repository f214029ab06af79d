//! Error types for afnetns

use thiserror::Error;

/// Afnetns error types
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Missing or invalid argument
    #[error("usage error: {message}")]
    Usage {
        /// Error message
        message: String,
    },

    /// Creation target already registered
    #[error("namespace \"{name}\" already exists")]
    NameCollision {
        /// Name that collided
        name: String,
    },

    /// Join or open target is not registered
    #[error("namespace \"{name}\" not found")]
    NotFound {
        /// Name that was looked up
        name: String,
    },

    /// Underlying syscall failed
    #[error("{operation}: {message}")]
    Resource {
        /// Operation that failed, including its target
        operation: String,
        /// System-level error text
        message: String,
    },
}

impl Error {
    /// Build a [`Error::Usage`] from a message
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Build a [`Error::NameCollision`] for a namespace name
    pub fn collision(name: impl Into<String>) -> Self {
        Self::NameCollision { name: name.into() }
    }

    /// Build a [`Error::NotFound`] for a namespace name
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Build a [`Error::Resource`] from an operation and its system error
    pub fn resource(operation: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Resource {
            operation: operation.into(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for afnetns operations
pub type Result<T> = std::result::Result<T, Error>;
