//! This module defines the errors that can be returned by ringhash.
//!
//! Every variant is non-fatal: an operation that fails leaves the ring exactly as it was before the call.

use std::fmt::Display;

use serde::Serialize;

pub type Result<T> = std::result::Result<T, Error>;

/// Error enum with all possible variants
#[derive(Debug, Serialize)]
pub enum Error {
    /// A node with the same ring id is already registered
    DuplicateNode { id: String },
    /// No node with the given ring id is registered
    NodeNotFound { id: String },
    /// Nodes must contribute at least one virtual point to the ring
    InvalidWeight { id: String, weight: usize },
    InvalidConfig { reason: String },
    Io { reason: String },
    Logic { reason: String },
}

impl Error {
    /// Returns true if this is an instance of a [`Error::DuplicateNode`] variant
    pub fn is_duplicate_node(&self) -> bool {
        matches!(self, Error::DuplicateNode { .. })
    }

    /// Returns true if this is an instance of a [`Error::NodeNotFound`] variant
    pub fn is_node_not_found(&self) -> bool {
        matches!(self, Error::NodeNotFound { .. })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig {
            reason: err.to_string(),
        }
    }
}
