//! Error types for nodecon.
//!
//! Separates operator usage mistakes (rejected before any cluster call) from
//! cluster-side failures.

use thiserror::Error;

/// Error type for node condition operations
#[derive(Error, Debug)]
pub enum Error {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// The named node does not exist in the cluster
    #[error("node not found: {name}")]
    NodeNotFound { name: String },

    /// The request was rejected before touching the cluster
    #[error("Validation error: {0}")]
    Validation(String),

    /// Client configuration could not be resolved
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A strategic merge patch could not be computed
    #[error("Patch error: {0}")]
    Patch(String),
}

impl Error {
    /// Check if this error indicates a not-found condition
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NodeNotFound { .. } => true,
            Error::Kube(kube::Error::Api(e)) => e.code == 404,
            _ => false,
        }
    }

    /// Check if this error is an operator usage error
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Map a fetch failure for `name`, turning 404 into [`Error::NodeNotFound`]
    pub fn from_fetch(name: &str, err: kube::Error) -> Self {
        match err {
            kube::Error::Api(ref e) if e.code == 404 => Error::NodeNotFound {
                name: name.to_string(),
            },
            other => Error::Kube(other),
        }
    }
}

/// Result type alias for node condition operations
pub type Result<T> = std::result::Result<T, Error>;
