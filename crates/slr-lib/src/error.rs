//! Error types shared by the regression core and its transports

use std::time::Duration;
use thiserror::Error;

/// Coarse classification used by transports to pick a status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input, rejected before any computation
    Validation,
    /// Requested model is absent from the store
    NotFound,
    /// Durable store or entropy source failure
    Storage,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Storage => "storage",
        }
    }
}

#[derive(Debug, Error)]
pub enum SlrError {
    #[error("no instances loaded")]
    NoInstances,

    #[error("error processing instance #{index}: expected 2 or 3 values, got {tokens}")]
    BadInstance { index: usize, tokens: usize },

    #[error("error processing instance #{index}: {reason}")]
    InvalidValue { index: usize, reason: String },

    #[error("could not load json: {0}")]
    MalformedInput(String),

    #[error("{0} key is required")]
    MissingParameter(&'static str),

    #[error("error converting arg parameter to float: {0}")]
    InvalidArgument(String),

    #[error("model {0} not found")]
    ModelNotFound(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("storage call timed out after {0:?}")]
    Timeout(Duration),

    #[error("cannot create random model name: {0}")]
    Entropy(String),
}

impl SlrError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SlrError::NoInstances
            | SlrError::BadInstance { .. }
            | SlrError::InvalidValue { .. }
            | SlrError::MalformedInput(_)
            | SlrError::MissingParameter(_)
            | SlrError::InvalidArgument(_) => ErrorKind::Validation,
            SlrError::ModelNotFound(_) => ErrorKind::NotFound,
            SlrError::Storage(_) | SlrError::Timeout(_) | SlrError::Entropy(_) => {
                ErrorKind::Storage
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub(crate) fn storage(context: &str, err: impl std::fmt::Display) -> Self {
        SlrError::Storage(format!("{}: {}", context, err))
    }
}

pub type Result<T, E = SlrError> = std::result::Result<T, E>;
