//! Error types for the form and workflow stores

use formflow_registry::PropsError;
use thiserror::Error;

/// Result type alias using FormflowError
pub type Result<T> = std::result::Result<T, FormflowError>;

/// Errors a store operation can reject with
///
/// Every variant is returned before any mutation happens, so an `Err`
/// always means the store is unchanged.
#[derive(Debug, Error)]
pub enum FormflowError {
    /// Malformed payload (missing type tag, bad serialized reference, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Properties do not fit the typed record of their component kind
    #[error(transparent)]
    InvalidProperties(#[from] PropsError),

    /// The operation targets an id that does not exist
    #[error("Unknown {kind} '{id}'")]
    Reference { kind: &'static str, id: String },

    /// The mutation would break a structural rule (undeclared port,
    /// dangling reference, duplicate id)
    #[error("Invariant violation: {0}")]
    Invariant(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Compression error
    #[error("Compression error: {0}")]
    Compression(String),
}

impl FormflowError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    pub fn unknown_element(id: impl Into<String>) -> Self {
        Self::Reference {
            kind: "element",
            id: id.into(),
        }
    }

    pub fn unknown_node(id: impl Into<String>) -> Self {
        Self::Reference {
            kind: "node",
            id: id.into(),
        }
    }

    pub fn unknown_edge(id: impl Into<String>) -> Self {
        Self::Reference {
            kind: "edge",
            id: id.into(),
        }
    }

    pub fn unknown_workflow(id: impl Into<String>) -> Self {
        Self::Reference {
            kind: "workflow",
            id: id.into(),
        }
    }

    /// Whether the error rejected a user gesture (as opposed to a
    /// history/serialization failure)
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Serialization(_) | Self::Compression(_))
    }
}
