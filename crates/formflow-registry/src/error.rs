//! Error types for the registry

use thiserror::Error;

/// Properties did not match the typed record of their component kind
#[derive(Debug, Error)]
#[error("Invalid properties for component '{component_type}': {source}")]
pub struct PropsError {
    pub component_type: String,
    #[source]
    pub source: serde_json::Error,
}

impl PropsError {
    pub fn new(component_type: impl Into<String>, source: serde_json::Error) -> Self {
        Self {
            component_type: component_type.into(),
            source,
        }
    }
}
