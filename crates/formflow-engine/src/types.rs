//! Shared identifier and geometry types

use serde::{Deserialize, Serialize};

/// Unique identifier for a form document
pub type FormId = String;

/// Unique identifier for a form element
pub type ElementId = String;

/// Unique identifier for a workflow
pub type WorkflowId = String;

/// Unique identifier for a workflow node
pub type NodeId = String;

/// Unique identifier for a workflow edge
pub type EdgeId = String;

/// A point in canvas or screen space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}
