//! Editor configuration
//!
//! Grid geometry, workflow skeleton anchors and history depth. Every field
//! has a default from [`crate::constants`], so a host only needs to supply
//! the keys it wants to change.

use serde::{Deserialize, Serialize};

use crate::constants::{grid, history, workflow};
use crate::error::Result;
use crate::types::Position;

/// Top-level configuration for an editing session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub grid: GridConfig,
    pub workflow: WorkflowConfig,
    pub history: HistoryConfig,
}

impl EditorConfig {
    /// Parse a configuration from JSON, filling missing keys with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EditorConfig = serde_json::from_str(json)?;
        Ok(config)
    }
}

/// Layout grid geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    /// Pixel size of one drop cell
    pub cell_size: f64,
    pub cols: u32,
    pub row_height: u32,
    pub width: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: grid::CELL_SIZE,
            cols: grid::COLS,
            row_height: grid::ROW_HEIGHT,
            width: grid::WIDTH,
        }
    }
}

/// Workflow skeleton placement and palette defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkflowConfig {
    pub start_anchor: Position,
    pub end_anchor: Position,
    /// Branch count a freshly dropped parallel node starts with
    pub default_parallel_branches: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            start_anchor: Position::from(workflow::START_ANCHOR),
            end_anchor: Position::from(workflow::END_ANCHOR),
            default_parallel_branches: workflow::DEFAULT_PARALLEL_BRANCHES,
        }
    }
}

impl WorkflowConfig {
    /// Default branch count clamped into the allowed range
    pub fn parallel_branches(&self) -> usize {
        self.default_parallel_branches.clamp(
            workflow::MIN_PARALLEL_BRANCHES,
            workflow::MAX_PARALLEL_BRANCHES,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoryConfig {
    pub max_snapshots: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_snapshots: history::MAX_SNAPSHOTS,
        }
    }
}
