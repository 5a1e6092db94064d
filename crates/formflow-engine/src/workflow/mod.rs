//! Workflow side of the builder: graph types, port rules, the graph store
//! and a structural lint.

pub mod ports;
mod store;
mod types;
mod validation;

pub use store::{edge_ids, WorkflowStore};
pub use types::{
    edge_id, ActionType, EdgeData, EdgeKind, NodeData, NodeKind, Workflow, WorkflowEdge,
    WorkflowNode,
};
pub use validation::{validate_workflow, WorkflowIssue};
