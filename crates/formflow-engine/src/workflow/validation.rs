//! Structural lint for workflow graphs
//!
//! The store already refuses edits that would break port rules, so a graph
//! built through it only trips the start/end checks. Graphs loaded from
//! elsewhere can trip any of them.

use std::collections::HashSet;

use super::ports::{accepts_input, branch_count, declares_output};
use super::types::{NodeKind, Workflow};
use crate::constants::workflow;

/// A structural problem found in a workflow
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowIssue {
    /// Workflow has no Start node
    MissingStartNode,
    /// Workflow has more than one Start node
    MultipleStartNodes,
    /// Workflow has no End node
    MissingEndNode,
    /// Two nodes share an id
    DuplicateNodeId { node_id: String },
    /// Two edges share an id
    DuplicateEdgeId { edge_id: String },
    /// An edge references a non-existent node
    UnknownNode { edge_id: String, node_id: String },
    /// An edge leaves through a port the source does not declare
    UndeclaredPort {
        edge_id: String,
        node_id: String,
        port: Option<String>,
    },
    /// An edge ends at a node that takes no input
    TargetRejectsInput { edge_id: String, node_id: String },
    /// A parallel node lists a branch count outside the allowed range
    BranchCountOutOfRange { node_id: String, count: usize },
}

impl std::fmt::Display for WorkflowIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingStartNode => write!(f, "Workflow has no Start node"),
            Self::MultipleStartNodes => write!(f, "Workflow has multiple Start nodes"),
            Self::MissingEndNode => write!(f, "Workflow has no End node"),
            Self::DuplicateNodeId { node_id } => write!(f, "Node id '{}' is used twice", node_id),
            Self::DuplicateEdgeId { edge_id } => write!(f, "Edge id '{}' is used twice", edge_id),
            Self::UnknownNode { edge_id, node_id } => {
                write!(f, "Edge '{}' references unknown node '{}'", edge_id, node_id)
            }
            Self::UndeclaredPort {
                edge_id,
                node_id,
                port,
            } => write!(
                f,
                "Edge '{}' leaves node '{}' through undeclared port '{}'",
                edge_id,
                node_id,
                port.as_deref().unwrap_or("<none>")
            ),
            Self::TargetRejectsInput { edge_id, node_id } => {
                write!(f, "Edge '{}' ends at node '{}' which takes no input", edge_id, node_id)
            }
            Self::BranchCountOutOfRange { node_id, count } => write!(
                f,
                "Parallel node '{}' lists {} branches (allowed {}..={})",
                node_id,
                count,
                workflow::MIN_PARALLEL_BRANCHES,
                workflow::MAX_PARALLEL_BRANCHES
            ),
        }
    }
}

impl std::error::Error for WorkflowIssue {}

/// Lint a workflow
///
/// Returns all issues found (not just the first).
pub fn validate_workflow(wf: &Workflow) -> Vec<WorkflowIssue> {
    let mut issues = Vec::new();

    validate_start_end_presence(wf, &mut issues);
    validate_unique_ids(wf, &mut issues);
    validate_edges(wf, &mut issues);
    validate_branch_counts(wf, &mut issues);

    issues
}

fn validate_start_end_presence(wf: &Workflow, issues: &mut Vec<WorkflowIssue>) {
    let starts = wf.nodes.iter().filter(|n| n.kind == NodeKind::Start).count();
    match starts {
        0 => issues.push(WorkflowIssue::MissingStartNode),
        1 => {}
        _ => issues.push(WorkflowIssue::MultipleStartNodes),
    }
    if !wf.nodes.iter().any(|n| n.kind == NodeKind::End) {
        issues.push(WorkflowIssue::MissingEndNode);
    }
}

fn validate_unique_ids(wf: &Workflow, issues: &mut Vec<WorkflowIssue>) {
    let mut seen = HashSet::new();
    for node in &wf.nodes {
        if !seen.insert(node.id.as_str()) {
            issues.push(WorkflowIssue::DuplicateNodeId {
                node_id: node.id.clone(),
            });
        }
    }

    let mut seen = HashSet::new();
    for edge in &wf.edges {
        if !seen.insert(edge.id.as_str()) {
            issues.push(WorkflowIssue::DuplicateEdgeId {
                edge_id: edge.id.clone(),
            });
        }
    }
}

fn validate_edges(wf: &Workflow, issues: &mut Vec<WorkflowIssue>) {
    for edge in &wf.edges {
        match wf.find_node(&edge.source) {
            None => issues.push(WorkflowIssue::UnknownNode {
                edge_id: edge.id.clone(),
                node_id: edge.source.clone(),
            }),
            Some(source) if !declares_output(source, edge.source_port.as_deref()) => {
                issues.push(WorkflowIssue::UndeclaredPort {
                    edge_id: edge.id.clone(),
                    node_id: source.id.clone(),
                    port: edge.source_port.clone(),
                })
            }
            Some(_) => {}
        }

        match wf.find_node(&edge.target) {
            None => issues.push(WorkflowIssue::UnknownNode {
                edge_id: edge.id.clone(),
                node_id: edge.target.clone(),
            }),
            Some(target) if !accepts_input(target.kind) => {
                issues.push(WorkflowIssue::TargetRejectsInput {
                    edge_id: edge.id.clone(),
                    node_id: target.id.clone(),
                })
            }
            Some(_) => {}
        }
    }
}

fn validate_branch_counts(wf: &Workflow, issues: &mut Vec<WorkflowIssue>) {
    for node in wf.nodes.iter().filter(|n| n.kind == NodeKind::Parallel) {
        if let Some(branches) = &node.data.parallel_branches {
            let count = branches.len();
            if count != 0 && count != branch_count(node) {
                issues.push(WorkflowIssue::BranchCountOutOfRange {
                    node_id: node.id.clone(),
                    count,
                });
            }
        }
    }
}
