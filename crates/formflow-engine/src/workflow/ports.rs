//! Port topology per node kind
//!
//! | kind      | inputs | outputs                     |
//! |-----------|--------|-----------------------------|
//! | start     | none   | `next`                      |
//! | condition | 1      | `true`, `false`             |
//! | action    | 1      | `next`                      |
//! | parallel  | 1      | `branch-0` .. `branch-(N-1)`|
//! | merge     | any    | `next`                      |
//! | end       | 1      | none                        |

use super::types::{NodeKind, WorkflowNode};
use crate::constants::workflow;
use crate::error::{FormflowError, Result};

pub const TRUE_PORT: &str = "true";
pub const FALSE_PORT: &str = "false";
pub const INPUT_PORT: &str = "input";

/// Name of the i-th branch port of a parallel node
pub fn branch_port(index: usize) -> String {
    format!("branch-{}", index)
}

/// Number of branches a parallel node declares
///
/// Taken from `parallelBranches`, clamped into the allowed range; nodes that
/// do not list their branches get the default.
pub fn branch_count(node: &WorkflowNode) -> usize {
    let listed = node
        .data
        .parallel_branches
        .as_ref()
        .map(Vec::len)
        .unwrap_or(0);
    if listed == 0 {
        workflow::DEFAULT_PARALLEL_BRANCHES
    } else {
        listed.clamp(
            workflow::MIN_PARALLEL_BRANCHES,
            workflow::MAX_PARALLEL_BRANCHES,
        )
    }
}

/// Output ports the node declares
pub fn output_ports(node: &WorkflowNode) -> Vec<String> {
    match node.kind {
        NodeKind::Start | NodeKind::Action | NodeKind::Merge => {
            vec![workflow::NEXT_PORT.to_string()]
        }
        NodeKind::Condition => vec![TRUE_PORT.to_string(), FALSE_PORT.to_string()],
        NodeKind::Parallel => (0..branch_count(node)).map(branch_port).collect(),
        NodeKind::End => Vec::new(),
    }
}

/// Whether edges may end at this kind
pub fn accepts_input(kind: NodeKind) -> bool {
    kind != NodeKind::Start
}

/// Whether an edge may leave this node through `port`
///
/// Single-output kinds take no port or `next`. Condition and parallel nodes
/// must name one of their declared ports.
pub fn declares_output(node: &WorkflowNode, port: Option<&str>) -> bool {
    match node.kind {
        NodeKind::End => false,
        NodeKind::Start | NodeKind::Action | NodeKind::Merge => {
            matches!(port, None | Some(workflow::NEXT_PORT))
        }
        NodeKind::Condition | NodeKind::Parallel => match port {
            Some(port) => output_ports(node).iter().any(|p| p == port),
            None => false,
        },
    }
}

/// The port an edge from `kind` is stored under
///
/// Single-output kinds store their one port as no port at all, so `next`
/// and an absent port name the same connection.
pub fn canonical_port(kind: NodeKind, port: Option<&str>) -> Option<&str> {
    match (kind, port) {
        (NodeKind::Start | NodeKind::Action | NodeKind::Merge, Some(workflow::NEXT_PORT)) => None,
        _ => port,
    }
}

/// Check an edge's source port against the source node
pub fn check_source_port(node: &WorkflowNode, port: Option<&str>) -> Result<()> {
    if declares_output(node, port) {
        Ok(())
    } else {
        Err(FormflowError::invariant(format!(
            "Node '{}' ({}) has no output port '{}'",
            node.id,
            node.kind.as_str(),
            port.unwrap_or("<none>")
        )))
    }
}
