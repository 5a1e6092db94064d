//! Workflow graph types
//!
//! A workflow is a branching graph attached to a form. Node kinds are
//! structural roles with a fixed port arity; nothing here executes.

use chrono::{DateTime, Utc};
use formflow_registry::PropertyMap;
use serde::{Deserialize, Serialize};

use crate::constants::workflow;
use crate::form::ConditionOperator;
use crate::types::{EdgeId, FormId, NodeId, Position, WorkflowId};

/// The structural role of a workflow node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Entry point; one output
    Start,
    /// Two-way branch on a form field
    Condition,
    /// Side effect (email, webhook, approval, assignment)
    Action,
    /// Fans out into N branches
    Parallel,
    /// Joins any number of branches
    Merge,
    /// Exit point; one input
    End,
}

impl NodeKind {
    pub const ALL: [NodeKind; 6] = [
        NodeKind::Start,
        NodeKind::Condition,
        NodeKind::Action,
        NodeKind::Parallel,
        NodeKind::Merge,
        NodeKind::End,
    ];

    /// The wire tag, also used as the prefix of minted node ids
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Start => "start",
            NodeKind::Condition => "condition",
            NodeKind::Action => "action",
            NodeKind::Parallel => "parallel",
            NodeKind::Merge => "merge",
            NodeKind::End => "end",
        }
    }

    /// Get a human-readable label for this node kind
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Start => "Start",
            NodeKind::Condition => "Condition",
            NodeKind::Action => "Action",
            NodeKind::Parallel => "Parallel",
            NodeKind::Merge => "Merge",
            NodeKind::End => "End",
        }
    }

    /// Parse a wire tag
    pub fn parse(tag: &str) -> Option<NodeKind> {
        NodeKind::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Email,
    Webhook,
    Approval,
    Assignment,
}

/// Node payload shown and edited by the properties panel
///
/// Kind-specific fields are optional; anything else the panel writes is
/// kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_element_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_operator: Option<ConditionOperator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<ActionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_config: Option<PropertyMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel_branches: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: PropertyMap,
}

impl NodeData {
    pub fn new(label: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            level: level.into(),
            ..Default::default()
        }
    }
}

/// A node in a workflow graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub position: Position,
    #[serde(default)]
    pub data: NodeData,
}

impl WorkflowNode {
    pub fn new(
        id: impl Into<String>,
        kind: NodeKind,
        position: Position,
        data: NodeData,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            data,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    #[default]
    Default,
    Conditional,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeData {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// An edge from an output port of one node to another node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_port: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: EdgeKind,
    #[serde(default)]
    pub data: EdgeData,
}

impl WorkflowEdge {
    /// Create an edge whose id is derived from its endpoints
    pub fn new(
        source: impl Into<String>,
        source_port: Option<&str>,
        target: impl Into<String>,
    ) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: edge_id(&source, source_port, &target),
            source,
            target,
            source_port: source_port.map(str::to_string),
            kind: EdgeKind::Default,
            data: EdgeData {
                label: workflow::EDGE_LABEL.to_string(),
                condition: None,
            },
        }
    }

    pub fn with_kind(mut self, kind: EdgeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.data.label = label.into();
        self
    }

    /// Whether the edge touches the node at either end
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// Deterministic edge id for a connection
///
/// Connecting the same ports twice yields the same id, so a repeated
/// connect gesture is caught as a duplicate.
pub fn edge_id(source: &str, source_port: Option<&str>, target: &str) -> EdgeId {
    format!(
        "edge-{}-{}-{}",
        source,
        source_port.unwrap_or(workflow::ANONYMOUS_PORT),
        target
    )
}

/// A workflow attached to a form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: WorkflowId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Weak reference; the form may no longer exist
    pub form_id: FormId,
    pub nodes: Vec<WorkflowNode>,
    pub edges: Vec<WorkflowEdge>,
    #[serde(default)]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    /// Create an empty workflow with no nodes
    pub fn new(id: impl Into<String>, form_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            form_id: form_id.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            is_active: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn find_node(&self, node_id: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    pub fn find_edge(&self, edge_id: &str) -> Option<&WorkflowEdge> {
        self.edges.iter().find(|e| e.id == edge_id)
    }

    /// Find the Start node in this workflow
    pub fn find_start_node(&self) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.kind == NodeKind::Start)
    }

    /// Get all edges leaving a given node
    pub fn outgoing_edges(&self, node_id: &str) -> Vec<&WorkflowEdge> {
        self.edges.iter().filter(|e| e.source == node_id).collect()
    }

    /// Get all edges entering a given node
    pub fn incoming_edges(&self, node_id: &str) -> Vec<&WorkflowEdge> {
        self.edges.iter().filter(|e| e.target == node_id).collect()
    }

    /// Stamp the workflow as modified now
    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }
}
