//! Shapes exchanged with the editing surfaces
//!
//! The graph canvas speaks loosely-typed nodes and edges (`type` is a
//! string, `data` any object). Conversions to the canonical types are
//! checked; conversions from them never fail.

use formflow_engine::workflow::{EdgeKind, NodeKind, WorkflowEdge, WorkflowNode};
use formflow_engine::{FormflowError, Position, Result};
use serde::{Deserialize, Serialize};

/// A node as the graph canvas sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub position: Position,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl SurfaceNode {
    pub fn from_node(node: &WorkflowNode) -> Self {
        Self {
            id: node.id.clone(),
            node_type: node.kind.as_str().to_string(),
            position: node.position,
            data: serde_json::to_value(&node.data).unwrap_or_default(),
        }
    }

    pub fn to_node(&self) -> Result<WorkflowNode> {
        let kind = NodeKind::parse(&self.node_type).ok_or_else(|| {
            FormflowError::validation(format!("Unknown node type '{}'", self.node_type))
        })?;
        let data = match &self.data {
            serde_json::Value::Null => Default::default(),
            value => serde_json::from_value(value.clone())?,
        };
        Ok(WorkflowNode::new(self.id.clone(), kind, self.position, data))
    }
}

/// An edge as the graph canvas sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_port: Option<String>,
    #[serde(rename = "type", default)]
    pub edge_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl SurfaceEdge {
    pub fn from_edge(edge: &WorkflowEdge) -> Self {
        let edge_type = match edge.kind {
            EdgeKind::Default => "default",
            EdgeKind::Conditional => "conditional",
        };
        Self {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            source_port: edge.source_port.clone(),
            edge_type: edge_type.to_string(),
            data: serde_json::to_value(&edge.data).unwrap_or_default(),
        }
    }

    pub fn to_edge(&self) -> Result<WorkflowEdge> {
        let kind = match self.edge_type.as_str() {
            "" | "default" => EdgeKind::Default,
            "conditional" => EdgeKind::Conditional,
            other => {
                return Err(FormflowError::validation(format!(
                    "Unknown edge type '{}'",
                    other
                )))
            }
        };
        let data = match &self.data {
            serde_json::Value::Null => Default::default(),
            value => serde_json::from_value(value.clone())?,
        };
        Ok(WorkflowEdge {
            id: self.id.clone(),
            source: self.source.clone(),
            target: self.target.clone(),
            source_port: self.source_port.clone(),
            kind,
            data,
        })
    }
}

/// Payload carried by a drag from the workflow palette
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DropPayload {
    pub node_type: Option<String>,
    /// JSON text of the form a form-node refers to
    pub serialized_form_ref: Option<String>,
}

/// The form a palette node refers to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl DropPayload {
    pub fn node(node_type: &str) -> Self {
        Self {
            node_type: Some(node_type.to_string()),
            serialized_form_ref: None,
        }
    }

    /// Check the payload and decode its parts
    pub fn parse(&self) -> Result<(NodeKind, Option<FormRef>)> {
        let tag = self
            .node_type
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| FormflowError::validation("Drop payload has no nodeType"))?;
        let kind = NodeKind::parse(tag)
            .ok_or_else(|| FormflowError::validation(format!("Unknown node type '{}'", tag)))?;

        let form_ref = match &self.serialized_form_ref {
            Some(text) => Some(serde_json::from_str::<FormRef>(text).map_err(|e| {
                FormflowError::validation(format!("Malformed form reference: {}", e))
            })?),
            None => None,
        };
        Ok((kind, form_ref))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formflow_engine::workflow::NodeData;
    use serde_json::json;

    #[test]
    fn test_node_round_trip() {
        let mut data = NodeData::new("Check age", "Level 2");
        data.condition_field = Some("age".to_string());
        data.extra.insert("color".to_string(), json!("blue"));
        let node = WorkflowNode::new("condition-1", NodeKind::Condition, Position::new(3.0, 4.0), data);

        let surface = SurfaceNode::from_node(&node);
        assert_eq!(surface.node_type, "condition");
        assert_eq!(surface.data["conditionField"], "age");
        assert_eq!(surface.to_node().unwrap(), node);
    }

    #[test]
    fn test_unknown_surface_type_is_rejected() {
        let surface = SurfaceNode {
            id: "x".to_string(),
            node_type: "loop".to_string(),
            position: Position::default(),
            data: json!({}),
        };
        assert!(matches!(surface.to_node(), Err(FormflowError::Validation(_))));
    }

    #[test]
    fn test_edge_round_trip() {
        let edge = WorkflowEdge::new("c1", Some("false"), "end-1")
            .with_kind(EdgeKind::Conditional)
            .with_label("False");
        let surface = SurfaceEdge::from_edge(&edge);
        assert_eq!(surface.edge_type, "conditional");
        assert_eq!(surface.to_edge().unwrap(), edge);
    }

    #[test]
    fn test_drop_payload() {
        let payload: DropPayload = serde_json::from_value(json!({
            "nodeType": "action",
            "serializedFormRef": "{\"id\":\"f9\",\"name\":\"Leave request\"}"
        }))
        .unwrap();
        let (kind, form_ref) = payload.parse().unwrap();
        assert_eq!(kind, NodeKind::Action);
        assert_eq!(form_ref.unwrap().name, "Leave request");

        assert!(DropPayload::default().parse().is_err());
        assert!(DropPayload::node("teleport").parse().is_err());

        let bad = DropPayload {
            node_type: Some("action".to_string()),
            serialized_form_ref: Some("{not json".to_string()),
        };
        assert!(matches!(bad.parse(), Err(FormflowError::Validation(_))));
    }
}
