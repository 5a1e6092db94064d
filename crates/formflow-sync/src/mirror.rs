//! Surface-local copies of the canonical graph and grid
//!
//! A mirror is what a surface renders. It may run ahead of the canonical
//! store only for ids that are mid-drag or waiting in the pending batch;
//! every other difference is drift and resolves by a full reset.

use formflow_engine::form::{layout_items, FormDocument, LayoutItem};
use formflow_engine::workflow::Workflow;
use formflow_engine::{FormId, NodeId, Position, Result, WorkflowId};
use serde::{Deserialize, Serialize};

use crate::surface::{SurfaceEdge, SurfaceNode};
use crate::viewport::Viewport;

/// The graph canvas's copy of the current workflow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMirror {
    /// Workflow the mirror was built from
    pub workflow_id: Option<WorkflowId>,
    pub nodes: Vec<SurfaceNode>,
    pub edges: Vec<SurfaceEdge>,
    /// Adapter-local; never written to the workflow
    pub selection: Option<NodeId>,
    pub viewport: Viewport,
}

impl GraphMirror {
    /// Overwrite nodes and edges from canonical (one-way)
    ///
    /// The viewport survives. The selection survives only if its node does.
    pub fn reset_from(&mut self, workflow: Option<&Workflow>) {
        self.workflow_id = workflow.map(|wf| wf.id.clone());
        self.nodes = workflow
            .map(|wf| wf.nodes.iter().map(SurfaceNode::from_node).collect())
            .unwrap_or_default();
        self.edges = workflow
            .map(|wf| wf.edges.iter().map(SurfaceEdge::from_edge).collect())
            .unwrap_or_default();
        if let Some(selected) = &self.selection {
            if self.find_node(selected).is_none() {
                self.selection = None;
            }
        }
    }

    pub fn find_node(&self, id: &str) -> Option<&SurfaceNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn position_of(&self, id: &str) -> Option<Position> {
        self.find_node(id).map(|n| n.position)
    }

    /// Move one node locally; false if the mirror has no such node
    pub fn set_position(&mut self, id: &str, position: Position) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    pub fn upsert_node(&mut self, node: SurfaceNode) {
        match self.nodes.iter_mut().find(|n| n.id == node.id) {
            Some(existing) => *existing = node,
            None => self.nodes.push(node),
        }
    }

    pub fn upsert_edge(&mut self, edge: SurfaceEdge) {
        match self.edges.iter_mut().find(|e| e.id == edge.id) {
            Some(existing) => *existing = edge,
            None => self.edges.push(edge),
        }
    }

    pub fn remove_node(&mut self, id: &str) {
        self.nodes.retain(|n| n.id != id);
        if self.selection.as_deref() == Some(id) {
            self.selection = None;
        }
    }

    pub fn remove_edge(&mut self, id: &str) {
        self.edges.retain(|e| e.id != id);
    }

    /// Whether the mirror agrees with canonical
    ///
    /// Positions of ids in `in_flight` are allowed to differ.
    pub fn agrees_with(&self, workflow: Option<&Workflow>, in_flight: &[&str]) -> bool {
        let Some(wf) = workflow else {
            return self.workflow_id.is_none() && self.nodes.is_empty() && self.edges.is_empty();
        };
        if self.workflow_id.as_deref() != Some(wf.id.as_str())
            || self.nodes.len() != wf.nodes.len()
            || self.edges.len() != wf.edges.len()
        {
            return false;
        }

        let nodes_agree = wf.nodes.iter().all(|node| {
            let Some(local) = self.find_node(&node.id) else {
                return false;
            };
            let expected = SurfaceNode::from_node(node);
            let moved_ok = in_flight.contains(&node.id.as_str()) || local.position == expected.position;
            moved_ok && local.node_type == expected.node_type && local.data == expected.data
        });

        nodes_agree
            && wf.edges.iter().all(|edge| {
                self.edges
                    .iter()
                    .any(|local| *local == SurfaceEdge::from_edge(edge))
            })
    }

    /// Rebuild a workflow from the mirror's nodes and edges
    ///
    /// Metadata (name, form, timestamps) comes from `base`.
    pub fn to_workflow(&self, base: &Workflow) -> Result<Workflow> {
        let mut wf = base.clone();
        wf.nodes = self
            .nodes
            .iter()
            .map(SurfaceNode::to_node)
            .collect::<Result<Vec<_>>>()?;
        wf.edges = self
            .edges
            .iter()
            .map(SurfaceEdge::to_edge)
            .collect::<Result<Vec<_>>>()?;
        Ok(wf)
    }
}

/// The grid surface's copy of the form layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridMirror {
    pub form_id: Option<FormId>,
    pub items: Vec<LayoutItem>,
    pub viewport: Viewport,
}

impl GridMirror {
    /// Overwrite the items from the elements' placement (one-way)
    pub fn reset_from(&mut self, document: &FormDocument) {
        self.form_id = Some(document.id.clone());
        self.items = layout_items(&document.elements);
    }

    pub fn find_item(&self, id: &str) -> Option<&LayoutItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn upsert_item(&mut self, item: LayoutItem) {
        match self.items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    pub fn remove_item(&mut self, id: &str) {
        self.items.retain(|i| i.id != id);
    }

    /// Whether every element has exactly one matching item
    ///
    /// Items of ids in `in_flight` may differ from the element's placement.
    pub fn agrees_with(&self, document: &FormDocument, in_flight: &[&str]) -> bool {
        if self.form_id.as_deref() != Some(document.id.as_str())
            || self.items.len() != document.elements.len()
        {
            return false;
        }
        document.elements.iter().all(|element| {
            self.find_item(&element.id).is_some_and(|item| {
                in_flight.contains(&element.id.as_str()) || item.matches(&element.grid_props)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formflow_engine::config::WorkflowConfig;

    fn skeleton() -> Workflow {
        Workflow::with_skeleton("wf-1", "form-1", "Leave", &WorkflowConfig::default())
    }

    #[test]
    fn test_graph_mirror_round_trip() {
        let wf = skeleton();
        let mut mirror = GraphMirror::default();
        mirror.reset_from(Some(&wf));

        assert!(mirror.agrees_with(Some(&wf), &[]));
        assert_eq!(mirror.to_workflow(&wf).unwrap(), wf);
    }

    #[test]
    fn test_local_move_is_drift_unless_in_flight() {
        let wf = skeleton();
        let mut mirror = GraphMirror::default();
        mirror.reset_from(Some(&wf));
        assert!(mirror.set_position("start-1", Position::new(9.0, 9.0)));

        assert!(!mirror.agrees_with(Some(&wf), &[]));
        assert!(mirror.agrees_with(Some(&wf), &["start-1"]));
    }

    #[test]
    fn test_reset_drops_stale_selection() {
        let wf = skeleton();
        let mut mirror = GraphMirror {
            selection: Some("gone".to_string()),
            ..Default::default()
        };
        mirror.reset_from(Some(&wf));
        assert_eq!(mirror.selection, None);

        mirror.selection = Some("end-1".to_string());
        mirror.reset_from(Some(&wf));
        assert_eq!(mirror.selection.as_deref(), Some("end-1"));
    }

    #[test]
    fn test_empty_graph_mirror() {
        let mirror = GraphMirror::default();
        assert!(mirror.agrees_with(None, &[]));
        assert!(!mirror.agrees_with(Some(&skeleton()), &[]));
    }

    #[test]
    fn test_grid_mirror_agreement() {
        let doc = FormDocument::new("form-1");
        let mut grid = GridMirror::default();
        assert!(!grid.agrees_with(&doc, &[]));
        grid.reset_from(&doc);
        assert!(grid.agrees_with(&doc, &[]));

        grid.upsert_item(LayoutItem::new("ghost", 0, 0, 1, 1));
        assert!(!grid.agrees_with(&doc, &[]));
    }
}
