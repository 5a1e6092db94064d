//! Workflow graph store
//!
//! Mutations on a [`Workflow`] check every structural rule before touching
//! the graph: a rejected call returns `Err` and leaves nodes, edges and
//! `updatedAt` exactly as they were. [`WorkflowStore`] holds the workflows
//! of a session and tracks which one is being edited.

use std::collections::{BTreeMap, HashSet};

use formflow_registry::PropertyMap;

use super::ports::{accepts_input, canonical_port, check_source_port, declares_output};
use super::types::{edge_id, NodeData, NodeKind, Workflow, WorkflowEdge, WorkflowNode};
use crate::config::WorkflowConfig;
use crate::constants::workflow;
use crate::error::{FormflowError, Result};
use crate::form::InfoPatch;
use crate::ids::IdSource;
use crate::types::{EdgeId, NodeId, Position, WorkflowId};

impl Workflow {
    /// Create a workflow seeded with the start/end skeleton
    pub fn with_skeleton(
        id: impl Into<String>,
        form_id: impl Into<String>,
        form_name: &str,
        config: &WorkflowConfig,
    ) -> Self {
        let mut wf = Workflow::new(id, form_id, format!("{} Workflow", form_name));
        wf.description = format!("Workflow for {}", form_name);
        wf.nodes = vec![
            WorkflowNode::new(
                workflow::START_ID,
                NodeKind::Start,
                config.start_anchor,
                NodeData::new(workflow::START_LABEL, workflow::START_LEVEL),
            ),
            WorkflowNode::new(
                workflow::END_ID,
                NodeKind::End,
                config.end_anchor,
                NodeData::new(workflow::END_LABEL, workflow::END_LEVEL),
            ),
        ];
        wf
    }

    fn node_index(&self, node_id: &str) -> Result<usize> {
        self.nodes
            .iter()
            .position(|n| n.id == node_id)
            .ok_or_else(|| FormflowError::unknown_node(node_id))
    }

    /// Append a node; its id must not be taken
    pub fn add_node(&mut self, node: WorkflowNode) -> Result<()> {
        if node.id.trim().is_empty() {
            return Err(FormflowError::validation("Node id is empty"));
        }
        if self.find_node(&node.id).is_some() {
            return Err(FormflowError::invariant(format!(
                "Duplicate node id '{}'",
                node.id
            )));
        }
        self.nodes.push(node);
        self.touch();
        Ok(())
    }

    /// Shallow-merge `patch` into a node's data
    ///
    /// Keys with the wrong shape (e.g. `actionType: 3`) reject the patch.
    /// Shrinking a parallel node's branch list drops the edges that left
    /// through the ports it no longer declares; those edges are returned.
    pub fn update_node(&mut self, node_id: &str, patch: &PropertyMap) -> Result<Vec<WorkflowEdge>> {
        let index = self.node_index(node_id)?;

        let mut data = match serde_json::to_value(&self.nodes[index].data)? {
            serde_json::Value::Object(map) => map,
            _ => PropertyMap::new(),
        };
        for (key, value) in patch {
            data.insert(key.clone(), value.clone());
        }
        let data: NodeData = serde_json::from_value(serde_json::Value::Object(data))
            .map_err(|e| FormflowError::validation(format!("Invalid data for node '{}': {}", node_id, e)))?;

        let mut updated = self.nodes[index].clone();
        updated.data = data;

        let (kept, dropped): (Vec<_>, Vec<_>) = std::mem::take(&mut self.edges)
            .into_iter()
            .partition(|e| e.source != node_id || declares_output(&updated, e.source_port.as_deref()));
        self.edges = kept;
        self.nodes[index] = updated;
        self.touch();

        if !dropped.is_empty() {
            log::debug!(
                "Node '{}' dropped {} edge(s) from removed ports",
                node_id,
                dropped.len()
            );
        }
        Ok(dropped)
    }

    pub fn move_node(&mut self, node_id: &str, position: Position) -> Result<()> {
        let index = self.node_index(node_id)?;
        self.nodes[index].position = position;
        self.touch();
        Ok(())
    }

    /// Commit a batch of positions in one step
    ///
    /// All-or-nothing: an unknown id rejects the whole batch.
    pub fn replace_positions(&mut self, positions: &BTreeMap<NodeId, Position>) -> Result<()> {
        for node_id in positions.keys() {
            self.node_index(node_id)?;
        }
        for node in &mut self.nodes {
            if let Some(position) = positions.get(&node.id) {
                node.position = *position;
            }
        }
        if !positions.is_empty() {
            self.touch();
        }
        Ok(())
    }

    /// Remove a node and every edge touching it
    pub fn remove_node(&mut self, node_id: &str) -> Result<(WorkflowNode, Vec<WorkflowEdge>)> {
        let index = self.node_index(node_id)?;
        let node = self.nodes.remove(index);

        let (dropped, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.edges)
            .into_iter()
            .partition(|e| e.touches(node_id));
        self.edges = kept;
        self.touch();
        Ok((node, dropped))
    }

    /// Append an edge after checking both endpoints and the source port
    ///
    /// A `next` port on a single-output source is stored as no port; an id
    /// derived from the `next` spelling is re-derived to match.
    pub fn add_edge(&mut self, mut edge: WorkflowEdge) -> Result<()> {
        if edge.id.trim().is_empty() {
            return Err(FormflowError::validation("Edge id is empty"));
        }
        let source = self
            .find_node(&edge.source)
            .ok_or_else(|| FormflowError::invariant(format!("Edge source '{}' does not exist", edge.source)))?;
        let target = self
            .find_node(&edge.target)
            .ok_or_else(|| FormflowError::invariant(format!("Edge target '{}' does not exist", edge.target)))?;

        check_source_port(source, edge.source_port.as_deref())?;
        if !accepts_input(target.kind) {
            return Err(FormflowError::invariant(format!(
                "Node '{}' ({}) accepts no input",
                target.id,
                target.kind.as_str()
            )));
        }
        let source_kind = source.kind;

        let port = canonical_port(source_kind, edge.source_port.as_deref()).map(str::to_string);
        if port != edge.source_port {
            if edge.id == edge_id(&edge.source, edge.source_port.as_deref(), &edge.target) {
                edge.id = edge_id(&edge.source, port.as_deref(), &edge.target);
            }
            edge.source_port = port;
        }

        if self.find_edge(&edge.id).is_some() {
            return Err(FormflowError::invariant(format!(
                "Duplicate edge id '{}'",
                edge.id
            )));
        }
        let connected = self.edges.iter().any(|e| {
            e.source == edge.source
                && e.target == edge.target
                && canonical_port(source_kind, e.source_port.as_deref())
                    == edge.source_port.as_deref()
        });
        if connected {
            return Err(FormflowError::invariant(format!(
                "'{}' is already connected to '{}'",
                edge.source, edge.target
            )));
        }

        self.edges.push(edge);
        self.touch();
        Ok(())
    }

    pub fn remove_edge(&mut self, edge_id: &str) -> Result<WorkflowEdge> {
        let index = self
            .edges
            .iter()
            .position(|e| e.id == edge_id)
            .ok_or_else(|| FormflowError::unknown_edge(edge_id))?;
        let edge = self.edges.remove(index);
        self.touch();
        Ok(edge)
    }

    /// Flip the active flag and return the new value
    pub fn toggle_active(&mut self) -> bool {
        self.is_active = !self.is_active;
        self.touch();
        self.is_active
    }

    pub fn update_info(&mut self, patch: &InfoPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        self.touch();
    }
}

/// The workflows of a session and the one being edited
#[derive(Debug, Clone, Default)]
pub struct WorkflowStore {
    workflows: Vec<Workflow>,
    current: Option<WorkflowId>,
    workflow_mode: bool,
    config: WorkflowConfig,
}

impl WorkflowStore {
    pub fn new(config: WorkflowConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn workflows(&self) -> &[Workflow] {
        &self.workflows
    }

    pub fn workflow_mode(&self) -> bool {
        self.workflow_mode
    }

    pub fn set_workflow_mode(&mut self, enabled: bool) {
        self.workflow_mode = enabled;
    }

    pub fn get(&self, id: &str) -> Option<&Workflow> {
        self.workflows.iter().find(|w| w.id == id)
    }

    /// The workflow attached to a form, if one was created
    pub fn for_form(&self, form_id: &str) -> Option<&Workflow> {
        self.workflows.iter().find(|w| w.form_id == form_id)
    }

    /// The workflow being edited
    pub fn current(&self) -> Option<&Workflow> {
        self.current.as_deref().and_then(|id| self.get(id))
    }

    /// The workflow being edited, for mutation
    pub fn current_mut(&mut self) -> Result<&mut Workflow> {
        let id = self
            .current
            .clone()
            .ok_or_else(|| FormflowError::unknown_workflow("<none>"))?;
        self.workflows
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| FormflowError::unknown_workflow(id))
    }

    /// Create the workflow for a form and start editing it
    ///
    /// A form has at most one workflow: if one exists it becomes current
    /// instead of a second being created. Returns the workflow id and
    /// whether it was newly created.
    pub fn create_workflow(
        &mut self,
        ids: &mut dyn IdSource,
        form_id: &str,
        form_name: &str,
    ) -> Result<(WorkflowId, bool)> {
        if form_id.trim().is_empty() {
            return Err(FormflowError::validation("Form id is empty"));
        }

        self.workflow_mode = true;
        if let Some(existing) = self.for_form(form_id) {
            let id = existing.id.clone();
            self.current = Some(id.clone());
            return Ok((id, false));
        }

        let wf = Workflow::with_skeleton(ids.workflow_id(), form_id, form_name, &self.config);
        let id = wf.id.clone();
        log::info!("Created workflow '{}' for form '{}'", id, form_id);
        self.workflows.push(wf);
        self.current = Some(id.clone());
        Ok((id, true))
    }

    /// Switch the workflow being edited
    pub fn set_current(&mut self, id: &str) -> Result<()> {
        if self.get(id).is_none() {
            return Err(FormflowError::unknown_workflow(id));
        }
        self.current = Some(id.to_string());
        Ok(())
    }

    /// Replace every workflow at once (history restore)
    pub fn restore(&mut self, workflows: Vec<Workflow>, current: Option<WorkflowId>) {
        let known: HashSet<&str> = workflows.iter().map(|w| w.id.as_str()).collect();
        self.current = current.filter(|id| known.contains(id.as_str()));
        self.workflows = workflows;
    }

    pub(crate) fn current_id(&self) -> Option<&WorkflowId> {
        self.current.as_ref()
    }
}

/// Edge ids of a workflow, in order
pub fn edge_ids(wf: &Workflow) -> Vec<EdgeId> {
    wf.edges.iter().map(|e| e.id.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use crate::workflow::{EdgeKind, WorkflowEdge};
    use serde_json::json;

    fn skeleton() -> Workflow {
        Workflow::with_skeleton("wf", "f1", "MyForm", &WorkflowConfig::default())
    }

    fn add(wf: &mut Workflow, id: &str, kind: NodeKind) {
        wf.add_node(WorkflowNode::new(id, kind, Position::default(), NodeData::new(kind.label(), "Level 2")))
            .unwrap();
    }

    fn map(value: serde_json::Value) -> PropertyMap {
        match value {
            serde_json::Value::Object(m) => m,
            _ => PropertyMap::new(),
        }
    }

    #[test]
    fn test_skeleton() {
        let wf = skeleton();
        assert_eq!(wf.name, "MyForm Workflow");
        assert_eq!(wf.description, "Workflow for MyForm");
        assert_eq!(wf.nodes.len(), 2);
        assert_eq!(wf.nodes[0].id, "start-1");
        assert_eq!(wf.nodes[0].position, Position::new(250.0, 50.0));
        assert_eq!(wf.nodes[0].data.level, "Level 1");
        assert_eq!(wf.nodes[1].id, "end-1");
        assert_eq!(wf.nodes[1].position, Position::new(250.0, 400.0));
        assert_eq!(wf.nodes[1].data.level, "Level 4");
        assert!(wf.edges.is_empty());
        assert!(!wf.is_active);
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut wf = skeleton();
        let result = wf.add_node(WorkflowNode::new("start-1", NodeKind::Action, Position::default(), NodeData::default()));
        assert!(matches!(result, Err(FormflowError::Invariant(_))));
        assert_eq!(wf.nodes.len(), 2);
    }

    #[test]
    fn test_condition_edges_need_true_or_false() {
        let mut wf = skeleton();
        add(&mut wf, "c1", NodeKind::Condition);
        add(&mut wf, "a1", NodeKind::Action);

        assert!(wf.add_edge(WorkflowEdge::new("c1", None, "a1")).is_err());
        assert!(wf.add_edge(WorkflowEdge::new("c1", Some("maybe"), "a1")).is_err());
        assert!(wf.edges.is_empty());

        wf.add_edge(WorkflowEdge::new("c1", Some("true"), "a1").with_kind(EdgeKind::Conditional))
            .unwrap();
        wf.add_edge(WorkflowEdge::new("c1", Some("false"), "end-1")).unwrap();
        assert_eq!(wf.edges.len(), 2);
    }

    #[test]
    fn test_edge_endpoint_rules() {
        let mut wf = skeleton();
        assert!(wf.add_edge(WorkflowEdge::new("start-1", None, "ghost")).is_err());
        assert!(wf.add_edge(WorkflowEdge::new("end-1", None, "start-1")).is_err());
        assert!(wf.add_edge(WorkflowEdge::new("end-1", None, "end-1")).is_err());

        wf.add_edge(WorkflowEdge::new("start-1", None, "end-1")).unwrap();
        let dup = wf.add_edge(WorkflowEdge::new("start-1", None, "end-1"));
        assert!(matches!(dup, Err(FormflowError::Invariant(_))));
        assert_eq!(wf.edges.len(), 1);
    }

    #[test]
    fn test_next_port_matches_anonymous_edge() {
        let mut wf = skeleton();
        add(&mut wf, "a1", NodeKind::Action);
        wf.add_edge(WorkflowEdge::new("a1", None, "end-1")).unwrap();

        let again = wf.add_edge(WorkflowEdge::new("a1", Some("next"), "end-1"));
        assert!(matches!(again, Err(FormflowError::Invariant(_))));

        let mut renamed = WorkflowEdge::new("a1", Some("next"), "end-1");
        renamed.id = "custom".to_string();
        assert!(wf.add_edge(renamed).is_err());
        assert_eq!(edge_ids(&wf), vec!["edge-a1-out-end-1"]);
    }

    #[test]
    fn test_next_port_is_stored_anonymous() {
        let mut wf = skeleton();
        wf.add_edge(WorkflowEdge::new("start-1", Some("next"), "end-1"))
            .unwrap();

        assert_eq!(wf.edges[0].id, "edge-start-1-out-end-1");
        assert_eq!(wf.edges[0].source_port, None);
        assert!(wf.add_edge(WorkflowEdge::new("start-1", None, "end-1")).is_err());
    }

    #[test]
    fn test_remove_node_cascades() {
        let mut wf = skeleton();
        add(&mut wf, "c1", NodeKind::Condition);
        add(&mut wf, "a1", NodeKind::Action);
        wf.add_edge(WorkflowEdge::new("start-1", None, "c1")).unwrap();
        wf.add_edge(WorkflowEdge::new("c1", Some("true"), "a1")).unwrap();
        wf.add_edge(WorkflowEdge::new("a1", None, "end-1")).unwrap();
        let a1_before = wf.find_node("a1").cloned();

        let (removed, dropped) = wf.remove_node("c1").unwrap();
        assert_eq!(removed.id, "c1");
        assert_eq!(dropped.len(), 2);
        assert_eq!(edge_ids(&wf), vec!["edge-a1-out-end-1"]);
        assert_eq!(wf.find_node("a1").cloned(), a1_before);
    }

    #[test]
    fn test_update_node_merges_data() {
        let mut wf = skeleton();
        add(&mut wf, "a1", NodeKind::Action);

        wf.update_node("a1", &map(json!({"actionType": "email", "note": "x"}))).unwrap();
        let node = wf.find_node("a1").unwrap();
        assert_eq!(node.data.label, "Action");
        assert_eq!(node.data.action_type, Some(crate::workflow::ActionType::Email));
        assert_eq!(node.data.extra["note"], "x");

        assert!(wf.update_node("a1", &map(json!({"actionType": 3}))).is_err());
        assert!(wf.update_node("ghost", &PropertyMap::new()).is_err());
    }

    #[test]
    fn test_shrinking_branches_drops_edges() {
        let mut wf = skeleton();
        add(&mut wf, "p1", NodeKind::Parallel);
        wf.update_node("p1", &map(json!({"parallelBranches": ["a", "b", "c"]})))
            .unwrap();
        wf.add_edge(WorkflowEdge::new("p1", Some("branch-2"), "end-1")).unwrap();
        wf.add_edge(WorkflowEdge::new("p1", Some("branch-0"), "end-1")).unwrap();

        let dropped = wf
            .update_node("p1", &map(json!({"parallelBranches": ["a", "b"]})))
            .unwrap();
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].source_port.as_deref(), Some("branch-2"));
        assert_eq!(wf.edges.len(), 1);
    }

    #[test]
    fn test_replace_positions_is_all_or_nothing() {
        let mut wf = skeleton();
        let mut batch = BTreeMap::new();
        batch.insert("start-1".to_string(), Position::new(1.0, 2.0));
        batch.insert("ghost".to_string(), Position::new(3.0, 4.0));

        assert!(wf.replace_positions(&batch).is_err());
        assert_eq!(wf.nodes[0].position, Position::new(250.0, 50.0));

        batch.remove("ghost");
        wf.replace_positions(&batch).unwrap();
        assert_eq!(wf.nodes[0].position, Position::new(1.0, 2.0));
    }

    #[test]
    fn test_rejected_mutation_keeps_timestamp() {
        let mut wf = skeleton();
        let stamp = wf.updated_at;
        assert!(wf.remove_edge("nope").is_err());
        assert_eq!(wf.updated_at, stamp);

        wf.toggle_active();
        assert!(wf.is_active);
        assert!(wf.updated_at >= stamp);
    }

    #[test]
    fn test_store_creates_one_workflow_per_form() {
        let mut ids = SequentialIds::new();
        let mut store = WorkflowStore::default();

        let (first, created) = store.create_workflow(&mut ids, "f1", "MyForm").unwrap();
        assert!(created);
        assert!(store.workflow_mode());

        let (again, created) = store.create_workflow(&mut ids, "f1", "MyForm").unwrap();
        assert!(!created);
        assert_eq!(first, again);
        assert_eq!(store.workflows().len(), 1);
        assert_eq!(store.current().unwrap().form_id, "f1");
    }

    #[test]
    fn test_current_mut_without_workflow() {
        let mut store = WorkflowStore::default();
        assert!(matches!(
            store.current_mut(),
            Err(FormflowError::Reference { kind: "workflow", .. })
        ));
    }
}
