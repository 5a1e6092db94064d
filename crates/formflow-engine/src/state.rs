//! Application state and command dispatch
//!
//! [`AppState`] is the single owner of the canonical form and workflows.
//! Nothing mutates it except [`AppState::dispatch`], which applies one
//! [`Command`] synchronously and reports what changed.

use std::collections::BTreeMap;

use formflow_registry::{ComponentRegistry, PropertyMap};
use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::error::Result;
use crate::events::StoreEvent;
use crate::form::{ElementPatch, FormDocument, FormStore, InfoPatch, LayoutItem};
use crate::ids::IdSource;
use crate::types::{EdgeId, ElementId, FormId, NodeId, Position, WorkflowId};
use crate::workflow::{Workflow, WorkflowEdge, WorkflowNode, WorkflowStore};

/// Collaborators a command may need
pub struct CommandContext<'a> {
    pub registry: &'a dyn ComponentRegistry,
    pub ids: &'a mut dyn IdSource,
}

/// A single change request against the canonical state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    /// Drop a component at a canvas-relative pixel
    #[serde(rename_all = "camelCase")]
    AddElement { component_type: String, drop: Position },
    UpdateElement { id: ElementId, patch: ElementPatch },
    RemoveElement { id: ElementId },
    DuplicateElement { id: ElementId },
    UpdateLayout { items: Vec<LayoutItem> },
    SelectElement { id: Option<ElementId> },
    UpdateFormSettings { patch: PropertyMap },
    UpdateFormInfo { patch: InfoPatch },
    TogglePreviewMode,
    LoadDocument { document: FormDocument },

    #[serde(rename_all = "camelCase")]
    CreateWorkflow { form_id: FormId, form_name: String },
    SelectWorkflow { id: WorkflowId },
    SetWorkflowMode { enabled: bool },
    AddNode { node: WorkflowNode },
    UpdateNode { id: NodeId, patch: PropertyMap },
    MoveNode { id: NodeId, position: Position },
    CommitPositions { positions: BTreeMap<NodeId, Position> },
    RemoveNode { id: NodeId },
    AddEdge { edge: WorkflowEdge },
    RemoveEdge { id: EdgeId },
    ToggleActive,
    UpdateWorkflowInfo { patch: InfoPatch },
}

/// Serializable copy of everything undo/redo restores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub document: FormDocument,
    pub workflows: Vec<Workflow>,
    pub current_workflow: Option<WorkflowId>,
}

/// The canonical application state
#[derive(Debug, Clone)]
pub struct AppState {
    config: EditorConfig,
    form: FormStore,
    workflows: WorkflowStore,
}

impl AppState {
    /// Start a session with an empty form
    pub fn new(config: EditorConfig, ids: &mut dyn IdSource) -> Self {
        Self::with_document(config, FormDocument::new(ids.form_id()))
    }

    /// Start a session around an existing document
    pub fn with_document(config: EditorConfig, document: FormDocument) -> Self {
        Self {
            form: FormStore::new(document, config.grid.clone()),
            workflows: WorkflowStore::new(config.workflow.clone()),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn form(&self) -> &FormStore {
        &self.form
    }

    pub fn document(&self) -> &FormDocument {
        self.form.document()
    }

    pub fn workflows(&self) -> &WorkflowStore {
        &self.workflows
    }

    pub fn current_workflow(&self) -> Option<&Workflow> {
        self.workflows.current()
    }

    /// Apply one command
    ///
    /// On `Err` nothing changed. On `Ok` the returned events describe every
    /// change, in order.
    pub fn dispatch(&mut self, command: Command, ctx: &mut CommandContext<'_>) -> Result<Vec<StoreEvent>> {
        let events = match command {
            Command::AddElement { component_type, drop } => {
                let id = self
                    .form
                    .add_element(ctx.registry, ctx.ids, &component_type, drop)?;
                vec![
                    StoreEvent::ElementAdded {
                        element_id: id.clone(),
                    },
                    StoreEvent::ElementSelected {
                        element_id: Some(id),
                    },
                ]
            }
            Command::UpdateElement { id, patch } => {
                self.form.update_element(&id, &patch)?;
                vec![StoreEvent::ElementUpdated { element_id: id }]
            }
            Command::RemoveElement { id } => {
                let was_selected = self.form.selected_element() == Some(id.as_str());
                self.form.remove_element(&id)?;
                let mut events = vec![StoreEvent::ElementRemoved { element_id: id }];
                if was_selected {
                    events.push(StoreEvent::ElementSelected { element_id: None });
                }
                events
            }
            Command::DuplicateElement { id } => {
                let copy = self.form.duplicate_element(ctx.ids, &id)?;
                vec![
                    StoreEvent::ElementAdded {
                        element_id: copy.clone(),
                    },
                    StoreEvent::ElementSelected {
                        element_id: Some(copy),
                    },
                ]
            }
            Command::UpdateLayout { items } => {
                let element_ids = self.form.update_layout(items);
                vec![StoreEvent::LayoutCommitted { element_ids }]
            }
            Command::SelectElement { id } => {
                self.form.select_element(id.as_deref())?;
                vec![StoreEvent::ElementSelected { element_id: id }]
            }
            Command::UpdateFormSettings { patch } => {
                self.form.update_form_settings(&patch)?;
                vec![StoreEvent::FormUpdated]
            }
            Command::UpdateFormInfo { patch } => {
                self.form.update_form_info(&patch);
                vec![StoreEvent::FormUpdated]
            }
            Command::TogglePreviewMode => {
                let enabled = self.form.toggle_preview_mode();
                vec![StoreEvent::PreviewToggled { enabled }]
            }
            Command::LoadDocument { document } => {
                let form_id = document.id.clone();
                self.form.load_document(document)?;
                vec![StoreEvent::FormLoaded { form_id }]
            }
            Command::CreateWorkflow { form_id, form_name } => {
                let (workflow_id, created) =
                    self.workflows.create_workflow(ctx.ids, &form_id, &form_name)?;
                if created {
                    vec![StoreEvent::WorkflowCreated { workflow_id }]
                } else {
                    vec![StoreEvent::WorkflowSelected { workflow_id }]
                }
            }
            Command::SelectWorkflow { id } => {
                self.workflows.set_current(&id)?;
                vec![StoreEvent::WorkflowSelected { workflow_id: id }]
            }
            Command::SetWorkflowMode { enabled } => {
                self.workflows.set_workflow_mode(enabled);
                vec![StoreEvent::WorkflowModeChanged { enabled }]
            }
            Command::AddNode { node } => {
                let node_id = node.id.clone();
                self.workflows.current_mut()?.add_node(node)?;
                vec![StoreEvent::NodeAdded { node_id }]
            }
            Command::UpdateNode { id, patch } => {
                let dropped = self.workflows.current_mut()?.update_node(&id, &patch)?;
                let mut events = vec![StoreEvent::NodeUpdated { node_id: id }];
                events.extend(
                    dropped
                        .into_iter()
                        .map(|e| StoreEvent::EdgeRemoved { edge_id: e.id }),
                );
                events
            }
            Command::MoveNode { id, position } => {
                self.workflows.current_mut()?.move_node(&id, position)?;
                vec![StoreEvent::PositionsCommitted { node_ids: vec![id] }]
            }
            Command::CommitPositions { positions } => {
                self.workflows.current_mut()?.replace_positions(&positions)?;
                vec![StoreEvent::PositionsCommitted {
                    node_ids: positions.into_keys().collect(),
                }]
            }
            Command::RemoveNode { id } => {
                let (_, dropped) = self.workflows.current_mut()?.remove_node(&id)?;
                vec![StoreEvent::NodeRemoved {
                    node_id: id,
                    removed_edges: dropped.into_iter().map(|e| e.id).collect(),
                }]
            }
            Command::AddEdge { edge } => {
                let edge_id = edge.id.clone();
                self.workflows.current_mut()?.add_edge(edge)?;
                vec![StoreEvent::EdgeAdded { edge_id }]
            }
            Command::RemoveEdge { id } => {
                self.workflows.current_mut()?.remove_edge(&id)?;
                vec![StoreEvent::EdgeRemoved { edge_id: id }]
            }
            Command::ToggleActive => {
                let wf = self.workflows.current_mut()?;
                wf.toggle_active();
                vec![StoreEvent::WorkflowUpdated {
                    workflow_id: wf.id.clone(),
                }]
            }
            Command::UpdateWorkflowInfo { patch } => {
                let wf = self.workflows.current_mut()?;
                wf.update_info(&patch);
                vec![StoreEvent::WorkflowUpdated {
                    workflow_id: wf.id.clone(),
                }]
            }
        };
        Ok(events)
    }

    /// Capture the content undo/redo restores
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            document: self.form.document().clone(),
            workflows: self.workflows.workflows().to_vec(),
            current_workflow: self.workflows.current_id().cloned(),
        }
    }

    /// Put back a captured snapshot
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.form.restore_document(snapshot.document);
        self.workflows
            .restore(snapshot.workflows, snapshot.current_workflow);
    }
}
