//! Synchronization adapter
//!
//! Reconciles the canonical stores with the surface mirrors. The adapter
//! is a reducer: it takes the combined [`SyncState`] and one
//! [`SurfaceEvent`] and returns the next state plus a [`SurfacePatch`]
//! telling the surfaces what to redraw.
//!
//! Rules:
//! - A mirror built from a different document or workflow than the
//!   canonical one is overwritten wholesale before anything else happens.
//! - Drags move only the mirror. The canonical store is written when the
//!   drag ends (or on [`SurfaceEvent::FlushPending`]) using the mirror's
//!   values at that moment.
//! - Node selection belongs to the graph mirror and never reaches the
//!   workflow.
//! - Any disagreement between a mirror and canonical outside in-flight
//!   drags forces a full reset.
//!
//! Rejected gestures change nothing; the patch carries the reason.

use std::collections::BTreeMap;

use formflow_engine::constants::workflow as wf_consts;
use formflow_engine::form::LayoutItem;
use formflow_engine::workflow::{ports, EdgeKind, NodeData, NodeKind, WorkflowEdge, WorkflowNode};
use formflow_engine::{
    AppState, Command, CommandContext, EdgeId, ElementId, FormflowError, NodeId, Position,
    Result, Snapshot, StoreEvent,
};
use serde::{Deserialize, Serialize};

use crate::drag::DragTracker;
use crate::mirror::{GraphMirror, GridMirror};
use crate::surface::{DropPayload, SurfaceEdge, SurfaceNode};
use crate::viewport::Viewport;

/// Which editing surface an event or patch concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Graph,
    Grid,
}

/// Something the user did on a surface (or the host's debounce tick)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SurfaceEvent {
    NodeDragStart {
        id: NodeId,
    },
    NodeDragMove {
        id: NodeId,
        position: Position,
    },
    /// `position` is the drop point if the surface reports one
    NodeDragEnd {
        id: NodeId,
        #[serde(default)]
        position: Option<Position>,
    },
    NodeDragCancel {
        id: NodeId,
    },
    /// Commit every finished drag still waiting
    FlushPending,
    /// A palette item was dropped on the graph canvas at a screen point
    PaletteDrop {
        payload: DropPayload,
        screen: Position,
    },
    #[serde(rename_all = "camelCase")]
    Connect {
        source: NodeId,
        #[serde(default)]
        source_port: Option<String>,
        target: NodeId,
    },
    SelectNode {
        id: Option<NodeId>,
    },
    DeleteNode {
        id: NodeId,
    },
    DeleteEdge {
        id: EdgeId,
    },
    ViewportChanged {
        surface: Surface,
        viewport: Viewport,
    },

    GridDragStart {
        id: ElementId,
    },
    GridDragMove {
        item: LayoutItem,
    },
    GridDragEnd {
        item: LayoutItem,
    },
    GridDragCancel {
        id: ElementId,
    },
    /// The grid reported a whole layout outside a drag (resize, reflow)
    LayoutCommitted {
        items: Vec<LayoutItem>,
    },
    /// A component was dropped on the form canvas at a screen point
    #[serde(rename_all = "camelCase")]
    ElementDrop {
        component_type: String,
        screen: Position,
    },

    /// A panel (properties, settings, toolbar) issued a store command
    Panel {
        command: Command,
    },
    /// Re-check the mirrors against canonical
    Refresh,
}

/// One redraw instruction for a surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum PatchOp {
    /// Replace the whole graph
    ResetGraph {
        nodes: Vec<SurfaceNode>,
        edges: Vec<SurfaceEdge>,
    },
    /// Replace the whole grid
    ResetGrid {
        items: Vec<LayoutItem>,
    },
    UpsertNode {
        node: SurfaceNode,
    },
    RemoveNode {
        id: NodeId,
    },
    MoveNode {
        id: NodeId,
        position: Position,
    },
    UpsertEdge {
        edge: SurfaceEdge,
    },
    RemoveEdge {
        id: EdgeId,
    },
    Select {
        id: Option<NodeId>,
    },
    UpsertGridItem {
        item: LayoutItem,
    },
    RemoveGridItem {
        id: ElementId,
    },
}

/// What a reducer step asks the surfaces to do
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfacePatch {
    pub ops: Vec<PatchOp>,
    /// Store events the step committed, in order
    pub committed: Vec<StoreEvent>,
    /// Why the gesture was refused, if it was
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection: Option<String>,
}

impl SurfacePatch {
    /// Whether the patch rebuilds a surface from scratch
    pub fn is_reset(&self) -> bool {
        self.ops
            .iter()
            .any(|op| matches!(op, PatchOp::ResetGraph { .. } | PatchOp::ResetGrid { .. }))
    }

    pub fn is_noop(&self) -> bool {
        self.ops.is_empty() && self.committed.is_empty()
    }

    pub fn is_rejected(&self) -> bool {
        self.rejection.is_some()
    }
}

/// Adapter behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncOptions {
    /// Commit as soon as a drag ends; when off, finished drags wait for
    /// `FlushPending`
    pub commit_on_drag_end: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            commit_on_drag_end: true,
        }
    }
}

/// Everything the surfaces hold locally
#[derive(Debug, Clone, Default)]
pub struct SurfaceState {
    pub graph: GraphMirror,
    pub grid: GridMirror,
    node_drags: DragTracker<Position>,
    grid_drags: DragTracker<LayoutItem>,
    pub options: SyncOptions,
}

/// Canonical state plus the surface mirrors
#[derive(Debug, Clone)]
pub struct SyncState {
    canonical: AppState,
    surface: SurfaceState,
}

/// Run one reducer step
///
/// The id source in `ctx` is the only collaborator with side effects; with a
/// deterministic source the step is a pure function of its inputs.
pub fn reduce(
    state: SyncState,
    event: SurfaceEvent,
    ctx: &mut CommandContext<'_>,
) -> (SyncState, SurfacePatch) {
    let mut state = state;
    let patch = state.apply(event, ctx);
    (state, patch)
}

impl SyncState {
    /// Wrap canonical state with mirrors freshly built from it
    pub fn new(canonical: AppState) -> Self {
        Self::with_options(canonical, SyncOptions::default())
    }

    pub fn with_options(canonical: AppState, options: SyncOptions) -> Self {
        let mut state = Self {
            canonical,
            surface: SurfaceState {
                options,
                ..Default::default()
            },
        };
        state.reset_mirrors(&mut SurfacePatch::default());
        state
    }

    pub fn canonical(&self) -> &AppState {
        &self.canonical
    }

    pub fn surface(&self) -> &SurfaceState {
        &self.surface
    }

    pub fn graph(&self) -> &GraphMirror {
        &self.surface.graph
    }

    pub fn grid(&self) -> &GridMirror {
        &self.surface.grid
    }

    pub fn options(&self) -> SyncOptions {
        self.surface.options
    }

    pub fn set_options(&mut self, options: SyncOptions) {
        self.surface.options = options;
    }

    /// Whether finished drags are waiting for a commit
    pub fn has_pending(&self) -> bool {
        !self.surface.node_drags.pending_is_empty() || !self.surface.grid_drags.pending_is_empty()
    }

    /// Whether both mirrors agree with canonical
    pub fn in_sync(&self) -> bool {
        let node_ids: Vec<&str> = self.surface.node_drags.in_flight().collect();
        let item_ids: Vec<&str> = self.surface.grid_drags.in_flight().collect();
        self.surface
            .graph
            .agrees_with(self.canonical.current_workflow(), &node_ids)
            && self
                .surface
                .grid
                .agrees_with(self.canonical.document(), &item_ids)
    }

    /// Put back a history snapshot and rebuild both mirrors
    pub fn restore(&mut self, snapshot: Snapshot) -> SurfacePatch {
        self.canonical.restore(snapshot);
        let mut patch = SurfacePatch::default();
        self.reset_mirrors(&mut patch);
        patch
    }

    /// Apply one surface event in place
    pub fn apply(&mut self, event: SurfaceEvent, ctx: &mut CommandContext<'_>) -> SurfacePatch {
        let mut patch = SurfacePatch::default();

        if !self.identity_matches() {
            log::info!(
                "Mirror identity changed (form '{}', workflow {:?}), resetting",
                self.canonical.document().id,
                self.canonical.current_workflow().map(|wf| wf.id.as_str())
            );
            self.reset_mirrors(&mut patch);
        }

        if let Err(e) = self.handle(event, ctx, &mut patch) {
            log::debug!("Surface event rejected: {}", e);
            patch.rejection = Some(e.to_string());
        }

        if !patch.committed.is_empty() && !patch.is_reset() && !self.in_sync() {
            log::warn!("Mirrors drifted from canonical state, resetting");
            self.reset_mirrors(&mut patch);
        }
        patch
    }

    fn identity_matches(&self) -> bool {
        let workflow_id = self.canonical.current_workflow().map(|wf| wf.id.as_str());
        self.surface.graph.workflow_id.as_deref() == workflow_id
            && self.surface.grid.form_id.as_deref() == Some(self.canonical.document().id.as_str())
    }

    /// Overwrite both mirrors from canonical and drop every drag
    fn reset_mirrors(&mut self, patch: &mut SurfacePatch) {
        self.surface.node_drags.clear();
        self.surface.grid_drags.clear();
        self.surface.graph.reset_from(self.canonical.current_workflow());
        self.surface.grid.reset_from(self.canonical.document());

        patch.ops.retain(|op| {
            !matches!(op, PatchOp::ResetGraph { .. } | PatchOp::ResetGrid { .. })
        });
        patch.ops.push(PatchOp::ResetGraph {
            nodes: self.surface.graph.nodes.clone(),
            edges: self.surface.graph.edges.clone(),
        });
        patch.ops.push(PatchOp::ResetGrid {
            items: self.surface.grid.items.clone(),
        });
        patch.ops.push(PatchOp::Select {
            id: self.surface.graph.selection.clone(),
        });
    }

    fn dispatch(
        &mut self,
        command: Command,
        ctx: &mut CommandContext<'_>,
        patch: &mut SurfacePatch,
    ) -> Result<Vec<StoreEvent>> {
        let events = self.canonical.dispatch(command, ctx)?;
        patch.committed.extend(events.iter().cloned());
        Ok(events)
    }

    fn handle(
        &mut self,
        event: SurfaceEvent,
        ctx: &mut CommandContext<'_>,
        patch: &mut SurfacePatch,
    ) -> Result<()> {
        match event {
            SurfaceEvent::NodeDragStart { id } => self.node_drag_start(&id, ctx, patch),
            SurfaceEvent::NodeDragMove { id, position } => {
                if !self.surface.node_drags.is_active(&id) {
                    log::debug!("Ignoring move for node '{}' outside a drag", id);
                    return Ok(());
                }
                self.surface.graph.set_position(&id, position);
                patch.ops.push(PatchOp::MoveNode { id, position });
                Ok(())
            }
            SurfaceEvent::NodeDragEnd { id, position } => {
                if let Some(position) = position {
                    if self.surface.node_drags.is_active(&id) {
                        self.surface.graph.set_position(&id, position);
                        patch.ops.push(PatchOp::MoveNode {
                            id: id.clone(),
                            position,
                        });
                    }
                }
                let Some(last) = self.surface.graph.position_of(&id) else {
                    return Err(FormflowError::unknown_node(id));
                };
                if !self.surface.node_drags.finish(&id, last) {
                    log::debug!("Ignoring drag end for node '{}' outside a drag", id);
                    return Ok(());
                }
                if self.surface.options.commit_on_drag_end {
                    self.flush_nodes(ctx, patch)?;
                }
                Ok(())
            }
            SurfaceEvent::NodeDragCancel { id } => {
                let Some(origin) = self.surface.node_drags.cancel(&id) else {
                    return Ok(());
                };
                let position = self
                    .canonical
                    .current_workflow()
                    .and_then(|wf| wf.find_node(&id))
                    .map(|n| n.position)
                    .unwrap_or(origin);
                self.surface.graph.set_position(&id, position);
                patch.ops.push(PatchOp::MoveNode { id, position });
                Ok(())
            }
            SurfaceEvent::FlushPending => {
                self.flush_nodes(ctx, patch)?;
                self.flush_grid(ctx, patch)
            }
            SurfaceEvent::PaletteDrop { payload, screen } => {
                self.palette_drop(&payload, screen, ctx, patch)
            }
            SurfaceEvent::Connect {
                source,
                source_port,
                target,
            } => self.connect(source, source_port, target, ctx, patch),
            SurfaceEvent::SelectNode { id } => {
                if let Some(id) = &id {
                    if self.surface.graph.find_node(id).is_none() {
                        return Err(FormflowError::unknown_node(id.clone()));
                    }
                }
                if self.surface.graph.selection != id {
                    self.surface.graph.selection = id.clone();
                    patch.ops.push(PatchOp::Select { id });
                }
                Ok(())
            }
            SurfaceEvent::DeleteNode { id } => {
                let events = self.dispatch(Command::RemoveNode { id: id.clone() }, ctx, patch)?;
                let was_selected = self.surface.graph.selection.as_deref() == Some(id.as_str());
                for event in events {
                    if let StoreEvent::NodeRemoved { removed_edges, .. } = event {
                        for edge_id in removed_edges {
                            self.surface.graph.remove_edge(&edge_id);
                            patch.ops.push(PatchOp::RemoveEdge { id: edge_id });
                        }
                    }
                }
                self.surface.graph.remove_node(&id);
                self.surface.node_drags.forget(&id);
                patch.ops.push(PatchOp::RemoveNode { id });
                if was_selected {
                    patch.ops.push(PatchOp::Select { id: None });
                }
                Ok(())
            }
            SurfaceEvent::DeleteEdge { id } => {
                self.dispatch(Command::RemoveEdge { id: id.clone() }, ctx, patch)?;
                self.surface.graph.remove_edge(&id);
                patch.ops.push(PatchOp::RemoveEdge { id });
                Ok(())
            }
            SurfaceEvent::ViewportChanged { surface, viewport } => {
                match surface {
                    Surface::Graph => self.surface.graph.viewport = viewport,
                    Surface::Grid => self.surface.grid.viewport = viewport,
                }
                Ok(())
            }

            SurfaceEvent::GridDragStart { id } => {
                if self.surface.grid_drags.has_pending(&id) {
                    self.flush_grid(ctx, patch)?;
                }
                let item = self
                    .surface
                    .grid
                    .find_item(&id)
                    .cloned()
                    .ok_or_else(|| FormflowError::unknown_element(id.clone()))?;
                if !self.surface.grid_drags.begin(&id, item) {
                    log::debug!("Element '{}' is already being dragged", id);
                }
                Ok(())
            }
            SurfaceEvent::GridDragMove { item } => {
                if !self.surface.grid_drags.is_active(&item.id) {
                    log::debug!("Ignoring move for element '{}' outside a drag", item.id);
                    return Ok(());
                }
                self.surface.grid.upsert_item(item.clone());
                patch.ops.push(PatchOp::UpsertGridItem { item });
                Ok(())
            }
            SurfaceEvent::GridDragEnd { item } => {
                if !self.surface.grid_drags.is_active(&item.id) {
                    log::debug!("Ignoring drag end for element '{}' outside a drag", item.id);
                    return Ok(());
                }
                self.surface.grid.upsert_item(item.clone());
                self.surface.grid_drags.finish(&item.id, item.clone());
                patch.ops.push(PatchOp::UpsertGridItem { item });
                if self.surface.options.commit_on_drag_end {
                    self.flush_grid(ctx, patch)?;
                }
                Ok(())
            }
            SurfaceEvent::GridDragCancel { id } => {
                let Some(origin) = self.surface.grid_drags.cancel(&id) else {
                    return Ok(());
                };
                let item = self
                    .canonical
                    .document()
                    .find_element(&id)
                    .map(|e| {
                        let g = &e.grid_props;
                        LayoutItem::new(e.id.clone(), g.x, g.y, g.w, g.h)
                    })
                    .unwrap_or(origin);
                self.surface.grid.upsert_item(item.clone());
                patch.ops.push(PatchOp::UpsertGridItem { item });
                Ok(())
            }
            SurfaceEvent::LayoutCommitted { items } => {
                self.dispatch(Command::UpdateLayout { items }, ctx, patch)?;
                self.surface.grid_drags.clear();
                self.sync_grid_items(patch);
                Ok(())
            }
            SurfaceEvent::ElementDrop {
                component_type,
                screen,
            } => {
                let drop = self.surface.grid.viewport.screen_to_canvas(screen);
                self.dispatch(Command::AddElement { component_type, drop }, ctx, patch)?;
                self.sync_grid_items(patch);
                Ok(())
            }

            SurfaceEvent::Panel { command } => {
                self.flush_nodes(ctx, patch)?;
                self.flush_grid(ctx, patch)?;
                self.dispatch(command, ctx, patch)?;
                self.reset_mirrors(patch);
                Ok(())
            }
            SurfaceEvent::Refresh => {
                if !self.in_sync() {
                    log::warn!("Mirrors drifted from canonical state, resetting");
                    self.reset_mirrors(patch);
                }
                Ok(())
            }
        }
    }

    fn node_drag_start(
        &mut self,
        id: &str,
        ctx: &mut CommandContext<'_>,
        patch: &mut SurfacePatch,
    ) -> Result<()> {
        if self.surface.node_drags.has_pending(id) {
            self.flush_nodes(ctx, patch)?;
        }
        let origin = self
            .surface
            .graph
            .position_of(id)
            .ok_or_else(|| FormflowError::unknown_node(id))?;
        if !self.surface.node_drags.begin(id, origin) {
            log::debug!("Node '{}' is already being dragged", id);
        }
        Ok(())
    }

    /// Commit finished node drags using the mirror's current positions
    fn flush_nodes(&mut self, ctx: &mut CommandContext<'_>, patch: &mut SurfacePatch) -> Result<()> {
        if self.surface.node_drags.pending_is_empty() {
            return Ok(());
        }
        let batch = self.surface.node_drags.drain_pending();
        let canonical = self.canonical.current_workflow();
        let positions: BTreeMap<NodeId, Position> = batch
            .into_iter()
            .filter(|(id, _)| canonical.is_some_and(|wf| wf.find_node(id).is_some()))
            .map(|(id, fallback)| {
                let position = self.surface.graph.position_of(&id).unwrap_or(fallback);
                (id, position)
            })
            .collect();
        if positions.is_empty() {
            return Ok(());
        }
        self.dispatch(Command::CommitPositions { positions }, ctx, patch)?;
        Ok(())
    }

    /// Commit finished grid drags
    ///
    /// The committed layout is the canonical one with only the drained ids
    /// taken from the mirror. Active drags keep their canonical cell.
    fn flush_grid(&mut self, ctx: &mut CommandContext<'_>, patch: &mut SurfacePatch) -> Result<()> {
        if self.surface.grid_drags.pending_is_empty() {
            return Ok(());
        }
        let finished = self.surface.grid_drags.drain_pending();

        let document = self.canonical.document();
        let mut items: Vec<LayoutItem> = document
            .elements
            .iter()
            .map(|e| match finished.get(&e.id) {
                Some(last) => self.surface.grid.find_item(&e.id).unwrap_or(last).clone(),
                None => {
                    let g = &e.grid_props;
                    LayoutItem::new(e.id.clone(), g.x, g.y, g.w, g.h)
                }
            })
            .collect();
        items.extend(
            document
                .layout
                .iter()
                .filter(|item| !document.contains(&item.id))
                .cloned(),
        );

        self.dispatch(Command::UpdateLayout { items }, ctx, patch)?;
        self.sync_grid_items(patch);
        Ok(())
    }

    /// Bring grid items not mid-drag in line with the elements
    fn sync_grid_items(&mut self, patch: &mut SurfacePatch) {
        let document = self.canonical.document();
        let in_flight: Vec<String> = self
            .surface
            .grid_drags
            .in_flight()
            .map(str::to_string)
            .collect();

        let stale: Vec<ElementId> = self
            .surface
            .grid
            .items
            .iter()
            .filter(|item| !document.contains(&item.id))
            .map(|item| item.id.clone())
            .collect();
        for id in stale {
            self.surface.grid.remove_item(&id);
            patch.ops.push(PatchOp::RemoveGridItem { id });
        }

        for element in &document.elements {
            if in_flight.contains(&element.id) {
                continue;
            }
            let g = &element.grid_props;
            let item = LayoutItem::new(element.id.clone(), g.x, g.y, g.w, g.h);
            if self.surface.grid.find_item(&item.id) != Some(&item) {
                self.surface.grid.upsert_item(item.clone());
                patch.ops.push(PatchOp::UpsertGridItem { item });
            }
        }
    }

    fn palette_drop(
        &mut self,
        payload: &DropPayload,
        screen: Position,
        ctx: &mut CommandContext<'_>,
        patch: &mut SurfacePatch,
    ) -> Result<()> {
        let (kind, form_ref) = payload.parse()?;
        let workflow = self
            .canonical
            .current_workflow()
            .ok_or_else(|| FormflowError::unknown_workflow("<none>"))?;

        let position = self.surface.graph.viewport.screen_to_canvas(screen);
        let ordinal = workflow.nodes.iter().filter(|n| n.kind == kind).count() + 1;
        let mut data = NodeData::new(
            format!("{} {}", kind.label(), ordinal),
            wf_consts::DEFAULT_LEVEL,
        );
        if kind == NodeKind::Parallel {
            let count = self.canonical.config().workflow.parallel_branches();
            data.parallel_branches = Some((1..=count).map(|i| format!("Branch {}", i)).collect());
        }
        if let Some(form) = form_ref {
            data.extra
                .insert("formId".to_string(), serde_json::Value::String(form.id));
            data.label = form.name.clone();
            data.extra
                .insert("formName".to_string(), serde_json::Value::String(form.name));
        }

        let node = WorkflowNode::new(ctx.ids.node_id(kind), kind, position, data);
        let surface_node = SurfaceNode::from_node(&node);
        self.dispatch(Command::AddNode { node }, ctx, patch)?;
        self.surface.graph.upsert_node(surface_node.clone());
        patch.ops.push(PatchOp::UpsertNode { node: surface_node });
        Ok(())
    }

    fn connect(
        &mut self,
        source: NodeId,
        source_port: Option<String>,
        target: NodeId,
        ctx: &mut CommandContext<'_>,
        patch: &mut SurfacePatch,
    ) -> Result<()> {
        let workflow = self
            .canonical
            .current_workflow()
            .ok_or_else(|| FormflowError::unknown_workflow("<none>"))?;
        let source_kind = workflow
            .find_node(&source)
            .map(|n| n.kind)
            .ok_or_else(|| FormflowError::unknown_node(source.clone()))?;

        let port = ports::canonical_port(source_kind, source_port.as_deref());
        let mut edge = WorkflowEdge::new(source, port, target);
        if workflow.find_edge(&edge.id).is_some() {
            log::debug!("Edge '{}' already exists, ignoring connect", edge.id);
            patch.rejection = Some(format!("Edge '{}' already exists", edge.id));
            return Ok(());
        }
        if source_kind == NodeKind::Condition {
            let label = match port {
                Some(ports::TRUE_PORT) => "True",
                Some(ports::FALSE_PORT) => "False",
                _ => wf_consts::EDGE_LABEL,
            };
            edge = edge.with_kind(EdgeKind::Conditional).with_label(label);
        }

        let surface_edge = SurfaceEdge::from_edge(&edge);
        self.dispatch(Command::AddEdge { edge }, ctx, patch)?;
        self.surface.graph.upsert_edge(surface_edge.clone());
        patch.ops.push(PatchOp::UpsertEdge { edge: surface_edge });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formflow_engine::{EditorConfig, SequentialIds};
    use formflow_registry::BuiltinRegistry;

    fn with_workflow() -> (SyncState, BuiltinRegistry, SequentialIds) {
        let registry = BuiltinRegistry::with_builtins();
        let mut ids = SequentialIds::new();
        let mut app = AppState::new(EditorConfig::default(), &mut ids);
        let form_id = app.document().id.clone();
        {
            let mut ctx = CommandContext {
                registry: &registry,
                ids: &mut ids,
            };
            app.dispatch(
                Command::CreateWorkflow {
                    form_id,
                    form_name: "Leave".to_string(),
                },
                &mut ctx,
            )
            .unwrap();
        }
        (SyncState::new(app), registry, ids)
    }

    #[test]
    fn test_new_state_is_in_sync() {
        let (state, _, _) = with_workflow();
        assert!(state.in_sync());
        assert_eq!(state.graph().nodes.len(), 2);
    }

    #[test]
    fn test_select_node_stays_local() {
        let (mut state, registry, mut ids) = with_workflow();
        let mut ctx = CommandContext {
            registry: &registry,
            ids: &mut ids,
        };
        let patch = state.apply(
            SurfaceEvent::SelectNode {
                id: Some("end-1".to_string()),
            },
            &mut ctx,
        );
        assert!(patch.committed.is_empty());
        assert_eq!(patch.ops, vec![PatchOp::Select { id: Some("end-1".to_string()) }]);
        assert_eq!(state.graph().selection.as_deref(), Some("end-1"));
    }

    #[test]
    fn test_unknown_node_selection_is_rejected() {
        let (mut state, registry, mut ids) = with_workflow();
        let mut ctx = CommandContext {
            registry: &registry,
            ids: &mut ids,
        };
        let patch = state.apply(
            SurfaceEvent::SelectNode {
                id: Some("nope".to_string()),
            },
            &mut ctx,
        );
        assert!(patch.is_rejected());
        assert!(patch.ops.is_empty());
        assert_eq!(state.graph().selection, None);
    }

    #[test]
    fn test_palette_drop_inverts_viewport() {
        let (mut state, registry, mut ids) = with_workflow();
        let mut ctx = CommandContext {
            registry: &registry,
            ids: &mut ids,
        };
        state.apply(
            SurfaceEvent::ViewportChanged {
                surface: Surface::Graph,
                viewport: Viewport::new(10.0, 20.0, 2.0),
            },
            &mut ctx,
        );
        let patch = state.apply(
            SurfaceEvent::PaletteDrop {
                payload: DropPayload::node("parallel"),
                screen: Position::new(210.0, 420.0),
            },
            &mut ctx,
        );

        let node = match &patch.ops[..] {
            [PatchOp::UpsertNode { node }] => node.clone(),
            other => panic!("Expected one UpsertNode, got {:?}", other),
        };
        assert_eq!(node.position, Position::new(100.0, 200.0));
        assert_eq!(node.data["label"], "Parallel 1");
        assert_eq!(node.data["parallelBranches"].as_array().unwrap().len(), 2);
        assert!(state.canonical().current_workflow().unwrap().find_node(&node.id).is_some());
        assert!(state.in_sync());
    }

    #[test]
    fn test_bad_payload_changes_nothing() {
        let (mut state, registry, mut ids) = with_workflow();
        let before = state.canonical().snapshot();
        let mut ctx = CommandContext {
            registry: &registry,
            ids: &mut ids,
        };
        let patch = state.apply(
            SurfaceEvent::PaletteDrop {
                payload: DropPayload::default(),
                screen: Position::default(),
            },
            &mut ctx,
        );
        assert!(patch.is_rejected());
        assert!(patch.is_noop());
        assert_eq!(state.canonical().snapshot(), before);
    }

    #[test]
    fn test_deferred_commit_waits_for_flush() {
        let (mut state, registry, mut ids) = with_workflow();
        state.set_options(SyncOptions {
            commit_on_drag_end: false,
        });
        let mut ctx = CommandContext {
            registry: &registry,
            ids: &mut ids,
        };
        let id = "end-1".to_string();
        state.apply(SurfaceEvent::NodeDragStart { id: id.clone() }, &mut ctx);
        state.apply(
            SurfaceEvent::NodeDragEnd {
                id: id.clone(),
                position: Some(Position::new(300.0, 500.0)),
            },
            &mut ctx,
        );
        assert!(state.has_pending());
        let canonical_end = state.canonical().current_workflow().unwrap().find_node(&id).unwrap().position;
        assert_eq!(canonical_end, Position::new(250.0, 400.0));

        let patch = state.apply(SurfaceEvent::FlushPending, &mut ctx);
        assert_eq!(
            patch.committed,
            vec![StoreEvent::PositionsCommitted { node_ids: vec![id.clone()] }]
        );
        let canonical_end = state.canonical().current_workflow().unwrap().find_node(&id).unwrap().position;
        assert_eq!(canonical_end, Position::new(300.0, 500.0));
        assert!(!state.has_pending());
    }

    #[test]
    fn test_patch_wire_shape() {
        let patch = SurfacePatch {
            ops: vec![PatchOp::RemoveEdge {
                id: "edge-a-out-b".to_string(),
            }],
            ..Default::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json["ops"][0]["op"], "removeEdge");
        assert!(json.get("rejection").is_none());
    }
}
