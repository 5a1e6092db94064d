//! End-to-end behaviour of the synchronization adapter

use std::sync::Arc;

use formflow_engine::workflow::{EdgeKind, NodeKind, Workflow};
use formflow_engine::{
    AppState, Command, CommandContext, EditorConfig, ElementPatch, FormflowError, LayoutItem,
    Position, SequentialIds, StoreEvent, VecEventSink,
};
use formflow_registry::BuiltinRegistry;
use formflow_sync::{
    reduce, DropPayload, Editor, PatchOp, SurfaceEvent, SurfacePatch, SyncOptions, SyncState,
};

struct Session {
    state: SyncState,
    registry: BuiltinRegistry,
    ids: SequentialIds,
}

impl Session {
    fn new() -> Self {
        let mut ids = SequentialIds::new();
        let app = AppState::new(EditorConfig::default(), &mut ids);
        Self {
            state: SyncState::new(app),
            registry: BuiltinRegistry::with_builtins(),
            ids,
        }
    }

    fn with_workflow() -> Self {
        let mut session = Self::new();
        let form_id = session.state.canonical().document().id.clone();
        let patch = session.send(SurfaceEvent::Panel {
            command: Command::CreateWorkflow {
                form_id,
                form_name: "Leave".to_string(),
            },
        });
        assert!(!patch.is_rejected());
        session
    }

    fn send(&mut self, event: SurfaceEvent) -> SurfacePatch {
        let mut ctx = CommandContext {
            registry: &self.registry,
            ids: &mut self.ids,
        };
        self.state.apply(event, &mut ctx)
    }

    fn workflow(&self) -> &Workflow {
        self.state.canonical().current_workflow().unwrap()
    }

    /// Drop a palette node at a canvas point and return its id
    fn drop_node(&mut self, node_type: &str, x: f64, y: f64) -> String {
        let patch = self.send(SurfaceEvent::PaletteDrop {
            payload: DropPayload::node(node_type),
            screen: Position::new(x, y),
        });
        patch
            .ops
            .iter()
            .find_map(|op| match op {
                PatchOp::UpsertNode { node } => Some(node.id.clone()),
                _ => None,
            })
            .unwrap_or_else(|| panic!("Drop of '{}' produced no node: {:?}", node_type, patch))
    }

    fn drop_element(&mut self, component_type: &str, x: f64, y: f64) -> String {
        self.send(SurfaceEvent::ElementDrop {
            component_type: component_type.to_string(),
            screen: Position::new(x, y),
        });
        self.state.canonical().form().selected_element().unwrap().to_string()
    }

    fn connect(&mut self, source: &str, port: Option<&str>, target: &str) -> SurfacePatch {
        self.send(SurfaceEvent::Connect {
            source: source.to_string(),
            source_port: port.map(str::to_string),
            target: target.to_string(),
        })
    }
}

#[test]
fn test_element_drop_lands_on_cell() {
    let mut session = Session::new();
    let id = session.drop_element("input", 150.0, 220.0);

    let element = session.state.canonical().document().find_element(&id).unwrap();
    let g = &element.grid_props;
    assert_eq!((g.x, g.y, g.w, g.h), (1, 2, 6, 2));
    assert_eq!(session.state.grid().find_item(&id), Some(&LayoutItem::new(id.clone(), 1, 2, 6, 2)));
    assert!(session.state.in_sync());
}

#[test]
fn test_layout_commit_is_idempotent() {
    let mut session = Session::new();
    let a = session.drop_element("input", 0.0, 0.0);
    let b = session.drop_element("textarea", 0.0, 300.0);
    let items = vec![LayoutItem::new(a, 0, 0, 4, 2), LayoutItem::new(b, 4, 0, 8, 3)];

    session.send(SurfaceEvent::LayoutCommitted {
        items: items.clone(),
    });
    let once = session.state.canonical().document().clone();

    let patch = session.send(SurfaceEvent::LayoutCommitted { items });
    assert_eq!(session.state.canonical().document(), &once);
    assert!(patch.ops.is_empty());
    assert_eq!(session.state.grid().items, once.layout);
}

#[test]
fn test_graph_mirror_round_trips() {
    let mut session = Session::with_workflow();
    let action = session.drop_node("action", 100.0, 200.0);
    session.connect("start-1", None, &action);
    session.connect(&action, Some("next"), "end-1");

    let rebuilt = session.state.graph().to_workflow(session.workflow()).unwrap();
    assert_eq!(&rebuilt, session.workflow());
}

#[test]
fn test_workflow_skeleton() {
    let session = Session::with_workflow();
    let wf = session.workflow();

    assert!(session.state.canonical().workflows().workflow_mode());
    assert_eq!(wf.name, "Leave Workflow");
    assert_eq!(wf.nodes.len(), 2);
    assert!(wf.edges.is_empty());

    let start = wf.find_node("start-1").unwrap();
    assert_eq!(start.kind, NodeKind::Start);
    assert_eq!(start.position, Position::new(250.0, 50.0));
    let end = wf.find_node("end-1").unwrap();
    assert_eq!(end.kind, NodeKind::End);
    assert_eq!(end.position, Position::new(250.0, 400.0));

    assert_eq!(session.state.graph().nodes.len(), 2);
}

#[test]
fn test_removing_condition_cascades_to_its_edges() {
    let mut session = Session::with_workflow();
    let condition = session.drop_node("condition", 250.0, 150.0);
    let action = session.drop_node("action", 100.0, 250.0);

    let patch = session.connect(&condition, Some("true"), &action);
    assert!(!patch.is_rejected());
    let edge_id = format!("edge-{}-true-{}", condition, action);
    let edge = session.workflow().find_edge(&edge_id).unwrap();
    assert_eq!(edge.kind, EdgeKind::Conditional);
    assert_eq!(edge.data.label, "True");

    let action_before = session.workflow().find_node(&action).unwrap().clone();
    let patch = session.send(SurfaceEvent::DeleteNode {
        id: condition.clone(),
    });

    assert!(patch.ops.contains(&PatchOp::RemoveEdge { id: edge_id }));
    assert!(patch.ops.contains(&PatchOp::RemoveNode { id: condition.clone() }));
    assert!(session.workflow().edges.is_empty());
    assert!(session.workflow().find_node(&condition).is_none());
    assert_eq!(session.workflow().find_node(&action), Some(&action_before));
    assert!(session.state.graph().edges.is_empty());
    assert!(session.state.in_sync());
}

#[test]
fn test_connect_enforces_ports() {
    let mut session = Session::with_workflow();
    let condition = session.drop_node("condition", 0.0, 0.0);
    let action = session.drop_node("action", 0.0, 0.0);

    let rejected = [
        session.connect(&action, None, "start-1"),
        session.connect("end-1", None, &action),
        session.connect(&condition, None, &action),
        session.connect(&condition, Some("maybe"), &action),
        session.connect("start-1", None, "ghost"),
    ];
    for patch in &rejected {
        assert!(patch.is_rejected(), "expected rejection: {:?}", patch);
        assert!(patch.committed.is_empty());
    }
    assert!(session.workflow().edges.is_empty());
    assert!(session.state.graph().edges.is_empty());
}

#[test]
fn test_duplicate_connect_is_noop() {
    let mut session = Session::with_workflow();
    let first = session.connect("start-1", None, "end-1");
    assert_eq!(first.committed.len(), 1);

    let second = session.connect("start-1", None, "end-1");
    assert!(second.is_rejected());
    assert!(second.is_noop());
    assert_eq!(session.workflow().edges.len(), 1);
}

#[test]
fn test_duplicate_element_from_panel() {
    let mut session = Session::new();
    let original = session.drop_element("input", 150.0, 220.0);
    let patch: ElementPatch = serde_json::from_value(serde_json::json!({
        "style": { "width": "50%" },
        "actions": { "onBlur": "check()" },
        "conditions": {
            "hide": [{ "field": "role", "operator": "equals", "value": "guest" }]
        },
        "validations": [{ "id": "v1", "type": "min_length", "value": 3, "message": "Too short" }],
        "gridProps": { "maxW": 8, "isDraggable": true }
    }))
    .unwrap();
    session.send(SurfaceEvent::Panel {
        command: Command::UpdateElement {
            id: original.clone(),
            patch,
        },
    });
    let before = session
        .state
        .canonical()
        .document()
        .find_element(&original)
        .cloned()
        .unwrap();

    let patch = session.send(SurfaceEvent::Panel {
        command: Command::DuplicateElement {
            id: original.clone(),
        },
    });
    assert!(patch.is_reset());

    let doc = session.state.canonical().document();
    assert_eq!(doc.elements.len(), 2);
    assert_eq!(doc.elements[0], before);
    let copy = &doc.elements[1];
    assert_ne!(copy.id, original);

    let mut expected = before.clone();
    expected.id = copy.id.clone();
    expected.grid_props.x += 1;
    expected.grid_props.y += 1;
    assert_eq!(copy, &expected);
    assert_eq!((copy.grid_props.x, copy.grid_props.y), (2, 3));
    assert_eq!(session.state.canonical().form().selected_element(), Some(copy.id.as_str()));
    assert_eq!(session.state.grid().items.len(), 2);
    assert!(session.state.in_sync());
}

#[test]
fn test_next_port_connect_matches_anonymous_edge() {
    let mut session = Session::with_workflow();
    let action = session.drop_node("action", 0.0, 0.0);

    let first = session.connect(&action, None, "end-1");
    assert_eq!(first.committed.len(), 1);

    let second = session.connect(&action, Some("next"), "end-1");
    assert!(second.is_rejected());
    assert!(second.is_noop());
    assert_eq!(session.workflow().edges.len(), 1);
    assert_eq!(session.state.graph().edges.len(), 1);

    let from_start = session.connect("start-1", Some("next"), &action);
    assert_eq!(from_start.committed.len(), 1);
    let edge = session.workflow().find_edge(&format!("edge-start-1-out-{}", action));
    assert_eq!(edge.map(|e| e.source_port.clone()), Some(None));
    assert!(session.state.in_sync());
}

#[test]
fn test_node_drag_commits_once_at_end() {
    let mut session = Session::with_workflow();
    session.send(SurfaceEvent::NodeDragStart {
        id: "end-1".to_string(),
    });

    for step in 1..=3 {
        let position = Position::new(250.0 + f64::from(step) * 10.0, 400.0);
        let patch = session.send(SurfaceEvent::NodeDragMove {
            id: "end-1".to_string(),
            position,
        });
        assert!(patch.committed.is_empty());
        assert_eq!(patch.ops, vec![PatchOp::MoveNode { id: "end-1".to_string(), position }]);
    }
    assert_eq!(
        session.workflow().find_node("end-1").unwrap().position,
        Position::new(250.0, 400.0)
    );

    let patch = session.send(SurfaceEvent::NodeDragEnd {
        id: "end-1".to_string(),
        position: None,
    });
    assert_eq!(
        patch.committed,
        vec![StoreEvent::PositionsCommitted {
            node_ids: vec!["end-1".to_string()]
        }]
    );
    assert_eq!(
        session.workflow().find_node("end-1").unwrap().position,
        Position::new(280.0, 400.0)
    );
    assert!(session.state.in_sync());
}

#[test]
fn test_drag_cancel_restores_mirror() {
    let mut session = Session::with_workflow();
    session.send(SurfaceEvent::NodeDragStart {
        id: "start-1".to_string(),
    });
    session.send(SurfaceEvent::NodeDragMove {
        id: "start-1".to_string(),
        position: Position::new(0.0, 0.0),
    });

    let patch = session.send(SurfaceEvent::NodeDragCancel {
        id: "start-1".to_string(),
    });
    assert!(patch.committed.is_empty());
    assert_eq!(
        patch.ops,
        vec![PatchOp::MoveNode {
            id: "start-1".to_string(),
            position: Position::new(250.0, 50.0)
        }]
    );
    assert_eq!(session.state.graph().position_of("start-1"), Some(Position::new(250.0, 50.0)));
    assert!(session.state.in_sync());
}

#[test]
fn test_second_drag_start_is_ignored() {
    let mut session = Session::with_workflow();
    session.send(SurfaceEvent::NodeDragStart {
        id: "start-1".to_string(),
    });
    session.send(SurfaceEvent::NodeDragMove {
        id: "start-1".to_string(),
        position: Position::new(10.0, 10.0),
    });

    let patch = session.send(SurfaceEvent::NodeDragStart {
        id: "start-1".to_string(),
    });
    assert!(patch.is_noop());
    assert!(!patch.is_rejected());

    let patch = session.send(SurfaceEvent::NodeDragCancel {
        id: "start-1".to_string(),
    });
    assert_eq!(
        patch.ops,
        vec![PatchOp::MoveNode {
            id: "start-1".to_string(),
            position: Position::new(250.0, 50.0)
        }]
    );
}

#[test]
fn test_new_drag_flushes_pending_move() {
    let mut session = Session::with_workflow();
    session.state.set_options(SyncOptions {
        commit_on_drag_end: false,
    });
    session.send(SurfaceEvent::NodeDragStart {
        id: "end-1".to_string(),
    });
    session.send(SurfaceEvent::NodeDragEnd {
        id: "end-1".to_string(),
        position: Some(Position::new(500.0, 500.0)),
    });
    assert!(session.state.has_pending());

    let patch = session.send(SurfaceEvent::NodeDragStart {
        id: "end-1".to_string(),
    });
    assert_eq!(patch.committed.len(), 1);
    assert_eq!(
        session.workflow().find_node("end-1").unwrap().position,
        Position::new(500.0, 500.0)
    );
}

#[test]
fn test_grid_drag_commits_layout() {
    let mut session = Session::new();
    let id = session.drop_element("input", 0.0, 0.0);

    session.send(SurfaceEvent::GridDragStart { id: id.clone() });
    let moved = LayoutItem::new(id.clone(), 3, 1, 6, 2);
    let patch = session.send(SurfaceEvent::GridDragMove {
        item: moved.clone(),
    });
    assert!(patch.committed.is_empty());
    assert_eq!(
        session.state.canonical().document().find_element(&id).unwrap().grid_props.x,
        0
    );

    let patch = session.send(SurfaceEvent::GridDragEnd { item: moved });
    assert_eq!(
        patch.committed,
        vec![StoreEvent::LayoutCommitted {
            element_ids: vec![id.clone()]
        }]
    );
    let grid = &session.state.canonical().document().find_element(&id).unwrap().grid_props;
    assert_eq!((grid.x, grid.y), (3, 1));
    assert!(session.state.in_sync());
}

#[test]
fn test_grid_commit_clamps_width_back_into_mirror() {
    let mut session = Session::new();
    let id = session.drop_element("input", 0.0, 0.0);

    session.send(SurfaceEvent::GridDragStart { id: id.clone() });
    let patch = session.send(SurfaceEvent::GridDragEnd {
        item: LayoutItem::new(id.clone(), 0, 0, 20, 2),
    });

    let clamped = LayoutItem::new(id.clone(), 0, 0, 12, 2);
    assert_eq!(patch.ops.last(), Some(&PatchOp::UpsertGridItem { item: clamped.clone() }));
    assert_eq!(session.state.grid().find_item(&id), Some(&clamped));
}

#[test]
fn test_grid_cancel_restores_item() {
    let mut session = Session::new();
    let id = session.drop_element("input", 150.0, 220.0);

    session.send(SurfaceEvent::GridDragStart { id: id.clone() });
    session.send(SurfaceEvent::GridDragMove {
        item: LayoutItem::new(id.clone(), 9, 9, 3, 3),
    });
    let patch = session.send(SurfaceEvent::GridDragCancel { id: id.clone() });

    assert!(patch.committed.is_empty());
    assert_eq!(session.state.grid().find_item(&id), Some(&LayoutItem::new(id.clone(), 1, 2, 6, 2)));
}

#[test]
fn test_finished_grid_drag_leaves_active_drag_uncommitted() {
    let mut session = Session::new();
    let a = session.drop_element("input", 0.0, 0.0);
    let b = session.drop_element("textarea", 0.0, 300.0);
    let b_origin = session.state.grid().find_item(&b).cloned().unwrap();

    session.send(SurfaceEvent::GridDragStart { id: a.clone() });
    session.send(SurfaceEvent::GridDragStart { id: b.clone() });
    session.send(SurfaceEvent::GridDragMove {
        item: LayoutItem::new(b.clone(), 5, 9, 6, 2),
    });
    let patch = session.send(SurfaceEvent::GridDragEnd {
        item: LayoutItem::new(a.clone(), 3, 0, 6, 2),
    });

    assert_eq!(
        patch.committed,
        vec![StoreEvent::LayoutCommitted {
            element_ids: vec![a.clone(), b.clone()]
        }]
    );
    let doc = session.state.canonical().document();
    let a_grid = &doc.find_element(&a).unwrap().grid_props;
    assert_eq!((a_grid.x, a_grid.y), (3, 0));
    let b_grid = &doc.find_element(&b).unwrap().grid_props;
    assert_eq!((b_grid.x, b_grid.y), (b_origin.x, b_origin.y));
    assert_eq!(
        session.state.grid().find_item(&b),
        Some(&LayoutItem::new(b.clone(), 5, 9, 6, 2))
    );
    assert!(session.state.in_sync());

    let patch = session.send(SurfaceEvent::GridDragCancel { id: b.clone() });
    assert!(patch.committed.is_empty());
    assert_eq!(session.state.grid().find_item(&b), Some(&b_origin));
    let b_grid = &session.state.canonical().document().find_element(&b).unwrap().grid_props;
    assert_eq!((b_grid.x, b_grid.y, b_grid.w, b_grid.h), (b_origin.x, b_origin.y, b_origin.w, b_origin.h));
    assert!(session.state.in_sync());
}

#[test]
fn test_loading_another_document_resets_mirrors() {
    let mut session = Session::new();
    session.drop_element("input", 0.0, 0.0);

    let patch = session.send(SurfaceEvent::Panel {
        command: Command::LoadDocument {
            document: formflow_engine::FormDocument::new("imported"),
        },
    });
    assert!(patch.is_reset());
    assert!(patch.ops.contains(&PatchOp::ResetGrid { items: Vec::new() }));
    assert_eq!(session.state.grid().form_id.as_deref(), Some("imported"));
}

#[test]
fn test_palette_drop_without_workflow_is_rejected() {
    let mut session = Session::new();
    let patch = session.send(SurfaceEvent::PaletteDrop {
        payload: DropPayload::node("action"),
        screen: Position::default(),
    });
    assert!(patch.is_rejected());
    assert!(patch.is_noop());
}

#[test]
fn test_form_node_drop_carries_form_ref() {
    let mut session = Session::with_workflow();
    let patch = session.send(SurfaceEvent::PaletteDrop {
        payload: DropPayload {
            node_type: Some("action".to_string()),
            serialized_form_ref: Some(r#"{"id":"f-7","name":"Expense claim"}"#.to_string()),
        },
        screen: Position::new(40.0, 40.0),
    });
    let node = match patch.ops.first() {
        Some(PatchOp::UpsertNode { node }) => node,
        other => panic!("Expected UpsertNode, got {:?}", other),
    };
    assert_eq!(node.data["label"], "Expense claim");
    assert_eq!(node.data["formId"], "f-7");
}

#[test]
fn test_reduce_is_deterministic() {
    let session = Session::with_workflow();
    let registry = BuiltinRegistry::with_builtins();
    let event = SurfaceEvent::PaletteDrop {
        payload: DropPayload::node("merge"),
        screen: Position::new(5.0, 5.0),
    };

    let run = |state: SyncState| {
        let mut ids = SequentialIds::new();
        let mut ctx = CommandContext {
            registry: &registry,
            ids: &mut ids,
        };
        reduce(state, event.clone(), &mut ctx)
    };
    let (left_state, left) = run(session.state.clone());
    let (right_state, right) = run(session.state.clone());

    assert_eq!(left.ops, right.ops);
    assert_eq!(left_state.graph(), right_state.graph());
    assert_eq!(session.state.graph().nodes.len(), 2);
}

#[test]
fn test_refresh_when_in_sync_is_noop() {
    let mut session = Session::with_workflow();
    let patch = session.send(SurfaceEvent::Refresh);
    assert!(patch.is_noop());
}

#[test]
fn test_editor_undo_resets_surfaces() {
    let sink = Arc::new(VecEventSink::new());
    let mut editor = Editor::with_parts(
        EditorConfig::default(),
        Box::new(BuiltinRegistry::with_builtins()),
        Box::new(SequentialIds::new()),
        sink.clone(),
    );
    let form_id = editor.canonical().document().id.clone();
    editor.command(Command::CreateWorkflow {
        form_id,
        form_name: "Onboarding".to_string(),
    });

    // Drag moves never reach history; only the commit does.
    editor.handle(SurfaceEvent::NodeDragStart {
        id: "end-1".to_string(),
    });
    editor.handle(SurfaceEvent::NodeDragMove {
        id: "end-1".to_string(),
        position: Position::new(1.0, 1.0),
    });
    editor.handle(SurfaceEvent::NodeDragEnd {
        id: "end-1".to_string(),
        position: None,
    });

    let patch = editor.undo().unwrap().unwrap();
    assert!(patch.is_reset());
    let end = editor
        .canonical()
        .current_workflow()
        .unwrap()
        .find_node("end-1")
        .unwrap();
    assert_eq!(end.position, Position::new(250.0, 400.0));
    assert_eq!(editor.state().graph().position_of("end-1"), Some(Position::new(250.0, 400.0)));

    editor.undo().unwrap().unwrap();
    assert!(editor.canonical().current_workflow().is_none());
    assert!(editor.state().graph().nodes.is_empty());
    assert!(!editor.can_undo());

    assert!(sink
        .events()
        .iter()
        .any(|e| matches!(e, StoreEvent::PositionsCommitted { .. })));
}

#[test]
fn test_rejection_reason_is_reported() {
    let mut session = Session::with_workflow();
    let patch = session.send(SurfaceEvent::DeleteEdge {
        id: "edge-missing".to_string(),
    });
    let expected = FormflowError::unknown_edge("edge-missing").to_string();
    assert_eq!(patch.rejection, Some(expected));
}
