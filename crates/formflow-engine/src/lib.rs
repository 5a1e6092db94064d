//! Formflow Engine - canonical stores for the form builder
//!
//! This crate owns the single source of truth for a building session:
//!
//! - `form`: the element store and grid layout engine
//! - `workflow`: the workflow graph store with per-kind port rules
//! - `state`: `AppState`, mutated only through `Command` dispatch
//! - `undo`: compressed snapshot history
//! - `events`: change notifications for hosts
//!
//! Rendering, property panels, submission and workflow execution live
//! outside this crate. Component metadata comes from `formflow-registry`.
//!
//! # Example
//!
//! ```ignore
//! use formflow_engine::{AppState, Command, CommandContext, EditorConfig, RuntimeIds};
//! use formflow_registry::BuiltinRegistry;
//!
//! let registry = BuiltinRegistry::with_builtins();
//! let mut ids = RuntimeIds::new();
//! let mut state = AppState::new(EditorConfig::default(), &mut ids);
//!
//! let mut ctx = CommandContext { registry: &registry, ids: &mut ids };
//! state.dispatch(
//!     Command::AddElement { component_type: "input".into(), drop: (150.0, 220.0).into() },
//!     &mut ctx,
//! )?;
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod form;
pub mod ids;
pub mod state;
pub mod types;
pub mod undo;
pub mod workflow;

pub use config::{EditorConfig, GridConfig, HistoryConfig, WorkflowConfig};
pub use error::{FormflowError, Result};
pub use events::{EventError, EventSink, NullEventSink, StoreEvent, VecEventSink};
pub use form::{ElementPatch, FormDocument, FormElement, FormStore, GridProps, LayoutItem};
pub use ids::{IdSource, RuntimeIds, SequentialIds};
pub use state::{AppState, Command, CommandContext, Snapshot};
pub use types::{EdgeId, ElementId, FormId, NodeId, Position, WorkflowId};
pub use undo::UndoStack;
pub use workflow::{
    validate_workflow, NodeKind, Workflow, WorkflowEdge, WorkflowIssue,
    WorkflowNode, WorkflowStore,
};
