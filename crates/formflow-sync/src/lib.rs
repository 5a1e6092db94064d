//! Formflow Sync - keeps the editing surfaces and the canonical stores
//! reconciled
//!
//! Two surfaces edit the same session: the graph canvas (workflow nodes and
//! edges) and the layout grid (form elements). Each renders a local mirror.
//! [`reduce`] folds one surface event into the canonical state and returns
//! a [`SurfacePatch`] describing how each mirror must change.
//!
//! [`Editor`] wraps the reducer with a registry, an id source, undo history
//! and an event sink for hosts that want a ready-made session.

pub mod adapter;
pub mod drag;
pub mod editor;
pub mod mirror;
pub mod surface;
pub mod viewport;

pub use adapter::{
    reduce, PatchOp, Surface, SurfaceEvent, SurfacePatch, SurfaceState, SyncOptions, SyncState,
};
pub use drag::DragTracker;
pub use editor::Editor;
pub use mirror::{GraphMirror, GridMirror};
pub use surface::{DropPayload, FormRef, SurfaceEdge, SurfaceNode};
pub use viewport::Viewport;
