//! Stateful editor session
//!
//! Owns a [`SyncState`] together with the registry, the id source, undo
//! history and an event sink, so a host only feeds surface events in and
//! applies the patches that come out.

use std::sync::Arc;

use formflow_engine::{
    AppState, Command, CommandContext, EditorConfig, EventSink, FormDocument, IdSource,
    NullEventSink, Result, RuntimeIds, Snapshot, StoreEvent, UndoStack,
};
use formflow_registry::{BuiltinRegistry, ComponentRegistry};

use crate::adapter::{SurfaceEvent, SurfacePatch, SyncState};

/// A building session with undo/redo
pub struct Editor {
    state: SyncState,
    registry: Box<dyn ComponentRegistry>,
    ids: Box<dyn IdSource>,
    history: UndoStack<Snapshot>,
    sink: Arc<dyn EventSink>,
}

impl Editor {
    /// Session over an empty form with the built-in catalog
    pub fn new(config: EditorConfig) -> Self {
        Self::with_parts(
            config,
            Box::new(BuiltinRegistry::with_builtins()),
            Box::new(RuntimeIds::new()),
            Arc::new(NullEventSink),
        )
    }

    pub fn with_parts(
        config: EditorConfig,
        registry: Box<dyn ComponentRegistry>,
        mut ids: Box<dyn IdSource>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let document = FormDocument::new(ids.form_id());
        Self::with_document(config, document, registry, ids, sink)
    }

    /// Session around an existing document
    pub fn with_document(
        config: EditorConfig,
        document: FormDocument,
        registry: Box<dyn ComponentRegistry>,
        ids: Box<dyn IdSource>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let history = UndoStack::new(config.history.max_snapshots);
        let state = SyncState::new(AppState::with_document(config, document));
        let mut editor = Self {
            state,
            registry,
            ids,
            history,
            sink,
        };
        editor.record();
        editor
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn canonical(&self) -> &AppState {
        self.state.canonical()
    }

    /// Feed one surface event through the adapter
    pub fn handle(&mut self, event: SurfaceEvent) -> SurfacePatch {
        let mut ctx = CommandContext {
            registry: self.registry.as_ref(),
            ids: self.ids.as_mut(),
        };
        let patch = self.state.apply(event, &mut ctx);

        if patch.committed.iter().any(changes_content) {
            self.record();
        }
        for event in &patch.committed {
            if let Err(e) = self.sink.send(event.clone()) {
                log::warn!("Failed to deliver store event: {}", e);
            }
        }
        patch
    }

    /// Shorthand for a panel-issued command
    pub fn command(&mut self, command: Command) -> SurfacePatch {
        self.handle(SurfaceEvent::Panel { command })
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Step back one committed change
    ///
    /// Returns `Ok(None)` when there is nothing to undo. The patch always
    /// resets both surfaces.
    pub fn undo(&mut self) -> Result<Option<SurfacePatch>> {
        let Some(snapshot) = self.history.undo().transpose()? else {
            return Ok(None);
        };
        Ok(Some(self.state.restore(snapshot)))
    }

    /// Step forward one undone change
    pub fn redo(&mut self) -> Result<Option<SurfacePatch>> {
        let Some(snapshot) = self.history.redo().transpose()? else {
            return Ok(None);
        };
        Ok(Some(self.state.restore(snapshot)))
    }

    fn record(&mut self) {
        if let Err(e) = self.history.push(&self.state.canonical().snapshot()) {
            log::warn!("Failed to record history snapshot: {}", e);
        }
    }
}

/// Whether an event changed document or graph content
///
/// Selection and view toggles are not recorded in history.
fn changes_content(event: &StoreEvent) -> bool {
    !matches!(
        event,
        StoreEvent::ElementSelected { .. }
            | StoreEvent::PreviewToggled { .. }
            | StoreEvent::WorkflowSelected { .. }
            | StoreEvent::WorkflowModeChanged { .. }
    )
}
