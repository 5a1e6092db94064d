//! Store change notifications
//!
//! Every successful command reports what it changed as a list of
//! [`StoreEvent`]s. Hosts that re-render or persist on change subscribe
//! through an [`EventSink`].

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::types::{EdgeId, ElementId, NodeId, WorkflowId};

/// Trait for receiving store events
///
/// This abstracts over the transport (UI channel, log, test buffer).
pub trait EventSink: Send + Sync {
    /// Send an event
    ///
    /// Returns an error if the event could not be delivered (e.g., channel closed)
    fn send(&self, event: StoreEvent) -> Result<(), EventError>;
}

/// Error when delivering an event fails
#[derive(Debug, Clone)]
pub struct EventError {
    pub message: String,
}

impl std::fmt::Display for EventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event error: {}", self.message)
    }
}

impl std::error::Error for EventError {}

/// A committed change to the canonical stores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StoreEvent {
    #[serde(rename_all = "camelCase")]
    ElementAdded { element_id: ElementId },

    #[serde(rename_all = "camelCase")]
    ElementUpdated { element_id: ElementId },

    #[serde(rename_all = "camelCase")]
    ElementRemoved { element_id: ElementId },

    #[serde(rename_all = "camelCase")]
    ElementSelected { element_id: Option<ElementId> },

    /// A grid layout was written back; lists the elements it matched
    #[serde(rename_all = "camelCase")]
    LayoutCommitted { element_ids: Vec<ElementId> },

    /// Form settings, name or description changed
    FormUpdated,

    /// A different form document was loaded
    #[serde(rename_all = "camelCase")]
    FormLoaded { form_id: String },

    #[serde(rename_all = "camelCase")]
    PreviewToggled { enabled: bool },

    #[serde(rename_all = "camelCase")]
    WorkflowCreated { workflow_id: WorkflowId },

    /// Another workflow became the one being edited
    #[serde(rename_all = "camelCase")]
    WorkflowSelected { workflow_id: WorkflowId },

    /// Workflow name, description or active flag changed
    #[serde(rename_all = "camelCase")]
    WorkflowUpdated { workflow_id: WorkflowId },

    #[serde(rename_all = "camelCase")]
    WorkflowModeChanged { enabled: bool },

    #[serde(rename_all = "camelCase")]
    NodeAdded { node_id: NodeId },

    #[serde(rename_all = "camelCase")]
    NodeUpdated { node_id: NodeId },

    /// A node was removed together with every edge touching it
    #[serde(rename_all = "camelCase")]
    NodeRemoved {
        node_id: NodeId,
        removed_edges: Vec<EdgeId>,
    },

    #[serde(rename_all = "camelCase")]
    EdgeAdded { edge_id: EdgeId },

    #[serde(rename_all = "camelCase")]
    EdgeRemoved { edge_id: EdgeId },

    /// A batch of node moves was committed
    #[serde(rename_all = "camelCase")]
    PositionsCommitted { node_ids: Vec<NodeId> },
}

/// A no-op event sink that discards all events
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn send(&self, _event: StoreEvent) -> Result<(), EventError> {
        Ok(())
    }
}

/// A vector-based event sink that collects events
///
/// Useful for testing to verify events were emitted correctly.
#[derive(Default)]
pub struct VecEventSink {
    events: Mutex<Vec<StoreEvent>>,
}

impl VecEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all collected events
    pub fn events(&self) -> Vec<StoreEvent> {
        self.events.lock().clone()
    }

    /// Clear all collected events
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for VecEventSink {
    fn send(&self, event: StoreEvent) -> Result<(), EventError> {
        self.events.lock().push(event);
        Ok(())
    }
}
