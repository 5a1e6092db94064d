//! Id minting
//!
//! Stores never invent ids themselves; they ask an [`IdSource`]. The
//! runtime source mints uuid v4 ids for elements, documents and workflows
//! and `<kind>-<millis>` ids for workflow nodes. Node ids are kept strictly
//! increasing within a session so two drops inside the same millisecond
//! still get distinct ids.

use crate::types::{ElementId, FormId, NodeId, WorkflowId};
use crate::workflow::NodeKind;

/// Source of fresh identifiers
pub trait IdSource: Send {
    fn element_id(&mut self) -> ElementId;
    fn form_id(&mut self) -> FormId;
    fn workflow_id(&mut self) -> WorkflowId;
    fn node_id(&mut self, kind: NodeKind) -> NodeId;
}

/// Production id source (uuid v4 + monotonic timestamps)
#[derive(Debug, Default)]
pub struct RuntimeIds {
    last_millis: i64,
}

impl RuntimeIds {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_millis(&mut self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        self.last_millis = if now > self.last_millis {
            now
        } else {
            self.last_millis + 1
        };
        self.last_millis
    }
}

impl IdSource for RuntimeIds {
    fn element_id(&mut self) -> ElementId {
        uuid::Uuid::new_v4().to_string()
    }

    fn form_id(&mut self) -> FormId {
        uuid::Uuid::new_v4().to_string()
    }

    fn workflow_id(&mut self) -> WorkflowId {
        uuid::Uuid::new_v4().to_string()
    }

    fn node_id(&mut self, kind: NodeKind) -> NodeId {
        format!("{}-{}", kind.as_str(), self.next_millis())
    }
}

/// Deterministic id source for tests and replays
///
/// Produces `element-1`, `form-2`, `condition-3`, ... from one shared
/// counter.
#[derive(Debug, Default)]
pub struct SequentialIds {
    counter: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self, prefix: &str) -> String {
        self.counter += 1;
        format!("{}-{}", prefix, self.counter)
    }
}

impl IdSource for SequentialIds {
    fn element_id(&mut self) -> ElementId {
        self.next("element")
    }

    fn form_id(&mut self) -> FormId {
        self.next("form")
    }

    fn workflow_id(&mut self) -> WorkflowId {
        self.next("workflow")
    }

    fn node_id(&mut self, kind: NodeKind) -> NodeId {
        self.next(kind.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_runtime_node_ids_never_collide() {
        let mut ids = RuntimeIds::new();
        let minted: HashSet<NodeId> = (0..500).map(|_| ids.node_id(NodeKind::Action)).collect();
        assert_eq!(minted.len(), 500);
        assert!(minted.iter().all(|id| id.starts_with("action-")));
    }

    #[test]
    fn test_runtime_element_ids_are_uuids() {
        let mut ids = RuntimeIds::new();
        let id = ids.element_id();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_sequential_ids() {
        let mut ids = SequentialIds::new();
        assert_eq!(ids.element_id(), "element-1");
        assert_eq!(ids.node_id(NodeKind::Condition), "condition-2");
        assert_eq!(ids.workflow_id(), "workflow-3");
    }
}
