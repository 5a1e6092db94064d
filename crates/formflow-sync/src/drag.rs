//! Drag session bookkeeping
//!
//! One tracker per surface. A drag is `begin` → `finish` (or `cancel`);
//! finished drags wait in the pending batch until the adapter commits them.

use std::collections::{BTreeMap, HashMap};

/// In-flight drags and the batch of finished ones awaiting commit
///
/// `T` is the value a drag moves (a node position, a grid item).
#[derive(Debug, Clone)]
pub struct DragTracker<T> {
    /// Value each active drag started from
    active: HashMap<String, T>,
    /// Final values of finished drags, keyed by id
    pending: BTreeMap<String, T>,
}

impl<T> Default for DragTracker<T> {
    fn default() -> Self {
        Self {
            active: HashMap::new(),
            pending: BTreeMap::new(),
        }
    }
}

impl<T: Clone> DragTracker<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a drag; returns false if one is already running for `id`
    pub fn begin(&mut self, id: &str, origin: T) -> bool {
        if self.active.contains_key(id) {
            return false;
        }
        self.active.insert(id.to_string(), origin);
        true
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active.contains_key(id)
    }

    pub fn has_active(&self) -> bool {
        !self.active.is_empty()
    }

    /// End a drag and queue its final value; false if no drag was running
    pub fn finish(&mut self, id: &str, value: T) -> bool {
        if self.active.remove(id).is_none() {
            return false;
        }
        self.pending.insert(id.to_string(), value);
        true
    }

    /// Abandon a drag, returning the value it started from
    pub fn cancel(&mut self, id: &str) -> Option<T> {
        self.active.remove(id)
    }

    pub fn has_pending(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    pub fn pending_is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending_ids(&self) -> impl Iterator<Item = &str> {
        self.pending.keys().map(String::as_str)
    }

    /// Take the whole pending batch
    pub fn drain_pending(&mut self) -> BTreeMap<String, T> {
        std::mem::take(&mut self.pending)
    }

    /// Ids whose mirror value may legitimately differ from canonical
    pub fn in_flight(&self) -> impl Iterator<Item = &str> {
        self.active
            .keys()
            .chain(self.pending.keys())
            .map(String::as_str)
    }

    /// Forget one id (the entity was removed)
    pub fn forget(&mut self, id: &str) {
        self.active.remove(id);
        self.pending.remove(id);
    }

    pub fn clear(&mut self) {
        self.active.clear();
        self.pending.clear();
    }
}
