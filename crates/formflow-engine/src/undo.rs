//! Snapshot history for undo and redo
//!
//! Every recorded state is serialized to JSON and packed with zstd. Stepping
//! backwards or forwards unpacks a whole state; commands are never replayed.

use std::collections::VecDeque;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::constants::history;
use crate::error::{FormflowError, Result};

/// Bounded history of packed `T` states with a cursor
///
/// The cursor names the state the session currently shows. Recording a new
/// state drops everything after the cursor; once the bound is reached the
/// oldest state falls off the front.
pub struct UndoStack<T> {
    packed: VecDeque<Vec<u8>>,
    cursor: usize,
    limit: usize,
    _state: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> UndoStack<T> {
    /// History keeping at most `limit` states (at least one)
    pub fn new(limit: usize) -> Self {
        Self {
            packed: VecDeque::new(),
            cursor: 0,
            limit: limit.max(1),
            _state: PhantomData,
        }
    }

    /// Record `state` as the newest entry and move the cursor onto it
    pub fn push(&mut self, state: &T) -> Result<()> {
        let bytes = pack(state)?;

        if !self.packed.is_empty() {
            self.packed.truncate(self.cursor + 1);
        }
        self.packed.push_back(bytes);

        let overflow = self.packed.len().saturating_sub(self.limit);
        self.packed.drain(..overflow);
        self.cursor = self.packed.len() - 1;
        Ok(())
    }

    /// Step the cursor back and return the state it lands on
    pub fn undo(&mut self) -> Option<Result<T>> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.unpack_at(self.cursor))
    }

    /// Step the cursor forward and return the state it lands on
    pub fn redo(&mut self) -> Option<Result<T>> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.unpack_at(self.cursor))
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.packed.len()
    }

    fn unpack_at(&self, index: usize) -> Result<T> {
        match self.packed.get(index) {
            Some(bytes) => unpack(bytes),
            None => Err(FormflowError::Compression(format!(
                "History has no entry {}",
                index
            ))),
        }
    }
}

impl<T: Serialize + DeserializeOwned> Default for UndoStack<T> {
    fn default() -> Self {
        Self::new(history::MAX_SNAPSHOTS)
    }
}

fn pack<T: Serialize>(state: &T) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(state)?;
    zstd::encode_all(json.as_slice(), history::COMPRESSION_LEVEL)
        .map_err(|e| FormflowError::Compression(e.to_string()))
}

fn unpack<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let json = zstd::decode_all(bytes).map_err(|e| FormflowError::Compression(e.to_string()))?;
    Ok(serde_json::from_slice(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormDocument;

    fn doc(name: &str) -> FormDocument {
        let mut doc = FormDocument::new("form-1");
        doc.name = name.to_string();
        doc
    }

    fn names(stack: &mut UndoStack<FormDocument>) -> Vec<String> {
        let mut seen = Vec::new();
        while let Some(state) = stack.undo() {
            seen.push(state.unwrap().name);
        }
        seen
    }

    #[test]
    fn test_undo_walks_back_to_first_state() {
        let mut stack = UndoStack::new(10);
        for name in ["first", "second", "third"] {
            stack.push(&doc(name)).unwrap();
        }

        assert!(!stack.can_redo());
        assert_eq!(names(&mut stack), vec!["second", "first"]);
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_redo_after_undo() {
        let mut stack = UndoStack::new(10);
        stack.push(&doc("first")).unwrap();
        stack.push(&doc("second")).unwrap();
        stack.undo();

        assert_eq!(stack.redo().unwrap().unwrap().name, "second");
        assert!(stack.redo().is_none());
    }

    #[test]
    fn test_push_discards_redo_branch() {
        let mut stack = UndoStack::new(10);
        stack.push(&doc("first")).unwrap();
        stack.push(&doc("second")).unwrap();
        stack.undo();
        stack.push(&doc("third")).unwrap();

        assert!(!stack.can_redo());
        assert_eq!(names(&mut stack), vec!["first"]);
        assert_eq!(stack.redo().unwrap().unwrap().name, "third");
    }

    #[test]
    fn test_limit_drops_oldest_states() {
        let mut stack = UndoStack::new(3);
        for i in 0..5 {
            stack.push(&doc(&format!("doc_{}", i))).unwrap();
        }

        assert_eq!(names(&mut stack), vec!["doc_3", "doc_2"]);
    }

    #[test]
    fn test_zero_limit_keeps_one_state() {
        let mut stack = UndoStack::new(0);
        stack.push(&doc("first")).unwrap();
        stack.push(&doc("second")).unwrap();

        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }
}
