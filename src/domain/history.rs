//! Snapshot history for undo.
//!
//! The initial snapshot is kept apart from the edits, so there is always a
//! current state and undo can never remove it.

use tracing::debug;

use crate::domain::store::TreeStore;

#[derive(Debug, Clone)]
pub struct SnapshotHistory {
    initial: TreeStore,
    edits: Vec<TreeStore>,
}

impl SnapshotHistory {
    pub fn new(initial: TreeStore) -> Self {
        Self {
            initial,
            edits: Vec::new(),
        }
    }

    /// The last snapshot, i.e. the live state.
    pub fn current(&self) -> &TreeStore {
        self.edits.last().unwrap_or(&self.initial)
    }

    /// Record `state` as the new live state. History is unbounded.
    pub fn commit(&mut self, state: TreeStore) {
        self.edits.push(state);
        debug!("commit: history length {}", self.len());
    }

    /// Drop the last snapshot and return the restored one.
    ///
    /// Returns `None` and changes nothing when only the initial snapshot is left.
    pub fn undo(&mut self) -> Option<&TreeStore> {
        self.edits.pop()?;
        debug!("undo: history length {}", self.len());
        Some(self.current())
    }

    /// Number of snapshots, the initial one included.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.edits.len() + 1
    }

    /// Number of undoable steps.
    pub fn undo_depth(&self) -> usize {
        self.edits.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.edits.is_empty()
    }

    /// All snapshots, oldest first.
    pub fn snapshots(&self) -> impl Iterator<Item = &TreeStore> {
        std::iter::once(&self.initial).chain(self.edits.iter())
    }
}
