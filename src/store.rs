//! The single authoritative in-memory copy of a board.
//!
//! Snapshots are immutable `Arc<Board>` values. Writers never patch a
//! snapshot in place; they build a new board (sharing untouched lists and
//! cards) and swap it in with [`HierarchyStore::replace`]. Observers detect
//! change with [`Arc::ptr_eq`].

use crate::domain::{Board, BoardId};
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone)]
pub struct HierarchyStore {
    current: Arc<RwLock<Arc<Board>>>,
}

impl HierarchyStore {
    pub fn new(board: Board) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(board))),
        }
    }

    /// A store holding an empty board, used until the first fetch lands
    pub fn empty(board_id: BoardId) -> Self {
        Self::new(Board::new(board_id, String::new()))
    }

    /// Returns the current snapshot
    pub fn snapshot(&self) -> Arc<Board> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    /// Swaps in a new snapshot and returns the one it replaced
    pub fn replace(&self, board: impl Into<Arc<Board>>) -> Arc<Board> {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, board.into())
    }

    pub fn board_id(&self) -> BoardId {
        self.snapshot().id.clone()
    }

    /// True when the store no longer holds `seen`
    pub fn has_changed_since(&self, seen: &Arc<Board>) -> bool {
        !Arc::ptr_eq(&self.snapshot(), seen)
    }
}
