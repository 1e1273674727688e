//! # Boardsync Core
//!
//! Drag-and-drop reordering for kanban boards, kept in sync with a remote
//! store.
//!
//! A board is a two-level hierarchy (lists holding cards). While the user
//! drags, every hover recomputes the arrangement locally with no network
//! round trip. On drop the final positions are persisted as one batch, and
//! if any part of that batch fails the board is reloaded from the remote.

pub mod config;
pub mod domain;
pub mod drag;
pub mod error;
pub mod remote;
pub mod store;
pub mod sync;

// Re-export commonly used types
pub use config::SyncConfig;
pub use domain::{Board, BoardId, Card, CardId, EntityKind, List, ListId};
pub use drag::{DragController, DragEvent, DragOutcome, DragState, DraggedEntity, Point};
pub use error::{BoardSyncError, Result};
pub use remote::RemoteBoard;
pub use store::HierarchyStore;
pub use sync::{CommitOutcome, PendingCommit, PositionSynchronizer};

#[cfg(feature = "file-remote")]
pub use remote::file_remote::FileRemote;
