use crate::{
    domain::{Board, BoardId},
    drag::{DragEvent, DragEvents, DragOutcome, DraggedEntity},
    error::{BoardSyncError, Result},
    remote::RemoteBoard,
    store::HierarchyStore,
    sync::plan::{self, CommitPlan, PersistCall},
};
use futures::future::join_all;
use std::sync::Arc;

/// How a committed batch resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Every call succeeded; the local arrangement is now durable
    Committed { calls: usize },
    /// At least one call failed; the store now holds the re-fetched board
    RolledBack { failed: usize, total: usize },
}

/// Persists the final arrangement of a drop, or reloads canonical state
/// when persistence fails.
///
/// Batches are independent: nothing serializes two in-flight commits, so
/// when drags overlap the batch that completes last decides what the remote
/// ends up holding.
pub struct PositionSynchronizer<R: ?Sized> {
    store: HierarchyStore,
    remote: Arc<R>,
    events: DragEvents,
}

impl<R: RemoteBoard + ?Sized> PositionSynchronizer<R> {
    pub fn new(store: HierarchyStore, remote: Arc<R>, events: DragEvents) -> Self {
        Self {
            store,
            remote,
            events,
        }
    }

    pub fn remote(&self) -> &Arc<R> {
        &self.remote
    }

    /// Renumbers the current snapshot for a drop of `entity`, swaps the
    /// renumbered board into the store and returns the batch to run.
    ///
    /// Fails with an ordering-invariant violation if the renumbered board is
    /// still not dense; that is a bug in the reorder logic.
    pub fn stage(self: &Arc<Self>, entity: &DraggedEntity) -> Result<PendingCommit<R>> {
        let snapshot = self.store.snapshot();

        let (settled, plan) = plan::finalize(&snapshot, entity).map_err(|e| {
            if e.is_invariant_violation() {
                tracing::error!(entity = entity.id(), error = %e, "ordering invariant violated on drop");
            }
            e
        })?;

        if let Some(board) = settled {
            self.store.replace(board);
        }

        tracing::debug!(entity = entity.id(), calls = plan.calls.len(), "commit staged");
        Ok(PendingCommit {
            synchronizer: Arc::clone(self),
            plan,
        })
    }

    /// Issues every call in `plan` concurrently and waits for all of them.
    ///
    /// Any failure discards local state and reloads the board from the
    /// remote. Failed calls are never retried individually.
    pub async fn commit(&self, plan: CommitPlan) -> Result<CommitOutcome> {
        let total = plan.calls.len();
        let results = join_all(plan.calls.iter().map(|call| self.persist(call))).await;
        let errors: Vec<BoardSyncError> = results.into_iter().filter_map(|r| r.err()).collect();

        if errors.is_empty() {
            tracing::info!(entity = plan.entity.id(), calls = total, "positions committed");
            self.finish(&plan.entity, DragOutcome::Committed);
            return Ok(CommitOutcome::Committed { calls: total });
        }

        let failed = errors.len();
        let first = errors[0].to_string();
        tracing::warn!(
            entity = plan.entity.id(),
            failed,
            total,
            error = %first,
            "position commit failed, reloading board"
        );

        match self.reload(&plan.board_id).await {
            Ok(_) => {
                self.finish(&plan.entity, DragOutcome::RolledBack);
                Ok(CommitOutcome::RolledBack { failed, total })
            }
            Err(reload_err) => {
                tracing::error!(board = %plan.board_id, error = %reload_err, "reload after failed commit failed");
                self.finish(&plan.entity, DragOutcome::Failed);
                Err(BoardSyncError::PersistenceFailure {
                    failed,
                    total,
                    message: format!("{first}; reload failed: {reload_err}"),
                })
            }
        }
    }

    /// Fetches the canonical board and fully replaces the store with it
    pub async fn reload(&self, board_id: &BoardId) -> Result<Arc<Board>> {
        let board = Arc::new(self.remote.fetch_board(board_id).await?.sorted());
        self.store.replace(Arc::clone(&board));
        tracing::info!(board = %board_id, lists = board.lists.len(), cards = board.card_count(), "board reloaded");
        Ok(board)
    }

    async fn persist(&self, call: &PersistCall) -> Result<()> {
        match call {
            PersistCall::List { id, order } => self.remote.reorder_list(id, *order).await,
            PersistCall::Card { id, order, list_id } => {
                self.remote
                    .reorder_or_reparent_card(id, *order, list_id.as_ref())
                    .await
            }
        }
    }

    fn finish(&self, entity: &DraggedEntity, outcome: DragOutcome) {
        self.events.publish(DragEvent::Ended {
            id: entity.id().to_string(),
            kind: entity.kind(),
            outcome,
        });
    }
}

/// A staged drop waiting to be persisted. Await [`PendingCommit::run`]
/// directly, or spawn it to keep the caller free for the next drag.
#[must_use = "a staged drop is not persisted until it is run"]
pub struct PendingCommit<R: ?Sized> {
    synchronizer: Arc<PositionSynchronizer<R>>,
    plan: CommitPlan,
}

impl<R: RemoteBoard + ?Sized> PendingCommit<R> {
    pub fn plan(&self) -> &CommitPlan {
        &self.plan
    }

    pub async fn run(self) -> Result<CommitOutcome> {
        self.synchronizer.commit(self.plan).await
    }
}

impl<R: ?Sized> std::fmt::Debug for PendingCommit<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingCommit")
            .field("plan", &self.plan)
            .finish()
    }
}
