//! Pointer-event front door: session classification, speculative moves on
//! hover, and staging the commit on release.

use crate::{
    config::SyncConfig,
    domain::Board,
    drag::{
        engine,
        events::{DragEvent, DragEvents, DragOutcome},
        session::{DragSession, DragState, Point, Release},
    },
    error::Result,
    remote::RemoteBoard,
    store::HierarchyStore,
    sync::{PendingCommit, PositionSynchronizer},
};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Drives one board's drag-and-drop. Every method except [`load`] and
/// [`reload`] is synchronous and never touches the network.
///
/// [`load`]: DragController::load
/// [`reload`]: DragController::reload
pub struct DragController<R: ?Sized> {
    store: HierarchyStore,
    session: DragSession,
    synchronizer: Arc<PositionSynchronizer<R>>,
    events: DragEvents,
    // Last board this gesture put in the store
    written: Option<Arc<Board>>,
}

impl<R: RemoteBoard + ?Sized> DragController<R> {
    pub fn new(store: HierarchyStore, remote: Arc<R>, config: &SyncConfig) -> Self {
        let events = DragEvents::new(config.event_capacity);
        let synchronizer = Arc::new(PositionSynchronizer::new(
            store.clone(),
            remote,
            events.clone(),
        ));

        Self {
            store,
            session: DragSession::new(config.activation_distance),
            synchronizer,
            events,
            written: None,
        }
    }

    pub fn store(&self) -> &HierarchyStore {
        &self.store
    }

    /// The read-only current hierarchy
    pub fn snapshot(&self) -> Arc<Board> {
        self.store.snapshot()
    }

    pub fn state(&self) -> &DragState {
        self.session.state()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DragEvent> {
        self.events.subscribe()
    }

    /// Initial load of the board named by the store
    pub async fn load(&self) -> Result<Arc<Board>> {
        self.reload().await
    }

    /// Replaces local state with the remote's canonical board
    pub async fn reload(&self) -> Result<Arc<Board>> {
        let board_id = self.store.board_id();
        self.synchronizer.reload(&board_id).await
    }

    /// Arms a session for `target`. Returns false when the target is not a
    /// list or card.
    pub fn pointer_down(&mut self, target: &str, at: Point) -> bool {
        let snapshot = self.store.snapshot();
        let armed = !self
            .session
            .pointer_down(target, at, Arc::clone(&snapshot))
            .is_idle();
        self.written = armed.then_some(snapshot);
        armed
    }

    /// Handles pointer travel and, once the drag is active, the element
    /// currently under the pointer.
    pub fn pointer_move(&mut self, at: Point, over: Option<&str>) {
        if self.session.pointer_move(at) {
            if let Some(entity) = self.session.entity() {
                tracing::info!(entity = entity.id(), kind = %entity.kind(), "drag started");
                self.events.publish(DragEvent::Started {
                    id: entity.id().to_string(),
                    kind: entity.kind(),
                });
            }
        }

        let Some(over) = over else {
            return;
        };
        if !self.session.hover(over) {
            return;
        }
        let Some(dragged) = self.session.entity().map(|e| e.id().to_string()) else {
            return;
        };

        let snapshot = self.store.snapshot();
        let moved = match engine::drag_over(&snapshot, &dragged, over) {
            Ok(Some(board)) => {
                let board = Arc::new(board);
                self.store.replace(Arc::clone(&board));
                self.written = Some(board);
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(dragged = %dragged, over, error = %e, "drag-over ignored");
                false
            }
        };

        self.events.publish(DragEvent::Over {
            id: dragged,
            over: over.to_string(),
            moved,
        });
    }

    /// Ends the gesture.
    ///
    /// A release before activation is a click and does nothing. A release
    /// over no target (or one that no longer exists) cancels: the pre-drag
    /// board is restored, unless a reload replaced it mid-gesture, and
    /// nothing is persisted. Otherwise the settled
    /// arrangement is staged and returned for the caller to run.
    pub fn pointer_up(&mut self, over: Option<&str>) -> Result<Option<PendingCommit<R>>> {
        let written = self.written.take();
        let Some(release) = self.session.release() else {
            return Ok(None);
        };
        if !release.activated {
            return Ok(None);
        }

        let on_target = over.is_some_and(|id| self.store.snapshot().resolve(id).is_some());
        if !on_target {
            self.abort(release, written);
            return Ok(None);
        }

        let entity = release.entity;

        match self.synchronizer.stage(&entity) {
            Ok(pending) => Ok(Some(pending)),
            Err(e) => {
                self.restore(release.before, written);
                self.events.publish(DragEvent::Ended {
                    id: entity.id().to_string(),
                    kind: entity.kind(),
                    outcome: DragOutcome::Failed,
                });
                Err(e)
            }
        }
    }

    /// Aborts an armed gesture as if released outside every target
    pub fn cancel(&mut self) {
        let written = self.written.take();
        match self.session.release() {
            Some(release) if release.activated => self.abort(release, written),
            _ => {}
        }
    }

    fn abort(&self, release: Release, written: Option<Arc<Board>>) {
        self.restore(release.before, written);
        tracing::info!(entity = release.entity.id(), "drag cancelled");
        self.events.publish(DragEvent::Ended {
            id: release.entity.id().to_string(),
            kind: release.entity.kind(),
            outcome: DragOutcome::Cancelled,
        });
    }

    /// Puts the pre-drag board back, unless something other than this
    /// gesture (a reload after a failed commit) has replaced the store since.
    fn restore(&self, before: Arc<Board>, written: Option<Arc<Board>>) {
        match written {
            Some(written) if self.store.has_changed_since(&written) => {
                tracing::debug!("board replaced during drag, keeping current state");
            }
            _ => {
                self.store.replace(before);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BoardId, Card, CardId, List, ListId};
    use crate::error::BoardSyncError;
    use crate::remote::memory::MemoryRemote;
    use crate::sync::CommitOutcome;

    fn board() -> Board {
        let mut board = Board::new(BoardId::from("b"), "B".into());
        for (list, cards) in [("A", vec!["c1", "c2"]), ("B", vec!["c3"])] {
            let mut l = List::new(ListId::from(list), BoardId::from("b"), list.into(), 0);
            for card in cards {
                l.push_card(Card::new(CardId::from(card), ListId::from(list), card.into(), 0));
            }
            board.push_list(l);
        }
        board
    }

    fn controller() -> (DragController<MemoryRemote>, Arc<MemoryRemote>) {
        let board = board();
        let remote = Arc::new(MemoryRemote::with_board(board.clone()));
        let controller = DragController::new(
            HierarchyStore::new(board),
            Arc::clone(&remote),
            &SyncConfig::default(),
        );
        (controller, remote)
    }

    #[test]
    fn test_click_is_not_a_drag() {
        let (mut ctl, remote) = controller();
        let before = ctl.snapshot();

        assert!(ctl.pointer_down("c1", Point::new(0.0, 0.0)));
        ctl.pointer_move(Point::new(2.0, 2.0), Some("c3"));
        assert!(ctl.pointer_up(Some("c3")).unwrap().is_none());

        assert!(!ctl.store().has_changed_since(&before));
        assert!(remote.calls().is_empty());
        assert!(ctl.state().is_idle());
    }

    #[test]
    fn test_hover_moves_speculatively() {
        let (mut ctl, remote) = controller();
        ctl.pointer_down("c1", Point::new(0.0, 0.0));
        ctl.pointer_move(Point::new(0.0, 10.0), Some("c3"));

        let snapshot = ctl.snapshot();
        assert_eq!(snapshot.lists[1].cards[0].id, CardId::from("c1"));
        assert!(remote.calls().is_empty());
    }

    #[test]
    fn test_repeated_hover_over_same_target_applies_once() {
        let (mut ctl, _) = controller();
        let mut rx = ctl.subscribe();
        ctl.pointer_down("c2", Point::new(0.0, 0.0));
        ctl.pointer_move(Point::new(0.0, 10.0), Some("c1"));
        let once = ctl.snapshot();
        ctl.pointer_move(Point::new(0.0, 12.0), Some("c1"));

        assert!(!ctl.store().has_changed_since(&once));
        let ids: Vec<_> = once.lists[0].cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "c1"]);

        assert!(matches!(rx.try_recv().unwrap(), DragEvent::Started { .. }));
        assert!(matches!(rx.try_recv().unwrap(), DragEvent::Over { moved: true, .. }));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unresolved_hover_is_swallowed() {
        let (mut ctl, _) = controller();
        ctl.pointer_down("c1", Point::new(0.0, 0.0));
        let before = ctl.snapshot();
        ctl.pointer_move(Point::new(0.0, 10.0), Some("toolbar"));
        assert!(!ctl.store().has_changed_since(&before));
        assert!(!ctl.state().is_idle());
    }

    #[test]
    fn test_cancel_restores_pre_drag_board() {
        let (mut ctl, remote) = controller();
        let before = ctl.snapshot();
        let mut rx = ctl.subscribe();

        ctl.pointer_down("c1", Point::new(0.0, 0.0));
        ctl.pointer_move(Point::new(0.0, 10.0), Some("c3"));
        ctl.cancel();

        assert!(Arc::ptr_eq(&before, &ctl.snapshot()));
        assert!(remote.calls().is_empty());
        assert!(matches!(rx.try_recv().unwrap(), DragEvent::Started { .. }));
        assert!(matches!(rx.try_recv().unwrap(), DragEvent::Over { moved: true, .. }));
        assert!(matches!(
            rx.try_recv().unwrap(),
            DragEvent::Ended {
                outcome: DragOutcome::Cancelled,
                ..
            }
        ));
    }

    #[test]
    fn test_cancel_when_idle_does_nothing() {
        let (mut ctl, _) = controller();
        let before = ctl.snapshot();
        let mut rx = ctl.subscribe();

        ctl.cancel();
        ctl.pointer_down("c1", Point::new(0.0, 0.0));
        ctl.cancel();

        assert!(Arc::ptr_eq(&before, &ctl.snapshot()));
        assert!(rx.try_recv().is_err());
        assert!(ctl.state().is_idle());
    }

    #[tokio::test]
    async fn test_cancel_after_rollback_keeps_reloaded_board() {
        let (mut ctl, remote) = controller();
        remote.fail_all(true);

        ctl.pointer_down("c1", Point::new(0.0, 0.0));
        ctl.pointer_move(Point::new(0.0, 10.0), Some("c3"));
        let pending = ctl.pointer_up(Some("c3")).unwrap().unwrap();

        // Next gesture starts from the speculative board
        ctl.pointer_down("c2", Point::new(0.0, 0.0));
        ctl.pointer_move(Point::new(0.0, 10.0), None);

        let outcome = pending.run().await.unwrap();
        assert!(matches!(outcome, CommitOutcome::RolledBack { .. }));

        ctl.cancel();
        let truth = remote.fetch_board(&BoardId::from("b")).await.unwrap();
        assert_eq!(*ctl.snapshot(), truth);
        let ids: Vec<_> = ctl.snapshot().lists[1]
            .cards
            .iter()
            .map(|c| c.id.to_string())
            .collect();
        assert_eq!(ids, vec!["c3"]);
    }

    #[test]
    fn test_drop_after_card_vanished_fails() {
        let (mut ctl, _) = controller();
        let mut rx = ctl.subscribe();

        ctl.pointer_down("c1", Point::new(0.0, 0.0));
        ctl.pointer_move(Point::new(0.0, 10.0), Some("c3"));

        // A reload lands mid-drag with the card deleted remotely
        let mut reloaded = Board::new(BoardId::from("b"), "B".into());
        let mut a = List::new(ListId::from("A"), BoardId::from("b"), "A".into(), 0);
        a.push_card(Card::new(CardId::from("c2"), ListId::from("A"), "c2".into(), 0));
        reloaded.push_list(a);
        let mut b = List::new(ListId::from("B"), BoardId::from("b"), "B".into(), 1);
        b.push_card(Card::new(CardId::from("c3"), ListId::from("B"), "c3".into(), 0));
        reloaded.push_list(b);
        ctl.store().replace(reloaded.clone());

        let err = ctl.pointer_up(Some("c3")).unwrap_err();
        assert!(matches!(err, BoardSyncError::CardNotFound(ref id) if id == "c1"));
        assert_eq!(*ctl.snapshot(), reloaded);
        assert!(ctl.state().is_idle());

        let mut last = None;
        while let Ok(event) = rx.try_recv() {
            last = Some(event);
        }
        assert!(matches!(
            last,
            Some(DragEvent::Ended {
                outcome: DragOutcome::Failed,
                ..
            })
        ));
    }

    #[test]
    fn test_failed_stage_restores_pre_drag_board() {
        let (mut ctl, _) = controller();
        let before = ctl.snapshot();
        let mut rx = ctl.subscribe();

        ctl.pointer_down("c1", Point::new(0.0, 0.0));
        ctl.pointer_move(Point::new(0.0, 10.0), Some("c3"));

        // Cards in B point at the wrong list; the gesture wrote this board
        let speculative = ctl.snapshot();
        let mut broken = (*speculative).clone();
        let list = broken.lists[1].with_cards(
            broken.lists[1]
                .cards
                .iter()
                .map(|c| Arc::new(c.moved_to(&ListId::from("A"))))
                .collect(),
        );
        broken.lists[1] = Arc::new(list);
        let broken = Arc::new(broken);
        ctl.store().replace(Arc::clone(&broken));
        ctl.written = Some(broken);

        let err = ctl.pointer_up(Some("c3")).unwrap_err();
        assert!(err.is_invariant_violation());
        assert!(Arc::ptr_eq(&before, &ctl.snapshot()));

        let mut last = None;
        while let Ok(event) = rx.try_recv() {
            last = Some(event);
        }
        assert!(matches!(
            last,
            Some(DragEvent::Ended {
                outcome: DragOutcome::Failed,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_drop_stages_and_commits() {
        let (mut ctl, remote) = controller();
        ctl.pointer_down("c1", Point::new(0.0, 0.0));
        ctl.pointer_move(Point::new(0.0, 10.0), Some("c3"));

        let pending = ctl.pointer_up(Some("c3")).unwrap().unwrap();
        assert!(ctl.state().is_idle());
        assert_eq!(pending.plan().calls.len(), 3);

        let snapshot = ctl.snapshot();
        assert_eq!(snapshot.lists[1].cards[1].order, 1);

        pending.run().await.unwrap();
        assert_eq!(remote.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_load_replaces_store() {
        let remote = Arc::new(MemoryRemote::with_board(board()));
        let ctl = DragController::new(
            HierarchyStore::empty(BoardId::from("b")),
            Arc::clone(&remote),
            &SyncConfig::default(),
        );

        let loaded = ctl.load().await.unwrap();
        assert_eq!(loaded.lists.len(), 2);
        assert!(Arc::ptr_eq(&loaded, &ctl.snapshot()));
    }
}
