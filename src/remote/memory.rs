//! In-memory remote for tests, with a call log and failure injection.

use crate::{
    domain::{Board, BoardId, CardId, ListId},
    error::{BoardSyncError, Result},
    remote::{apply_card_order, apply_list_order, RemoteBoard},
    sync::PersistCall,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryRemote {
    boards: Mutex<HashMap<BoardId, Board>>,
    calls: Mutex<Vec<PersistCall>>,
    failing_ids: Mutex<HashSet<String>>,
    fail_all: AtomicBool,
    fail_fetch: AtomicBool,
    fetches: AtomicUsize,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_board(board: Board) -> Self {
        let remote = Self::new();
        remote.insert(board);
        remote
    }

    pub fn insert(&self, board: Board) {
        lock(&self.boards).insert(board.id.clone(), board);
    }

    /// The stored board as-is, without the sorting `fetch_board` applies
    pub fn stored(&self, id: &BoardId) -> Option<Board> {
        lock(&self.boards).get(id).cloned()
    }

    /// Every persistence call received so far, in arrival order
    pub fn calls(&self) -> Vec<PersistCall> {
        lock(&self.calls).clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Makes every persistence call fail
    pub fn fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Makes persistence calls for one list or card id fail
    pub fn fail_on(&self, id: impl Into<String>) {
        lock(&self.failing_ids).insert(id.into());
    }

    pub fn fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    fn check(&self, call: PersistCall) -> Result<()> {
        let id = call.entity_id().to_string();
        lock(&self.calls).push(call);

        if self.fail_all.load(Ordering::SeqCst) || lock(&self.failing_ids).contains(&id) {
            return Err(BoardSyncError::Remote(format!("rejected update for {id}")));
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[async_trait]
impl RemoteBoard for MemoryRemote {
    async fn reorder_list(&self, id: &ListId, order: u32) -> Result<()> {
        self.check(PersistCall::List {
            id: id.clone(),
            order,
        })?;

        let mut boards = lock(&self.boards);
        if boards
            .values_mut()
            .any(|board| apply_list_order(board, id, order))
        {
            Ok(())
        } else {
            Err(BoardSyncError::ListNotFound(id.to_string()))
        }
    }

    async fn reorder_or_reparent_card(
        &self,
        id: &CardId,
        order: u32,
        list_id: Option<&ListId>,
    ) -> Result<()> {
        self.check(PersistCall::Card {
            id: id.clone(),
            order,
            list_id: list_id.cloned(),
        })?;

        let mut boards = lock(&self.boards);
        for board in boards.values_mut() {
            if apply_card_order(board, id, order, list_id)? {
                return Ok(());
            }
        }
        Err(BoardSyncError::CardNotFound(id.to_string()))
    }

    async fn fetch_board(&self, id: &BoardId) -> Result<Board> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(BoardSyncError::Remote("fetch unavailable".into()));
        }

        lock(&self.boards)
            .get(id)
            .cloned()
            .map(Board::sorted)
            .ok_or_else(|| BoardSyncError::BoardNotFound(id.to_string()))
    }
}
