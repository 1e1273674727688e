//! The remote collaborator that owns durable board state.
//!
//! The core only ever asks it to persist an entity's position (and, for
//! cards, parent) and to hand back the canonical hierarchy.

use crate::{
    domain::{Board, BoardId, CardId, ListId},
    error::{BoardSyncError, Result},
};
use async_trait::async_trait;
use std::sync::Arc;

#[cfg(feature = "file-remote")]
pub mod file_remote;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

/// Persistence contract for board positions
#[async_trait]
pub trait RemoteBoard: Send + Sync {
    /// Sets a list's position among its siblings
    async fn reorder_list(&self, id: &ListId, order: u32) -> Result<()>;

    /// Sets a card's position, moving it to `list_id` first when given
    async fn reorder_or_reparent_card(
        &self,
        id: &CardId,
        order: u32,
        list_id: Option<&ListId>,
    ) -> Result<()>;

    /// Loads the canonical hierarchy
    async fn fetch_board(&self, id: &BoardId) -> Result<Board>;
}

/// Sets the stored order of a list. Returns false when the board does not
/// hold the list.
pub(crate) fn apply_list_order(board: &mut Board, id: &ListId, order: u32) -> bool {
    match board.lists.iter_mut().find(|l| &l.id == id) {
        Some(list) => {
            Arc::make_mut(list).order = order;
            true
        }
        None => false,
    }
}

/// Sets the stored order of a card, reparenting it first when asked.
/// Returns `Ok(false)` when the board does not hold the card.
pub(crate) fn apply_card_order(
    board: &mut Board,
    id: &CardId,
    order: u32,
    list_id: Option<&ListId>,
) -> Result<bool> {
    let Some(mut location) = board.locate_card(id.as_str()) else {
        return Ok(false);
    };

    if let Some(target) = list_id {
        let target_index = board
            .list_index(target.as_str())
            .ok_or_else(|| BoardSyncError::ListNotFound(target.to_string()))?;

        if target_index != location.list_index {
            let card = Arc::make_mut(&mut board.lists[location.list_index])
                .cards
                .remove(location.card_index);
            let card = Arc::new(card.moved_to(target));
            let target_list = Arc::make_mut(&mut board.lists[target_index]);
            target_list.cards.push(card);
            location.list_index = target_index;
            location.card_index = target_list.cards.len() - 1;
        }
    }

    let list = Arc::make_mut(&mut board.lists[location.list_index]);
    Arc::make_mut(&mut list.cards[location.card_index]).order = order;
    Ok(true)
}
