//! Turning a settled drag into a batch of persistence calls.

use crate::domain::{
    check_dense, renumber_cards, renumber_lists, validate_list, Board, BoardId, CardId, ListId,
};
use crate::drag::DraggedEntity;
use crate::error::{BoardSyncError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One persistence call to the remote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PersistCall {
    List {
        id: ListId,
        order: u32,
    },
    Card {
        id: CardId,
        order: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        list_id: Option<ListId>,
    },
}

impl PersistCall {
    pub fn entity_id(&self) -> &str {
        match self {
            Self::List { id, .. } => id.as_str(),
            Self::Card { id, .. } => id.as_str(),
        }
    }

    pub fn order(&self) -> u32 {
        match self {
            Self::List { order, .. } | Self::Card { order, .. } => *order,
        }
    }
}

/// The batch issued for one drop
#[derive(Debug, Clone, PartialEq)]
pub struct CommitPlan {
    pub board_id: BoardId,
    pub entity: DraggedEntity,
    pub calls: Vec<PersistCall>,
}

/// Renumbers the collections a drop touched and derives the calls that
/// persist them.
///
/// A list drop renumbers and persists every list on the board. A card drop
/// renumbers and persists the destination list and, when the card changed
/// lists, the source list too; only the moved card's call carries the new
/// `list_id`. Returns the renumbered board, or `None` if every order value
/// was already in place.
pub fn finalize(board: &Board, entity: &DraggedEntity) -> Result<(Option<Board>, CommitPlan)> {
    match entity {
        DraggedEntity::List { .. } => finalize_lists(board, entity),
        DraggedEntity::Card { id, source_list } => finalize_cards(board, entity, id, source_list),
    }
}

fn finalize_lists(board: &Board, entity: &DraggedEntity) -> Result<(Option<Board>, CommitPlan)> {
    let renumbered = renumber_lists(board);
    let settled = renumbered.as_ref().unwrap_or(board);

    check_dense(
        &format!("board {}", settled.id),
        settled.lists.iter().map(|l| l.order),
    )?;

    let calls = settled
        .lists
        .iter()
        .map(|list| PersistCall::List {
            id: list.id.clone(),
            order: list.order,
        })
        .collect();

    let plan = CommitPlan {
        board_id: board.id.clone(),
        entity: entity.clone(),
        calls,
    };
    Ok((renumbered, plan))
}

fn finalize_cards(
    board: &Board,
    entity: &DraggedEntity,
    card_id: &CardId,
    source_list: &ListId,
) -> Result<(Option<Board>, CommitPlan)> {
    let dest_index = board
        .locate_card(card_id.as_str())
        .map(|location| location.list_index)
        .ok_or_else(|| BoardSyncError::CardNotFound(card_id.to_string()))?;

    let dest_id = board.lists[dest_index].id.clone();
    let moved_across = &dest_id != source_list;

    let mut affected = vec![dest_index];
    if moved_across {
        match board.list_index(source_list.as_str()) {
            Some(index) => affected.push(index),
            None => tracing::warn!(list = %source_list, "source list vanished during drag"),
        }
    }

    let mut lists = board.lists.clone();
    let mut changed = false;
    let mut calls = Vec::new();

    for index in affected {
        if let Some(list) = renumber_cards(&board.lists[index]) {
            lists[index] = Arc::new(list);
            changed = true;
        }

        let list = &lists[index];
        validate_list(list)?;

        calls.extend(list.cards.iter().map(|card| PersistCall::Card {
            id: card.id.clone(),
            order: card.order,
            list_id: (moved_across && &card.id == card_id).then(|| dest_id.clone()),
        }));
    }

    let plan = CommitPlan {
        board_id: board.id.clone(),
        entity: entity.clone(),
        calls,
    };
    Ok((changed.then(|| board.with_lists(lists)), plan))
}
