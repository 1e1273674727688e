//! Speculative rearrangement of a board while a drag is in flight.
//!
//! [`drag_over`] is pure: it reads a snapshot and returns a new board, or
//! nothing when the pointer position has no effect. It never renumbers
//! `order` fields; that happens once, on drop.

use crate::domain::{Board, CardLocation, EntityKind};
use crate::error::{BoardSyncError, Result};
use std::sync::Arc;

/// Computes the arrangement produced by holding `dragged` over `over`.
///
/// Returns `Ok(None)` when the event changes nothing (dragging onto itself,
/// a list hovering a card, a card already sitting where it would land).
/// Returns [`BoardSyncError::TargetUnresolved`] when either id is unknown;
/// `board` is untouched in every case.
pub fn drag_over(board: &Board, dragged: &str, over: &str) -> Result<Option<Board>> {
    if dragged == over {
        return Ok(None);
    }

    match board.resolve(dragged) {
        Some(EntityKind::List) => move_list(board, dragged, over),
        Some(EntityKind::Card) => move_card(board, dragged, over),
        None => Err(BoardSyncError::TargetUnresolved(dragged.to_string())),
    }
}

fn move_list(board: &Board, dragged: &str, over: &str) -> Result<Option<Board>> {
    let from = board
        .list_index(dragged)
        .ok_or_else(|| BoardSyncError::TargetUnresolved(dragged.to_string()))?;

    let to = match board.list_index(over) {
        Some(index) => index,
        None if board.locate_card(over).is_some() => return Ok(None),
        None => return Err(BoardSyncError::TargetUnresolved(over.to_string())),
    };

    let mut lists = board.lists.clone();
    let moved = lists.remove(from);
    lists.insert(to, moved);

    tracing::debug!(list = dragged, from, to, "list moved");
    Ok(Some(board.with_lists(lists)))
}

/// Where a dragged card lands
#[derive(Clone, Copy)]
enum Landing {
    /// Before the card currently at this index of the list
    At(CardLocation),
    /// At the end of the list at this index
    End(usize),
}

fn move_card(board: &Board, dragged: &str, over: &str) -> Result<Option<Board>> {
    let source = board
        .locate_card(dragged)
        .ok_or_else(|| BoardSyncError::TargetUnresolved(dragged.to_string()))?;

    let landing = if let Some(location) = board.locate_card(over) {
        Landing::At(location)
    } else if let Some(list_index) = board.list_index(over) {
        Landing::End(list_index)
    } else {
        return Err(BoardSyncError::TargetUnresolved(over.to_string()));
    };

    let dest_index = match landing {
        Landing::At(location) => location.list_index,
        Landing::End(list_index) => list_index,
    };

    let source_list = &board.lists[source.list_index];
    let mut lists = board.lists.clone();

    if dest_index == source.list_index {
        let mut cards = source_list.cards.clone();
        let card = cards.remove(source.card_index);
        // The over card is looked up again once the dragged card is out
        match landing {
            Landing::At(_) => {
                let index = cards
                    .iter()
                    .position(|c| c.id == *over)
                    .unwrap_or(cards.len());
                cards.insert(index, card);
            }
            Landing::End(_) => cards.push(card),
        }

        let unchanged = cards
            .iter()
            .zip(source_list.cards.iter())
            .all(|(a, b)| Arc::ptr_eq(a, b));
        if unchanged {
            return Ok(None);
        }

        lists[dest_index] = Arc::new(source_list.with_cards(cards));
    } else {
        let dest_list = &board.lists[dest_index];

        let mut source_cards = source_list.cards.clone();
        let card = source_cards.remove(source.card_index);
        let card = Arc::new(card.moved_to(&dest_list.id));

        let mut dest_cards = dest_list.cards.clone();
        match landing {
            Landing::At(location) => dest_cards.insert(location.card_index, card),
            Landing::End(_) => dest_cards.push(card),
        }

        lists[source.list_index] = Arc::new(source_list.with_cards(source_cards));
        lists[dest_index] = Arc::new(dest_list.with_cards(dest_cards));
    }

    tracing::debug!(
        card = dragged,
        from = %source_list.id,
        to = %board.lists[dest_index].id,
        "card moved"
    );
    Ok(Some(board.with_lists(lists)))
}
