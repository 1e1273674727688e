use crate::domain::board::{Board, List};
use crate::domain::card::Card;
use crate::error::{BoardSyncError, Result};
use std::collections::HashSet;
use std::sync::Arc;

/// Checks that `orders` is a permutation of `0..orders.len()`
///
/// # Examples
/// ```
/// use boardsync_core::domain::ordering::check_dense;
///
/// assert!(check_dense("list todo", [1, 0, 2]).is_ok());
/// assert!(check_dense("list todo", [0, 2]).is_err());
/// ```
pub fn check_dense(scope: &str, orders: impl IntoIterator<Item = u32>) -> Result<()> {
    let orders: Vec<u32> = orders.into_iter().collect();
    let n = orders.len();
    let mut seen = vec![false; n];

    let dense = orders.iter().all(|&order| match seen.get_mut(order as usize) {
        Some(slot) if !*slot => {
            *slot = true;
            true
        }
        _ => false,
    });

    if dense {
        Ok(())
    } else {
        Err(BoardSyncError::OrderingInvariantViolation {
            scope: scope.to_string(),
            orders,
        })
    }
}

/// Checks every structural invariant of a settled board
///
/// * list orders are dense
/// * each list's card orders are dense
/// * every card's `list_id` names the list that holds it
/// * no card id appears twice
pub fn validate(board: &Board) -> Result<()> {
    check_dense(
        &format!("board {}", board.id),
        board.lists.iter().map(|l| l.order),
    )?;

    let mut seen = HashSet::new();
    for list in &board.lists {
        validate_list(list)?;

        for card in &list.cards {
            if !seen.insert(card.id.clone()) {
                return Err(BoardSyncError::OrderingInvariantViolation {
                    scope: format!("card {} appears more than once", card.id),
                    orders: vec![card.order],
                });
            }
        }
    }

    Ok(())
}

/// Checks a single list: dense card orders, and every card points back at it
pub fn validate_list(list: &List) -> Result<()> {
    check_dense(&format!("list {}", list.id), list.cards.iter().map(|c| c.order))?;

    match list.cards.iter().find(|c| c.list_id != list.id) {
        Some(card) => Err(BoardSyncError::OrderingInvariantViolation {
            scope: format!(
                "card {} claims list {} but sits in {}",
                card.id, card.list_id, list.id
            ),
            orders: vec![card.order],
        }),
        None => Ok(()),
    }
}

/// Rewrites each card's `order` to its index. Cards already in place keep
/// their reference; returns `None` when nothing changed.
pub fn renumber_cards(list: &List) -> Option<List> {
    let mut changed = false;
    let cards: Vec<Arc<Card>> = list
        .cards
        .iter()
        .enumerate()
        .map(|(index, card)| {
            let order = index as u32;
            if card.order == order {
                Arc::clone(card)
            } else {
                changed = true;
                Arc::new(card.with_order(order))
            }
        })
        .collect();

    changed.then(|| list.with_cards(cards))
}

/// Rewrites each list's `order` to its index, reusing untouched lists
pub fn renumber_lists(board: &Board) -> Option<Board> {
    let mut changed = false;
    let lists: Vec<Arc<List>> = board
        .lists
        .iter()
        .enumerate()
        .map(|(index, list)| {
            let order = index as u32;
            if list.order == order {
                Arc::clone(list)
            } else {
                changed = true;
                let mut renumbered = list.with_cards(list.cards.clone());
                renumbered.order = order;
                Arc::new(renumbered)
            }
        })
        .collect();

    changed.then(|| board.with_lists(lists))
}
