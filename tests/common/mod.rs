#![allow(dead_code)]

use boardsync_core::{Board, BoardId, Card, CardId, List, ListId};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Builds board `b` from `(list id, [card ids])` pairs, in order
pub fn board(lists: &[(&str, &[&str])]) -> Board {
    let mut board = Board::new(BoardId::from("b"), "Board".to_string());
    for (list_id, cards) in lists {
        let mut list = List::new(
            ListId::from(*list_id),
            BoardId::from("b"),
            list_id.to_string(),
            0,
        );
        for card_id in cards.iter() {
            list.push_card(Card::new(
                CardId::from(*card_id),
                ListId::from(*list_id),
                card_id.to_string(),
                0,
            ));
        }
        board.push_list(list);
    }
    board
}

pub fn card_ids(board: &Board, list: &str) -> Vec<String> {
    board
        .find_list(&ListId::from(list))
        .map(|l| l.cards.iter().map(|c| c.id.to_string()).collect())
        .unwrap_or_default()
}

pub fn card_orders(board: &Board, list: &str) -> Vec<u32> {
    board
        .find_list(&ListId::from(list))
        .map(|l| l.cards.iter().map(|c| c.order).collect())
        .unwrap_or_default()
}

pub fn list_ids(board: &Board) -> Vec<String> {
    board.lists.iter().map(|l| l.id.to_string()).collect()
}
