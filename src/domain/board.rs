use crate::domain::card::Card;
use crate::domain::ids::{BoardId, CardId, EntityKind, ListId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An ordered column of cards on a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: ListId,
    pub board_id: BoardId,
    pub title: String,
    pub order: u32,
    #[serde(default)]
    pub cards: Vec<Arc<Card>>,
    pub created_at: DateTime<Utc>,
}

impl List {
    pub fn new(id: ListId, board_id: BoardId, title: String, order: u32) -> Self {
        Self {
            id,
            board_id,
            title,
            order,
            cards: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Appends a card at the end of the list, assigning it this list's id
    /// and the next dense order value
    pub fn push_card(&mut self, card: Card) {
        let order = self.cards.len() as u32;
        let card = Card {
            list_id: self.id.clone(),
            order,
            ..card
        };
        self.cards.push(Arc::new(card));
    }

    /// Index of the card with the given id within this list
    pub fn card_index(&self, id: &str) -> Option<usize> {
        self.cards.iter().position(|c| c.id == *id)
    }

    /// Returns a copy of this list sharing the same card references but
    /// holding `cards` instead
    pub fn with_cards(&self, cards: Vec<Arc<Card>>) -> Self {
        Self {
            id: self.id.clone(),
            board_id: self.board_id.clone(),
            title: self.title.clone(),
            order: self.order,
            cards,
            created_at: self.created_at,
        }
    }
}

/// Position of a card inside a board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardLocation {
    pub list_index: usize,
    pub card_index: usize,
}

/// Root aggregate: a board and its ordered lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    #[serde(default)]
    pub lists: Vec<Arc<List>>,
    pub created_at: DateTime<Utc>,
}

impl Board {
    pub fn new(id: BoardId, title: String) -> Self {
        Self {
            id,
            title,
            lists: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Appends a list at the end of the board with the next dense order value
    pub fn push_list(&mut self, list: List) {
        let order = self.lists.len() as u32;
        let list = List {
            board_id: self.id.clone(),
            order,
            ..list
        };
        self.lists.push(Arc::new(list));
    }

    /// Returns a copy of this board holding `lists` instead
    pub fn with_lists(&self, lists: Vec<Arc<List>>) -> Self {
        Self {
            id: self.id.clone(),
            title: self.title.clone(),
            lists,
            created_at: self.created_at,
        }
    }

    /// Index of the list with the given id
    pub fn list_index(&self, id: &str) -> Option<usize> {
        self.lists.iter().position(|l| l.id == *id)
    }

    pub fn find_list(&self, id: &ListId) -> Option<&Arc<List>> {
        self.lists.iter().find(|l| &l.id == id)
    }

    /// Locates a card by id across all lists
    pub fn locate_card(&self, id: &str) -> Option<CardLocation> {
        self.lists.iter().enumerate().find_map(|(list_index, list)| {
            list.card_index(id).map(|card_index| CardLocation {
                list_index,
                card_index,
            })
        })
    }

    pub fn find_card(&self, id: &CardId) -> Option<&Arc<Card>> {
        self.locate_card(id.as_str())
            .map(|loc| &self.lists[loc.list_index].cards[loc.card_index])
    }

    /// Classifies a raw id: lists take precedence over cards
    pub fn resolve(&self, id: &str) -> Option<EntityKind> {
        if self.list_index(id).is_some() {
            Some(EntityKind::List)
        } else if self.locate_card(id).is_some() {
            Some(EntityKind::Card)
        } else {
            None
        }
    }

    pub fn card_count(&self) -> usize {
        self.lists.iter().map(|l| l.cards.len()).sum()
    }

    /// Canonicalizes a board as delivered by a remote: lists sorted by
    /// `order`, and each list's cards sorted by `order`. Sorting is stable.
    pub fn sorted(mut self) -> Self {
        self.lists.sort_by_key(|l| l.order);
        for list in self.lists.iter_mut() {
            if !list.cards.windows(2).all(|w| w[0].order <= w[1].order) {
                let mut cards = list.cards.clone();
                cards.sort_by_key(|c| c.order);
                *list = Arc::new(list.with_cards(cards));
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Board {
        let mut board = Board::new(BoardId::from("b"), "Sprint".into());
        let mut todo = List::new(ListId::from("todo"), BoardId::from("b"), "Todo".into(), 0);
        todo.push_card(Card::new(CardId::from("c1"), ListId::from("x"), "one".into(), 9));
        todo.push_card(Card::new(CardId::from("c2"), ListId::from("x"), "two".into(), 9));
        board.push_list(todo);
        board.push_list(List::new(
            ListId::from("done"),
            BoardId::from("other"),
            "Done".into(),
            7,
        ));
        board
    }

    #[test]
    fn test_push_assigns_parent_and_order() {
        let board = sample();
        assert_eq!(board.lists[1].order, 1);
        assert_eq!(board.lists[1].board_id, BoardId::from("b"));
        assert_eq!(board.lists[0].cards[1].order, 1);
        assert_eq!(board.lists[0].cards[1].list_id, ListId::from("todo"));
    }

    #[test]
    fn test_resolve_classifies_ids() {
        let board = sample();
        assert_eq!(board.resolve("todo"), Some(EntityKind::List));
        assert_eq!(board.resolve("c2"), Some(EntityKind::Card));
        assert_eq!(board.resolve("nope"), None);
    }

    #[test]
    fn test_locate_card() {
        let board = sample();
        let loc = board.locate_card("c2").unwrap();
        assert_eq!(loc.list_index, 0);
        assert_eq!(loc.card_index, 1);
        assert_eq!(board.find_card(&CardId::from("c1")).unwrap().title, "one");
        assert_eq!(board.card_count(), 2);
    }

    #[test]
    fn test_sorted_orders_lists_and_cards() {
        let mut board = sample();
        let todo = board.lists[0].clone();
        let reversed: Vec<_> = todo.cards.iter().rev().cloned().collect();
        board.lists[0] = Arc::new(todo.with_cards(reversed));
        board.lists.reverse();

        let board = board.sorted();
        assert_eq!(board.lists[0].id, ListId::from("todo"));
        assert_eq!(board.lists[0].cards[0].id, CardId::from("c1"));
    }

    #[test]
    fn test_sorted_keeps_references_of_ordered_lists() {
        let board = sample();
        let before = board.lists[0].clone();
        let board = board.sorted();
        assert!(Arc::ptr_eq(&before, &board.lists[0]));
    }
}
