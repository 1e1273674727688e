use crate::domain::ids::{CardId, ListId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A card on a kanban list
///
/// Only `list_id` and `order` are touched by the reorder engine; the
/// remaining fields are passed through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub list_id: ListId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub labels: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub order: u32,
    pub created_at: DateTime<Utc>,
}

impl Card {
    /// Creates a new card in the given list at the given position
    pub fn new(id: CardId, list_id: ListId, title: String, order: u32) -> Self {
        Self {
            id,
            list_id,
            title,
            description: None,
            labels: BTreeSet::new(),
            due_date: None,
            order,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.insert(label.into());
        self
    }

    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Returns a copy of this card reparented to `list_id`
    pub fn moved_to(&self, list_id: &ListId) -> Self {
        Self {
            list_id: list_id.clone(),
            ..self.clone()
        }
    }

    /// Returns a copy of this card with a new position
    pub fn with_order(&self, order: u32) -> Self {
        Self {
            order,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_creation() {
        let card = Card::new(CardId::from("c1"), ListId::from("l1"), "Write docs".into(), 2);
        assert_eq!(card.order, 2);
        assert_eq!(card.list_id, ListId::from("l1"));
        assert!(card.labels.is_empty());
        assert!(card.description.is_none());
    }

    #[test]
    fn test_moved_to_keeps_passthrough_fields() {
        let due = Utc::now();
        let card = Card::new(CardId::from("c1"), ListId::from("l1"), "Ship".into(), 0)
            .with_description("release 1.0".into())
            .with_label("urgent")
            .with_due_date(due);

        let moved = card.moved_to(&ListId::from("l2"));
        assert_eq!(moved.list_id, ListId::from("l2"));
        assert_eq!(moved.description.as_deref(), Some("release 1.0"));
        assert!(moved.labels.contains("urgent"));
        assert_eq!(moved.due_date, Some(due));
        assert_eq!(moved.created_at, card.created_at);
    }

    #[test]
    fn test_labels_are_a_set() {
        let card = Card::new(CardId::from("c1"), ListId::from("l1"), "x".into(), 0)
            .with_label("b")
            .with_label("a")
            .with_label("b");
        let labels: Vec<_> = card.labels.iter().map(String::as_str).collect();
        assert_eq!(labels, vec!["a", "b"]);
    }

    #[test]
    fn test_wire_shape_is_camel_case() {
        let card = Card::new(CardId::from("c1"), ListId::from("l1"), "x".into(), 0);
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["listId"], "l1");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("dueDate").is_none());
    }
}
