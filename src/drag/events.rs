use crate::config::SyncConfig;
use crate::domain::EntityKind;
use serde::Serialize;
use tokio::sync::broadcast;

/// How a drag gesture settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DragOutcome {
    /// Every persistence call succeeded
    Committed,
    /// A persistence call failed and the board was reloaded from the remote
    RolledBack,
    /// Released outside any target; the pre-drag arrangement was restored
    Cancelled,
    /// Neither the commit nor the reload went through
    Failed,
}

/// Notifications raised to the surrounding application
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DragEvent {
    Started {
        id: String,
        kind: EntityKind,
    },
    Over {
        id: String,
        over: String,
        moved: bool,
    },
    Ended {
        id: String,
        kind: EntityKind,
        outcome: DragOutcome,
    },
}

/// Fan-out of [`DragEvent`]s to any number of subscribers
#[derive(Debug, Clone)]
pub struct DragEvents {
    sender: broadcast::Sender<DragEvent>,
}

impl DragEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DragEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: DragEvent) {
        // No subscribers is fine
        let _ = self.sender.send(event);
    }
}

impl Default for DragEvents {
    fn default() -> Self {
        Self::new(SyncConfig::default().event_capacity)
    }
}
