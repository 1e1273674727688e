use crate::domain::{Board, CardId, EntityKind, ListId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A pointer position in device-independent pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// What the pointer is holding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragState {
    Idle,
    ArmedList(ListId),
    ArmedCard(CardId),
}

impl DragState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// The entity being dragged, with what the synchronizer needs to know
/// about where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DraggedEntity {
    List { id: ListId },
    Card { id: CardId, source_list: ListId },
}

impl DraggedEntity {
    pub fn id(&self) -> &str {
        match self {
            Self::List { id } => id.as_str(),
            Self::Card { id, .. } => id.as_str(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::List { .. } => EntityKind::List,
            Self::Card { .. } => EntityKind::Card,
        }
    }
}

#[derive(Debug)]
struct Grip {
    entity: DraggedEntity,
    origin: Point,
    activated: bool,
    last_over: Option<String>,
    before: Arc<Board>,
}

/// What the session hands back when the pointer is released
#[derive(Debug)]
pub struct Release {
    pub entity: DraggedEntity,
    /// False when the pointer never travelled past the activation
    /// distance, i.e. the gesture was a click
    pub activated: bool,
    /// The snapshot as it was on pointer-down
    pub before: Arc<Board>,
}

/// Pointer-driven state machine for a single drag gesture
#[derive(Debug)]
pub struct DragSession {
    state: DragState,
    grip: Option<Grip>,
    activation_distance: f64,
}

impl DragSession {
    pub const DEFAULT_ACTIVATION_DISTANCE: f64 = 8.0;

    pub fn new(activation_distance: f64) -> Self {
        Self {
            state: DragState::Idle,
            grip: None,
            activation_distance,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// The held entity, if any
    pub fn entity(&self) -> Option<&DraggedEntity> {
        self.grip.as_ref().map(|g| &g.entity)
    }

    /// True once the pointer has moved far enough for this to be a drag
    pub fn is_active(&self) -> bool {
        self.grip.as_ref().is_some_and(|g| g.activated)
    }

    /// Classifies `target` against `snapshot` and arms the session.
    ///
    /// Any previously armed gesture is discarded. Targets that are neither
    /// a list nor a card leave the session idle.
    pub fn pointer_down(&mut self, target: &str, at: Point, snapshot: Arc<Board>) -> &DragState {
        self.reset();

        let (state, entity) = if snapshot.list_index(target).is_some() {
            let id = ListId::from(target);
            (DragState::ArmedList(id.clone()), DraggedEntity::List { id })
        } else if let Some(location) = snapshot.locate_card(target) {
            let id = CardId::from(target);
            let source_list = snapshot.lists[location.list_index].id.clone();
            (
                DragState::ArmedCard(id.clone()),
                DraggedEntity::Card { id, source_list },
            )
        } else {
            return &self.state;
        };

        self.state = state;
        self.grip = Some(Grip {
            entity,
            origin: at,
            activated: false,
            last_over: None,
            before: snapshot,
        });
        &self.state
    }

    /// Tracks pointer travel. Returns true on the move that activates the drag.
    pub fn pointer_move(&mut self, at: Point) -> bool {
        let threshold = self.activation_distance;
        match self.grip.as_mut() {
            Some(grip) if !grip.activated && grip.origin.distance_to(at) >= threshold => {
                grip.activated = true;
                true
            }
            _ => false,
        }
    }

    /// Records the current hover target. Returns true when it differs from
    /// the previous one, so each target is applied once per visit.
    pub fn hover(&mut self, over: &str) -> bool {
        match self.grip.as_mut() {
            Some(grip) if grip.activated => {
                if grip.last_over.as_deref() == Some(over) {
                    false
                } else {
                    grip.last_over = Some(over.to_string());
                    true
                }
            }
            _ => false,
        }
    }

    /// Ends the gesture and returns to idle
    pub fn release(&mut self) -> Option<Release> {
        let grip = self.grip.take()?;
        self.state = DragState::Idle;
        Some(Release {
            entity: grip.entity,
            activated: grip.activated,
            before: grip.before,
        })
    }

    pub fn reset(&mut self) {
        self.state = DragState::Idle;
        self.grip = None;
    }
}

impl Default for DragSession {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ACTIVATION_DISTANCE)
    }
}
