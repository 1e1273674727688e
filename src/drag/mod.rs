pub mod controller;
pub mod engine;
pub mod events;
pub mod session;

pub use controller::DragController;
pub use engine::drag_over;
pub use events::{DragEvent, DragEvents, DragOutcome};
pub use session::{DragSession, DragState, DraggedEntity, Point, Release};
