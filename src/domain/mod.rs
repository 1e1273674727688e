pub mod board;
pub mod card;
pub mod ids;
pub mod ordering;

pub use board::{Board, CardLocation, List};
pub use card::Card;
pub use ids::{BoardId, CardId, EntityKind, ListId};
pub use ordering::{check_dense, renumber_cards, renumber_lists, validate, validate_list};
