use thiserror::Error;

pub type Result<T> = std::result::Result<T, BoardSyncError>;

#[derive(Debug, Error)]
pub enum BoardSyncError {
    #[error("Drag target does not resolve to a list or card: {0}")]
    TargetUnresolved(String),

    #[error("Persistence failed for {failed} of {total} calls: {message}")]
    PersistenceFailure {
        failed: usize,
        total: usize,
        message: String,
    },

    #[error("Order values of {scope} are not a dense 0..n run: {orders:?}")]
    OrderingInvariantViolation { scope: String, orders: Vec<u32> },

    #[error("Board not found: {0}")]
    BoardNotFound(String),

    #[error("List not found: {0}")]
    ListNotFound(String),

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl BoardSyncError {
    /// True for errors that indicate a bug in the reorder logic rather than
    /// a bad pointer target or an unreachable remote.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::OrderingInvariantViolation { .. })
    }
}
