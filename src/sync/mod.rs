pub mod plan;
pub mod synchronizer;

pub use plan::{finalize, CommitPlan, PersistCall};
pub use synchronizer::{CommitOutcome, PendingCommit, PositionSynchronizer};
