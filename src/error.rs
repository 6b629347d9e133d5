use crate::comm::Tag;

#[derive(thiserror::Error, Debug)]
pub enum CommError {
    #[error("rank {rank} is no longer reachable")]
    Disconnected { rank: usize },
    #[error("expected a {expected:?} message, got {got:?}")]
    UnexpectedPayload { expected: Tag, got: Tag },
    #[error("root rank {root} did not supply a value to broadcast")]
    MissingRootValue { root: usize },
}

#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("communication failed: {0}")]
    Comm(#[from] CommError),
    #[error("rank {rank} panicked")]
    RankPanicked { rank: usize },
    #[error("rank {rank} is active but has no partition")]
    Unplanned { rank: usize },
    #[error("coordinator finished without a result")]
    NoResult,
    #[error("distributed count {distributed} disagrees with sequential count {sequential}")]
    Mismatch { distributed: u64, sequential: u64 },
}
