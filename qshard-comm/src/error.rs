//! Error types for collective communication

use crate::reduce::ReduceOp;
use thiserror::Error;

/// Errors raised by the partition manager and transports
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommError {
    /// A peer left while this rank was waiting on it
    #[error("Rank {rank} disconnected")]
    Disconnected { rank: usize },

    /// A message carried a different type than the receiver expected
    #[error("Received payload does not match expected type {expected}")]
    PayloadMismatch { expected: &'static str },

    /// Rank index outside the group
    #[error("Invalid rank {rank} for group of size {size}")]
    InvalidRank { rank: usize, size: usize },

    /// Buffer lengths disagree
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// The element type has no meaning for this reduction
    #[error("Reduction {op:?} is not defined for {ty}")]
    UnsupportedReduceOp { op: ReduceOp, ty: &'static str },

    /// A cluster needs at least one rank
    #[error("Cluster size must be at least 1")]
    EmptyCluster,

    /// A rank thread panicked
    #[error("Rank {rank} panicked")]
    RankPanicked { rank: usize },
}

/// Result type for communication
pub type Result<T> = std::result::Result<T, CommError>;
