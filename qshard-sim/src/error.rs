//! Error types for the distributed simulator

use qshard_comm::CommError;
use qshard_gates::GateError;
use qshard_state::StateError;
use thiserror::Error;

/// Result type for simulator operations
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors that can occur during distributed simulation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// Observable or operator shape does not fit the state
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Matrix size or list lengths disagree
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The world cannot be split into whole global qubits
    #[error("World size {size} is not a power of two")]
    InvalidWorldSize { size: usize },

    /// Fewer qubits than the world needs for its global bits
    #[error("{num_qubits} qubits cannot be partitioned over {size} ranks")]
    TooFewQubits { num_qubits: usize, size: usize },

    /// Local shard failure
    #[error(transparent)]
    State(#[from] StateError),

    /// Collective communication failure
    #[error(transparent)]
    Comm(#[from] CommError),

    /// Gate registry failure
    #[error(transparent)]
    Gate(#[from] GateError),
}
