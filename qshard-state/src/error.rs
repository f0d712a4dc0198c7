//! Error types for shard operations

use qshard_gates::GateError;
use thiserror::Error;

/// Errors that can occur while operating on a local shard
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// Wire index outside the shard
    #[error("Invalid wire {wire} for {num_qubits}-qubit state")]
    InvalidWire { wire: usize, num_qubits: usize },

    /// The same wire appears twice in one operation
    #[error("Wire {wire} appears more than once in the operation")]
    DuplicateWire { wire: usize },

    /// Invalid state dimension
    #[error("Invalid state dimension {dimension}, expected power of 2")]
    InvalidDimension { dimension: usize },

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Operation name not registered, or not registered for a kernel
    #[error("Unknown operation '{name}'")]
    UnknownOperation { name: String },

    /// A kernel map has no entry for an operation
    #[error("Kernel map has no kernel for operation '{op}'")]
    KernelMapIncomplete { op: String },

    /// Invalid arguments for an operation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Memory allocation error
    #[error("Failed to allocate {size} bytes for state vector")]
    AllocationError { size: usize },

    /// Gate registry error
    #[error(transparent)]
    Gate(#[from] GateError),
}

/// Result type for shard operations
pub type Result<T> = std::result::Result<T, StateError>;
