//! Error types for gate lookup and matrix construction

use thiserror::Error;

/// Errors raised by the gate registry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GateError {
    /// The name does not correspond to any registered operation
    #[error("Unknown operation '{name}'")]
    UnknownGate { name: String },

    /// Wrong number of parameters for a gate
    #[error("{gate} expects {expected} parameter(s), got {actual}")]
    WrongParameterCount {
        gate: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Wrong number of wires for a gate
    #[error("{gate} acts on {expected} wire(s), got {actual}")]
    WrongWireCount {
        gate: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Result type for gate operations
pub type Result<T> = std::result::Result<T, GateError>;
