//! Gate definitions for the qshard simulator
//!
//! This crate holds everything about operations that does not depend on a
//! state vector: the fixed gate registry, the operation kinds used as
//! dispatch keys, gate matrices and generator descriptions.
//!
//! # Conventions
//!
//! - Wire 0 is the most significant bit of a basis-state index.
//! - Matrices are flattened row-major; the first wire of a gate is the most
//!   significant bit of the row index.
//!
//! # Example
//!
//! ```
//! use qshard_gates::{gate_matrix, GateOperation, GateRegistry};
//! use std::f64::consts::PI;
//!
//! let info = GateRegistry::lookup("RX").unwrap();
//! assert_eq!(info.num_params, 1);
//!
//! let rx = gate_matrix(GateOperation::RX, &[PI], 1).unwrap();
//! assert_eq!(rx.dimension(), 2);
//! ```

pub mod error;
pub mod generators;
pub mod matrices;
pub mod operations;
pub mod registry;

pub use error::{GateError, Result};
pub use generators::{generator_spec, GeneratorAction, GeneratorSpec, Pauli};
pub use matrices::{gate_matrix, GateMatrix};
pub use operations::{
    ControlledGateOperation, ControlledGeneratorOperation, ControlledMatrixOperation,
    GateOperation, GeneratorOperation, MatrixOperation,
};
pub use registry::{GateInfo, GateRegistry};
