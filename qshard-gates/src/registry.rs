//! Fixed registry of gate arities
//!
//! The registry answers, for every gate name, which canonical operation it
//! denotes and how many wires and parameters it requires. It is a static
//! table: nothing is registered at runtime.
//!
//! # Example
//!
//! ```rust
//! use qshard_gates::registry::GateRegistry;
//! use qshard_gates::GateOperation;
//!
//! let info = GateRegistry::lookup("CRX").unwrap();
//! assert_eq!(info.op, GateOperation::CRX);
//! assert_eq!(info.num_wires, Some(2));
//! assert_eq!(info.num_params, 1);
//! ```

use crate::error::{GateError, Result};
use crate::operations::GateOperation;

/// Arity information for one gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateInfo {
    /// Canonical operation id
    pub op: GateOperation,
    /// Required number of wires, `None` for variable-arity gates
    pub num_wires: Option<usize>,
    /// Required number of parameters
    pub num_params: usize,
}

impl GateInfo {
    const fn new(op: GateOperation, num_wires: Option<usize>, num_params: usize) -> Self {
        Self {
            op,
            num_wires,
            num_params,
        }
    }

    /// Canonical name of the gate
    pub fn name(&self) -> &'static str {
        self.op.name()
    }

    /// Check a wire count and parameter count against this gate's arity
    pub fn validate(&self, num_wires: usize, num_params: usize) -> Result<()> {
        match self.num_wires {
            Some(expected) if expected != num_wires => {
                return Err(GateError::WrongWireCount {
                    gate: self.name(),
                    expected,
                    actual: num_wires,
                });
            }
            None if num_wires == 0 => {
                return Err(GateError::WrongWireCount {
                    gate: self.name(),
                    expected: 1,
                    actual: 0,
                });
            }
            _ => {}
        }

        if self.num_params != num_params {
            return Err(GateError::WrongParameterCount {
                gate: self.name(),
                expected: self.num_params,
                actual: num_params,
            });
        }

        Ok(())
    }
}

const GATE_TABLE: &[GateInfo] = &[
    GateInfo::new(GateOperation::Identity, Some(1), 0),
    GateInfo::new(GateOperation::PauliX, Some(1), 0),
    GateInfo::new(GateOperation::PauliY, Some(1), 0),
    GateInfo::new(GateOperation::PauliZ, Some(1), 0),
    GateInfo::new(GateOperation::Hadamard, Some(1), 0),
    GateInfo::new(GateOperation::S, Some(1), 0),
    GateInfo::new(GateOperation::T, Some(1), 0),
    GateInfo::new(GateOperation::SX, Some(1), 0),
    GateInfo::new(GateOperation::RX, Some(1), 1),
    GateInfo::new(GateOperation::RY, Some(1), 1),
    GateInfo::new(GateOperation::RZ, Some(1), 1),
    GateInfo::new(GateOperation::PhaseShift, Some(1), 1),
    GateInfo::new(GateOperation::Rot, Some(1), 3),
    GateInfo::new(GateOperation::CNOT, Some(2), 0),
    GateInfo::new(GateOperation::CY, Some(2), 0),
    GateInfo::new(GateOperation::CZ, Some(2), 0),
    GateInfo::new(GateOperation::SWAP, Some(2), 0),
    GateInfo::new(GateOperation::ControlledPhaseShift, Some(2), 1),
    GateInfo::new(GateOperation::CRX, Some(2), 1),
    GateInfo::new(GateOperation::CRY, Some(2), 1),
    GateInfo::new(GateOperation::CRZ, Some(2), 1),
    GateInfo::new(GateOperation::CRot, Some(2), 3),
    GateInfo::new(GateOperation::IsingXX, Some(2), 1),
    GateInfo::new(GateOperation::IsingYY, Some(2), 1),
    GateInfo::new(GateOperation::IsingZZ, Some(2), 1),
    GateInfo::new(GateOperation::Toffoli, Some(3), 0),
    GateInfo::new(GateOperation::CSWAP, Some(3), 0),
    GateInfo::new(GateOperation::MultiRZ, None, 1),
];

/// Read-only view over the gate table
#[derive(Debug, Clone, Copy, Default)]
pub struct GateRegistry;

impl GateRegistry {
    /// Look up a gate by name
    pub fn lookup(name: &str) -> Result<GateInfo> {
        let op = GateOperation::from_name(name)?;
        Ok(Self::info(op))
    }

    /// Arity information for an operation
    pub fn info(op: GateOperation) -> GateInfo {
        // The table lists every variant in declaration order.
        GATE_TABLE[op as usize]
    }

    /// Check whether a gate with this name is registered
    pub fn contains(name: &str) -> bool {
        GateOperation::from_name(name).is_ok()
    }

    /// All registered gate names
    pub fn gate_names() -> impl Iterator<Item = &'static str> {
        GATE_TABLE.iter().map(|info| info.name())
    }

    /// Number of registered gates
    pub fn len() -> usize {
        GATE_TABLE.len()
    }

    /// Gates acting on exactly `num_wires` wires
    pub fn gates_for_wires(num_wires: usize) -> Vec<GateOperation> {
        GATE_TABLE
            .iter()
            .filter(|info| info.num_wires == Some(num_wires))
            .map(|info| info.op)
            .collect()
    }
}
