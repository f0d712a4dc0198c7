//! Generators of parametric gates
//!
//! A parametric gate `U(θ) = exp(i·c·θ·G)` is described by its generator `G`
//! and scale factor `c`. Every generator supported here is a Pauli string or
//! the projector `|1⟩⟨1|`, optionally restricted to the subspace where some
//! leading control wires are `|1⟩`.

use crate::error::Result;
use crate::operations::GeneratorOperation;
use crate::registry::GateRegistry;
use num_complex::Complex64;
use smallvec::SmallVec;

/// Single-qubit Pauli operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pauli {
    X,
    Y,
    Z,
}

impl Pauli {
    /// Row-major matrix of the Pauli
    pub fn matrix(self) -> [Complex64; 4] {
        match self {
            Pauli::X => crate::matrices::PAULI_X,
            Pauli::Y => crate::matrices::PAULI_Y,
            Pauli::Z => crate::matrices::PAULI_Z,
        }
    }
}

/// What the generator does on its target wires
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorAction {
    /// Tensor product of Paulis, one per target wire
    Paulis(SmallVec<[Pauli; 4]>),
    /// Projector onto `|1⟩` of the single target wire
    ProjectOne,
}

/// Structure of a gate generator
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSpec {
    /// Scale factor returned alongside the applied generator
    pub coefficient: f64,
    /// Number of leading wires that must be `|1⟩` (projected, not flipped)
    pub controls: usize,
    /// Action on the remaining wires
    pub action: GeneratorAction,
}

fn paulis(p: Pauli, count: usize) -> GeneratorAction {
    GeneratorAction::Paulis(std::iter::repeat(p).take(count).collect())
}

/// Describe the generator of `op` acting on `num_wires` wires
pub fn generator_spec(op: GeneratorOperation, num_wires: usize) -> Result<GeneratorSpec> {
    GateRegistry::info(op.gate()).validate(num_wires, GateRegistry::info(op.gate()).num_params)?;

    let (coefficient, controls, action) = match op {
        GeneratorOperation::RX => (-0.5, 0, paulis(Pauli::X, 1)),
        GeneratorOperation::RY => (-0.5, 0, paulis(Pauli::Y, 1)),
        GeneratorOperation::RZ => (-0.5, 0, paulis(Pauli::Z, 1)),
        GeneratorOperation::PhaseShift => (1.0, 0, GeneratorAction::ProjectOne),
        GeneratorOperation::CRX => (-0.5, 1, paulis(Pauli::X, 1)),
        GeneratorOperation::CRY => (-0.5, 1, paulis(Pauli::Y, 1)),
        GeneratorOperation::CRZ => (-0.5, 1, paulis(Pauli::Z, 1)),
        GeneratorOperation::ControlledPhaseShift => (1.0, 1, GeneratorAction::ProjectOne),
        GeneratorOperation::IsingXX => (-0.5, 0, paulis(Pauli::X, 2)),
        GeneratorOperation::IsingYY => (-0.5, 0, paulis(Pauli::Y, 2)),
        GeneratorOperation::IsingZZ => (-0.5, 0, paulis(Pauli::Z, 2)),
        GeneratorOperation::MultiRZ => (-0.5, 0, paulis(Pauli::Z, num_wires)),
    };

    Ok(GeneratorSpec {
        coefficient,
        controls,
        action,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_generators() {
        let spec = generator_spec(GeneratorOperation::RY, 1).unwrap();
        assert_eq!(spec.coefficient, -0.5);
        assert_eq!(spec.controls, 0);
        assert_eq!(spec.action, GeneratorAction::Paulis(SmallVec::from_slice(&[Pauli::Y])));
    }

    #[test]
    fn test_phase_shift_generators() {
        let spec = generator_spec(GeneratorOperation::ControlledPhaseShift, 2).unwrap();
        assert_eq!(spec.coefficient, 1.0);
        assert_eq!(spec.controls, 1);
        assert_eq!(spec.action, GeneratorAction::ProjectOne);
    }

    #[test]
    fn test_multi_rz_width() {
        let spec = generator_spec(GeneratorOperation::MultiRZ, 4).unwrap();
        match spec.action {
            GeneratorAction::Paulis(p) => assert_eq!(p.len(), 4),
            GeneratorAction::ProjectOne => panic!("expected Pauli string"),
        }
    }

    #[test]
    fn test_wire_count_checked() {
        assert!(generator_spec(GeneratorOperation::CRX, 1).is_err());
        assert!(generator_spec(GeneratorOperation::IsingXX, 3).is_err());
    }
}
