//! Operation-level kernels written once over [`KernelBackend`]

use super::{KernelBackend, WireLayout};
use crate::error::{Result, StateError};
use num_complex::Complex64;
use qshard_gates::matrices::{adjoint_dense, PAULI_Z};
use qshard_gates::{
    gate_matrix, generator_spec, ControlledGateOperation, ControlledGeneratorOperation,
    GateMatrix, GateOperation, GeneratorAction, GeneratorOperation, Pauli,
};

fn apply_gate_matrix<B: KernelBackend>(
    state: &mut [Complex64],
    layout: &WireLayout,
    matrix: &GateMatrix,
    inverse: bool,
) {
    let matrix = if inverse {
        matrix.adjoint()
    } else {
        matrix.clone()
    };
    match &matrix {
        GateMatrix::Dense { data, .. } => B::apply_dense(state, layout, data),
        GateMatrix::Diagonal { data, .. } => B::apply_diagonal(state, layout, data),
    }
}

/// Apply a named gate to `wires`
pub fn apply_gate<B: KernelBackend>(
    state: &mut [Complex64],
    num_qubits: usize,
    op: GateOperation,
    wires: &[usize],
    inverse: bool,
    params: &[f64],
) -> Result<()> {
    let matrix = gate_matrix(op, params, wires.len())?;
    let layout = WireLayout::targets(num_qubits, wires)?;
    apply_gate_matrix::<B>(state, &layout, &matrix, inverse);
    Ok(())
}

/// Apply a named gate to `wires`, conditioned on `controls` holding `values`
pub fn apply_controlled_gate<B: KernelBackend>(
    state: &mut [Complex64],
    num_qubits: usize,
    op: ControlledGateOperation,
    controls: &[usize],
    values: &[bool],
    wires: &[usize],
    inverse: bool,
    params: &[f64],
) -> Result<()> {
    let matrix = gate_matrix(op.base(), params, wires.len())?;
    let layout = WireLayout::new(num_qubits, wires, controls, values)?;
    apply_gate_matrix::<B>(state, &layout, &matrix, inverse);
    Ok(())
}

fn check_matrix(matrix: &[Complex64], wires: &[usize]) -> Result<()> {
    if wires.is_empty() {
        return Err(StateError::Validation(
            "matrix operation requires at least one wire".to_string(),
        ));
    }
    let expected = 1usize << (2 * wires.len());
    if matrix.len() != expected {
        return Err(StateError::DimensionMismatch {
            expected,
            actual: matrix.len(),
        });
    }
    Ok(())
}

/// Apply a dense row-major matrix to `wires`
pub fn apply_matrix<B: KernelBackend>(
    state: &mut [Complex64],
    num_qubits: usize,
    matrix: &[Complex64],
    wires: &[usize],
    inverse: bool,
) -> Result<()> {
    apply_controlled_matrix::<B>(state, num_qubits, matrix, &[], &[], wires, inverse)
}

/// Apply a dense row-major matrix to `wires` under control wires
pub fn apply_controlled_matrix<B: KernelBackend>(
    state: &mut [Complex64],
    num_qubits: usize,
    matrix: &[Complex64],
    controls: &[usize],
    values: &[bool],
    wires: &[usize],
    inverse: bool,
) -> Result<()> {
    check_matrix(matrix, wires)?;
    let layout = WireLayout::new(num_qubits, wires, controls, values)?;
    if inverse {
        let adjoint = adjoint_dense(matrix, 1 << wires.len());
        B::apply_dense(state, &layout, &adjoint);
    } else {
        B::apply_dense(state, &layout, matrix);
    }
    Ok(())
}

fn apply_pauli<B: KernelBackend>(
    state: &mut [Complex64],
    num_qubits: usize,
    pauli: Pauli,
    wire: usize,
) -> Result<()> {
    let layout = WireLayout::targets(num_qubits, &[wire])?;
    match pauli {
        Pauli::Z => B::apply_diagonal(state, &layout, &[PAULI_Z[0], PAULI_Z[3]]),
        Pauli::X | Pauli::Y => B::apply_dense(state, &layout, &pauli.matrix()),
    }
    Ok(())
}

/// Apply the generator of `op` and return its scale factor
///
/// Generators are Hermitian, so `adjoint` does not change the result.
pub fn apply_generator<B: KernelBackend>(
    state: &mut [Complex64],
    num_qubits: usize,
    op: GeneratorOperation,
    wires: &[usize],
    _adjoint: bool,
) -> Result<f64> {
    let spec = generator_spec(op, wires.len())?;
    // Validate all wires up front so a failure leaves the state untouched.
    WireLayout::targets(num_qubits, wires)?;

    let (controls, targets) = wires.split_at(spec.controls);
    if !controls.is_empty() {
        let ones = vec![true; controls.len()];
        B::project(state, &WireLayout::new(num_qubits, &[], controls, &ones)?);
    }

    match &spec.action {
        GeneratorAction::Paulis(paulis) => {
            for (&pauli, &wire) in paulis.iter().zip(targets) {
                apply_pauli::<B>(state, num_qubits, pauli, wire)?;
            }
        }
        GeneratorAction::ProjectOne => {
            let layout = WireLayout::targets(num_qubits, targets)?;
            let projector = [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)];
            B::apply_diagonal(state, &layout, &projector);
        }
    }

    Ok(spec.coefficient)
}

/// Apply a generator restricted to the subspace where `controls` hold `values`
pub fn apply_controlled_generator<B: KernelBackend>(
    state: &mut [Complex64],
    num_qubits: usize,
    op: ControlledGeneratorOperation,
    controls: &[usize],
    values: &[bool],
    wires: &[usize],
    adjoint: bool,
) -> Result<f64> {
    let layout = WireLayout::new(num_qubits, wires, controls, values)?;
    B::project(state, &layout);
    apply_generator::<B>(state, num_qubits, op.base(), wires, adjoint)
}
