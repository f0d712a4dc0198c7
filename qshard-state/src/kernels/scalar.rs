//! Sequential reference kernels

use super::{KernelBackend, KernelType, WireLayout};
use num_complex::Complex64;
use smallvec::SmallVec;

/// Sequential kernels; implement every operation
#[derive(Debug, Clone, Copy, Default)]
pub struct Scalar;

impl KernelBackend for Scalar {
    const KERNEL: KernelType = KernelType::Scalar;

    fn apply_dense(state: &mut [Complex64], layout: &WireLayout, matrix: &[Complex64]) {
        match layout.num_targets() {
            1 if !layout.has_controls() => {
                apply_single_qubit(state, layout.target_bit(0), matrix)
            }
            1 => apply_single_qubit_controlled(state, layout, matrix),
            2 => apply_two_qubit(state, layout, matrix),
            _ => apply_multi_qubit(state, layout, matrix),
        }
    }

    fn apply_diagonal(state: &mut [Complex64], layout: &WireLayout, diagonal: &[Complex64]) {
        for (index, amp) in state.iter_mut().enumerate() {
            if layout.controls_match(index) {
                *amp *= diagonal[layout.matrix_index(index)];
            }
        }
    }

    fn project(state: &mut [Complex64], layout: &WireLayout) {
        for (index, amp) in state.iter_mut().enumerate() {
            if !layout.controls_match(index) {
                *amp = Complex64::new(0.0, 0.0);
            }
        }
    }
}

/// Apply a 2×2 matrix to the amplitude pairs split by `bit`
#[inline]
pub fn apply_single_qubit(state: &mut [Complex64], bit: usize, matrix: &[Complex64]) {
    let n = state.len();
    let stride = 1 << bit;
    let (m00, m01, m10, m11) = (matrix[0], matrix[1], matrix[2], matrix[3]);
    let mut i = 0;

    while i < n {
        for j in 0..stride {
            let idx0 = i + j;
            let idx1 = idx0 + stride;

            let a = state[idx0];
            let b = state[idx1];

            state[idx0] = m00 * a + m01 * b;
            state[idx1] = m10 * a + m11 * b;
        }
        i += stride * 2;
    }
}

#[inline]
fn apply_single_qubit_controlled(
    state: &mut [Complex64],
    layout: &WireLayout,
    matrix: &[Complex64],
) {
    let stride = 1 << layout.target_bit(0);
    let (m00, m01, m10, m11) = (matrix[0], matrix[1], matrix[2], matrix[3]);

    for g in 0..layout.num_groups() {
        let idx0 = layout.group_base(g);
        let idx1 = idx0 + stride;

        let a = state[idx0];
        let b = state[idx1];

        state[idx0] = m00 * a + m01 * b;
        state[idx1] = m10 * a + m11 * b;
    }
}

#[inline]
fn apply_two_qubit(state: &mut [Complex64], layout: &WireLayout, matrix: &[Complex64]) {
    let offsets = layout.target_offsets();

    for g in 0..layout.num_groups() {
        let base = layout.group_base(g);
        let v = [
            state[base + offsets[0]],
            state[base + offsets[1]],
            state[base + offsets[2]],
            state[base + offsets[3]],
        ];
        for (row, &offset) in offsets.iter().enumerate() {
            let m = &matrix[row * 4..row * 4 + 4];
            state[base + offset] = m[0] * v[0] + m[1] * v[1] + m[2] * v[2] + m[3] * v[3];
        }
    }
}

/// Gather, multiply and scatter for an arbitrary number of targets
fn apply_multi_qubit_group(
    state: &mut [Complex64],
    base: usize,
    offsets: &[usize],
    matrix: &[Complex64],
    scratch: &mut SmallVec<[Complex64; 16]>,
) {
    let dim = offsets.len();
    scratch.clear();
    scratch.extend(offsets.iter().map(|&o| state[base + o]));

    for (row, &offset) in offsets.iter().enumerate() {
        let m = &matrix[row * dim..(row + 1) * dim];
        state[base + offset] = m.iter().zip(scratch.iter()).map(|(a, b)| a * b).sum();
    }
}

#[inline]
fn apply_multi_qubit(state: &mut [Complex64], layout: &WireLayout, matrix: &[Complex64]) {
    let offsets = layout.target_offsets();
    let mut scratch = SmallVec::new();

    for g in 0..layout.num_groups() {
        apply_multi_qubit_group(state, layout.group_base(g), &offsets, matrix, &mut scratch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use qshard_gates::matrices::{HADAMARD, PAULI_X};
    use qshard_gates::{gate_matrix, GateOperation};

    fn basis(n: usize, k: usize) -> Vec<Complex64> {
        let mut v = vec![Complex64::new(0.0, 0.0); 1 << n];
        v[k] = Complex64::new(1.0, 0.0);
        v
    }

    #[test]
    fn test_pauli_x_on_wire_zero_flips_msb() {
        let mut state = basis(3, 0);
        let layout = WireLayout::targets(3, &[0]).unwrap();
        Scalar::apply_dense(&mut state, &layout, &PAULI_X);
        assert_relative_eq!(state[0b100].re, 1.0);
    }

    #[test]
    fn test_hadamard_superposition() {
        let mut state = basis(2, 0);
        let layout = WireLayout::targets(2, &[1]).unwrap();
        Scalar::apply_dense(&mut state, &layout, &HADAMARD);
        let h = std::f64::consts::FRAC_1_SQRT_2;
        assert_relative_eq!(state[0].re, h, epsilon = 1e-12);
        assert_relative_eq!(state[1].re, h, epsilon = 1e-12);
    }

    #[test]
    fn test_cnot_via_two_qubit_and_controlled_paths_agree() {
        let cnot = gate_matrix(GateOperation::CNOT, &[], 2).unwrap().to_dense();
        for k in 0..8 {
            let mut a = basis(3, k);
            let mut b = basis(3, k);
            Scalar::apply_dense(&mut a, &WireLayout::targets(3, &[2, 0]).unwrap(), &cnot);
            let controlled = WireLayout::new(3, &[0], &[2], &[true]).unwrap();
            Scalar::apply_dense(&mut b, &controlled, &PAULI_X);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_multi_qubit_toffoli() {
        let toffoli = gate_matrix(GateOperation::Toffoli, &[], 3).unwrap().to_dense();
        let mut state = basis(4, 0b1101);
        // wires 0, 1, 3: controls on bits 3 and 2, target bit 0
        Scalar::apply_dense(&mut state, &WireLayout::targets(4, &[0, 1, 3]).unwrap(), &toffoli);
        assert_relative_eq!(state[0b1100].re, 1.0);
    }

    #[test]
    fn test_project_zero_control_value() {
        let mut state = vec![Complex64::new(0.5, 0.0); 4];
        Scalar::project(&mut state, &WireLayout::new(2, &[], &[0], &[false]).unwrap());
        assert_relative_eq!(state[0].re, 0.5);
        assert_relative_eq!(state[1].re, 0.5);
        assert_relative_eq!(state[2].re, 0.0);
        assert_relative_eq!(state[3].re, 0.0);
    }
}
