//! Rayon kernels
//!
//! Every kernel splits the shard into groups of amplitudes that only mix with
//! each other, so workers write disjoint index sets.

use super::{KernelBackend, KernelType, SendPtr, WireLayout};
use num_complex::Complex64;
use rayon::prelude::*;
use smallvec::SmallVec;

/// Multi-threaded kernels; implement every operation
#[derive(Debug, Clone, Copy, Default)]
pub struct Parallel;

impl KernelBackend for Parallel {
    const KERNEL: KernelType = KernelType::Parallel;

    fn apply_dense(state: &mut [Complex64], layout: &WireLayout, matrix: &[Complex64]) {
        if layout.num_targets() == 1 && !layout.has_controls() {
            apply_single_qubit(state, layout.target_bit(0), matrix);
        } else {
            apply_grouped(state, layout, matrix);
        }
    }

    fn apply_diagonal(state: &mut [Complex64], layout: &WireLayout, diagonal: &[Complex64]) {
        state.par_iter_mut().enumerate().for_each(|(index, amp)| {
            if layout.controls_match(index) {
                *amp *= diagonal[layout.matrix_index(index)];
            }
        });
    }

    fn project(state: &mut [Complex64], layout: &WireLayout) {
        state.par_iter_mut().enumerate().for_each(|(index, amp)| {
            if !layout.controls_match(index) {
                *amp = Complex64::new(0.0, 0.0);
            }
        });
    }
}

/// Apply a 2×2 matrix across chunks of `2·stride` amplitudes
#[inline]
fn apply_single_qubit(state: &mut [Complex64], bit: usize, matrix: &[Complex64]) {
    let stride = 1 << bit;
    let (m00, m01, m10, m11) = (matrix[0], matrix[1], matrix[2], matrix[3]);

    state.par_chunks_mut(stride * 2).for_each(|chunk| {
        for j in 0..stride.min(chunk.len() - stride) {
            let a = chunk[j];
            let b = chunk[j + stride];

            chunk[j] = m00 * a + m01 * b;
            chunk[j + stride] = m10 * a + m11 * b;
        }
    });
}

fn apply_grouped(state: &mut [Complex64], layout: &WireLayout, matrix: &[Complex64]) {
    let offsets = layout.target_offsets();
    let dim = offsets.len();
    let ptr = SendPtr::new(state.as_mut_ptr());

    (0..layout.num_groups()).into_par_iter().for_each_init(
        SmallVec::<[Complex64; 16]>::new,
        |scratch, g| {
            let base = layout.group_base(g);
            let p = ptr.get();
            // Groups are disjoint, so each worker owns the indices it touches.
            scratch.clear();
            scratch.extend(offsets.iter().map(|&o| unsafe { *p.add(base + o) }));
            for (row, &offset) in offsets.iter().enumerate() {
                let m = &matrix[row * dim..(row + 1) * dim];
                let value: Complex64 = m.iter().zip(scratch.iter()).map(|(a, b)| a * b).sum();
                unsafe { *p.add(base + offset) = value };
            }
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::Scalar;
    use approx::assert_relative_eq;
    use qshard_gates::{gate_matrix, GateOperation};

    fn random_state(n: usize) -> Vec<Complex64> {
        (0..1usize << n)
            .map(|i| Complex64::new((i as f64 * 0.37).sin(), (i as f64 * 0.11).cos()))
            .collect()
    }

    fn assert_close(a: &[Complex64], b: &[Complex64]) {
        for (x, y) in a.iter().zip(b) {
            assert_relative_eq!(x.re, y.re, epsilon = 1e-12);
            assert_relative_eq!(x.im, y.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_matches_scalar_for_every_shape() {
        let n = 6;
        let cases: Vec<(GateOperation, Vec<usize>, Vec<usize>, Vec<bool>)> = vec![
            (GateOperation::Hadamard, vec![3], vec![], vec![]),
            (GateOperation::RY, vec![0], vec![5, 2], vec![true, false]),
            (GateOperation::IsingXX, vec![4, 1], vec![], vec![]),
            (GateOperation::CSWAP, vec![5, 0, 2], vec![3], vec![true]),
        ];

        for (op, targets, controls, values) in cases {
            let params = vec![0.42; qshard_gates::GateRegistry::info(op).num_params];
            let m = gate_matrix(op, &params, targets.len()).unwrap().to_dense();
            let layout = WireLayout::new(n, &targets, &controls, &values).unwrap();

            let mut a = random_state(n);
            let mut b = a.clone();
            Scalar::apply_dense(&mut a, &layout, &m);
            Parallel::apply_dense(&mut b, &layout, &m);
            assert_close(&a, &b);
        }
    }

    #[test]
    fn test_diagonal_matches_scalar() {
        let n = 5;
        let d = qshard_gates::matrices::multi_rz_diagonal(0.9, 3);
        let layout = WireLayout::new(n, &[0, 2, 4], &[1], &[true]).unwrap();
        let mut a = random_state(n);
        let mut b = a.clone();
        Scalar::apply_diagonal(&mut a, &layout, &d);
        Parallel::apply_diagonal(&mut b, &layout, &d);
        assert_close(&a, &b);
    }
}
