//! SSE2 single-qubit kernels
//!
//! Each `Complex64` fits one 128-bit register as `[re, im]`, so a complex
//! product `m·a` is `m.re·[a.re, a.im] + m.im·[-a.im, a.re]`. Operations the
//! SSE2 path does not cover fall through to the scalar kernels.

use super::scalar::Scalar;
use super::{KernelBackend, KernelType, WireLayout};
use num_complex::Complex64;
use qshard_gates::{GateOperation, GeneratorOperation};

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

/// Minimum shard size (in qubits) for the SIMD family to be selected
pub const SIMD_MIN_QUBITS: usize = 4;

pub(crate) const IMPLEMENTED_GATES: &[GateOperation] = &[
    GateOperation::Identity,
    GateOperation::PauliX,
    GateOperation::PauliY,
    GateOperation::PauliZ,
    GateOperation::Hadamard,
    GateOperation::S,
    GateOperation::T,
    GateOperation::SX,
    GateOperation::RX,
    GateOperation::RY,
    GateOperation::RZ,
    GateOperation::PhaseShift,
    GateOperation::Rot,
];

pub(crate) const IMPLEMENTED_GENERATORS: &[GeneratorOperation] = &[
    GeneratorOperation::RX,
    GeneratorOperation::RY,
    GeneratorOperation::RZ,
    GeneratorOperation::PhaseShift,
];

/// SSE2 kernels for uncontrolled single-qubit dense matrices
#[derive(Debug, Clone, Copy, Default)]
pub struct Simd;

impl KernelBackend for Simd {
    const KERNEL: KernelType = KernelType::Simd;

    fn apply_dense(state: &mut [Complex64], layout: &WireLayout, matrix: &[Complex64]) {
        if layout.num_targets() == 1 && !layout.has_controls() {
            apply_single_qubit(state, layout.target_bit(0), matrix);
        } else {
            Scalar::apply_dense(state, layout, matrix);
        }
    }

    fn apply_diagonal(state: &mut [Complex64], layout: &WireLayout, diagonal: &[Complex64]) {
        Scalar::apply_diagonal(state, layout, diagonal);
    }

    fn project(state: &mut [Complex64], layout: &WireLayout) {
        Scalar::project(state, layout);
    }
}

/// Single-qubit matrix application, SSE2 where available
pub fn apply_single_qubit(state: &mut [Complex64], bit: usize, matrix: &[Complex64]) {
    #[cfg(target_arch = "x86_64")]
    {
        // SSE2 is part of the x86_64 baseline.
        unsafe { apply_gate_sse2(state, bit, matrix) }
    }

    #[cfg(not(target_arch = "x86_64"))]
    {
        super::scalar::apply_single_qubit(state, bit, matrix)
    }
}

/// Apply a single-qubit gate using SSE2 instructions
///
/// # Safety
/// Requires SSE2 support (available on all x86_64 CPUs)
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn apply_gate_sse2(state: &mut [Complex64], bit: usize, matrix: &[Complex64]) {
    let n = state.len();
    let stride = 1 << bit;

    // [m.re, m.re] and [-m.im, m.im] for each matrix element
    let m00_re = _mm_set1_pd(matrix[0].re);
    let m00_im = _mm_set_pd(matrix[0].im, -matrix[0].im);
    let m01_re = _mm_set1_pd(matrix[1].re);
    let m01_im = _mm_set_pd(matrix[1].im, -matrix[1].im);
    let m10_re = _mm_set1_pd(matrix[2].re);
    let m10_im = _mm_set_pd(matrix[2].im, -matrix[2].im);
    let m11_re = _mm_set1_pd(matrix[3].re);
    let m11_im = _mm_set_pd(matrix[3].im, -matrix[3].im);

    let ptr = state.as_mut_ptr() as *mut f64;
    let mut i = 0;

    while i < n {
        for j in 0..stride {
            let p0 = ptr.add(2 * (i + j));
            let p1 = ptr.add(2 * (i + j + stride));

            let a = _mm_loadu_pd(p0); // [a.re, a.im]
            let b = _mm_loadu_pd(p1);
            let a_swap = _mm_shuffle_pd::<0b01>(a, a); // [a.im, a.re]
            let b_swap = _mm_shuffle_pd::<0b01>(b, b);

            let new_a = _mm_add_pd(
                _mm_add_pd(_mm_mul_pd(m00_re, a), _mm_mul_pd(m00_im, a_swap)),
                _mm_add_pd(_mm_mul_pd(m01_re, b), _mm_mul_pd(m01_im, b_swap)),
            );
            let new_b = _mm_add_pd(
                _mm_add_pd(_mm_mul_pd(m10_re, a), _mm_mul_pd(m10_im, a_swap)),
                _mm_add_pd(_mm_mul_pd(m11_re, b), _mm_mul_pd(m11_im, b_swap)),
            );

            _mm_storeu_pd(p0, new_a);
            _mm_storeu_pd(p1, new_b);
        }
        i += stride * 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::scalar;
    use approx::assert_relative_eq;
    use qshard_gates::matrices;

    #[test]
    fn test_simd_matches_scalar() {
        let n = 5;
        let original: Vec<Complex64> = (0..1usize << n)
            .map(|i| Complex64::new((i as f64).cos(), (i as f64 * 0.5).sin()))
            .collect();
        let rot = matrices::rot(0.3, -1.2, 2.2);

        for bit in 0..n {
            let mut a = original.clone();
            let mut b = original.clone();
            scalar::apply_single_qubit(&mut a, bit, &rot);
            apply_single_qubit(&mut b, bit, &rot);
            for (x, y) in a.iter().zip(&b) {
                assert_relative_eq!(x.re, y.re, epsilon = 1e-12);
                assert_relative_eq!(x.im, y.im, epsilon = 1e-12);
            }
        }
    }
}
