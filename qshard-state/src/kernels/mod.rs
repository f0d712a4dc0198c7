//! Gate application kernels
//!
//! Kernels operate on a raw amplitude slice of `2^num_qubits` entries, with
//! wire 0 the most significant index bit. Each kernel family implements the
//! [`KernelBackend`] primitives (dense matrix, diagonal, projection); the
//! operation-level functions in [`ops`] are written once on top of them.

pub mod ops;
pub mod parallel;
pub mod scalar;
pub mod simd;

use crate::error::{Result, StateError};
use num_complex::Complex64;
use qshard_gates::{
    ControlledGateOperation, ControlledGeneratorOperation, ControlledMatrixOperation,
    GateOperation, GeneratorOperation, MatrixOperation,
};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

pub use parallel::Parallel;
pub use scalar::Scalar;
pub use simd::Simd;

/// Kernel families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KernelType {
    /// Sequential reference kernels
    Scalar,
    /// Rayon kernels over disjoint index groups
    Parallel,
    /// SSE2 single-qubit kernels
    Simd,
}

impl KernelType {
    pub const ALL: &'static [KernelType] =
        &[KernelType::Scalar, KernelType::Parallel, KernelType::Simd];

    pub const fn name(self) -> &'static str {
        match self {
            KernelType::Scalar => "Scalar",
            KernelType::Parallel => "Parallel",
            KernelType::Simd => "Simd",
        }
    }

    /// Gates this kernel family implements
    pub fn implemented_gates(self) -> &'static [GateOperation] {
        match self {
            KernelType::Scalar | KernelType::Parallel => GateOperation::ALL,
            KernelType::Simd => simd::IMPLEMENTED_GATES,
        }
    }

    /// Generators this kernel family implements
    pub fn implemented_generators(self) -> &'static [GeneratorOperation] {
        match self {
            KernelType::Scalar | KernelType::Parallel => GeneratorOperation::ALL,
            KernelType::Simd => simd::IMPLEMENTED_GENERATORS,
        }
    }

    /// Matrix operations this kernel family implements
    pub fn implemented_matrices(self) -> &'static [MatrixOperation] {
        match self {
            KernelType::Scalar | KernelType::Parallel => MatrixOperation::ALL,
            KernelType::Simd => &[MatrixOperation::SingleQubitOp],
        }
    }

    /// Controlled gates this kernel family implements
    pub fn implemented_controlled_gates(self) -> &'static [ControlledGateOperation] {
        match self {
            KernelType::Scalar | KernelType::Parallel => ControlledGateOperation::ALL,
            KernelType::Simd => &[],
        }
    }

    /// Controlled generators this kernel family implements
    pub fn implemented_controlled_generators(self) -> &'static [ControlledGeneratorOperation] {
        match self {
            KernelType::Scalar | KernelType::Parallel => ControlledGeneratorOperation::ALL,
            KernelType::Simd => &[],
        }
    }

    /// Controlled matrix operations this kernel family implements
    pub fn implemented_controlled_matrices(self) -> &'static [ControlledMatrixOperation] {
        match self {
            KernelType::Scalar | KernelType::Parallel => ControlledMatrixOperation::ALL,
            KernelType::Simd => &[],
        }
    }
}

impl fmt::Display for KernelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw pointer that may cross rayon worker boundaries
///
/// Only used where every worker writes a disjoint set of indices.
#[derive(Clone, Copy)]
pub(crate) struct SendPtr<T>(*mut T);
unsafe impl<T> Send for SendPtr<T> {}
unsafe impl<T> Sync for SendPtr<T> {}

impl<T> SendPtr<T> {
    pub(crate) fn new(ptr: *mut T) -> Self {
        Self(ptr)
    }

    // Accessed through a method so closures capture the wrapper, not the field.
    #[inline]
    pub(crate) fn get(self) -> *mut T {
        self.0
    }
}

/// Bit-level description of the wires an operation touches
///
/// Target `j` of `m` maps to bit `m-1-j` of the matrix index; wire `w` of an
/// `n`-qubit shard maps to bit `n-1-w` of the amplitude index.
#[derive(Debug, Clone)]
pub struct WireLayout {
    num_qubits: usize,
    /// Bit positions of the targets, first target first
    target_bits: SmallVec<[usize; 4]>,
    /// Every touched bit position, ascending
    sorted_bits: SmallVec<[usize; 8]>,
    control_mask: usize,
    control_value: usize,
}

impl WireLayout {
    /// Validate wires and build the layout
    pub fn new(
        num_qubits: usize,
        targets: &[usize],
        controls: &[usize],
        values: &[bool],
    ) -> Result<Self> {
        if controls.len() != values.len() {
            return Err(StateError::DimensionMismatch {
                expected: controls.len(),
                actual: values.len(),
            });
        }

        let mut seen = 0usize;
        let mut bit_of = |wire: usize| -> Result<usize> {
            if wire >= num_qubits {
                return Err(StateError::InvalidWire { wire, num_qubits });
            }
            let bit = num_qubits - 1 - wire;
            if seen & (1 << bit) != 0 {
                return Err(StateError::DuplicateWire { wire });
            }
            seen |= 1 << bit;
            Ok(bit)
        };

        let target_bits = targets
            .iter()
            .map(|&w| bit_of(w))
            .collect::<Result<SmallVec<[usize; 4]>>>()?;

        let mut control_mask = 0;
        let mut control_value = 0;
        for (&wire, &value) in controls.iter().zip(values) {
            let bit = bit_of(wire)?;
            control_mask |= 1 << bit;
            if value {
                control_value |= 1 << bit;
            }
        }

        let mut sorted_bits: SmallVec<[usize; 8]> = target_bits.iter().copied().collect();
        sorted_bits.extend((0..num_qubits).filter(|&b| control_mask & (1usize << b) != 0));
        sorted_bits.sort_unstable();

        Ok(Self {
            num_qubits,
            target_bits,
            sorted_bits,
            control_mask,
            control_value,
        })
    }

    /// Layout with targets only
    pub fn targets(num_qubits: usize, targets: &[usize]) -> Result<Self> {
        Self::new(num_qubits, targets, &[], &[])
    }

    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    #[inline]
    pub fn num_targets(&self) -> usize {
        self.target_bits.len()
    }

    #[inline]
    pub fn has_controls(&self) -> bool {
        self.control_mask != 0
    }

    #[inline]
    pub fn target_bit(&self, j: usize) -> usize {
        self.target_bits[j]
    }

    /// Number of independent groups the operation splits the shard into
    #[inline]
    pub fn num_groups(&self) -> usize {
        1 << (self.num_qubits - self.sorted_bits.len())
    }

    /// First amplitude index of group `g` (all target bits zero, controls set)
    #[inline]
    pub fn group_base(&self, mut g: usize) -> usize {
        for &bit in &self.sorted_bits {
            let low = g & ((1 << bit) - 1);
            g = ((g >> bit) << (bit + 1)) | low;
        }
        g | self.control_value
    }

    /// Offsets from a group base for every matrix index
    pub fn target_offsets(&self) -> SmallVec<[usize; 8]> {
        let m = self.target_bits.len();
        (0..1usize << m)
            .map(|k| {
                self.target_bits
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| k & (1 << (m - 1 - j)) != 0)
                    .fold(0, |acc, (_, &bit)| acc | (1 << bit))
            })
            .collect()
    }

    /// Whether an amplitude index satisfies the control condition
    #[inline]
    pub fn controls_match(&self, index: usize) -> bool {
        index & self.control_mask == self.control_value
    }

    /// Matrix index of an amplitude index
    #[inline]
    pub fn matrix_index(&self, index: usize) -> usize {
        let m = self.target_bits.len();
        self.target_bits
            .iter()
            .enumerate()
            .fold(0, |acc, (j, &bit)| acc | (((index >> bit) & 1) << (m - 1 - j)))
    }
}

/// Primitive operations every kernel family provides
pub trait KernelBackend {
    /// Family this backend belongs to
    const KERNEL: KernelType;

    /// Apply a dense row-major `2^m × 2^m` matrix to the layout's targets
    fn apply_dense(state: &mut [Complex64], layout: &WireLayout, matrix: &[Complex64]);

    /// Multiply by a diagonal of length `2^m`
    fn apply_diagonal(state: &mut [Complex64], layout: &WireLayout, diagonal: &[Complex64]);

    /// Zero every amplitude whose control bits do not match
    fn project(state: &mut [Complex64], layout: &WireLayout);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_base_msb_order() {
        // 3 qubits, target wire 0 -> bit 2
        let layout = WireLayout::targets(3, &[0]).unwrap();
        assert_eq!(layout.num_groups(), 4);
        let bases: Vec<usize> = (0..4).map(|g| layout.group_base(g)).collect();
        assert_eq!(bases, vec![0, 1, 2, 3]);
        assert_eq!(layout.target_offsets().as_slice(), &[0, 4]);
    }

    #[test]
    fn test_controls_fixed_in_base() {
        // control wire 0 (bit 2) = 1, target wire 2 (bit 0)
        let layout = WireLayout::new(3, &[2], &[0], &[true]).unwrap();
        let bases: Vec<usize> = (0..layout.num_groups()).map(|g| layout.group_base(g)).collect();
        assert_eq!(bases, vec![0b100, 0b110]);
        assert!(layout.controls_match(0b101));
        assert!(!layout.controls_match(0b001));
    }

    #[test]
    fn test_matrix_index() {
        let layout = WireLayout::targets(3, &[2, 0]).unwrap();
        // first target is wire 2 (bit 0), second is wire 0 (bit 2)
        assert_eq!(layout.matrix_index(0b001), 0b10);
        assert_eq!(layout.matrix_index(0b100), 0b01);
        assert_eq!(layout.target_offsets().as_slice(), &[0, 4, 1, 5]);
    }

    #[test]
    fn test_wire_validation() {
        assert_eq!(
            WireLayout::targets(2, &[2]).unwrap_err(),
            StateError::InvalidWire { wire: 2, num_qubits: 2 }
        );
        assert_eq!(
            WireLayout::new(2, &[1], &[1], &[true]).unwrap_err(),
            StateError::DuplicateWire { wire: 1 }
        );
        assert!(WireLayout::new(2, &[1], &[0], &[]).is_err());
    }
}
