//! Per-configuration mapping from operation kind to kernel family

use crate::config::{MemoryModel, Threading};
use crate::error::{Result, StateError};
use crate::kernels::simd::SIMD_MIN_QUBITS;
use crate::kernels::KernelType;
use ahash::AHashMap;
use qshard_gates::{
    ControlledGateOperation, ControlledGeneratorOperation, ControlledMatrixOperation,
    GateOperation, GeneratorOperation, MatrixOperation,
};
use smallvec::SmallVec;
use std::hash::Hash;

/// Kernel families in preference order for a configuration
///
/// `Scalar` is always last and implements everything.
pub fn kernel_priority(
    num_qubits: usize,
    threading: Threading,
    memory_model: MemoryModel,
    parallel_threshold: usize,
) -> SmallVec<[KernelType; 3]> {
    let mut priority = SmallVec::new();
    if threading == Threading::MultiThread && num_qubits >= parallel_threshold {
        priority.push(KernelType::Parallel);
    }
    if cfg!(target_arch = "x86_64")
        && memory_model >= MemoryModel::Aligned256
        && num_qubits >= SIMD_MIN_QUBITS
    {
        priority.push(KernelType::Simd);
    }
    priority.push(KernelType::Scalar);
    priority
}

fn build_table<Op: Copy + Eq + Hash>(
    ops: &[Op],
    priority: &[KernelType],
    implemented: fn(KernelType) -> &'static [Op],
) -> AHashMap<Op, KernelType> {
    ops.iter()
        .filter_map(|&op| {
            priority
                .iter()
                .find(|&&kernel| implemented(kernel).contains(&op))
                .map(|&kernel| (op, kernel))
        })
        .collect()
}

fn lookup<Op: Eq + Hash + std::fmt::Display>(
    table: &AHashMap<Op, KernelType>,
    op: Op,
) -> Result<KernelType> {
    table
        .get(&op)
        .copied()
        .ok_or_else(|| StateError::KernelMapIncomplete { op: op.to_string() })
}

/// Immutable operation-to-kernel mapping
///
/// Built once per state vector and queried on every apply call.
#[derive(Debug, Clone)]
pub struct KernelMap {
    threading: Threading,
    memory_model: MemoryModel,
    gates: AHashMap<GateOperation, KernelType>,
    generators: AHashMap<GeneratorOperation, KernelType>,
    matrices: AHashMap<MatrixOperation, KernelType>,
    controlled_gates: AHashMap<ControlledGateOperation, KernelType>,
    controlled_generators: AHashMap<ControlledGeneratorOperation, KernelType>,
    controlled_matrices: AHashMap<ControlledMatrixOperation, KernelType>,
}

impl KernelMap {
    /// Build the map for a shard configuration
    pub fn new(
        num_qubits: usize,
        threading: Threading,
        memory_model: MemoryModel,
        parallel_threshold: usize,
    ) -> Self {
        let priority = kernel_priority(num_qubits, threading, memory_model, parallel_threshold);
        tracing::debug!(
            num_qubits,
            ?threading,
            ?memory_model,
            ?priority,
            "building kernel map"
        );

        Self {
            threading,
            memory_model,
            gates: build_table(GateOperation::ALL, &priority, KernelType::implemented_gates),
            generators: build_table(
                GeneratorOperation::ALL,
                &priority,
                KernelType::implemented_generators,
            ),
            matrices: build_table(MatrixOperation::ALL, &priority, KernelType::implemented_matrices),
            controlled_gates: build_table(
                ControlledGateOperation::ALL,
                &priority,
                KernelType::implemented_controlled_gates,
            ),
            controlled_generators: build_table(
                ControlledGeneratorOperation::ALL,
                &priority,
                KernelType::implemented_controlled_generators,
            ),
            controlled_matrices: build_table(
                ControlledMatrixOperation::ALL,
                &priority,
                KernelType::implemented_controlled_matrices,
            ),
        }
    }

    pub fn threading(&self) -> Threading {
        self.threading
    }

    pub fn memory_model(&self) -> MemoryModel {
        self.memory_model
    }

    pub fn gate_kernel(&self, op: GateOperation) -> Result<KernelType> {
        lookup(&self.gates, op)
    }

    pub fn generator_kernel(&self, op: GeneratorOperation) -> Result<KernelType> {
        lookup(&self.generators, op)
    }

    pub fn matrix_kernel(&self, op: MatrixOperation) -> Result<KernelType> {
        lookup(&self.matrices, op)
    }

    pub fn controlled_gate_kernel(&self, op: ControlledGateOperation) -> Result<KernelType> {
        lookup(&self.controlled_gates, op)
    }

    pub fn controlled_generator_kernel(
        &self,
        op: ControlledGeneratorOperation,
    ) -> Result<KernelType> {
        lookup(&self.controlled_generators, op)
    }

    pub fn controlled_matrix_kernel(&self, op: ControlledMatrixOperation) -> Result<KernelType> {
        lookup(&self.controlled_matrices, op)
    }

    /// Check that every operation kind has a kernel
    pub fn is_complete(&self) -> bool {
        self.gates.len() == GateOperation::ALL.len()
            && self.generators.len() == GeneratorOperation::ALL.len()
            && self.matrices.len() == MatrixOperation::ALL.len()
            && self.controlled_gates.len() == ControlledGateOperation::ALL.len()
            && self.controlled_generators.len() == ControlledGeneratorOperation::ALL.len()
            && self.controlled_matrices.len() == ControlledMatrixOperation::ALL.len()
    }
}
