//! Dynamic `(kernel, operation) -> function` table
//!
//! The table is built once per process and never mutated afterwards. Each
//! kernel family registers the operations it implements; looking up a pair
//! that was never registered is an [`StateError::UnknownOperation`].

use crate::error::{Result, StateError};
use crate::kernels::{ops, KernelBackend, KernelType, Parallel, Scalar, Simd};
use ahash::AHashMap;
use num_complex::Complex64;
use qshard_gates::{
    ControlledGateOperation, ControlledGeneratorOperation, ControlledMatrixOperation,
    GateOperation, GeneratorOperation, MatrixOperation,
};
use std::sync::OnceLock;

/// `(state, num_qubits, wires, inverse, params)`
pub type GateFn = Box<dyn Fn(&mut [Complex64], usize, &[usize], bool, &[f64]) -> Result<()> + Send + Sync>;

/// `(state, num_qubits, wires, adjoint) -> scale factor`
pub type GeneratorFn = Box<dyn Fn(&mut [Complex64], usize, &[usize], bool) -> Result<f64> + Send + Sync>;

/// `(state, num_qubits, matrix, wires, inverse)`
pub type MatrixFn =
    Box<dyn Fn(&mut [Complex64], usize, &[Complex64], &[usize], bool) -> Result<()> + Send + Sync>;

/// `(state, num_qubits, controls, values, wires, inverse, params)`
pub type ControlledGateFn = Box<
    dyn Fn(&mut [Complex64], usize, &[usize], &[bool], &[usize], bool, &[f64]) -> Result<()>
        + Send
        + Sync,
>;

/// `(state, num_qubits, controls, values, wires, adjoint) -> scale factor`
pub type ControlledGeneratorFn = Box<
    dyn Fn(&mut [Complex64], usize, &[usize], &[bool], &[usize], bool) -> Result<f64>
        + Send
        + Sync,
>;

/// `(state, num_qubits, matrix, controls, values, wires, inverse)`
pub type ControlledMatrixFn = Box<
    dyn Fn(&mut [Complex64], usize, &[Complex64], &[usize], &[bool], &[usize], bool) -> Result<()>
        + Send
        + Sync,
>;

/// Process-wide dispatch table
#[derive(Default)]
pub struct Dispatcher {
    gates: AHashMap<(KernelType, GateOperation), GateFn>,
    generators: AHashMap<(KernelType, GeneratorOperation), GeneratorFn>,
    matrices: AHashMap<(KernelType, MatrixOperation), MatrixFn>,
    controlled_gates: AHashMap<(KernelType, ControlledGateOperation), ControlledGateFn>,
    controlled_generators: AHashMap<(KernelType, ControlledGeneratorOperation), ControlledGeneratorFn>,
    controlled_matrices: AHashMap<(KernelType, ControlledMatrixOperation), ControlledMatrixFn>,
}

static DISPATCHER: OnceLock<Dispatcher> = OnceLock::new();

// Closures are passed through these so their argument types come from the
// `Fn` bound rather than from inference on `Box::new`.
fn gate_fn<F>(f: F) -> GateFn
where
    F: Fn(&mut [Complex64], usize, &[usize], bool, &[f64]) -> Result<()> + Send + Sync + 'static,
{
    Box::new(f)
}

fn generator_fn<F>(f: F) -> GeneratorFn
where
    F: Fn(&mut [Complex64], usize, &[usize], bool) -> Result<f64> + Send + Sync + 'static,
{
    Box::new(f)
}

fn matrix_fn<F>(f: F) -> MatrixFn
where
    F: Fn(&mut [Complex64], usize, &[Complex64], &[usize], bool) -> Result<()>
        + Send
        + Sync
        + 'static,
{
    Box::new(f)
}

fn controlled_gate_fn<F>(f: F) -> ControlledGateFn
where
    F: Fn(&mut [Complex64], usize, &[usize], &[bool], &[usize], bool, &[f64]) -> Result<()>
        + Send
        + Sync
        + 'static,
{
    Box::new(f)
}

fn controlled_generator_fn<F>(f: F) -> ControlledGeneratorFn
where
    F: Fn(&mut [Complex64], usize, &[usize], &[bool], &[usize], bool) -> Result<f64>
        + Send
        + Sync
        + 'static,
{
    Box::new(f)
}

fn controlled_matrix_fn<F>(f: F) -> ControlledMatrixFn
where
    F: Fn(&mut [Complex64], usize, &[Complex64], &[usize], &[bool], &[usize], bool) -> Result<()>
        + Send
        + Sync
        + 'static,
{
    Box::new(f)
}

fn unknown(kernel: KernelType, name: impl std::fmt::Display) -> StateError {
    StateError::UnknownOperation {
        name: format!("{name} (kernel {kernel})"),
    }
}

impl Dispatcher {
    /// The shared instance, built on first use
    pub fn instance() -> &'static Dispatcher {
        DISPATCHER.get_or_init(|| {
            let mut dispatcher = Dispatcher::default();
            dispatcher.register::<Scalar>();
            dispatcher.register::<Parallel>();
            dispatcher.register::<Simd>();
            tracing::debug!(
                gates = dispatcher.gates.len(),
                generators = dispatcher.generators.len(),
                matrices = dispatcher.matrices.len(),
                "kernel dispatcher initialized"
            );
            dispatcher
        })
    }

    fn register<B: KernelBackend + 'static>(&mut self) {
        let kernel = B::KERNEL;

        for &op in kernel.implemented_gates() {
            self.gates.insert(
                (kernel, op),
                gate_fn(move |state, n, wires, inverse, params| {
                    ops::apply_gate::<B>(state, n, op, wires, inverse, params)
                }),
            );
        }
        for &op in kernel.implemented_generators() {
            self.generators.insert(
                (kernel, op),
                generator_fn(move |state, n, wires, adjoint| {
                    ops::apply_generator::<B>(state, n, op, wires, adjoint)
                }),
            );
        }
        for &op in kernel.implemented_matrices() {
            self.matrices.insert(
                (kernel, op),
                matrix_fn(|state, n, matrix, wires, inverse| {
                    ops::apply_matrix::<B>(state, n, matrix, wires, inverse)
                }),
            );
        }
        for &op in kernel.implemented_controlled_gates() {
            self.controlled_gates.insert(
                (kernel, op),
                controlled_gate_fn(move |state, n, controls, values, wires, inverse, params| {
                    ops::apply_controlled_gate::<B>(
                        state, n, op, controls, values, wires, inverse, params,
                    )
                }),
            );
        }
        for &op in kernel.implemented_controlled_generators() {
            self.controlled_generators.insert(
                (kernel, op),
                controlled_generator_fn(move |state, n, controls, values, wires, adjoint| {
                    ops::apply_controlled_generator::<B>(
                        state, n, op, controls, values, wires, adjoint,
                    )
                }),
            );
        }
        for &op in kernel.implemented_controlled_matrices() {
            self.controlled_matrices.insert(
                (kernel, op),
                controlled_matrix_fn(|state, n, matrix, controls, values, wires, inverse| {
                    ops::apply_controlled_matrix::<B>(
                        state, n, matrix, controls, values, wires, inverse,
                    )
                }),
            );
        }
    }

    /// Whether `(kernel, name)` resolves to a registered gate
    pub fn is_registered(&self, kernel: KernelType, name: &str) -> bool {
        GateOperation::from_name(name)
            .map(|op| self.gates.contains_key(&(kernel, op)))
            .unwrap_or(false)
    }

    /// Apply a gate by name with an explicit kernel
    #[allow(clippy::too_many_arguments)]
    pub fn apply_operation(
        &self,
        kernel: KernelType,
        state: &mut [Complex64],
        num_qubits: usize,
        name: &str,
        wires: &[usize],
        inverse: bool,
        params: &[f64],
    ) -> Result<()> {
        let op = GateOperation::from_name(name).map_err(|_| StateError::UnknownOperation {
            name: name.to_string(),
        })?;
        self.apply_gate(kernel, op, state, num_qubits, wires, inverse, params)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn apply_gate(
        &self,
        kernel: KernelType,
        op: GateOperation,
        state: &mut [Complex64],
        num_qubits: usize,
        wires: &[usize],
        inverse: bool,
        params: &[f64],
    ) -> Result<()> {
        let f = self.gates.get(&(kernel, op)).ok_or_else(|| unknown(kernel, op))?;
        f(state, num_qubits, wires, inverse, params)
    }

    pub fn apply_generator(
        &self,
        kernel: KernelType,
        op: GeneratorOperation,
        state: &mut [Complex64],
        num_qubits: usize,
        wires: &[usize],
        adjoint: bool,
    ) -> Result<f64> {
        let f = self
            .generators
            .get(&(kernel, op))
            .ok_or_else(|| unknown(kernel, format!("Generator{op}")))?;
        f(state, num_qubits, wires, adjoint)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn apply_matrix(
        &self,
        kernel: KernelType,
        op: MatrixOperation,
        state: &mut [Complex64],
        num_qubits: usize,
        matrix: &[Complex64],
        wires: &[usize],
        inverse: bool,
    ) -> Result<()> {
        let f = self.matrices.get(&(kernel, op)).ok_or_else(|| unknown(kernel, op))?;
        f(state, num_qubits, matrix, wires, inverse)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn apply_controlled_gate(
        &self,
        kernel: KernelType,
        op: ControlledGateOperation,
        state: &mut [Complex64],
        num_qubits: usize,
        controls: &[usize],
        values: &[bool],
        wires: &[usize],
        inverse: bool,
        params: &[f64],
    ) -> Result<()> {
        let f = self
            .controlled_gates
            .get(&(kernel, op))
            .ok_or_else(|| unknown(kernel, format!("C({op})")))?;
        f(state, num_qubits, controls, values, wires, inverse, params)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn apply_controlled_generator(
        &self,
        kernel: KernelType,
        op: ControlledGeneratorOperation,
        state: &mut [Complex64],
        num_qubits: usize,
        controls: &[usize],
        values: &[bool],
        wires: &[usize],
        adjoint: bool,
    ) -> Result<f64> {
        let f = self
            .controlled_generators
            .get(&(kernel, op))
            .ok_or_else(|| unknown(kernel, format!("C(Generator{op})")))?;
        f(state, num_qubits, controls, values, wires, adjoint)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn apply_controlled_matrix(
        &self,
        kernel: KernelType,
        op: ControlledMatrixOperation,
        state: &mut [Complex64],
        num_qubits: usize,
        matrix: &[Complex64],
        controls: &[usize],
        values: &[bool],
        wires: &[usize],
        inverse: bool,
    ) -> Result<()> {
        let f = self
            .controlled_matrices
            .get(&(kernel, op))
            .ok_or_else(|| unknown(kernel, op))?;
        f(state, num_qubits, matrix, controls, values, wires, inverse)
    }
}
