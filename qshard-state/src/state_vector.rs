//! Local amplitude shard and its operation engine

use crate::buffer::AlignedBuffer;
use crate::config::{KernelConfig, MemoryModel};
use crate::dispatch::{Dispatcher, KernelMap};
use crate::error::{Result, StateError};
use crate::kernels::KernelType;
use num_complex::Complex64;
use qshard_gates::{
    ControlledGateOperation, ControlledGeneratorOperation, ControlledMatrixOperation,
    GateOperation, GateRegistry, GeneratorOperation, MatrixOperation,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Largest shard a single rank may hold
pub const MAX_LOCAL_QUBITS: usize = 30;

/// Norms at or below this are left alone by [`StateVector::normalize`]
pub const NORMALIZE_EPSILON: f64 = 100.0 * f64::EPSILON;

/// Outcome of a single-wire measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sample {
    Zero,
    One,
    /// The draw disagreed with the requested postselection
    Rejected,
}

impl Sample {
    pub fn from_bit(bit: bool) -> Self {
        if bit {
            Sample::One
        } else {
            Sample::Zero
        }
    }

    /// `0`, `1`, or `-1` for a rejected postselection
    pub fn value(self) -> i32 {
        match self {
            Sample::Zero => 0,
            Sample::One => 1,
            Sample::Rejected => -1,
        }
    }

    pub fn is_rejected(self) -> bool {
        self == Sample::Rejected
    }
}

/// Check a postselection value and turn it into a branch bit
pub fn postselect_bit(postselect: Option<u8>) -> Result<Option<bool>> {
    match postselect {
        None => Ok(None),
        Some(0) => Ok(Some(false)),
        Some(1) => Ok(Some(true)),
        Some(other) => Err(StateError::Validation(format!(
            "postselect value must be 0 or 1, got {other}"
        ))),
    }
}

/// One shard of amplitudes with its kernel map
///
/// Wire 0 is the most significant bit of an amplitude index.
///
/// # Example
///
/// ```
/// use qshard_state::StateVector;
///
/// let mut state = StateVector::new(2).unwrap();
/// state.apply_operation("Hadamard", &[0], false, &[]).unwrap();
/// state.apply_operation("CNOT", &[0, 1], false, &[]).unwrap();
/// let [p0, p1] = state.probs(1).unwrap();
/// assert!((p0 - 0.5).abs() < 1e-12 && (p1 - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct StateVector {
    num_qubits: usize,
    data: AlignedBuffer,
    kernel_map: KernelMap,
    config: KernelConfig,
    rng: StdRng,
}

impl StateVector {
    /// Create a shard in `|0…0⟩` with the default kernel configuration
    pub fn new(num_qubits: usize) -> Result<Self> {
        Self::with_config(num_qubits, KernelConfig::default())
    }

    /// Create a shard in `|0…0⟩`
    pub fn with_config(num_qubits: usize, config: KernelConfig) -> Result<Self> {
        let mut state = Self::zeroed(num_qubits, config)?;
        state.data[0] = Complex64::new(1.0, 0.0);
        Ok(state)
    }

    /// Create a shard with every amplitude zero
    pub fn zeroed(num_qubits: usize, config: KernelConfig) -> Result<Self> {
        if num_qubits > MAX_LOCAL_QUBITS {
            return Err(StateError::Validation(format!(
                "{num_qubits} qubits exceeds the {MAX_LOCAL_QUBITS}-qubit shard limit"
            )));
        }

        let data = AlignedBuffer::zeroed(1 << num_qubits)?;
        let memory_model = config
            .memory_model
            .unwrap_or_else(|| MemoryModel::detect(data.as_ptr()));
        let kernel_map = KernelMap::new(
            num_qubits,
            config.threading,
            memory_model,
            config.parallel_threshold,
        );

        Ok(Self {
            num_qubits,
            data,
            kernel_map,
            config,
            rng: StdRng::from_entropy(),
        })
    }

    /// Create a shard holding a copy of `amplitudes`
    pub fn from_amplitudes(num_qubits: usize, amplitudes: &[Complex64]) -> Result<Self> {
        let mut state = Self::zeroed(num_qubits, KernelConfig::default())?;
        state.update_data(amplitudes)?;
        Ok(state)
    }

    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of amplitudes (`2^num_qubits`)
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn data(&self) -> &[Complex64] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [Complex64] {
        &mut self.data
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Kernel selection for this shard
    pub fn kernel_map(&self) -> &KernelMap {
        &self.kernel_map
    }

    /// Overwrite every amplitude
    pub fn update_data(&mut self, amplitudes: &[Complex64]) -> Result<()> {
        if amplitudes.len() != self.data.len() {
            return Err(StateError::DimensionMismatch {
                expected: self.data.len(),
                actual: amplitudes.len(),
            });
        }
        self.data.copy_from_slice(amplitudes);
        Ok(())
    }

    /// Zero every amplitude
    pub fn set_zero(&mut self) {
        self.data.fill_zero();
    }

    /// Set the shard to the computational basis state `index`
    pub fn set_basis_state(&mut self, index: usize) -> Result<()> {
        if index >= self.data.len() {
            return Err(StateError::DimensionMismatch {
                expected: self.data.len(),
                actual: index,
            });
        }
        self.data.fill_zero();
        self.data[index] = Complex64::new(1.0, 0.0);
        Ok(())
    }

    /// Return to `|0…0⟩`
    pub fn reset_state(&mut self) {
        self.data.fill_zero();
        self.data[0] = Complex64::new(1.0, 0.0);
    }

    /// Reseed the measurement RNG
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Uniform draw in `[0, 1)` from the measurement RNG
    pub fn draw_uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Mutable access to the measurement RNG
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    // ---------------------------------------------------------------------
    // Gates
    // ---------------------------------------------------------------------

    /// Apply a registered gate by name
    pub fn apply_operation(
        &mut self,
        name: &str,
        wires: &[usize],
        inverse: bool,
        params: &[f64],
    ) -> Result<()> {
        let op = GateOperation::from_name(name).map_err(|_| StateError::UnknownOperation {
            name: name.to_string(),
        })?;
        let kernel = self.kernel_map.gate_kernel(op)?;
        Dispatcher::instance().apply_gate(
            kernel,
            op,
            &mut self.data,
            self.num_qubits,
            wires,
            inverse,
            params,
        )
    }

    /// Apply a gate by name, falling back to `matrix` for unregistered names
    pub fn apply_operation_with_matrix(
        &mut self,
        name: &str,
        wires: &[usize],
        inverse: bool,
        params: &[f64],
        matrix: &[Complex64],
    ) -> Result<()> {
        if GateRegistry::contains(name) {
            self.apply_operation(name, wires, inverse, params)
        } else if !matrix.is_empty() {
            self.apply_matrix(matrix, wires, inverse)
        } else {
            Err(StateError::UnknownOperation {
                name: name.to_string(),
            })
        }
    }

    /// Apply a gate through an explicitly chosen kernel
    pub fn apply_operation_with_kernel(
        &mut self,
        kernel: KernelType,
        name: &str,
        wires: &[usize],
        inverse: bool,
        params: &[f64],
    ) -> Result<()> {
        Dispatcher::instance().apply_operation(
            kernel,
            &mut self.data,
            self.num_qubits,
            name,
            wires,
            inverse,
            params,
        )
    }

    /// Apply a sequence of gates; every list must have the same length
    pub fn apply_operations(
        &mut self,
        names: &[&str],
        wires: &[Vec<usize>],
        inverses: &[bool],
        params: &[Vec<f64>],
    ) -> Result<()> {
        for len in [wires.len(), inverses.len(), params.len()] {
            if len != names.len() {
                return Err(StateError::DimensionMismatch {
                    expected: names.len(),
                    actual: len,
                });
            }
        }
        for (((name, w), &inv), p) in names.iter().zip(wires).zip(inverses).zip(params) {
            self.apply_operation(name, w, inv, p)?;
        }
        Ok(())
    }

    /// Apply a gate to `wires` when `controls` hold `values`
    pub fn apply_controlled_operation(
        &mut self,
        name: &str,
        controls: &[usize],
        values: &[bool],
        wires: &[usize],
        inverse: bool,
        params: &[f64],
    ) -> Result<()> {
        let op = ControlledGateOperation::from_name(name).map_err(|_| {
            StateError::UnknownOperation {
                name: name.to_string(),
            }
        })?;
        let kernel = self.kernel_map.controlled_gate_kernel(op)?;
        Dispatcher::instance().apply_controlled_gate(
            kernel,
            op,
            &mut self.data,
            self.num_qubits,
            controls,
            values,
            wires,
            inverse,
            params,
        )
    }

    // ---------------------------------------------------------------------
    // Matrices
    // ---------------------------------------------------------------------

    /// Apply a dense row-major matrix of size `4^#wires`
    pub fn apply_matrix(&mut self, matrix: &[Complex64], wires: &[usize], inverse: bool) -> Result<()> {
        if wires.is_empty() {
            return Err(StateError::Validation(
                "matrix operation requires at least one wire".to_string(),
            ));
        }
        let op = MatrixOperation::for_wires(wires.len());
        let kernel = self.kernel_map.matrix_kernel(op)?;
        Dispatcher::instance().apply_matrix(
            kernel,
            op,
            &mut self.data,
            self.num_qubits,
            matrix,
            wires,
            inverse,
        )
    }

    /// Apply a dense matrix to `wires` when `controls` hold `values`
    pub fn apply_controlled_matrix(
        &mut self,
        matrix: &[Complex64],
        controls: &[usize],
        values: &[bool],
        wires: &[usize],
        inverse: bool,
    ) -> Result<()> {
        if wires.is_empty() {
            return Err(StateError::Validation(
                "matrix operation requires at least one wire".to_string(),
            ));
        }
        let op = ControlledMatrixOperation::for_wires(wires.len());
        let kernel = self.kernel_map.controlled_matrix_kernel(op)?;
        Dispatcher::instance().apply_controlled_matrix(
            kernel,
            op,
            &mut self.data,
            self.num_qubits,
            matrix,
            controls,
            values,
            wires,
            inverse,
        )
    }

    // ---------------------------------------------------------------------
    // Generators
    // ---------------------------------------------------------------------

    /// Apply the generator of a parametric gate and return its scale factor
    ///
    /// Accepts both `"RX"` and `"GeneratorRX"`.
    pub fn apply_generator(&mut self, name: &str, wires: &[usize], adjoint: bool) -> Result<f64> {
        let op = GeneratorOperation::parse(name).map_err(|_| StateError::UnknownOperation {
            name: name.to_string(),
        })?;
        let kernel = self.kernel_map.generator_kernel(op)?;
        Dispatcher::instance().apply_generator(
            kernel,
            op,
            &mut self.data,
            self.num_qubits,
            wires,
            adjoint,
        )
    }

    /// Apply a generator restricted to the subspace where `controls` hold `values`
    pub fn apply_controlled_generator(
        &mut self,
        name: &str,
        controls: &[usize],
        values: &[bool],
        wires: &[usize],
        adjoint: bool,
    ) -> Result<f64> {
        let bare = name.strip_prefix("Generator").unwrap_or(name);
        let op = ControlledGeneratorOperation::from_name(bare).map_err(|_| {
            StateError::UnknownOperation {
                name: name.to_string(),
            }
        })?;
        let kernel = self.kernel_map.controlled_generator_kernel(op)?;
        Dispatcher::instance().apply_controlled_generator(
            kernel,
            op,
            &mut self.data,
            self.num_qubits,
            controls,
            values,
            wires,
            adjoint,
        )
    }

    // ---------------------------------------------------------------------
    // Linear algebra
    // ---------------------------------------------------------------------

    /// Sum of squared magnitudes
    pub fn norm_sqr(&self) -> f64 {
        self.data.iter().map(|a| a.norm_sqr()).sum()
    }

    /// L2 norm
    pub fn norm(&self) -> f64 {
        self.norm_sqr().sqrt()
    }

    /// Multiply every amplitude by `factor`
    pub fn scale(&mut self, factor: Complex64) {
        for amp in self.data.iter_mut() {
            *amp *= factor;
        }
    }

    /// Scale to unit norm unless the norm is numerically zero
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > NORMALIZE_EPSILON {
            self.scale(Complex64::new(1.0 / norm, 0.0));
        }
    }

    fn check_same_len(&self, other: &[Complex64]) -> Result<()> {
        if other.len() != self.data.len() {
            return Err(StateError::DimensionMismatch {
                expected: self.data.len(),
                actual: other.len(),
            });
        }
        Ok(())
    }

    /// `⟨self|other⟩` over this shard
    pub fn inner_product(&self, other: &[Complex64]) -> Result<Complex64> {
        self.check_same_len(other)?;
        Ok(self
            .data
            .iter()
            .zip(other)
            .map(|(a, b)| a.conj() * b)
            .sum())
    }

    /// `self += coefficient · other`
    pub fn scale_and_add(&mut self, coefficient: Complex64, other: &[Complex64]) -> Result<()> {
        self.check_same_len(other)?;
        for (a, b) in self.data.iter_mut().zip(other) {
            *a += coefficient * b;
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Measurement
    // ---------------------------------------------------------------------

    fn check_wire(&self, wire: usize) -> Result<usize> {
        if wire >= self.num_qubits {
            return Err(StateError::InvalidWire {
                wire,
                num_qubits: self.num_qubits,
            });
        }
        Ok(self.num_qubits - 1 - wire)
    }

    /// Sum of `|a|²` over amplitudes where `wire` is `0`
    pub fn zero_weight(&self, wire: usize) -> Result<f64> {
        let stride = 1 << self.check_wire(wire)?;
        Ok(self
            .data
            .chunks(stride * 2)
            .map(|block| block[..stride].iter().map(|a| a.norm_sqr()).sum::<f64>())
            .sum())
    }

    /// `[P(0), 1 - P(0)]` for one wire
    pub fn probs(&self, wire: usize) -> Result<[f64; 2]> {
        let p0 = self.zero_weight(wire)?;
        Ok([p0, 1.0 - p0])
    }

    /// Marginal probabilities over `wires`, first wire most significant
    pub fn marginal_probs(&self, wires: &[usize]) -> Result<Vec<f64>> {
        let bits = wires
            .iter()
            .map(|&w| self.check_wire(w))
            .collect::<Result<Vec<_>>>()?;
        let m = bits.len();
        let mut probs = vec![0.0; 1 << m];
        for (index, amp) in self.data.iter().enumerate() {
            let k = bits
                .iter()
                .enumerate()
                .fold(0, |acc, (j, &bit)| acc | (((index >> bit) & 1) << (m - 1 - j)));
            probs[k] += amp.norm_sqr();
        }
        Ok(probs)
    }

    /// Zero amplitudes where `wire` differs from `branch`, without renormalizing
    pub fn discard_branch(&mut self, wire: usize, branch: bool) -> Result<()> {
        let stride = 1 << self.check_wire(wire)?;
        let discard = if branch { 0..stride } else { stride..stride * 2 };
        for block in self.data.chunks_mut(stride * 2) {
            for amp in &mut block[discard.clone()] {
                *amp = Complex64::new(0.0, 0.0);
            }
        }
        Ok(())
    }

    /// Project `wire` onto `branch` and renormalize
    pub fn collapse(&mut self, wire: usize, branch: bool) -> Result<()> {
        self.discard_branch(wire, branch)?;
        self.normalize();
        Ok(())
    }

    /// Draw a measurement of `wire` and collapse onto it
    ///
    /// With `postselect` set and disagreeing with the draw, every amplitude is
    /// zeroed and [`Sample::Rejected`] is returned. With `reset`, a `1` outcome
    /// is flipped back to `|0⟩` after collapsing.
    pub fn measure(&mut self, wire: usize, postselect: Option<u8>, reset: bool) -> Result<Sample> {
        let postselect = postselect_bit(postselect)?;
        let [p0, _] = self.probs(wire)?;
        let branch = self.draw_uniform() >= p0;

        if postselect.is_some_and(|p| p != branch) {
            tracing::warn!(wire, branch, "postselection rejected, state zeroed");
            self.set_zero();
            return Ok(Sample::Rejected);
        }

        self.collapse(wire, branch)?;
        if reset && branch {
            self.apply_operation("PauliX", &[wire], false, &[])?;
        }
        Ok(Sample::from_bit(branch))
    }

    /// Mid-circuit measurement on exactly one wire
    pub fn apply_mid_measure(
        &mut self,
        wires: &[usize],
        postselect: &[u8],
        reset: bool,
    ) -> Result<Sample> {
        let (wire, postselect) = check_mid_measure(wires, postselect)?;
        self.measure(wire, postselect, reset)
    }
}

/// Validate mid-measure arguments: one wire, at most one postselect value
pub fn check_mid_measure(wires: &[usize], postselect: &[u8]) -> Result<(usize, Option<u8>)> {
    if wires.len() != 1 {
        return Err(StateError::Validation(format!(
            "mid-circuit measurement acts on one wire, got {}",
            wires.len()
        )));
    }
    if postselect.len() > 1 {
        return Err(StateError::Validation(format!(
            "at most one postselect value allowed, got {}",
            postselect.len()
        )));
    }
    Ok((wires[0], postselect.first().copied()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Threading;
    use approx::assert_relative_eq;

    fn bell() -> StateVector {
        let mut s = StateVector::new(2).unwrap();
        s.apply_operation("Hadamard", &[0], false, &[]).unwrap();
        s.apply_operation("CNOT", &[0, 1], false, &[]).unwrap();
        s
    }

    #[test]
    fn test_new_is_zero_state() {
        let s = StateVector::new(3).unwrap();
        assert_eq!(s.len(), 8);
        assert_eq!(s.data()[0], Complex64::new(1.0, 0.0));
        assert_relative_eq!(s.norm(), 1.0);
    }

    #[test]
    fn test_msb_wire_order() {
        let mut s = StateVector::new(3).unwrap();
        s.apply_operation("PauliX", &[0], false, &[]).unwrap();
        assert_eq!(s.data()[0b100], Complex64::new(1.0, 0.0));
        assert_relative_eq!(s.probs(0).unwrap()[1], 1.0);
        assert_relative_eq!(s.probs(2).unwrap()[0], 1.0);
    }

    #[test]
    fn test_unknown_operation() {
        let mut s = StateVector::new(1).unwrap();
        assert_eq!(
            s.apply_operation("Bogus", &[0], false, &[]).unwrap_err(),
            StateError::UnknownOperation { name: "Bogus".to_string() }
        );
    }

    #[test]
    fn test_matrix_fallback() {
        let mut a = StateVector::new(1).unwrap();
        let mut b = StateVector::new(1).unwrap();
        let x = qshard_gates::matrices::PAULI_X;
        a.apply_operation_with_matrix("MyX", &[0], false, &[], &x).unwrap();
        b.apply_operation("PauliX", &[0], false, &[]).unwrap();
        assert_eq!(a.data(), b.data());
        assert!(a.apply_operation_with_matrix("MyX", &[0], false, &[], &[]).is_err());
    }

    #[test]
    fn test_apply_operations_length_mismatch() {
        let mut s = StateVector::new(2).unwrap();
        let err = s
            .apply_operations(&["PauliX", "PauliY"], &[vec![0]], &[false, false], &[vec![], vec![]])
            .unwrap_err();
        assert_eq!(err, StateError::DimensionMismatch { expected: 2, actual: 1 });
    }

    #[test]
    fn test_controlled_values_length_checked() {
        let mut s = StateVector::new(3).unwrap();
        let err = s
            .apply_controlled_operation("PauliX", &[0, 1], &[true], &[2], false, &[])
            .unwrap_err();
        assert!(matches!(err, StateError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_controlled_matrix_on_zero_value() {
        let mut s = StateVector::new(2).unwrap();
        s.apply_controlled_matrix(&qshard_gates::matrices::PAULI_X, &[0], &[false], &[1], false)
            .unwrap();
        assert_eq!(s.data()[0b01], Complex64::new(1.0, 0.0));
    }

    #[test]
    fn test_generator_returns_coefficient() {
        let mut s = bell();
        assert_eq!(s.apply_generator("GeneratorRY", &[1], false).unwrap(), -0.5);
        assert_eq!(
            s.apply_controlled_generator("PhaseShift", &[0], &[true], &[1], false).unwrap(),
            1.0
        );
        assert!(s.apply_generator("Hadamard", &[0], false).is_err());
    }

    #[test]
    fn test_probs_and_marginals() {
        let s = bell();
        let p = s.marginal_probs(&[0, 1]).unwrap();
        assert_relative_eq!(p[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(p[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(p[3], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_collapse_normalizes() {
        let mut s = bell();
        s.collapse(0, true).unwrap();
        assert_relative_eq!(s.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(s.data()[3].re, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_normalize_skips_zero_vector() {
        let mut s = StateVector::new(2).unwrap();
        s.set_zero();
        s.normalize();
        assert!(s.data().iter().all(|a| a.norm() == 0.0));
    }

    #[test]
    fn test_measure_is_reproducible_with_seed() {
        let mut a = bell();
        let mut b = bell();
        a.seed(7);
        b.seed(7);
        let ra = a.measure(0, None, false).unwrap();
        let rb = b.measure(0, None, false).unwrap();
        assert_eq!(ra, rb);
        assert_eq!(a.data(), b.data());
        // Bell state: the other wire agrees
        let other = a.measure(1, None, false).unwrap();
        assert_eq!(other, ra);
    }

    #[test]
    fn test_rejected_postselection_zeroes_state() {
        let mut s = StateVector::new(2).unwrap();
        s.apply_operation("PauliX", &[1], false, &[]).unwrap();
        let sample = s.measure(1, Some(0), false).unwrap();
        assert_eq!(sample.value(), -1);
        assert!(s.data().iter().all(|a| a.norm() == 0.0));
    }

    #[test]
    fn test_measure_with_reset() {
        let mut s = StateVector::new(1).unwrap();
        s.apply_operation("PauliX", &[0], false, &[]).unwrap();
        let sample = s.measure(0, None, true).unwrap();
        assert_eq!(sample, Sample::One);
        assert_relative_eq!(s.data()[0].re, 1.0);
    }

    #[test]
    fn test_mid_measure_argument_checks() {
        let mut s = StateVector::new(2).unwrap();
        assert!(s.apply_mid_measure(&[0, 1], &[], false).is_err());
        assert!(s.apply_mid_measure(&[0], &[0, 1], false).is_err());
        assert!(s.apply_mid_measure(&[0], &[2], false).is_err());
        assert_eq!(s.apply_mid_measure(&[0], &[0], false).unwrap(), Sample::Zero);
    }

    #[test]
    fn test_inner_product_and_scale_and_add() {
        let s = bell();
        let ip = s.inner_product(s.data()).unwrap();
        assert_relative_eq!(ip.re, 1.0, epsilon = 1e-12);

        let mut acc = StateVector::zeroed(2, KernelConfig::default()).unwrap();
        acc.scale_and_add(Complex64::new(2.0, 0.0), s.data()).unwrap();
        assert_relative_eq!(acc.norm(), 2.0, epsilon = 1e-12);
        assert!(acc.inner_product(&[Complex64::new(0.0, 0.0)]).is_err());
    }

    #[test]
    fn test_kernel_choice_does_not_change_result() {
        let config = KernelConfig::default()
            .with_threading(Threading::MultiThread)
            .with_parallel_threshold(2);
        let mut a = StateVector::with_config(5, config).unwrap();
        let mut b = StateVector::with_config(5, KernelConfig::single_threaded()).unwrap();
        for s in [&mut a, &mut b] {
            s.apply_operation("Hadamard", &[0], false, &[]).unwrap();
            s.apply_operation("CRX", &[0, 4], false, &[0.3]).unwrap();
            s.apply_operation("MultiRZ", &[1, 2, 4], false, &[0.7]).unwrap();
        }
        assert_eq!(
            a.kernel_map().gate_kernel(GateOperation::CRX).unwrap(),
            KernelType::Parallel
        );
        for (x, y) in a.data().iter().zip(b.data()) {
            assert_relative_eq!(x.re, y.re, epsilon = 1e-12);
            assert_relative_eq!(x.im, y.im, epsilon = 1e-12);
        }
    }
}
