//! Amplitude vector partitioned across ranks
//!
//! With `2^G` ranks, the top `G` bits of a global amplitude index select the
//! owning rank and the remaining `L` bits index into that rank's shard. Wires
//! `0..G` are therefore *global* wires and wires `G..G+L` are *local* wires.
//!
//! Operations on local wires run on the shard directly. An operation that
//! touches a global wire first swaps that wire with a free local wire, which
//! moves half of each shard to the partner rank, runs locally on the
//! substituted wires, then swaps back.

use crate::config::SimulatorConfig;
use crate::error::{Result, SimError};
use num_complex::Complex64;
use qshard_comm::{PartitionManager, ReduceOp};
use qshard_gates::{
    generator_spec, ControlledGateOperation, ControlledGeneratorOperation, GateInfo,
    GateRegistry, GeneratorOperation,
};
use qshard_state::{
    check_mid_measure, postselect_bit, Sample, StateError, StateVector, NORMALIZE_EPSILON,
};
use smallvec::SmallVec;

type WireList = SmallVec<[usize; 4]>;
type ControlValues = SmallVec<[bool; 4]>;

#[inline]
fn bit_set(index: usize, bit: usize) -> bool {
    (index >> bit) & 1 == 1
}

fn unknown(name: &str) -> SimError {
    StateError::UnknownOperation {
        name: name.to_string(),
    }
    .into()
}

fn lookup_gate(name: &str) -> Result<GateInfo> {
    GateRegistry::lookup(name).map_err(|_| unknown(name))
}

fn check_matrix_len(matrix: &[Complex64], num_wires: usize) -> Result<()> {
    let expected = 1usize
        .checked_shl(2 * num_wires as u32)
        .unwrap_or(usize::MAX);
    if matrix.len() != expected {
        return Err(SimError::DimensionMismatch {
            expected,
            actual: matrix.len(),
        });
    }
    Ok(())
}

fn check_control_values(controls: &[usize], values: &[bool]) -> Result<()> {
    if controls.len() != values.len() {
        return Err(SimError::DimensionMismatch {
            expected: controls.len(),
            actual: values.len(),
        });
    }
    Ok(())
}

/// One rank's part of a state vector spread over a communicator
///
/// Every rank must issue the same sequence of calls; most methods perform
/// collective communication.
///
/// # Example
///
/// ```
/// use qshard_comm::LocalCluster;
/// use qshard_sim::{DistributedStateVector, SimulatorConfig};
///
/// let probs = LocalCluster::run(2, |comm| {
///     let mut state = DistributedStateVector::new(3, comm, &SimulatorConfig::default()).unwrap();
///     state.apply_operation("Hadamard", &[0], false, &[]).unwrap();
///     state.probs(0).unwrap()
/// })
/// .unwrap();
/// assert!((probs[0][0] - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct DistributedStateVector {
    shard: StateVector,
    comm: PartitionManager,
    num_qubits: usize,
    global_qubits: usize,
}

impl DistributedStateVector {
    /// Create `|0…0⟩` over every rank of `comm`
    pub fn new(num_qubits: usize, comm: PartitionManager, config: &SimulatorConfig) -> Result<Self> {
        let size = comm.size();
        if !size.is_power_of_two() {
            return Err(SimError::InvalidWorldSize { size });
        }
        let global_qubits = size.trailing_zeros() as usize;
        if num_qubits < global_qubits {
            return Err(SimError::TooFewQubits { num_qubits, size });
        }

        let mut shard = StateVector::zeroed(num_qubits - global_qubits, config.kernel_config())?;
        if let Some(seed) = config.seed {
            shard.seed(seed);
        }

        tracing::debug!(
            rank = comm.rank(),
            num_qubits,
            global_qubits,
            local_qubits = num_qubits - global_qubits,
            "created distributed state vector"
        );

        let mut state = Self {
            shard,
            comm,
            num_qubits,
            global_qubits,
        };
        state.reset_state();
        Ok(state)
    }

    /// Create a state from the full amplitude vector; each rank keeps its slice
    pub fn from_amplitudes(
        num_qubits: usize,
        comm: PartitionManager,
        config: &SimulatorConfig,
        amplitudes: &[Complex64],
    ) -> Result<Self> {
        let mut state = Self::new(num_qubits, comm, config)?;
        let expected = 1usize << num_qubits;
        if amplitudes.len() != expected {
            return Err(SimError::DimensionMismatch {
                expected,
                actual: amplitudes.len(),
            });
        }
        let len = state.shard.len();
        let start = state.rank() * len;
        state.shard.update_data(&amplitudes[start..start + len])?;
        Ok(state)
    }

    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Wires whose bit selects the owning rank
    #[inline]
    pub fn global_qubits(&self) -> usize {
        self.global_qubits
    }

    /// Wires addressed inside each shard
    #[inline]
    pub fn local_qubits(&self) -> usize {
        self.num_qubits - self.global_qubits
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.comm.rank()
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.comm.size()
    }

    pub fn comm(&self) -> &PartitionManager {
        &self.comm
    }

    /// This rank's shard
    pub fn shard(&self) -> &StateVector {
        &self.shard
    }

    pub fn shard_mut(&mut self) -> &mut StateVector {
        &mut self.shard
    }

    /// This rank's amplitudes
    pub fn local_data(&self) -> &[Complex64] {
        self.shard.data()
    }

    /// Overwrite this rank's amplitudes
    pub fn update_local_data(&mut self, amplitudes: &[Complex64]) -> Result<()> {
        self.shard.update_data(amplitudes)?;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // State preparation
    // ---------------------------------------------------------------------

    /// Set the global computational basis state `index`
    ///
    /// Only the owning rank holds the nonzero amplitude; no communication.
    pub fn set_basis_state(&mut self, index: usize) -> Result<()> {
        let dim = 1usize << self.num_qubits;
        if index >= dim {
            return Err(SimError::DimensionMismatch {
                expected: dim,
                actual: index,
            });
        }
        let local_qubits = self.local_qubits();
        if index >> local_qubits == self.rank() {
            self.shard.set_basis_state(index & ((1 << local_qubits) - 1))?;
        } else {
            self.shard.set_zero();
        }
        Ok(())
    }

    /// Return to `|0…0⟩`
    pub fn reset_state(&mut self) {
        if self.rank() == 0 {
            self.shard.reset_state();
        } else {
            self.shard.set_zero();
        }
    }

    /// Zero every amplitude on every rank
    pub fn set_zero(&mut self) {
        self.shard.set_zero();
    }

    /// Reseed the measurement RNG; only rank 0's seed affects draws
    pub fn seed(&mut self, seed: u64) {
        self.shard.seed(seed);
    }

    /// Uniform draw made on rank 0 and shared with the group
    pub(crate) fn shared_draw(&mut self) -> Result<f64> {
        let draw = if self.rank() == 0 {
            self.shard.draw_uniform()
        } else {
            0.0
        };
        Ok(self.comm.broadcast(draw, 0)?)
    }

    // ---------------------------------------------------------------------
    // Wire routing
    // ---------------------------------------------------------------------

    fn check_wires(&self, wires: &[usize]) -> Result<()> {
        for (i, &wire) in wires.iter().enumerate() {
            if wire >= self.num_qubits {
                return Err(StateError::InvalidWire {
                    wire,
                    num_qubits: self.num_qubits,
                }
                .into());
            }
            if wires[..i].contains(&wire) {
                return Err(StateError::DuplicateWire { wire }.into());
            }
        }
        Ok(())
    }

    #[inline]
    fn is_global(&self, wire: usize) -> bool {
        wire < self.global_qubits
    }

    /// Position of a global wire within the rank index
    #[inline]
    fn rank_bit_position(&self, wire: usize) -> usize {
        self.global_qubits - 1 - wire
    }

    /// Value of a global wire on this rank
    #[inline]
    fn rank_bit(&self, wire: usize) -> bool {
        bit_set(self.rank(), self.rank_bit_position(wire))
    }

    /// Swap global `wire` with shard wire `local`
    ///
    /// Amplitudes whose `local` bit differs from this rank's `wire` bit trade
    /// places with the partner rank. The swap is its own inverse.
    fn swap_global(&mut self, wire: usize, local: usize) -> Result<()> {
        let mine = self.rank_bit(wire);
        let partner = self.rank() ^ (1 << self.rank_bit_position(wire));
        let bit = self.local_qubits() - 1 - local;

        let outgoing: Vec<Complex64> = self
            .shard
            .data()
            .iter()
            .enumerate()
            .filter(|&(i, _)| bit_set(i, bit) != mine)
            .map(|(_, &amp)| amp)
            .collect();
        let expected = outgoing.len();

        tracing::trace!(rank = self.rank(), wire, local, partner, len = expected, "swapping global wire");
        let incoming: Vec<Complex64> = self.comm.exchange(outgoing, partner)?;
        if incoming.len() != expected {
            return Err(SimError::DimensionMismatch {
                expected,
                actual: incoming.len(),
            });
        }

        let slots = self
            .shard
            .data_mut()
            .iter_mut()
            .enumerate()
            .filter(|(i, _)| bit_set(*i, bit) != mine)
            .map(|(_, amp)| amp);
        for (slot, value) in slots.zip(incoming) {
            *slot = value;
        }
        Ok(())
    }

    /// Run `f` on the shard with every wire in `wires` made local
    ///
    /// `f` receives shard wire indices in the same order as `wires`.
    fn with_local_wires<T>(
        &mut self,
        wires: &[usize],
        f: impl FnOnce(&mut StateVector, &[usize]) -> qshard_state::Result<T>,
    ) -> Result<T> {
        self.check_wires(wires)?;
        let local_qubits = self.local_qubits();
        if wires.len() > local_qubits {
            return Err(SimError::Validation(format!(
                "operation on {} wires needs at least that many local qubits, shard has {local_qubits}",
                wires.len()
            )));
        }

        let g = self.global_qubits;
        let mut free = (0..local_qubits).rev().filter(|&l| !wires.contains(&(l + g)));
        let mut swaps: SmallVec<[(usize, usize); 4]> = SmallVec::new();
        let mut local = WireList::with_capacity(wires.len());
        for &wire in wires {
            if wire < g {
                let l = free.next().ok_or_else(|| {
                    SimError::Validation("no free local wire to swap with".to_string())
                })?;
                swaps.push((wire, l));
                local.push(l);
            } else {
                local.push(wire - g);
            }
        }

        for &(wire, l) in &swaps {
            self.swap_global(wire, l)?;
        }
        let result = f(&mut self.shard, &local);
        for &(wire, l) in swaps.iter().rev() {
            self.swap_global(wire, l)?;
        }
        Ok(result?)
    }

    /// Settle control wires that live on global qubits
    ///
    /// A global control is fixed across this rank's shard, so it is checked
    /// against the rank index instead of being swapped in. Returns the
    /// remaining shard-level controls, or `None` when this rank fails a global
    /// control. Ranks that trade halves for a global target share their
    /// control bits, so partners always reach the same answer.
    fn resolve_controls(
        &self,
        controls: &[usize],
        values: &[bool],
        wires: &[usize],
    ) -> Result<Option<(WireList, ControlValues)>> {
        check_control_values(controls, values)?;
        let all: WireList = controls.iter().chain(wires).copied().collect();
        self.check_wires(&all)?;

        let mut matched = true;
        let mut local_controls = WireList::new();
        let mut local_values = ControlValues::new();
        for (&wire, &value) in controls.iter().zip(values) {
            if self.is_global(wire) {
                matched &= self.rank_bit(wire) == value;
            } else {
                local_controls.push(wire);
                local_values.push(value);
            }
        }

        // Checked before the early return so every rank fails alike.
        let local_qubits = self.local_qubits();
        let needed = local_controls.len() + wires.len();
        if needed > local_qubits {
            return Err(SimError::Validation(format!(
                "operation needs {needed} local qubits, shard has {local_qubits}"
            )));
        }
        Ok(matched.then_some((local_controls, local_values)))
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
        lookup_gate(name)?.validate(wires.len(), params.len())?;
        self.with_local_wires(wires, |shard, local| {
            shard.apply_operation(name, local, inverse, params)
        })
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
            Err(unknown(name))
        }
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
                return Err(SimError::DimensionMismatch {
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
        let op = ControlledGateOperation::from_name(name).map_err(|_| unknown(name))?;
        GateRegistry::info(op.base()).validate(wires.len(), params.len())?;

        let (controls, values) = match self.resolve_controls(controls, values, wires)? {
            Some(resolved) => resolved,
            None => return Ok(()),
        };
        let all: WireList = controls.iter().chain(wires).copied().collect();
        self.with_local_wires(&all, |shard, local| {
            let (c, w) = local.split_at(controls.len());
            shard.apply_controlled_operation(name, c, &values, w, inverse, params)
        })
    }

    /// Apply a dense row-major matrix of size `4^#wires`
    pub fn apply_matrix(&mut self, matrix: &[Complex64], wires: &[usize], inverse: bool) -> Result<()> {
        if wires.is_empty() {
            return Err(SimError::Validation(
                "matrix operation requires at least one wire".to_string(),
            ));
        }
        self.check_wires(wires)?;
        check_matrix_len(matrix, wires.len())?;
        self.with_local_wires(wires, |shard, local| shard.apply_matrix(matrix, local, inverse))
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
            return Err(SimError::Validation(
                "matrix operation requires at least one wire".to_string(),
            ));
        }
        check_matrix_len(matrix, wires.len())?;

        let (controls, values) = match self.resolve_controls(controls, values, wires)? {
            Some(resolved) => resolved,
            None => return Ok(()),
        };
        let all: WireList = controls.iter().chain(wires).copied().collect();
        self.with_local_wires(&all, |shard, local| {
            let (c, w) = local.split_at(controls.len());
            shard.apply_controlled_matrix(matrix, c, &values, w, inverse)
        })
    }

    // ---------------------------------------------------------------------
    // Generators
    // ---------------------------------------------------------------------

    /// Apply the generator of a parametric gate and return its scale factor
    pub fn apply_generator(&mut self, name: &str, wires: &[usize], adjoint: bool) -> Result<f64> {
        let op = GeneratorOperation::parse(name).map_err(|_| unknown(name))?;
        GateRegistry::info(op.gate()).validate(wires.len(), 1)?;
        self.with_local_wires(wires, |shard, local| shard.apply_generator(name, local, adjoint))
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
        let op = ControlledGeneratorOperation::from_name(bare).map_err(|_| unknown(name))?;
        GateRegistry::info(op.base().gate()).validate(wires.len(), 1)?;

        let (controls, values) = match self.resolve_controls(controls, values, wires)? {
            Some(resolved) => resolved,
            None => {
                // The projector removes this whole shard.
                self.shard.set_zero();
                return Ok(generator_spec(op.base(), wires.len())?.coefficient);
            }
        };
        let all: WireList = controls.iter().chain(wires).copied().collect();
        self.with_local_wires(&all, |shard, local| {
            let (c, w) = local.split_at(controls.len());
            shard.apply_controlled_generator(name, c, &values, w, adjoint)
        })
    }

    // ---------------------------------------------------------------------
    // Reductions and linear algebra
    // ---------------------------------------------------------------------

    /// Sum a per-rank value over the group; identical on every rank
    pub fn all_reduce_sum(&self, local: f64) -> Result<f64> {
        Ok(self.comm.all_reduce_scalar(local, ReduceOp::Sum)?)
    }

    /// L2 norm of the full vector
    pub fn norm(&self) -> Result<f64> {
        Ok(self.all_reduce_sum(self.shard.norm_sqr())?.sqrt())
    }

    /// Scale to unit norm unless the norm is numerically zero
    pub fn normalize(&mut self) -> Result<()> {
        let norm = self.norm()?;
        if norm > NORMALIZE_EPSILON {
            self.shard.scale(Complex64::new(1.0 / norm, 0.0));
        }
        Ok(())
    }

    /// Multiply every amplitude by `factor`; local only
    pub fn scale(&mut self, factor: Complex64) {
        self.shard.scale(factor);
    }

    /// `self += coefficient · other`; local only
    pub fn scale_and_add(&mut self, coefficient: Complex64, other: &Self) -> Result<()> {
        self.shard.scale_and_add(coefficient, other.local_data())?;
        Ok(())
    }

    /// `⟨self|other⟩` over this rank's shard only
    pub fn local_inner_product(&self, other: &Self) -> Result<Complex64> {
        Ok(self.shard.inner_product(other.local_data())?)
    }

    /// `⟨self|other⟩` over the full vector
    pub fn inner_product(&self, other: &Self) -> Result<Complex64> {
        let local = self.local_inner_product(other)?;
        Ok(self.comm.all_reduce_scalar(local, ReduceOp::Sum)?)
    }

    /// Full vector on `root` in global index order; `None` elsewhere
    ///
    /// Intended for inspection of small states.
    pub fn get_data_vector(&self, root: usize) -> Result<Option<Vec<Complex64>>> {
        let gathered = self.comm.gather(self.shard.data().to_vec(), root)?;
        Ok(gathered.map(|shards| shards.concat()))
    }

    /// Full vector on every rank
    pub fn get_data_vector_all(&self) -> Result<Vec<Complex64>> {
        Ok(self.comm.all_gather(self.shard.data().to_vec())?.concat())
    }

    // ---------------------------------------------------------------------
    // Measurement
    // ---------------------------------------------------------------------

    /// `[P(0), 1 - P(0)]` for one wire
    pub fn probs(&self, wire: usize) -> Result<[f64; 2]> {
        self.check_wires(&[wire])?;
        let local_p0 = if self.is_global(wire) {
            if self.rank_bit(wire) {
                0.0
            } else {
                self.shard.norm_sqr()
            }
        } else {
            self.shard.zero_weight(wire - self.global_qubits)?
        };
        let p0 = self.all_reduce_sum(local_p0)?;
        Ok([p0, 1.0 - p0])
    }

    /// Marginal probabilities over `wires`, first wire most significant
    pub fn marginal_probs(&self, wires: &[usize]) -> Result<Vec<f64>> {
        self.check_wires(wires)?;
        let m = wires.len();
        let n = self.num_qubits;
        let base = self.rank() << self.local_qubits();

        let mut probs = vec![0.0; 1 << m];
        for (i, amp) in self.shard.data().iter().enumerate() {
            let index = base | i;
            let k = wires.iter().enumerate().fold(0, |acc, (j, &w)| {
                acc | (usize::from(bit_set(index, n - 1 - w)) << (m - 1 - j))
            });
            probs[k] += amp.norm_sqr();
        }
        Ok(self.comm.all_reduce(&probs, ReduceOp::Sum)?)
    }

    /// Project `wire` onto `branch` and renormalize
    pub fn collapse(&mut self, wire: usize, branch: bool) -> Result<()> {
        self.check_wires(&[wire])?;
        if self.is_global(wire) {
            if self.rank_bit(wire) != branch {
                self.shard.set_zero();
            }
        } else {
            self.shard.discard_branch(wire - self.global_qubits, branch)?;
        }
        self.normalize()
    }

    /// Measure `wire` and collapse onto the outcome
    ///
    /// Rank 0 draws the outcome and broadcasts it. With `postselect` set and
    /// disagreeing with the draw, every amplitude on every rank is zeroed and
    /// [`Sample::Rejected`] is returned. With `reset`, a `1` outcome is
    /// flipped back to `|0⟩`.
    pub fn measure(&mut self, wire: usize, postselect: Option<u8>, reset: bool) -> Result<Sample> {
        self.check_wires(&[wire])?;
        let postselect = postselect_bit(postselect)?;
        if reset && self.is_global(wire) && self.local_qubits() == 0 {
            return Err(SimError::Validation(
                "resetting a global wire needs at least one local qubit".to_string(),
            ));
        }

        let [p0, _] = self.probs(wire)?;
        let branch = self.shared_draw()? >= p0;

        if postselect.is_some_and(|p| p != branch) {
            if self.rank() == 0 {
                tracing::warn!(wire, branch, "postselection rejected, state zeroed");
            }
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
