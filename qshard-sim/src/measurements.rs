//! Expectation values, variances, probabilities and samples
//!
//! Every method here is collective: all ranks must call it with the same
//! arguments. Observables are applied to a copy of the state, so the state
//! itself is never modified except for the sampling RNG.

use crate::error::{Result, SimError};
use crate::observable::Observable;
use crate::sampling::AliasTable;
use crate::state::DistributedStateVector;
use num_complex::Complex64;
use qshard_comm::ReduceOp;
use std::sync::Arc;

fn check_list_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(SimError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

/// Measurement front end over one rank's part of a state
pub struct Measurements<'a> {
    state: &'a mut DistributedStateVector,
}

impl<'a> Measurements<'a> {
    pub fn new(state: &'a mut DistributedStateVector) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &DistributedStateVector {
        &*self.state
    }

    /// `O|ψ⟩` on a copy of the state
    fn image<F>(&self, apply: F) -> Result<DistributedStateVector>
    where
        F: FnOnce(&mut DistributedStateVector) -> Result<()>,
    {
        let mut image = self.state.clone();
        apply(&mut image)?;
        Ok(image)
    }

    fn expval_with<F>(&self, apply: F) -> Result<f64>
    where
        F: FnOnce(&mut DistributedStateVector) -> Result<()>,
    {
        let image = self.image(apply)?;
        Ok(self.state.inner_product(&image)?.re)
    }

    fn var_with<F>(&self, apply: F) -> Result<f64>
    where
        F: FnOnce(&mut DistributedStateVector) -> Result<()>,
    {
        let image = self.image(apply)?;
        let mean_square = image.shard().norm_sqr();
        let mean = self.state.local_inner_product(&image)?.re;
        let totals = self
            .state
            .comm()
            .all_reduce(&[mean_square, mean], ReduceOp::Sum)?;
        Ok(totals[0] - totals[1] * totals[1])
    }

    // ---------------------------------------------------------------------
    // Expectation values
    // ---------------------------------------------------------------------

    /// `⟨ψ|O|ψ⟩`
    pub fn expval(&self, observable: &Observable) -> Result<f64> {
        observable.validate(self.state.num_qubits())?;
        self.expval_with(|image| observable.apply_in_place(image))
    }

    /// Expectation of a row-major matrix on `wires`
    pub fn expval_matrix(&self, matrix: &[Complex64], wires: &[usize]) -> Result<f64> {
        self.expval_with(|image| image.apply_matrix(matrix, wires, false))
    }

    /// Expectation of a registered gate used as an observable
    pub fn expval_named(&self, name: &str, wires: &[usize], params: &[f64]) -> Result<f64> {
        let observable = Observable::named(name, wires.to_vec(), params.to_vec())?;
        self.expval(&observable)
    }

    /// Expectation of each observable in turn
    pub fn expval_list(&self, observables: &[Arc<Observable>]) -> Result<Vec<f64>> {
        observables.iter().map(|o| self.expval(o)).collect()
    }

    /// Expectation of each `(names[i], wires[i])` gate observable in turn
    pub fn expval_named_list(&self, names: &[&str], wires: &[Vec<usize>]) -> Result<Vec<f64>> {
        check_list_len(names.len(), wires.len())?;
        names
            .iter()
            .zip(wires)
            .map(|(name, w)| self.expval_named(name, w, &[]))
            .collect()
    }

    // ---------------------------------------------------------------------
    // Variances
    // ---------------------------------------------------------------------

    /// `⟨ψ|O²|ψ⟩ - ⟨ψ|O|ψ⟩²`, with one reduction for both terms
    pub fn var(&self, observable: &Observable) -> Result<f64> {
        observable.validate(self.state.num_qubits())?;
        self.var_with(|image| observable.apply_in_place(image))
    }

    /// Variance of a row-major matrix on `wires`
    pub fn var_matrix(&self, matrix: &[Complex64], wires: &[usize]) -> Result<f64> {
        self.var_with(|image| image.apply_matrix(matrix, wires, false))
    }

    /// Variance of a registered gate used as an observable
    pub fn var_named(&self, name: &str, wires: &[usize], params: &[f64]) -> Result<f64> {
        let observable = Observable::named(name, wires.to_vec(), params.to_vec())?;
        self.var(&observable)
    }

    pub fn var_list(&self, observables: &[Arc<Observable>]) -> Result<Vec<f64>> {
        observables.iter().map(|o| self.var(o)).collect()
    }

    pub fn var_named_list(&self, names: &[&str], wires: &[Vec<usize>]) -> Result<Vec<f64>> {
        check_list_len(names.len(), wires.len())?;
        names
            .iter()
            .zip(wires)
            .map(|(name, w)| self.var_named(name, w, &[]))
            .collect()
    }

    // ---------------------------------------------------------------------
    // Probabilities and samples
    // ---------------------------------------------------------------------

    /// Marginal distribution over `wires`, first wire most significant
    pub fn probs(&self, wires: &[usize]) -> Result<Vec<f64>> {
        self.state.marginal_probs(wires)
    }

    /// Distribution over every basis state
    pub fn probs_all(&self) -> Result<Vec<f64>> {
        let wires: Vec<usize> = (0..self.state.num_qubits()).collect();
        self.state.marginal_probs(&wires)
    }

    /// Draw `num_samples` basis states; each row lists one bit per wire
    ///
    /// Rank 0 gathers the distribution, samples it with its RNG and
    /// broadcasts the draws, so every rank returns the same rows. The gather
    /// puts all `2^n` probabilities on rank 0, which limits this to states
    /// small enough to fit on one rank.
    pub fn generate_samples(&mut self, num_samples: usize) -> Result<Vec<Vec<u8>>> {
        let num_qubits = self.state.num_qubits();
        let weights: Vec<f64> = self.state.local_data().iter().map(|a| a.norm_sqr()).collect();
        let comm = self.state.comm().clone();

        // Errors travel with the broadcast so every rank fails together.
        let drawn: std::result::Result<Vec<usize>, String> = match comm.gather(weights, 0)? {
            Some(parts) => match AliasTable::new(&parts.concat()) {
                Ok(table) => {
                    let rng = self.state.shard_mut().rng_mut();
                    let mut indices = Vec::with_capacity(num_samples);
                    for _ in 0..num_samples {
                        indices.push(table.sample(rng));
                    }
                    Ok(indices)
                }
                Err(e) => Err(e.to_string()),
            },
            None => Ok(Vec::new()),
        };
        let indices = comm.broadcast(drawn, 0)?.map_err(SimError::Validation)?;

        tracing::debug!(num_samples, num_qubits, "generated samples");
        Ok(indices
            .into_iter()
            .map(|index| {
                (0..num_qubits)
                    .map(|w| ((index >> (num_qubits - 1 - w)) & 1) as u8)
                    .collect()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatorConfig;
    use approx::assert_relative_eq;
    use qshard_comm::LocalCluster;

    #[test]
    fn test_expval_pauli_z_on_global_wire() {
        let out = LocalCluster::run(2, |comm| {
            let mut state = DistributedStateVector::new(2, comm, &SimulatorConfig::debug()).unwrap();
            state.apply_operation("RY", &[0], false, &[0.7]).unwrap();
            Measurements::new(&mut state).expval_named("PauliZ", &[0], &[]).unwrap()
        })
        .unwrap();
        for e in out {
            assert_relative_eq!(e, 0.7f64.cos(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_var_of_eigenstate_is_zero() {
        let out = LocalCluster::run(2, |comm| {
            let mut state = DistributedStateVector::new(2, comm, &SimulatorConfig::debug()).unwrap();
            state.apply_operation("PauliX", &[1], false, &[]).unwrap();
            Measurements::new(&mut state).var_named("PauliZ", &[1], &[]).unwrap()
        })
        .unwrap();
        for v in out {
            assert_relative_eq!(v, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_list_length_mismatch() {
        let out = LocalCluster::run(1, |comm| {
            let mut state = DistributedStateVector::new(2, comm, &SimulatorConfig::debug()).unwrap();
            Measurements::new(&mut state)
                .expval_named_list(&["PauliZ", "PauliX"], &[vec![0]])
                .unwrap_err()
        })
        .unwrap();
        assert_eq!(
            out[0],
            SimError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_samples_of_basis_state() {
        let out = LocalCluster::run(2, |comm| {
            let mut state = DistributedStateVector::new(3, comm, &SimulatorConfig::debug()).unwrap();
            state.set_basis_state(0b110).unwrap();
            Measurements::new(&mut state).generate_samples(5).unwrap()
        })
        .unwrap();
        for rows in out {
            assert_eq!(rows, vec![vec![1, 1, 0]; 5]);
        }
    }

    #[test]
    fn test_sampling_zero_state_fails_everywhere() {
        let out = LocalCluster::run(2, |comm| {
            let mut state = DistributedStateVector::new(2, comm, &SimulatorConfig::debug()).unwrap();
            state.set_zero();
            Measurements::new(&mut state).generate_samples(3).is_err()
        })
        .unwrap();
        assert_eq!(out, vec![true, true]);
    }
}
