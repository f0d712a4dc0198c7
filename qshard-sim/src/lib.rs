//! Distributed state-vector simulation
//!
//! This crate puts the pieces together: one [`qshard_state::StateVector`]
//! shard per rank, a [`qshard_comm::PartitionManager`] connecting the ranks,
//! and the observable and measurement layers on top.
//!
//! # Features
//!
//! - **Sharded amplitudes**: the top `log2(ranks)` wires select the owning rank
//! - **Transparent routing**: gates on global wires swap through a partner rank
//! - **Observables**: named gates, matrices, tensor products, weighted sums and
//!   sparse Hamiltonians
//! - **Measurements**: expectation values, variances, marginal probabilities,
//!   mid-circuit measurement and sampling
//!
//! # Example
//!
//! ```
//! use qshard_comm::LocalCluster;
//! use qshard_sim::{DistributedStateVector, Measurements, SimulatorConfig};
//!
//! let config = SimulatorConfig::default().with_seed(7);
//! let expvals = LocalCluster::run(4, |comm| {
//!     let mut state = DistributedStateVector::new(4, comm, &config).unwrap();
//!     state.apply_operation("Hadamard", &[0], false, &[]).unwrap();
//!     state.apply_operation("CNOT", &[0, 3], false, &[]).unwrap();
//!     Measurements::new(&mut state).expval_named("PauliZ", &[3], &[]).unwrap()
//! })
//! .unwrap();
//! assert!(expvals.iter().all(|e| e.abs() < 1e-12));
//! ```

pub mod config;
pub mod error;
pub mod measurements;
pub mod observable;
mod sampling;
pub mod sparse;
pub mod state;

pub use config::SimulatorConfig;
pub use error::{Result, SimError};
pub use measurements::Measurements;
pub use observable::Observable;
pub use sparse::apply_sparse_hamiltonian;
pub use state::DistributedStateVector;
