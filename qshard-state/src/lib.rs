//! Local shard engine for the qshard simulator
//!
//! This crate owns everything that happens inside a single rank:
//!
//! - [`AlignedBuffer`]: 64-byte aligned amplitude storage
//! - [`kernels`]: scalar, rayon and SSE2 kernel families
//! - [`dispatch`]: per-shard [`KernelMap`] and the process-wide [`Dispatcher`]
//! - [`StateVector`]: gates, matrices, generators and single-wire measurement
//! - [`CsrMatrix`]: sparse matrix-vector products for sparse Hamiltonians
//!
//! Wire 0 is always the most significant bit of an amplitude index.

pub mod buffer;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod kernels;
pub mod sparse;
pub mod state_vector;

pub use buffer::AlignedBuffer;
pub use config::{KernelConfig, MemoryModel, Threading};
pub use dispatch::{Dispatcher, KernelMap};
pub use error::{Result, StateError};
pub use kernels::KernelType;
pub use sparse::CsrMatrix;
pub use state_vector::{check_mid_measure, postselect_bit, Sample, StateVector, NORMALIZE_EPSILON};
