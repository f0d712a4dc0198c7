//! Collective communication for the qshard simulator
//!
//! Ranks talk through a [`Transport`]; the bundled [`ChannelTransport`] runs
//! every rank as a thread in the current process. [`PartitionManager`] layers
//! the collectives the distributed engine needs on top: barrier, broadcast,
//! gather, scatter, reductions, pairwise exchange and communicator split.
//!
//! ```
//! use qshard_comm::{LocalCluster, ReduceOp};
//!
//! let sums = LocalCluster::run(3, |comm| {
//!     comm.all_reduce_scalar(comm.rank() as f64, ReduceOp::Sum).unwrap()
//! })
//! .unwrap();
//! assert_eq!(sums, vec![3.0; 3]);
//! ```

pub mod cluster;
pub mod error;
pub mod manager;
pub mod reduce;
pub mod transport;

pub use cluster::LocalCluster;
pub use error::{CommError, Result};
pub use manager::{PartitionManager, WORLD_CONTEXT};
pub use reduce::{combine_into, ReduceOp, Reducible};
pub use transport::{ChannelTransport, Envelope, Payload, Transport};
