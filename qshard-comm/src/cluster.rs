//! Run a group of ranks as threads in one process

use crate::error::{CommError, Result};
use crate::manager::PartitionManager;
use crate::transport::{ChannelTransport, Transport};
use std::sync::Arc;

/// Marks the endpoint as departed when the rank's closure returns or unwinds
struct DepartGuard(Arc<ChannelTransport>);

impl Drop for DepartGuard {
    fn drop(&mut self) {
        self.0.depart();
    }
}

/// Thread-per-rank launcher over a [`ChannelTransport`] mesh
pub struct LocalCluster;

impl LocalCluster {
    /// Run `f` on `size` ranks and collect the results in rank order
    ///
    /// A panic on one rank wakes any peer blocked on it with
    /// [`CommError::Disconnected`] and is reported as
    /// [`CommError::RankPanicked`] for the lowest panicking rank.
    pub fn run<T, F>(size: usize, f: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(PartitionManager) -> T + Sync,
    {
        if size == 0 {
            return Err(CommError::EmptyCluster);
        }
        tracing::debug!(size, "starting local cluster");

        let endpoints: Vec<Arc<ChannelTransport>> =
            ChannelTransport::mesh(size).into_iter().map(Arc::new).collect();
        let f = &f;

        std::thread::scope(|scope| {
            let handles: Vec<_> = endpoints
                .into_iter()
                .map(|endpoint| {
                    scope.spawn(move || {
                        let _guard = DepartGuard(Arc::clone(&endpoint));
                        let transport: Arc<dyn Transport> = endpoint;
                        f(PartitionManager::world(transport))
                    })
                })
                .collect();

            handles
                .into_iter()
                .enumerate()
                .map(|(rank, handle)| {
                    handle.join().map_err(|_| {
                        tracing::error!(rank, "rank panicked");
                        CommError::RankPanicked { rank }
                    })
                })
                .collect()
        })
    }
}
