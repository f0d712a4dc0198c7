//! Collective operations over a group of ranks
//!
//! A [`PartitionManager`] is one rank's handle on a communicator: a context
//! id plus the ordered list of world ranks that belong to it. Every collective
//! is synchronous across the group and must be issued in the same order on
//! every member. Reductions combine contributions in rank order, so all ranks
//! see bitwise-identical results.

use crate::error::{CommError, Result};
use crate::reduce::{combine_into, ReduceOp, Reducible};
use crate::transport::{Envelope, Payload, Transport};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

mod tag {
    pub const BARRIER: u32 = 1;
    pub const BCAST: u32 = 2;
    pub const REDUCE: u32 = 3;
    pub const GATHER: u32 = 4;
    pub const SCATTER: u32 = 5;
    pub const EXCHANGE: u32 = 6;
    pub const SPLIT: u32 = 7;
    pub const P2P: u32 = 8;
}

/// Context id of the world communicator
pub const WORLD_CONTEXT: u64 = 0;

// splitmix64 finalizer, used to derive child context ids
fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// One rank's view of a communicator
#[derive(Clone)]
pub struct PartitionManager {
    transport: Arc<dyn Transport>,
    context: u64,
    /// World rank of each group member, indexed by group rank
    members: Arc<[usize]>,
    rank: usize,
    splits: Arc<AtomicU64>,
}

impl std::fmt::Debug for PartitionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionManager")
            .field("context", &self.context)
            .field("rank", &self.rank)
            .field("size", &self.members.len())
            .finish()
    }
}

impl PartitionManager {
    /// World communicator over a transport
    pub fn world(transport: Arc<dyn Transport>) -> Self {
        let size = transport.world_size();
        let rank = transport.world_rank();
        Self {
            transport,
            context: WORLD_CONTEXT,
            members: (0..size).collect(),
            rank,
            splits: Arc::new(AtomicU64::new(0)),
        }
    }

    /// This rank's index within the group
    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of ranks in the group
    #[inline]
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Opaque communicator id
    #[inline]
    pub fn context(&self) -> u64 {
        self.context
    }

    /// World rank of a group member
    pub fn world_rank_of(&self, rank: usize) -> Result<usize> {
        self.members.get(rank).copied().ok_or(CommError::InvalidRank {
            rank,
            size: self.members.len(),
        })
    }

    fn check_rank(&self, rank: usize) -> Result<()> {
        self.world_rank_of(rank).map(|_| ())
    }

    fn post<T: Send + 'static>(&self, dest: usize, tag: u32, value: T) -> Result<()> {
        let envelope = Envelope {
            context: self.context,
            source: self.members[self.rank],
            tag,
            payload: Box::new(value),
        };
        self.transport.send(self.world_rank_of(dest)?, envelope)
    }

    fn fetch<T: 'static>(&self, source: usize, tag: u32) -> Result<T> {
        let payload: Payload = self
            .transport
            .recv(self.context, self.world_rank_of(source)?, tag)?;
        payload
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| CommError::PayloadMismatch {
                expected: std::any::type_name::<T>(),
            })
    }

    // ---------------------------------------------------------------------
    // Point to point
    // ---------------------------------------------------------------------

    /// Send a value to `dest`; never blocks
    pub fn send<T: Send + 'static>(&self, value: T, dest: usize) -> Result<()> {
        self.post(dest, tag::P2P, value)
    }

    /// Receive a value sent with [`send`](Self::send) from `source`
    pub fn recv<T: Send + 'static>(&self, source: usize) -> Result<T> {
        self.fetch(source, tag::P2P)
    }

    /// Swap values with `partner`, who must call `exchange` with this rank
    pub fn exchange<T: Send + 'static>(&self, value: T, partner: usize) -> Result<T> {
        self.check_rank(partner)?;
        if partner == self.rank {
            return Ok(value);
        }
        tracing::trace!(rank = self.rank, partner, "exchange");
        self.post(partner, tag::EXCHANGE, value)?;
        self.fetch(partner, tag::EXCHANGE)
    }

    // ---------------------------------------------------------------------
    // Collectives
    // ---------------------------------------------------------------------

    /// Block until every member has arrived
    pub fn barrier(&self) -> Result<()> {
        if self.rank == 0 {
            for source in 1..self.size() {
                self.fetch::<()>(source, tag::BARRIER)?;
            }
            for dest in 1..self.size() {
                self.post(dest, tag::BARRIER, ())?;
            }
        } else {
            self.post(0, tag::BARRIER, ())?;
            self.fetch::<()>(0, tag::BARRIER)?;
        }
        Ok(())
    }

    /// Distribute `root`'s value; other ranks' `value` is discarded
    pub fn broadcast<T: Clone + Send + 'static>(&self, value: T, root: usize) -> Result<T> {
        self.check_rank(root)?;
        if self.rank == root {
            for dest in (0..self.size()).filter(|&d| d != root) {
                self.post(dest, tag::BCAST, value.clone())?;
            }
            Ok(value)
        } else {
            self.fetch(root, tag::BCAST)
        }
    }

    /// Collect one value per rank on `root`, in rank order
    pub fn gather<T: Send + 'static>(&self, value: T, root: usize) -> Result<Option<Vec<T>>> {
        self.gather_tagged(value, root, tag::GATHER)
    }

    fn gather_tagged<T: Send + 'static>(
        &self,
        value: T,
        root: usize,
        tag: u32,
    ) -> Result<Option<Vec<T>>> {
        self.check_rank(root)?;
        if self.rank != root {
            self.post(root, tag, value)?;
            return Ok(None);
        }

        let mut own = Some(value);
        let mut values = Vec::with_capacity(self.size());
        for source in 0..self.size() {
            if source == root {
                if let Some(v) = own.take() {
                    values.push(v);
                }
            } else {
                values.push(self.fetch(source, tag)?);
            }
        }
        Ok(Some(values))
    }

    /// Every rank receives every rank's value, in rank order
    pub fn all_gather<T: Clone + Send + 'static>(&self, value: T) -> Result<Vec<T>> {
        let gathered = self.gather(value, 0)?;
        self.broadcast(gathered.unwrap_or_default(), 0)
    }

    /// Hand `values[r]` to rank `r`; only `root` supplies `values`
    pub fn scatter<T: Send + 'static>(&self, values: Option<Vec<T>>, root: usize) -> Result<T> {
        self.check_rank(root)?;
        if self.rank != root {
            return self.fetch(root, tag::SCATTER);
        }

        let values = values.unwrap_or_default();
        if values.len() != self.size() {
            return Err(CommError::LengthMismatch {
                expected: self.size(),
                actual: values.len(),
            });
        }

        let mut own = None;
        for (dest, value) in values.into_iter().enumerate() {
            if dest == root {
                own = Some(value);
            } else {
                self.post(dest, tag::SCATTER, value)?;
            }
        }
        own.ok_or(CommError::InvalidRank {
            rank: root,
            size: self.size(),
        })
    }

    /// Elementwise reduction of `send` into `recv` on `root`
    ///
    /// `recv` is only written on `root`.
    pub fn reduce<T: Reducible>(
        &self,
        send: &[T],
        recv: &mut [T],
        root: usize,
        op: ReduceOp,
    ) -> Result<()> {
        let gathered = self.gather_tagged(send.to_vec(), root, tag::REDUCE)?;
        if let Some(contributions) = gathered {
            if recv.len() != send.len() {
                return Err(CommError::LengthMismatch {
                    expected: send.len(),
                    actual: recv.len(),
                });
            }
            let mut parts = contributions.into_iter();
            let mut acc = parts.next().unwrap_or_default();
            for part in parts {
                combine_into(&mut acc, &part, op)?;
            }
            recv.copy_from_slice(&acc);
        }
        Ok(())
    }

    /// Elementwise reduction whose result every rank receives
    pub fn all_reduce<T: Reducible>(&self, send: &[T], op: ReduceOp) -> Result<Vec<T>> {
        let mut recv = send.to_vec();
        self.reduce(send, &mut recv, 0, op)?;
        self.broadcast(recv, 0)
    }

    /// Scalar convenience form of [`all_reduce`](Self::all_reduce)
    pub fn all_reduce_scalar<T: Reducible>(&self, value: T, op: ReduceOp) -> Result<T> {
        let reduced = self.all_reduce(&[value], op)?;
        reduced.first().copied().ok_or(CommError::LengthMismatch {
            expected: 1,
            actual: 0,
        })
    }

    /// Partition the group by `color`
    ///
    /// Members passing the same `Some(color)` form a new group ordered by
    /// `(key, parent rank)`. Members passing `None` get `None` back. Every
    /// member must call `split`.
    pub fn split(&self, color: Option<u32>, key: u32) -> Result<Option<PartitionManager>> {
        let seq = self.splits.fetch_add(1, Ordering::Relaxed);
        let entries = self.all_gather_tagged((color, key))?;

        let Some(color) = color else {
            return Ok(None);
        };

        let mut group: Vec<(u32, usize)> = entries
            .iter()
            .enumerate()
            .filter(|(_, (c, _))| *c == Some(color))
            .map(|(parent, &(_, k))| (k, parent))
            .collect();
        group.sort_unstable();

        let members: Arc<[usize]> = group.iter().map(|&(_, parent)| self.members[parent]).collect();
        let rank = group
            .iter()
            .position(|&(_, parent)| parent == self.rank)
            .ok_or(CommError::InvalidRank {
                rank: self.rank,
                size: group.len(),
            })?;
        let context = mix(self.context ^ mix(seq) ^ mix(u64::from(color) << 32 | 0x5eed));

        tracing::debug!(
            parent_context = self.context,
            context,
            color,
            rank,
            size = members.len(),
            "communicator split"
        );

        Ok(Some(PartitionManager {
            transport: Arc::clone(&self.transport),
            context,
            members,
            rank,
            splits: Arc::new(AtomicU64::new(0)),
        }))
    }

    fn all_gather_tagged<T: Clone + Send + 'static>(&self, value: T) -> Result<Vec<T>> {
        let gathered = self.gather_tagged(value, 0, tag::SPLIT)?;
        if self.rank == 0 {
            let values = gathered.unwrap_or_default();
            for dest in 1..self.size() {
                self.post(dest, tag::SPLIT, values.clone())?;
            }
            Ok(values)
        } else {
            self.fetch(0, tag::SPLIT)
        }
    }
}
