//! Message transport between ranks
//!
//! A transport moves type-erased payloads between world ranks. Messages are
//! matched on `(context, source, tag)`; messages with the same key from the
//! same source are delivered in the order they were sent.

use crate::error::{CommError, Result};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Type-erased message body
pub type Payload = Box<dyn Any + Send>;

/// A routed message
pub struct Envelope {
    /// Communicator the message belongs to
    pub context: u64,
    /// World rank of the sender
    pub source: usize,
    /// Collective or point-to-point tag
    pub tag: u32,
    pub payload: Payload,
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("context", &self.context)
            .field("source", &self.source)
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

/// Point-to-point delivery between world ranks
pub trait Transport: Send + Sync {
    /// This endpoint's world rank
    fn world_rank(&self) -> usize;

    /// Number of world ranks
    fn world_size(&self) -> usize;

    /// Deliver an envelope to `dest` without blocking
    fn send(&self, dest: usize, envelope: Envelope) -> Result<()>;

    /// Block until a message matching `(context, source, tag)` arrives
    fn recv(&self, context: u64, source: usize, tag: u32) -> Result<Payload>;
}

/// How often a blocked receiver re-checks peer liveness
const LIVENESS_POLL: Duration = Duration::from_millis(20);

/// In-process transport: one crossbeam channel per rank
pub struct ChannelTransport {
    rank: usize,
    senders: Vec<Sender<Envelope>>,
    receiver: Receiver<Envelope>,
    /// Messages that arrived before anyone asked for them
    pending: Mutex<VecDeque<Envelope>>,
    alive: Arc<[AtomicBool]>,
}

impl ChannelTransport {
    /// Build a fully connected set of `size` endpoints, indexed by rank
    pub fn mesh(size: usize) -> Vec<ChannelTransport> {
        let (senders, receivers): (Vec<_>, Vec<_>) = (0..size).map(|_| unbounded()).unzip();
        let alive: Arc<[AtomicBool]> = (0..size).map(|_| AtomicBool::new(true)).collect();

        receivers
            .into_iter()
            .enumerate()
            .map(|(rank, receiver)| ChannelTransport {
                rank,
                senders: senders.clone(),
                receiver,
                pending: Mutex::new(VecDeque::new()),
                alive: Arc::clone(&alive),
            })
            .collect()
    }

    /// Mark this endpoint as gone; peers blocked on it fail with `Disconnected`
    pub fn depart(&self) {
        self.alive[self.rank].store(false, Ordering::Release);
    }

    fn is_alive(&self, rank: usize) -> bool {
        self.alive[rank].load(Ordering::Acquire)
    }

    fn take_pending(&self, context: u64, source: usize, tag: u32) -> Option<Payload> {
        let mut pending = self.pending.lock();
        let pos = pending
            .iter()
            .position(|e| e.context == context && e.source == source && e.tag == tag)?;
        pending.remove(pos).map(|e| e.payload)
    }
}

impl Transport for ChannelTransport {
    fn world_rank(&self) -> usize {
        self.rank
    }

    fn world_size(&self) -> usize {
        self.senders.len()
    }

    fn send(&self, dest: usize, envelope: Envelope) -> Result<()> {
        let sender = self.senders.get(dest).ok_or(CommError::InvalidRank {
            rank: dest,
            size: self.senders.len(),
        })?;
        if !self.is_alive(dest) {
            return Err(CommError::Disconnected { rank: dest });
        }
        sender
            .send(envelope)
            .map_err(|_| CommError::Disconnected { rank: dest })
    }

    fn recv(&self, context: u64, source: usize, tag: u32) -> Result<Payload> {
        if source >= self.senders.len() {
            return Err(CommError::InvalidRank {
                rank: source,
                size: self.senders.len(),
            });
        }
        if let Some(payload) = self.take_pending(context, source, tag) {
            return Ok(payload);
        }

        loop {
            match self.receiver.recv_timeout(LIVENESS_POLL) {
                Ok(envelope) => {
                    if envelope.context == context && envelope.source == source && envelope.tag == tag
                    {
                        return Ok(envelope.payload);
                    }
                    self.pending.lock().push_back(envelope);
                }
                Err(RecvTimeoutError::Timeout) => {
                    if !self.is_alive(source) {
                        // The peer may have sent before leaving.
                        while let Ok(envelope) = self.receiver.try_recv() {
                            self.pending.lock().push_back(envelope);
                        }
                        return self
                            .take_pending(context, source, tag)
                            .ok_or(CommError::Disconnected { rank: source });
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(CommError::Disconnected { rank: source });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(source: usize, tag: u32, value: i32) -> Envelope {
        Envelope {
            context: 0,
            source,
            tag,
            payload: Box::new(value),
        }
    }

    #[test]
    fn test_out_of_order_tags_are_buffered() {
        let mesh = ChannelTransport::mesh(2);
        mesh[0].send(1, envelope(0, 7, 70)).unwrap();
        mesh[0].send(1, envelope(0, 8, 80)).unwrap();

        let second = mesh[1].recv(0, 0, 8).unwrap();
        let first = mesh[1].recv(0, 0, 7).unwrap();
        assert_eq!(*second.downcast::<i32>().unwrap(), 80);
        assert_eq!(*first.downcast::<i32>().unwrap(), 70);
    }

    #[test]
    fn test_departed_peer_is_reported() {
        let mesh = ChannelTransport::mesh(2);
        mesh[0].depart();
        assert_eq!(
            mesh[1].recv(0, 0, 1).unwrap_err(),
            CommError::Disconnected { rank: 0 }
        );
        assert!(mesh[1].send(0, envelope(1, 1, 0)).is_err());
    }

    #[test]
    fn test_message_sent_before_departure_still_delivered() {
        let mesh = ChannelTransport::mesh(2);
        mesh[0].send(1, envelope(0, 3, 33)).unwrap();
        mesh[0].depart();
        let payload = mesh[1].recv(0, 0, 3).unwrap();
        assert_eq!(*payload.downcast::<i32>().unwrap(), 33);
    }

    #[test]
    fn test_invalid_rank() {
        let mesh = ChannelTransport::mesh(1);
        assert!(matches!(
            mesh[0].send(4, envelope(0, 0, 0)),
            Err(CommError::InvalidRank { rank: 4, size: 1 })
        ));
    }
}
