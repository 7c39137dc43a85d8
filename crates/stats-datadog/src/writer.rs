//! Frame buffer writer
//!
//! Packs encoded metrics into frames no larger than the configured capacity
//! and hands each frame to the sink as a single write.

use crate::codec::{DogStatsdEncoder, Encoder};
use crate::sink::Sink;
use bytes::BytesMut;
use stats_engine::ChangeSet;
use tracing::debug;

/// Initial size of the per-metric scratch buffer
pub const SCRATCH_SIZE: usize = 1024;

/// Reusable encoder state for one flush task
pub struct FrameWriter {
    encoder: Box<dyn Encoder>,
    /// Encoding of the current metric
    scratch: BytesMut,
    /// Pending frame
    frame: BytesMut,
    /// Frame capacity in bytes, independent of the allocation size
    capacity: usize,
}

impl FrameWriter {
    /// Create a writer using the DogStatsD encoder
    pub fn new(capacity: usize) -> Self {
        Self::with_encoder(capacity, Box::new(DogStatsdEncoder))
    }

    /// Create a writer using a custom encoder
    pub fn with_encoder(capacity: usize, encoder: Box<dyn Encoder>) -> Self {
        Self {
            encoder,
            scratch: BytesMut::with_capacity(SCRATCH_SIZE),
            frame: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    /// Frame capacity in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Encode `changes` and write them to `sink`.
    ///
    /// Each metric ends up in exactly one write. A metric whose encoding alone
    /// exceeds the capacity is written on its own and is likely to be dropped
    /// by a datagram transport. Write failures are logged and ignored.
    ///
    /// Returns the number of writes issued.
    pub async fn write<S: Sink + ?Sized>(&mut self, sink: &mut S, changes: &ChangeSet) -> usize {
        let mut writes = 0;

        for metric in changes.iter() {
            self.scratch.clear();
            self.encoder.encode(&mut self.scratch, metric);

            if self.scratch.len() > self.capacity {
                debug!(
                    "Metric {} encodes to {} bytes, above the {} byte frame capacity",
                    metric.name,
                    self.scratch.len(),
                    self.capacity
                );
                send(sink, &self.scratch).await;
                writes += 1;
                continue;
            }

            if self.frame.len() + self.scratch.len() > self.capacity {
                send(sink, &self.frame).await;
                writes += 1;
                self.frame.clear();
            }

            self.frame.extend_from_slice(&self.scratch);
        }

        if !self.frame.is_empty() {
            send(sink, &self.frame).await;
            writes += 1;
            self.frame.clear();
        }

        writes
    }
}

async fn send<S: Sink + ?Sized>(sink: &mut S, bytes: &[u8]) {
    if let Err(e) = sink.write(bytes).await {
        debug!("Dropped {} byte frame: {}", bytes.len(), e);
    }
}
