//! Flush loop
//!
//! One task per client. On every tick it pulls a snapshot from the source,
//! diffs it against the baseline, writes the changes and keeps the new
//! snapshot as the next baseline. On shutdown it runs one last flush so the
//! changes accumulated since the previous tick are not lost.

use crate::codec::Encoder;
use crate::diff::diff;
use crate::sink::{Sink, UdpSink};
use crate::writer::FrameWriter;
use stats_engine::{Snapshot, SnapshotSource};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

/// Background flush task state
pub(crate) struct FlushLoop {
    source: Arc<dyn SnapshotSource>,
    writer: FrameWriter,
    sink: Option<Box<dyn Sink>>,
    address: String,
    interval: Duration,
}

impl FlushLoop {
    pub(crate) fn new(
        source: Arc<dyn SnapshotSource>,
        encoder: Box<dyn Encoder>,
        sink: Option<Box<dyn Sink>>,
        address: String,
        buffer_size: usize,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            writer: FrameWriter::with_encoder(buffer_size, encoder),
            sink,
            address,
            interval,
        }
    }

    /// Run until `shutdown` flips to `true` or its sender goes away.
    pub(crate) async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut sink: Box<dyn Sink> = match self.sink.take() {
            Some(sink) => sink,
            None => match UdpSink::connect(&self.address).await {
                Ok(sink) => Box::new(sink),
                Err(e) => {
                    error!("Metrics client stopped, cannot open sink for {}: {}", self.address, e);
                    return;
                }
            },
        };

        info!("Metrics flush loop started, interval {:?}", self.interval);

        let mut baseline = Snapshot::new();
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("Metrics flush loop draining");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    baseline = self.flush(sink.as_mut(), &baseline).await;
                }
            }
        }

        self.flush(sink.as_mut(), &baseline).await;

        if let Err(e) = sink.close().await {
            debug!("Error closing metrics sink: {}", e);
        }
        info!("Metrics flush loop stopped");
    }

    /// One diff + write cycle, returns the new baseline
    async fn flush(&mut self, sink: &mut dyn Sink, baseline: &Snapshot) -> Snapshot {
        let (next, changes) = diff(baseline, self.source.snapshot());
        if !changes.is_empty() {
            let writes = self.writer.write(sink, &changes).await;
            debug!("Flushed {} metric changes in {} writes", changes.len(), writes);
        }
        next
    }
}
