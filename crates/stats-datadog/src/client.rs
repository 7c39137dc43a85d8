//! Client handle owning the flush loop lifecycle

use crate::codec::{DogStatsdEncoder, Encoder};
use crate::config::ClientConfig;
use crate::flush::FlushLoop;
use crate::sink::Sink;
use stats_engine::{default_engine, SnapshotSource};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Lifecycle state of a [`Client`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// The flush loop is ticking
    Running,
    /// Shutdown was requested and the final flush is in progress
    Closing,
    /// The flush loop has terminated and released its sink
    Closed,
}

/// Handle to a background task forwarding engine snapshots to a collector.
///
/// Call [`Client::close`] before the handle goes away: it runs the final
/// flush and waits for it. Dropping an open client only requests shutdown and
/// lets the final flush happen in the background if the runtime is still alive.
pub struct Client {
    shutdown: watch::Sender<bool>,
    done: watch::Receiver<bool>,
}

impl Client {
    /// Start a client reading the default engine and sending over UDP.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn new(config: ClientConfig) -> Self {
        Self::builder(config).start()
    }

    /// Create a builder to override the sink, engine or encoder
    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    /// Stop the flush loop and wait for its final flush.
    ///
    /// Safe to call any number of times, from any number of tasks: only the
    /// first call starts the shutdown, and every call returns once the loop
    /// has terminated.
    pub async fn close(&self) {
        if !self.shutdown.send_replace(true) {
            debug!("Metrics client closing");
        }

        let mut done = self.done.clone();
        // the sender is dropped when the task ends, which counts as done too
        let _ = done.wait_for(|done| *done).await;
    }

    /// Await `future`, then close the client
    pub async fn close_after<F: Future>(self, future: F) -> F::Output {
        let output = future.await;
        self.close().await;
        output
    }

    /// Current lifecycle state
    pub fn state(&self) -> ClientState {
        if *self.done.borrow() || self.done.has_changed().is_err() {
            ClientState::Closed
        } else if *self.shutdown.borrow() {
            ClientState::Closing
        } else {
            ClientState::Running
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        if !self.shutdown.send_replace(true) {
            warn!("Metrics client dropped without close, pending metrics may be lost");
        }
    }
}

/// Builder for [`Client`]
pub struct ClientBuilder {
    config: ClientConfig,
    sink: Option<Box<dyn Sink>>,
    source: Option<Arc<dyn SnapshotSource>>,
    encoder: Option<Box<dyn Encoder>>,
}

impl ClientBuilder {
    /// Create a builder from a configuration
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            sink: None,
            source: None,
            encoder: None,
        }
    }

    /// Write frames to `sink` instead of opening a UDP socket
    pub fn sink(mut self, sink: impl Sink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Read snapshots from `source` instead of the default engine
    pub fn engine(mut self, source: impl SnapshotSource + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Encode metrics with `encoder` instead of DogStatsD text
    pub fn encoder(mut self, encoder: impl Encoder + 'static) -> Self {
        self.encoder = Some(Box::new(encoder));
        self
    }

    /// Spawn the flush loop and return its handle.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn start(self) -> Client {
        let config = self.config.normalized();
        let source: Arc<dyn SnapshotSource> = match self.source {
            Some(source) => source,
            None => default_engine(),
        };
        let encoder = self
            .encoder
            .unwrap_or_else(|| Box::new(DogStatsdEncoder));

        let flush = FlushLoop::new(
            source,
            encoder,
            self.sink,
            config.address,
            config.buffer_size,
            config.flush_interval,
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (done_tx, done_rx) = watch::channel(false);

        tokio::spawn(async move {
            flush.run(shutdown_rx).await;
            done_tx.send_replace(true);
        });

        Client {
            shutdown: shutdown_tx,
            done: done_rx,
        }
    }
}
