//! # stats-datadog
//!
//! Forwards the state of a metrics engine to a DogStatsD agent.
//!
//! This crate provides:
//! - A snapshot differ turning two engine snapshots into a change set
//! - A frame writer packing encoded changes into datagram-sized writes
//! - A background flush loop and the [`Client`] handle that owns it
//! - UDP, writer-backed and in-memory sinks
//!
//! ## Architecture
//!
//! ```text
//! +-------------------+
//! |      Client       |  <- Lifecycle, close()
//! +-------------------+
//!          |
//! +-------------------+
//! |    Flush loop     |  <- tick / shutdown
//! +-------------------+
//!     |          |
//! +--------+ +--------+
//! |  diff  | | writer |  <- change set -> frames
//! +--------+ +--------+
//!                |
//!           +--------+
//!           |  Sink  |  <- UDP socket
//!           +--------+
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use stats_datadog::{Client, ClientConfig};
//! use stats_engine::default_engine;
//!
//! let client = Client::new(ClientConfig::new("127.0.0.1:8125"));
//! default_engine().incr("jobs.done", &[], 1.0);
//!
//! // flush pending changes and release the socket
//! client.close().await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod client;
mod codec;
mod config;
mod diff;
mod error;
mod flush;
mod sink;
mod writer;

pub use client::{Client, ClientBuilder, ClientState};
pub use codec::{decode_frame, decode_metric, encode_metric, DogStatsdEncoder, Encoder};
pub use config::{ClientConfig, DEFAULT_ADDRESS, DEFAULT_BUFFER_SIZE, DEFAULT_FLUSH_INTERVAL};
pub use diff::diff;
pub use error::{ClientError, ClientResult};
pub use sink::{MemorySink, Sink, UdpSink, WriterSink};
pub use writer::{FrameWriter, SCRATCH_SIZE};
