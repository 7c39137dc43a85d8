//! # stats-engine
//!
//! In-process metrics collection for statsfwd.
//!
//! Features:
//! - Counters, gauges and bucketed histograms keyed by name and tags
//! - Point-in-time [`Snapshot`]s pulled through [`SnapshotSource`]
//! - Unordered [`ChangeSet`]s for what must be forwarded on a tick
//! - A process-wide default engine
//!
//! ## Usage
//!
//! ```
//! use stats_engine::{Engine, SnapshotSource, Tag};
//!
//! let engine = Engine::new();
//! engine.incr("requests", &[Tag::new("route", "index")], 1.0);
//! engine.set("connections", &[], 12.0);
//! engine.observe("latency", &[], 250.0);
//!
//! let snapshot = engine.snapshot();
//! assert_eq!(snapshot.len(), 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod changes;
mod engine;
mod histogram;
mod metric;
mod snapshot;

pub use changes::ChangeSet;
pub use engine::{default_engine, Engine, SnapshotSource, DEFAULT_BUCKETS};
pub use histogram::Histogram;
pub use metric::{metric_key, Metric, MetricKind, Tag};
pub use snapshot::Snapshot;

/// Macro for timing a block of code into a histogram (microseconds)
#[macro_export]
macro_rules! timed {
    ($engine:expr, $name:expr, $tags:expr, $block:block) => {{
        let start = std::time::Instant::now();
        let result = $block;
        $engine.observe($name, $tags, start.elapsed().as_micros() as f64);
        result
    }};
}
