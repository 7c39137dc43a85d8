//! Metrics engine implementation

use crate::metric::{metric_key, Metric, MetricKind, Tag};
use crate::{Histogram, Snapshot};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Default histogram bucket boundaries (in microseconds)
pub const DEFAULT_BUCKETS: [f64; 9] = [
    10.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0,
];

/// Source of point-in-time snapshots.
///
/// Called from the flush task at arbitrary frequency, so implementations must
/// be cheap and must not block for long.
pub trait SnapshotSource: Send + Sync {
    /// Take a snapshot of all known metrics
    fn snapshot(&self) -> Snapshot;
}

impl<T: SnapshotSource + ?Sized> SnapshotSource for Arc<T> {
    fn snapshot(&self) -> Snapshot {
        (**self).snapshot()
    }
}

/// A counter or gauge series
struct Series {
    template: Metric,
    state: Mutex<(f64, u64)>,
}

impl Series {
    fn new(kind: MetricKind, name: &str, tags: &[Tag]) -> Self {
        Self {
            template: Metric::new(kind, name, tags.to_vec()),
            state: Mutex::new((0.0, 0)),
        }
    }

    fn to_metric(&self) -> Metric {
        let (value, sample) = *self.state.lock();
        self.template.clone().with_value(value).with_sample(sample)
    }
}

/// Thread-safe metrics storage
pub struct Engine {
    /// Counter series
    counters: RwLock<HashMap<String, Arc<Series>>>,
    /// Gauge series
    gauges: RwLock<HashMap<String, Arc<Series>>>,
    /// Histogram series
    histograms: RwLock<HashMap<String, Arc<Histogram>>>,
    /// Bucket boundaries for new histograms
    buckets: Vec<f64>,
}

impl Engine {
    /// Create a new engine with the default histogram buckets
    pub fn new() -> Self {
        Self::with_buckets(&DEFAULT_BUCKETS)
    }

    /// Create a new engine with custom histogram buckets
    pub fn with_buckets(buckets: &[f64]) -> Self {
        let mut buckets = buckets.to_vec();
        buckets.sort_by(|a, b| a.total_cmp(b));
        Self {
            counters: RwLock::new(HashMap::new()),
            gauges: RwLock::new(HashMap::new()),
            histograms: RwLock::new(HashMap::new()),
            buckets,
        }
    }

    /// Increment a counter. Non-finite deltas are dropped.
    pub fn incr(&self, name: &str, tags: &[Tag], delta: f64) {
        if !accept(name, delta) {
            return;
        }
        let series = Self::series(&self.counters, MetricKind::Counter, name, tags);
        let mut state = series.state.lock();
        state.0 += delta;
        state.1 += 1;
    }

    /// Set a gauge value. Non-finite values are dropped.
    pub fn set(&self, name: &str, tags: &[Tag], value: f64) {
        if !accept(name, value) {
            return;
        }
        let series = Self::series(&self.gauges, MetricKind::Gauge, name, tags);
        let mut state = series.state.lock();
        state.0 = value;
        state.1 += 1;
    }

    /// Record a histogram observation. Non-finite values are dropped.
    pub fn observe(&self, name: &str, tags: &[Tag], value: f64) {
        if !accept(name, value) {
            return;
        }
        let key = metric_key(name, tags);

        let histograms = self.histograms.read();
        if let Some(h) = histograms.get(&key) {
            h.observe(value);
            return;
        }
        drop(histograms);

        let mut histograms = self.histograms.write();
        let h = histograms
            .entry(key)
            .or_insert_with(|| Arc::new(Histogram::new(name, tags.to_vec(), &self.buckets)));
        h.observe(value);
    }

    /// Get counter value
    pub fn get_counter(&self, name: &str, tags: &[Tag]) -> Option<f64> {
        self.counters
            .read()
            .get(&metric_key(name, tags))
            .map(|s| s.state.lock().0)
    }

    /// Get gauge value
    pub fn get_gauge(&self, name: &str, tags: &[Tag]) -> Option<f64> {
        self.gauges
            .read()
            .get(&metric_key(name, tags))
            .map(|s| s.state.lock().0)
    }

    /// Get histogram mean
    pub fn get_histogram_mean(&self, name: &str, tags: &[Tag]) -> Option<f64> {
        self.histograms
            .read()
            .get(&metric_key(name, tags))
            .map(|h| h.mean())
    }

    fn series(
        map: &RwLock<HashMap<String, Arc<Series>>>,
        kind: MetricKind,
        name: &str,
        tags: &[Tag],
    ) -> Arc<Series> {
        let key = metric_key(name, tags);

        if let Some(s) = map.read().get(&key) {
            return Arc::clone(s);
        }

        let mut map = map.write();
        let s = map
            .entry(key)
            .or_insert_with(|| Arc::new(Series::new(kind, name, tags)));
        Arc::clone(s)
    }
}

fn accept(name: &str, value: f64) -> bool {
    if value.is_finite() {
        return true;
    }
    tracing::debug!("Dropping non-finite value {} for metric {}", value, name);
    false
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotSource for Engine {
    fn snapshot(&self) -> Snapshot {
        let mut metrics = Vec::new();
        metrics.extend(self.counters.read().values().map(|s| s.to_metric()));
        metrics.extend(self.gauges.read().values().map(|s| s.to_metric()));
        for h in self.histograms.read().values() {
            metrics.extend(h.members());
        }
        Snapshot::from_metrics(metrics)
    }
}

static DEFAULT_ENGINE: OnceLock<Arc<Engine>> = OnceLock::new();

/// Process-wide shared engine
pub fn default_engine() -> Arc<Engine> {
    Arc::clone(DEFAULT_ENGINE.get_or_init(|| {
        tracing::debug!("Initializing default metrics engine");
        Arc::new(Engine::new())
    }))
}
