//! Point-in-time snapshots of the engine state

use crate::{Metric, MetricKind};
use serde::{Deserialize, Serialize};

/// Snapshot of all metrics at a point in time.
///
/// A metric is identified by its kind and key, so a counter and a gauge may
/// share a key. Identities are expected to be unique within one snapshot.
/// When they are not, lookups return the last matching entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    metrics: Vec<Metric>,
}

impl Snapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a snapshot from a list of metrics
    pub fn from_metrics(metrics: Vec<Metric>) -> Self {
        Self { metrics }
    }

    /// Append a metric
    pub fn push(&mut self, metric: Metric) {
        self.metrics.push(metric);
    }

    /// Number of metrics
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Whether the snapshot holds no metrics
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Iterate over the metrics in snapshot order
    pub fn iter(&self) -> std::slice::Iter<'_, Metric> {
        self.metrics.iter()
    }

    /// Borrow the metrics
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Find a metric by key regardless of kind (last match wins)
    pub fn get(&self, key: &str) -> Option<&Metric> {
        self.metrics.iter().rev().find(|m| m.key == key)
    }

    /// Find a metric by kind and key (last match wins)
    pub fn find(&self, kind: MetricKind, key: &str) -> Option<&Metric> {
        self.metrics
            .iter()
            .rev()
            .find(|m| m.kind == kind && m.key == key)
    }

    /// Export snapshot as JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export snapshot as compact JSON string
    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl FromIterator<Metric> for Snapshot {
    fn from_iter<I: IntoIterator<Item = Metric>>(iter: I) -> Self {
        Self::from_metrics(iter.into_iter().collect())
    }
}

impl IntoIterator for Snapshot {
    type Item = Metric;
    type IntoIter = std::vec::IntoIter<Metric>;

    fn into_iter(self) -> Self::IntoIter {
        self.metrics.into_iter()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Metric;
    type IntoIter = std::slice::Iter<'a, Metric>;

    fn into_iter(self) -> Self::IntoIter {
        self.metrics.iter()
    }
}
