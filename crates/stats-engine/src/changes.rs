//! Unordered sets of metric changes

use crate::{Metric, MetricKind};

/// The metrics that must be forwarded for one tick.
///
/// A change set has no meaningful order: aggregated entries are produced from
/// hash-map iteration, so the type only offers iteration and lookup by
/// `(kind, key)`, never positional access.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    metrics: Vec<Metric>,
}

impl ChangeSet {
    /// Create an empty change set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty change set with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            metrics: Vec::with_capacity(capacity),
        }
    }

    /// Add a change
    pub fn insert(&mut self, metric: Metric) {
        self.metrics.push(metric);
    }

    /// Number of changes
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Whether there is nothing to forward
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Iterate over the changes in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &Metric> {
        self.metrics.iter()
    }

    /// Find the change for a metric of `kind` keyed `key`
    pub fn get(&self, kind: MetricKind, key: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.kind == kind && m.key == key)
    }

    /// Whether a change exists for `(kind, key)`
    pub fn contains(&self, kind: MetricKind, key: &str) -> bool {
        self.get(kind, key).is_some()
    }
}

impl FromIterator<Metric> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = Metric>>(iter: I) -> Self {
        Self {
            metrics: iter.into_iter().collect(),
        }
    }
}

impl Extend<Metric> for ChangeSet {
    fn extend<I: IntoIterator<Item = Metric>>(&mut self, iter: I) {
        self.metrics.extend(iter);
    }
}

impl IntoIterator for ChangeSet {
    type Item = Metric;
    type IntoIter = std::vec::IntoIter<Metric>;

    fn into_iter(self) -> Self::IntoIter {
        self.metrics.into_iter()
    }
}
