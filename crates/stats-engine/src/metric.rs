//! Metric records shared by the engine, the differ and the encoders

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a metric, selects how changes are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Monotonic count, forwarded as a delta
    Counter,
    /// Current value, forwarded as is
    Gauge,
    /// Sampled distribution, forwarded as a weighted average per group
    Histogram,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Counter => write!(f, "counter"),
            MetricKind::Gauge => write!(f, "gauge"),
            MetricKind::Histogram => write!(f, "histogram"),
        }
    }
}

/// A `name:value` tag attached to a metric
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name
    pub name: String,
    /// Tag value
    pub value: String,
}

impl Tag {
    /// Create a new tag
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.value)
    }
}

/// One observed value at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Metric kind
    pub kind: MetricKind,
    /// Identity of this metric instance within its kind, stable across snapshots
    pub key: String,
    /// Aggregation group, shared by the members of one histogram
    pub group: String,
    /// Metric name
    pub name: String,
    /// Metric tags
    pub tags: Vec<Tag>,
    /// Measured value
    pub value: f64,
    /// Number of observations the value represents, `0` for exact values
    pub sample: u64,
}

impl Metric {
    /// Create a metric keyed by its name and tags, with a zero value
    pub fn new(kind: MetricKind, name: impl Into<String>, tags: Vec<Tag>) -> Self {
        let name = name.into();
        let key = metric_key(&name, &tags);
        Self {
            kind,
            group: key.clone(),
            key,
            name,
            tags,
            value: 0.0,
            sample: 0,
        }
    }

    /// Set the value
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    /// Set the sample count
    pub fn with_sample(mut self, sample: u64) -> Self {
        self.sample = sample;
        self
    }

    /// Override the identity key, keeping the group
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}

/// Build the identity key of a metric from its name and tags.
///
/// Tags are sorted so the key does not depend on the order callers pass them in.
pub fn metric_key(name: &str, tags: &[Tag]) -> String {
    if tags.is_empty() {
        return name.to_string();
    }

    let mut sorted: Vec<&Tag> = tags.iter().collect();
    sorted.sort();

    let mut key = String::with_capacity(name.len() + tags.len() * 16);
    key.push_str(name);
    for (i, tag) in sorted.iter().enumerate() {
        key.push(if i == 0 { '#' } else { ',' });
        key.push_str(&tag.name);
        key.push(':');
        key.push_str(&tag.value);
    }
    key
}
