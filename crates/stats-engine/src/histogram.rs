//! Bucketed histogram reported as one snapshot member per bucket

use crate::metric::{metric_key, Metric, MetricKind, Tag};
use parking_lot::Mutex;

#[derive(Debug, Default, Clone, Copy)]
struct Bucket {
    sum: f64,
    count: u64,
}

/// Histogram for tracking value distributions.
///
/// Every bucket is exposed as its own member metric sharing the histogram's
/// group, so readers can aggregate only the buckets that received new
/// observations.
pub struct Histogram {
    name: String,
    tags: Vec<Tag>,
    group: String,
    /// Bucket upper boundaries, ascending
    bounds: Vec<f64>,
    /// One slot per boundary plus the overflow slot
    buckets: Vec<Mutex<Bucket>>,
}

impl Histogram {
    /// Create a histogram with the given ascending bucket boundaries
    pub fn new(name: impl Into<String>, tags: Vec<Tag>, bounds: &[f64]) -> Self {
        let name = name.into();
        let group = metric_key(&name, &tags);
        let buckets = (0..=bounds.len())
            .map(|_| Mutex::new(Bucket::default()))
            .collect();
        Histogram {
            name,
            tags,
            group,
            bounds: bounds.to_vec(),
            buckets,
        }
    }

    /// Record a value, ignoring NaN and infinities
    pub fn observe(&self, value: f64) {
        if !value.is_finite() {
            return;
        }
        let index = self
            .bounds
            .iter()
            .position(|bound| value <= *bound)
            .unwrap_or(self.bounds.len());

        let mut bucket = self.buckets[index].lock();
        bucket.sum += value;
        bucket.count += 1;
    }

    /// Get mean value over all observations
    pub fn mean(&self) -> f64 {
        let (sum, count) = self.buckets.iter().fold((0.0, 0u64), |(s, c), b| {
            let b = b.lock();
            (s + b.sum, c + b.count)
        });
        if count == 0 {
            return 0.0;
        }
        sum / count as f64
    }

    /// Get total count
    pub fn total_count(&self) -> u64 {
        self.buckets.iter().map(|b| b.lock().count).sum()
    }

    /// Group key shared by all members
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Members for every bucket that has seen at least one observation
    pub fn members(&self) -> Vec<Metric> {
        self.buckets
            .iter()
            .enumerate()
            .filter_map(|(i, bucket)| {
                let bucket = *bucket.lock();
                if bucket.count == 0 {
                    return None;
                }
                let bound = match self.bounds.get(i) {
                    Some(bound) => bound.to_string(),
                    None => "+Inf".to_string(),
                };
                Some(
                    Metric::new(MetricKind::Histogram, self.name.clone(), self.tags.clone())
                        .with_key(format!("{}|le={}", self.group, bound))
                        .with_value(bucket.sum)
                        .with_sample(bucket.count),
                )
            })
            .collect()
    }
}
