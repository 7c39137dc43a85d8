//! Snapshot differ
//!
//! Reduces two consecutive engine snapshots to the set of metrics that must be
//! forwarded:
//!
//! - counters are reported as the delta since the previous snapshot
//! - gauges are reported as is
//! - histogram members are grouped and reported as one sample-weighted
//!   average per group
//!
//! A metric counts as unchanged when its `sample` did not move since the
//! previous snapshot. The value is never compared: this is a cheap proxy for
//! "no new observation arrived" and it decides which histogram members take
//! part in an aggregate.

use stats_engine::{ChangeSet, Metric, MetricKind, Snapshot};
use std::collections::HashMap;
use tracing::debug;

/// Compute the changes between `previous` and `current`.
///
/// Returns `current` as the new baseline together with the change set.
/// Metrics are matched on `(kind, key)`, so a counter and a gauge sharing a
/// key never stand in for each other. Duplicates in `previous` resolve to the
/// last occurrence.
pub fn diff(previous: &Snapshot, current: Snapshot) -> (Snapshot, ChangeSet) {
    let mut changes = ChangeSet::with_capacity(current.len());

    let baseline: HashMap<(MetricKind, &str), &Metric> = previous
        .iter()
        .map(|m| ((m.kind, m.key.as_str()), m))
        .collect();
    let mut groups: HashMap<&str, Vec<&Metric>> = HashMap::new();

    for m in current.iter() {
        let prev = baseline.get(&(m.kind, m.key.as_str())).copied();

        if let Some(prev) = prev {
            if prev.sample == m.sample {
                continue;
            }
        }

        match m.kind {
            MetricKind::Counter => {
                let base = prev.map(|p| p.value).unwrap_or(0.0);
                changes.insert(m.clone().with_value(m.value - base).with_sample(0));
            }
            MetricKind::Gauge => {
                changes.insert(m.clone().with_sample(0));
            }
            MetricKind::Histogram => {
                groups.entry(m.group.as_str()).or_default().push(m);
            }
        }
    }

    for (group, members) in groups {
        if let Some(avg) = aggregate(group, &members) {
            changes.insert(avg);
        }
    }

    (current, changes)
}

/// Weighted average of the changed members of one histogram group.
///
/// Groups with no sample weight are skipped instead of producing NaN.
fn aggregate(group: &str, members: &[&Metric]) -> Option<Metric> {
    let first = members.first()?;

    let (sum, sample) = members
        .iter()
        .fold((0.0, 0u64), |(sum, sample), m| (sum + m.value, sample + m.sample));

    if sample == 0 {
        debug!("Skipping histogram {} with no sample weight", group);
        return None;
    }

    Some(Metric {
        kind: MetricKind::Histogram,
        key: group.to_string(),
        group: group.to_string(),
        name: first.name.clone(),
        tags: first.tags.clone(),
        value: sum / sample as f64,
        sample,
    })
}
