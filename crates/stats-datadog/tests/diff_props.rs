//! Property tests for the snapshot differ

use proptest::prelude::*;
use stats_datadog::diff;
use stats_engine::{Metric, MetricKind, Snapshot};

fn counter(i: usize, value: u32, sample: u32) -> Metric {
    Metric::new(MetricKind::Counter, format!("c{}", i), vec![])
        .with_value(value as f64)
        .with_sample(sample as u64)
}

fn gauge(i: usize, value: i32, sample: u32) -> Metric {
    Metric::new(MetricKind::Gauge, format!("g{}", i), vec![])
        .with_value(value as f64)
        .with_sample(sample as u64)
}

fn member(bucket: usize, value: u32, sample: u32) -> Metric {
    let mut m = Metric::new(MetricKind::Histogram, "h", vec![])
        .with_key(format!("h|le={}", bucket))
        .with_value(value as f64)
        .with_sample(sample as u64);
    m.group = "h".to_string();
    m
}

fn shared_counter(i: usize, value: u32, sample: u32) -> Metric {
    Metric::new(MetricKind::Counter, format!("m{}", i), vec![])
        .with_value(value as f64)
        .with_sample(sample as u64)
}

fn shared_gauge(i: usize, value: i32, sample: u32) -> Metric {
    Metric::new(MetricKind::Gauge, format!("m{}", i), vec![])
        .with_value(value as f64)
        .with_sample(sample as u64)
}

proptest! {
    #[test]
    fn counters_report_exact_deltas(
        pairs in proptest::collection::vec((0u32..10_000, 0u32..10_000, 1u32..100, 1u32..100), 1..30)
    ) {
        let old: Snapshot = pairs.iter().enumerate().map(|(i, (v, _, s, _))| counter(i, *v, *s)).collect();
        let new: Snapshot = pairs.iter().enumerate().map(|(i, (v0, dv, s, ds))| counter(i, v0 + dv, s + ds)).collect();

        let (_, changes) = diff(&old, new);
        prop_assert_eq!(changes.len(), pairs.len());
        for (i, (_, dv, _, _)) in pairs.iter().enumerate() {
            let m = changes.get(MetricKind::Counter, &format!("c{}", i)).unwrap();
            prop_assert_eq!(m.value, *dv as f64);
            prop_assert_eq!(m.sample, 0);
        }
    }

    #[test]
    fn new_metrics_report_raw_values(
        values in proptest::collection::vec((0u32..10_000, -10_000i32..10_000, 1u32..100), 1..30)
    ) {
        let mut new = Snapshot::new();
        for (i, (c, g, s)) in values.iter().enumerate() {
            new.push(counter(i, *c, *s));
            new.push(gauge(i, *g, *s));
        }

        let (_, changes) = diff(&Snapshot::new(), new);
        for (i, (c, g, _)) in values.iter().enumerate() {
            prop_assert_eq!(changes.get(MetricKind::Counter, &format!("c{}", i)).unwrap().value, *c as f64);
            prop_assert_eq!(changes.get(MetricKind::Gauge, &format!("g{}", i)).unwrap().value, *g as f64);
        }
    }

    #[test]
    fn unchanged_sample_means_no_change(
        values in proptest::collection::vec((0u32..10_000, 0u32..10_000, 0u32..100), 1..30)
    ) {
        let old: Snapshot = values.iter().enumerate()
            .flat_map(|(i, (a, _, s))| vec![counter(i, *a, *s), gauge(i, *a as i32, *s), member(i, *a, *s)])
            .collect();
        let new: Snapshot = values.iter().enumerate()
            .flat_map(|(i, (_, b, s))| vec![counter(i, *b, *s), gauge(i, *b as i32, *s), member(i, *b, *s)])
            .collect();

        let (_, changes) = diff(&old, new);
        prop_assert!(changes.is_empty());
    }

    #[test]
    fn counter_delta_ignores_gauge_with_same_key(
        pairs in proptest::collection::vec((0u32..10_000, 1u32..10_000, -10_000i32..10_000, 1u32..100), 1..30)
    ) {
        let old: Snapshot = pairs.iter().enumerate()
            .flat_map(|(i, (c, _, g, s))| vec![shared_counter(i, *c, *s), shared_gauge(i, *g, *s)])
            .collect();
        let new: Snapshot = pairs.iter().enumerate()
            .flat_map(|(i, (c, dc, g, s))| vec![shared_counter(i, c + dc, s + 1), shared_gauge(i, *g, *s)])
            .collect();

        let (_, changes) = diff(&old, new);
        prop_assert_eq!(changes.len(), pairs.len());
        for (i, (_, dc, _, _)) in pairs.iter().enumerate() {
            let key = format!("m{}", i);
            prop_assert_eq!(changes.get(MetricKind::Counter, &key).unwrap().value, *dc as f64);
            prop_assert!(changes.get(MetricKind::Gauge, &key).is_none());
        }
    }

    #[test]
    fn histogram_average_is_weighted_by_samples(
        members in proptest::collection::vec((0u32..10_000, 1u32..100), 1..20)
    ) {
        let new: Snapshot = members.iter().enumerate().map(|(i, (v, s))| member(i, *v, *s)).collect();

        let sum: f64 = members.iter().map(|(v, _)| *v as f64).sum();
        let weight: u64 = members.iter().map(|(_, s)| *s as u64).sum();

        let (_, changes) = diff(&Snapshot::new(), new);
        prop_assert_eq!(changes.len(), 1);
        let avg = changes.get(MetricKind::Histogram, "h").unwrap();
        prop_assert!((avg.value - sum / weight as f64).abs() < 1e-9);
        prop_assert_eq!(avg.sample, weight);
    }
}
