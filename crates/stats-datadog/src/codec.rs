//! DogStatsD text encoding and decoding.
//!
//! One metric is one line:
//!
//! ```text
//! <name>:<value>|<c|g|h>[|@<rate>][|#<tag>:<value>,...]\n
//! ```
//!
//! The rate is `1 / sample` and only written when a value stands for more
//! than one observation.

use bytes::{BufMut, BytesMut};
use stats_engine::{Metric, MetricKind, Tag};
use std::fmt::Write;

/// Serializes one metric into transport bytes
pub trait Encoder: Send + Sync {
    /// Append the encoding of `metric` to `buf`
    fn encode(&self, buf: &mut BytesMut, metric: &Metric);
}

/// Encoder for the DogStatsD text protocol
#[derive(Debug, Clone, Copy, Default)]
pub struct DogStatsdEncoder;

impl Encoder for DogStatsdEncoder {
    fn encode(&self, buf: &mut BytesMut, metric: &Metric) {
        encode_metric(buf, metric);
    }
}

const NAME_RESERVED: &[char] = &[':', '|', '@', '#', ',', '\n'];
const VALUE_RESERVED: &[char] = &['|', ',', '\n'];

fn put_sanitized(buf: &mut BytesMut, s: &str, reserved: &[char]) {
    for c in s.chars() {
        let c = if reserved.contains(&c) { '_' } else { c };
        let mut tmp = [0u8; 4];
        buf.put_slice(c.encode_utf8(&mut tmp).as_bytes());
    }
}

fn kind_code(kind: MetricKind) -> &'static [u8] {
    match kind {
        MetricKind::Counter => b"c",
        MetricKind::Gauge => b"g",
        MetricKind::Histogram => b"h",
    }
}

/// Encode a metric as one DogStatsD line.
pub fn encode_metric(buf: &mut BytesMut, metric: &Metric) {
    put_sanitized(buf, &metric.name, NAME_RESERVED);
    buf.put_u8(b':');
    // fmt::Write for BytesMut grows the buffer and never fails
    let _ = write!(buf, "{}", metric.value);
    buf.put_u8(b'|');
    buf.put_slice(kind_code(metric.kind));

    if metric.sample > 1 {
        buf.put_slice(b"|@");
        let _ = write!(buf, "{}", 1.0 / metric.sample as f64);
    }

    for (i, tag) in metric.tags.iter().enumerate() {
        buf.put_slice(if i == 0 { b"|#" } else { b"," });
        put_sanitized(buf, &tag.name, NAME_RESERVED);
        buf.put_u8(b':');
        put_sanitized(buf, &tag.value, VALUE_RESERVED);
    }

    buf.put_u8(b'\n');
}

/// Decode one DogStatsD line.
///
/// Keys and groups are rebuilt from the name and tags the same way the engine
/// builds them. Lines without a rate decode with `sample = 0`, except
/// histograms which always represent at least one observation.
pub fn decode_metric(line: &str) -> Option<Metric> {
    let line = line.trim_end_matches('\n');
    let mut parts = line.split('|');

    let (name, value) = parts.next()?.split_once(':')?;
    if name.is_empty() {
        return None;
    }
    let value: f64 = value.parse().ok()?;

    let kind = match parts.next()? {
        "c" => MetricKind::Counter,
        "g" => MetricKind::Gauge,
        "h" => MetricKind::Histogram,
        _ => return None,
    };

    let mut sample = match kind {
        MetricKind::Histogram => 1,
        _ => 0,
    };
    let mut tags = Vec::new();

    for part in parts {
        if let Some(rate) = part.strip_prefix('@') {
            let rate: f64 = rate.parse().ok()?;
            if rate <= 0.0 {
                return None;
            }
            sample = (1.0 / rate).round() as u64;
        } else if let Some(list) = part.strip_prefix('#') {
            tags = list
                .split(',')
                .filter(|t| !t.is_empty())
                .map(|t| match t.split_once(':') {
                    Some((n, v)) => Tag::new(n, v),
                    None => Tag::new(t, ""),
                })
                .collect();
        } else {
            return None;
        }
    }

    Some(
        Metric::new(kind, name, tags)
            .with_value(value)
            .with_sample(sample),
    )
}

/// Decode every line of a frame, skipping lines that do not parse
pub fn decode_frame(frame: &[u8]) -> Vec<Metric> {
    match std::str::from_utf8(frame) {
        Ok(text) => text
            .split('\n')
            .filter(|l| !l.is_empty())
            .filter_map(decode_metric)
            .collect(),
        Err(_) => Vec::new(),
    }
}
