//! # Chart Bucketer
//!
//! Groups rows into fixed-width time buckets over `lastActivity` and counts
//! each bucket per lead status. The bucket width is chosen from a step table
//! keyed by the length of the charted range.

use crate::lead::{Lead, LeadStatus};
use crate::params::DateFilter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `(minutes, interval_ms)`: the first threshold the range stays under wins.
const INTERVALS: [(i64, i64); 13] = [
    (1, 1_000),
    (5, 5_000),
    (10, 10_000),
    (30, 30_000),
    (60, 60_000),
    (120, 120_000),
    (240, 240_000),
    (480, 480_000),
    (1_440, 1_440_000),
    (2_880, 2_880_000),
    (5_760, 5_760_000),
    (11_520, 11_520_000),
    (23_040, 23_040_000),
];

/// Width used once the range exceeds the largest threshold.
pub const FALLBACK_INTERVAL_MS: i64 = 46_080_000;

/// Upper bound on buckets per chart. Wider ranges double the interval until
/// they fit.
pub const MAX_BUCKETS: i64 = 1_000;

/// One point of the timeline chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChartBucket {
    /// Bucket start, epoch millis.
    pub timestamp: i64,
    pub open: u32,
    pub claimed: u32,
    pub locked: u32,
    pub closed: u32,
}

impl ChartBucket {
    fn count(&mut self, status: LeadStatus) {
        match status {
            LeadStatus::Open => self.open += 1,
            LeadStatus::Claimed => self.claimed += 1,
            LeadStatus::Locked => self.locked += 1,
            LeadStatus::Closed => self.closed += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.open + self.claimed + self.locked + self.closed
    }
}

/// Bucket width in millis for a range of `duration_ms`.
pub fn interval_for(duration_ms: i64) -> i64 {
    let minutes = duration_ms.abs() / 60_000;
    INTERVALS
        .iter()
        .find(|(threshold, _)| minutes < *threshold)
        .map(|(_, interval)| *interval)
        .unwrap_or(FALLBACK_INTERVAL_MS)
}

/// Bucket width actually used for a range: the table interval, doubled
/// until the range yields at most [`MAX_BUCKETS`] buckets.
pub fn bucket_width(duration_ms: i64) -> i64 {
    let duration = duration_ms.saturating_abs();
    let mut interval = interval_for(duration);
    while duration / interval > MAX_BUCKETS {
        interval = interval.saturating_mul(2);
    }
    interval
}

/// Range to chart: the explicit filter when present, otherwise the span of
/// `lastActivity` over the rows. `None` when neither exists.
pub fn effective_range(
    rows: &[Lead],
    range: Option<&DateFilter>,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    if let Some(range) = range {
        return Some(range.chart_range());
    }
    let mut times = rows.iter().map(|row| row.last_activity);
    let first = times.next()?;
    Some(times.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
}

/// Bucket `rows` over the effective range. Produces
/// `floor(duration / interval)` buckets starting at the range's lower bound;
/// a trailing partial interval gets no bucket. Never more than
/// [`MAX_BUCKETS`].
pub fn bucket(rows: &[Lead], range: Option<&DateFilter>) -> Vec<ChartBucket> {
    let Some((start, end)) = effective_range(rows, range) else {
        return Vec::new();
    };
    let (start, end) = (start.timestamp_millis(), end.timestamp_millis());
    let duration = end.saturating_sub(start).saturating_abs();
    let interval = bucket_width(duration);
    let steps = duration / interval;
    let from = start.min(end);

    let mut buckets: Vec<ChartBucket> = (0..steps)
        .map(|i| ChartBucket {
            timestamp: from + i * interval,
            ..Default::default()
        })
        .collect();

    for row in rows {
        let offset = row.last_activity.timestamp_millis() - from;
        if offset < 0 {
            continue;
        }
        if let Some(bucket) = buckets.get_mut((offset / interval) as usize) {
            bucket.count(row.status);
        }
    }
    buckets
}
