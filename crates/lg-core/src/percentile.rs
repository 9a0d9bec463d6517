//! # Percentiles
//!
//! Nearest-rank percentiles over response times, the fixed checkpoints
//! reported in response metadata, and the rank of a single value within a
//! sample.

use serde::{Deserialize, Serialize};

/// Checkpoints reported with every page.
pub const CHECKPOINTS: [u8; 5] = [50, 75, 90, 95, 99];

/// A sample sorted once, queried many times (once per row for ranks).
#[derive(Debug, Clone, Default)]
pub struct Distribution {
    sorted: Vec<f64>,
}

impl Distribution {
    pub fn new(samples: impl IntoIterator<Item = f64>) -> Self {
        let mut sorted: Vec<f64> = samples.into_iter().collect();
        sorted.sort_by(f64::total_cmp);
        Self { sorted }
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Nearest-rank percentile: the sample at rank `ceil(p / 100 * n)`,
    /// clamped to the sample. `None` when empty.
    pub fn percentile(&self, p: f64) -> Option<f64> {
        let n = self.sorted.len();
        if n == 0 {
            return None;
        }
        let rank = (p.clamp(0.0, 100.0) * n as f64 / 100.0).ceil() as usize;
        Some(self.sorted[rank.saturating_sub(1).min(n - 1)])
    }

    /// Share of samples (in percent) ranked below the first sample that
    /// reaches `value`; 100 when no sample reaches it.
    pub fn rank(&self, value: f64) -> f64 {
        let below = self.sorted.partition_point(|v| *v < value);
        if below == self.sorted.len() {
            100.0
        } else {
            below as f64 / self.sorted.len() as f64 * 100.0
        }
    }

    pub fn checkpoints(&self) -> Percentiles {
        let at = |p: u8| self.percentile(f64::from(p)).unwrap_or(0.0);
        Percentiles {
            p50: at(50),
            p75: at(75),
            p90: at(90),
            p95: at(95),
            p99: at(99),
        }
    }
}

/// Nearest-rank percentile of `samples` for `p` in `[0, 100]`; `None` for an
/// empty sample.
pub fn percentile(samples: &[f64], p: f64) -> Option<f64> {
    Distribution::new(samples.iter().copied()).percentile(p)
}

/// Percentile rank of `value` within `samples`.
pub fn percentile_rank(samples: &[f64], value: f64) -> f64 {
    Distribution::new(samples.iter().copied()).rank(value)
}

/// Response-time percentiles at the fixed [`CHECKPOINTS`]; every checkpoint
/// is 0 when there are no samples.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Percentiles {
    #[serde(rename = "50")]
    pub p50: f64,
    #[serde(rename = "75")]
    pub p75: f64,
    #[serde(rename = "90")]
    pub p90: f64,
    #[serde(rename = "95")]
    pub p95: f64,
    #[serde(rename = "99")]
    pub p99: f64,
}

impl Percentiles {
    pub fn from_samples(samples: &[f64]) -> Self {
        Distribution::new(samples.iter().copied()).checkpoints()
    }

    /// `(checkpoint, value)` pairs in ascending checkpoint order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> {
        CHECKPOINTS
            .into_iter()
            .zip([self.p50, self.p75, self.p90, self.p95, self.p99])
    }
}

/// Coarse position of a row against the distribution, used to highlight
/// slow responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentileBand {
    Low,
    Medium,
    High,
    Critical,
}

impl PercentileBand {
    pub fn of(rank: f64) -> Self {
        if rank < 50.0 {
            PercentileBand::Low
        } else if rank < 75.0 {
            PercentileBand::Medium
        } else if rank < 90.0 {
            PercentileBand::High
        } else {
            PercentileBand::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PercentileBand::Low => "low",
            PercentileBand::Medium => "medium",
            PercentileBand::High => "high",
            PercentileBand::Critical => "critical",
        }
    }
}
