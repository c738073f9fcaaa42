//! Run statistics and percentile calculation

use crate::response::OutcomeKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Summary of one completed run
///
/// Built once by the aggregator after every item has an outcome.
#[derive(Debug, Clone, Default)]
pub struct RunStatistics {
    /// Number of items dispatched
    pub total_items: usize,

    /// Items that ended in `Success`
    pub succeeded: usize,

    /// Items that ended in any error outcome
    pub failed: usize,

    /// Outcome counts per kind
    pub by_kind: BTreeMap<OutcomeKind, usize>,

    /// Wall-clock time bracketing the dispatch
    pub elapsed: Duration,

    /// `elapsed / total_items`; `None` when no items were dispatched
    pub per_item_average: Option<Duration>,

    /// Per-item latency distribution (milliseconds)
    pub latency: LatencyPercentiles,
}

impl RunStatistics {
    /// Count for one outcome kind
    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.by_kind.get(&kind).copied().unwrap_or(0)
    }

    /// Get the success rate (0.0 - 1.0)
    pub fn success_rate(&self) -> f64 {
        if self.total_items > 0 {
            self.succeeded as f64 / self.total_items as f64
        } else {
            0.0
        }
    }

    /// Items completed per second of wall-clock time
    pub fn items_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total_items as f64 / secs
        } else {
            0.0
        }
    }
}

/// Latency percentiles (all values in milliseconds)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct LatencyPercentiles {
    /// Minimum value
    pub min: f64,
    /// 50th percentile (median)
    pub p50: f64,
    /// 90th percentile
    pub p90: f64,
    /// 95th percentile
    pub p95: f64,
    /// 99th percentile
    pub p99: f64,
    /// Maximum value
    pub max: f64,
    /// Mean value
    pub mean: f64,
}

impl LatencyPercentiles {
    /// Calculate percentiles from a slice of values
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let mut sorted: Vec<f64> = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let len = sorted.len();
        let mean = sorted.iter().sum::<f64>() / len as f64;

        Self {
            min: sorted[0],
            p50: percentile(&sorted, 0.50),
            p90: percentile(&sorted, 0.90),
            p95: percentile(&sorted, 0.95),
            p99: percentile(&sorted, 0.99),
            max: sorted[len - 1],
            mean,
        }
    }
}

/// Calculate percentile from sorted values using linear interpolation
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let idx = p * (sorted.len() - 1) as f64;
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;
    let frac = idx - lower as f64;

    if upper >= sorted.len() {
        sorted[sorted.len() - 1]
    } else {
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}
