//! Per-worker accounting

use crate::response::OutcomeKind;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// What one worker did during a run
#[derive(Debug, Default, Clone)]
pub struct WorkerStats {
    /// Worker identifier
    pub worker_id: usize,

    /// Outcome counts for the items this worker claimed
    pub by_kind: BTreeMap<OutcomeKind, usize>,

    /// Time spent encoding and calling, summed over items
    pub busy: Duration,

    started_at: Option<Instant>,
    ended_at: Option<Instant>,
}

impl WorkerStats {
    /// Empty stats for a worker
    pub fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            ..Default::default()
        }
    }

    /// Mark the start of the worker loop
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// Mark the end of the worker loop
    pub fn stop(&mut self) {
        self.ended_at = Some(Instant::now());
    }

    /// Account for one finished item
    pub fn record(&mut self, kind: OutcomeKind, latency: Duration) {
        *self.by_kind.entry(kind).or_insert(0) += 1;
        self.busy += latency;
    }

    /// Count for one outcome kind
    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.by_kind.get(&kind).copied().unwrap_or(0)
    }

    /// Items this worker claimed
    pub fn processed(&self) -> usize {
        self.by_kind.values().sum()
    }

    /// Items that ended in `Success`
    pub fn succeeded(&self) -> usize {
        self.count(OutcomeKind::Success)
    }

    /// Items that ended in any error outcome
    pub fn failed(&self) -> usize {
        self.processed() - self.succeeded()
    }

    /// Share of processed items that succeeded; 0 before any item
    pub fn success_rate(&self) -> f64 {
        match self.processed() {
            0 => 0.0,
            n => self.succeeded() as f64 / n as f64,
        }
    }

    /// Time between `start` and `stop` (or now, while running)
    pub fn elapsed(&self) -> Option<Duration> {
        let start = self.started_at?;
        Some(match self.ended_at {
            Some(end) => end.duration_since(start),
            None => start.elapsed(),
        })
    }

    /// Items per second of the worker's own lifetime
    pub fn items_per_second(&self) -> f64 {
        match self.elapsed() {
            Some(d) if !d.is_zero() => self.processed() as f64 / d.as_secs_f64(),
            _ => 0.0,
        }
    }

    /// Fraction of the lifetime spent inside encode + call
    ///
    /// Well below 1.0 means the worker mostly waited for a permit or the
    /// channel.
    pub fn utilization(&self) -> f64 {
        match self.elapsed() {
            Some(d) if !d.is_zero() => (self.busy.as_secs_f64() / d.as_secs_f64()).min(1.0),
            _ => 0.0,
        }
    }
}
