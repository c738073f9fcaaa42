//! Outcome aggregation into run statistics

use std::collections::BTreeMap;
use std::time::Duration;

use crate::metrics::{LatencyPercentiles, RunStatistics};
use crate::response::{OutcomeKind, OutcomeRecord};

/// Aggregate the collected records of one run
///
/// `elapsed` is the wall-clock time bracketing the dispatch. With no records
/// the average is left undefined instead of dividing by zero.
pub fn aggregate_outcomes(records: &[OutcomeRecord], elapsed: Duration) -> RunStatistics {
    let total_items = records.len();

    let mut by_kind: BTreeMap<OutcomeKind, usize> = BTreeMap::new();
    for record in records {
        *by_kind.entry(record.outcome.kind()).or_insert(0) += 1;
    }

    let succeeded = by_kind.get(&OutcomeKind::Success).copied().unwrap_or(0);
    let failed = total_items - succeeded;

    let per_item_average = (total_items > 0).then(|| elapsed.div_f64(total_items as f64));

    let latencies: Vec<f64> = records.iter().map(|r| r.latency_ms).collect();

    RunStatistics {
        total_items,
        succeeded,
        failed,
        by_kind,
        elapsed,
        per_item_average,
        latency: LatencyPercentiles::from_values(&latencies),
    }
}
