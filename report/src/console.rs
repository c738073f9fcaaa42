//! Console lines for outcomes and the run summary

use std::fmt::Write;

use detect_bench_core::{Outcome, OutcomeKind, OutcomeRecord, RunStatistics};

/// One line describing a single item's outcome
pub fn outcome_line(record: &OutcomeRecord) -> String {
    let image = &record.item;
    match &record.outcome {
        Outcome::Success { body } => {
            let worker = record
                .worker_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string());
            format!("Thread : {}, input image: {}, output:{}", worker, image, body)
        }
        Outcome::ServiceError { status, body } => {
            format!("Error for {}, response status: {} - {}", image, status, body)
        }
        Outcome::ConnectionError { cause } => {
            format!("Connection error for {}: {}", image, cause)
        }
        Outcome::TimeoutError { cause } => format!("Timeout error for {}: {}", image, cause),
        Outcome::EncodingError { cause } => format!("Encoding error for {}: {}", image, cause),
        Outcome::UnexpectedError { cause } => {
            format!("Unexpected error for {}: {}", image, cause)
        }
    }
}

/// Total elapsed time and the per-item average
///
/// The average reads `n/a` for an empty run.
pub fn summary_line(stats: &RunStatistics) -> String {
    let average = stats
        .per_item_average
        .map(|avg| format!("{:.3}s", avg.as_secs_f64()))
        .unwrap_or_else(|| "n/a".to_string());

    format!(
        "Total time spent: {:.3}s average response time: {}",
        stats.elapsed.as_secs_f64(),
        average
    )
}

/// Item counts, with a per-kind breakdown of failures
pub fn breakdown_line(stats: &RunStatistics) -> String {
    let mut line = format!(
        "Items: {} succeeded: {} failed: {}",
        stats.total_items, stats.succeeded, stats.failed
    );

    let failures: Vec<String> = stats
        .by_kind
        .iter()
        .filter(|(kind, count)| **kind != OutcomeKind::Success && **count > 0)
        .map(|(kind, count)| format!("{}={}", kind, count))
        .collect();

    if !failures.is_empty() {
        let _ = write!(line, " ({})", failures.join(", "));
    }
    line
}
