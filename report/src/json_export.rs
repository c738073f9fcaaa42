//! JSON export functionality

use std::fs::File;
use std::path::Path;

use anyhow::Result;
use detect_bench_core::{DispatchRun, OutcomeKind};
use serde_json::{json, Value};

/// Writes a completed run as pretty JSON
pub struct JsonExporter;

impl JsonExporter {
    /// Build the JSON document for a run
    pub fn to_value(run: &DispatchRun, endpoint: &str) -> Value {
        let stats = run.statistics();

        let by_kind: serde_json::Map<String, Value> = stats
            .by_kind
            .iter()
            .map(|(kind, count)| (kind.to_string(), json!(count)))
            .collect();

        let workers: Vec<Value> = run
            .workers
            .iter()
            .map(|w| {
                json!({
                    "worker_id": w.worker_id,
                    "processed": w.processed(),
                    "succeeded": w.succeeded(),
                    "failed": w.failed(),
                    "timeouts": w.count(OutcomeKind::TimeoutError),
                    "success_rate": w.success_rate(),
                    "items_per_second": w.items_per_second(),
                    "busy_secs": w.busy.as_secs_f64(),
                    "utilization": w.utilization(),
                    "elapsed_secs": w.elapsed().map(|d| d.as_secs_f64()),
                })
            })
            .collect();

        json!({
            "summary": {
                "endpoint": endpoint,
                "started_at": run.started_at,
                "finished_at": run.finished_at,
                "elapsed_secs": stats.elapsed.as_secs_f64(),
                "average_secs": stats.per_item_average.map(|d| d.as_secs_f64()),
                "total_items": stats.total_items,
                "succeeded": stats.succeeded,
                "failed": stats.failed,
                "success_rate_percent": stats.success_rate() * 100.0,
                "items_per_second": stats.items_per_second(),
                "by_kind": by_kind,
                "latency_ms": {
                    "min": stats.latency.min,
                    "mean": stats.latency.mean,
                    "p50": stats.latency.p50,
                    "p90": stats.latency.p90,
                    "p95": stats.latency.p95,
                    "p99": stats.latency.p99,
                    "max": stats.latency.max,
                },
            },
            "workers": workers,
            "records": run.records,
        })
    }

    /// Export a run to a JSON file
    pub fn export(run: &DispatchRun, endpoint: &str, path: impl AsRef<Path>) -> Result<()> {
        let output = Self::to_value(run, endpoint);

        let file = File::create(path.as_ref())?;
        serde_json::to_writer_pretty(file, &output)?;

        Ok(())
    }
}
