//! CLI argument parsing and command handling

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use detect_bench_client::{HttpTransport, TransportConfig};
use detect_bench_core::{IdentityMode, OrchestratorBuilder, OutcomeObserver, OutcomeRecord};
use detect_bench_report::{breakdown_line, outcome_line, summary_line, JsonExporter};
use detect_bench_sources::{DirectorySource, DEFAULT_EXTENSION};

/// Send every image in a folder to an object detection endpoint and report
/// throughput
#[derive(Parser, Debug)]
#[command(name = "detect-bench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Folder containing the images to send
    pub input_folder: PathBuf,

    /// Detection endpoint URL (e.g. http://localhost:8080/detect)
    pub endpoint_url: String,

    /// Number of concurrent workers
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub number_of_workers: u32,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "60", value_parser = parse_secs)]
    pub timeout: Duration,

    /// Connection timeout in seconds
    #[arg(long, default_value = "10", value_parser = parse_secs)]
    pub connect_timeout: Duration,

    /// Image file extension to include (repeatable)
    #[arg(long = "ext", default_value = DEFAULT_EXTENSION)]
    pub extensions: Vec<String>,

    /// How item ids are derived: path or content
    #[arg(long, default_value = "path")]
    pub identity: IdentityMode,

    /// Write a JSON report of the run to this file
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parse a positive number of seconds, fractions allowed
fn parse_secs(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", s))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("timeout must be positive, got {}", s));
    }
    Ok(Duration::from_secs_f64(secs))
}

/// Write one report line, logging instead of panicking when the reader is
/// gone (closed pipe, full disk)
fn emit<W: Write>(out: &mut W, line: &str) {
    if let Err(e) = writeln!(out, "{}", line) {
        tracing::warn!(error = %e, "Failed to write report line");
    }
}

/// Prints each outcome as soon as the engine collects it
struct PrintObserver<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> PrintObserver<W> {
    fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl<W: Write + Send> OutcomeObserver for PrintObserver<W> {
    fn on_outcome(&self, record: &OutcomeRecord) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        emit(&mut *out, &outcome_line(record));
    }
}

impl Cli {
    /// Run the dispatch based on CLI arguments
    pub async fn run(&self) -> Result<()> {
        tracing::info!(
            input_folder = %self.input_folder.display(),
            endpoint = %self.endpoint_url,
            workers = self.number_of_workers,
            "Starting detect-bench"
        );

        // 1. Transport
        let transport_config = TransportConfig::new(&self.endpoint_url)
            .with_request_timeout(self.timeout)
            .with_connect_timeout(self.connect_timeout);
        let transport = HttpTransport::new(&transport_config)
            .with_context(|| format!("Invalid endpoint configuration: {}", self.endpoint_url))?;

        // 2. Source
        let source = DirectorySource::new(&self.input_folder).with_extensions(&self.extensions);

        // 3. Engine
        let orchestrator = OrchestratorBuilder::new()
            .num_workers(self.number_of_workers as usize)
            .request_timeout(self.timeout)
            .identity(self.identity)
            .transport(Arc::new(transport))
            .source(Arc::new(source))
            .observer(Arc::new(PrintObserver::new(std::io::stdout())))
            .build()
            .context("Failed to configure dispatch")?;

        // 4. Dispatch; per-item failures are already printed by the observer
        let run = match orchestrator.run().await {
            Ok(run) => run,
            Err(e) if e.is_pre_dispatch() => {
                return Err(e).with_context(|| {
                    format!(
                        "Nothing was dispatched from {}",
                        self.input_folder.display()
                    )
                });
            }
            Err(e) => return Err(e).context("Dispatch aborted"),
        };

        // 5. Summary
        let stats = run.statistics();
        let mut stdout = std::io::stdout().lock();
        emit(&mut stdout, &summary_line(&stats));
        emit(&mut stdout, &breakdown_line(&stats));
        drop(stdout);

        if let Some(path) = &self.json {
            JsonExporter::export(&run, &self.endpoint_url, path)
                .with_context(|| format!("Failed to export JSON to: {}", path.display()))?;
            tracing::info!(path = %path.display(), "JSON report written");
        }

        Ok(())
    }
}
