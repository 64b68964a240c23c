//! Heart Risk Assessment - Main Entry Point
//!
//! Reads patient profiles as JSON lines on stdin and writes verdicts to stdout.

use anyhow::{Context, Result};
use assess::{build_pipeline, init_logging, AppConfig};
use std::io::{self, BufWriter};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging(&config.log)?;

    info!("=== Heart Risk Assessment v{} ===", env!("CARGO_PKG_VERSION"));

    let pipeline = build_pipeline(&config)?;

    // Blocking stdin/stdout work stays off the async workers
    let summary = tokio::task::spawn_blocking(move || {
        let stdin = io::stdin();
        let stdout = io::stdout();
        pipeline.run(stdin.lock(), BufWriter::new(stdout.lock()))
    })
    .await
    .context("Pipeline task panicked")??;

    info!(
        "Done: {} assessed, {} rejected",
        summary.assessed, summary.rejected
    );
    Ok(())
}
