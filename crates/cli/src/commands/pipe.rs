//! `pipe` command implementation.
//!
//! Every stdin line becomes one `Info` record, written through the logger's
//! `io::Write` adapter.

use std::io::Write as _;

use anyhow::{Context, Result};
use observability::{record_dispatch_metrics, record_lines_piped, DispatchSummary};
use sawmill::Logger;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::cli::PipeArgs;
use crate::error::{ensure_config_exists, CliError};

/// Lines between two metric exports
const METRICS_EVERY: u64 = 1024;

/// Execute the `pipe` command
pub async fn run_pipe(args: &PipeArgs) -> Result<()> {
    ensure_config_exists(&args.config)?;

    if let Some(port) = args.metrics_port {
        observability::init_metrics_only(port)?;
    }

    let logger = build_logger(args)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut count = 0u64;
    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read stdin")?
    {
        (&logger)
            .write_all(line.as_bytes())
            .map_err(CliError::from)?;
        count += 1;

        if count % METRICS_EVERY == 0 {
            record_lines_piped(METRICS_EVERY);
            record_dispatch_metrics(&logger.metrics());
        }
    }
    record_lines_piped(count % METRICS_EVERY);

    debug!(lines = count, "stdin exhausted, closing logger");
    logger.close();

    let snapshot = logger.metrics();
    record_dispatch_metrics(&snapshot);
    info!(
        lines = count,
        dropped = snapshot.dropped,
        "Pipe finished"
    );

    if args.summary {
        eprint!("{}", DispatchSummary::from(&snapshot));
    }

    Ok(())
}

fn build_logger(args: &PipeArgs) -> Result<Logger, CliError> {
    let mut builder = Logger::builder().queue_capacity(args.queue_capacity);
    if let Some(ref hostname) = args.hostname {
        builder = builder.hostname(hostname.clone());
    }
    let logger = builder.build();

    let indices = logger.load_configuration(&args.config)?;
    info!(
        config = %args.config.display(),
        entries = indices.len(),
        "Destinations registered"
    );
    Ok(logger)
}
