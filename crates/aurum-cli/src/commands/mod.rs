mod analyze;
mod plan;
mod prices;

use std::time::Instant;

use aurum_core::{DateRange, PriceTracker, ProviderId, TrackerConfig};
use serde_json::Value;
use tracing::debug;

use crate::cli::{Cli, Command, RangeArgs};
use crate::error::CliError;
use crate::metadata::{Metadata, RequestId};
use crate::output::Envelope;

pub struct CommandResult {
    pub data: Value,
    pub chunks: usize,
}

impl CommandResult {
    pub fn new(data: Value, chunks: usize) -> Self {
        Self { data, chunks }
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope, CliError> {
    let config = tracker_config(cli)?;
    let tracker = PriceTracker::from_config(&config)?;
    let request_id = RequestId::new_v4();
    debug!(%request_id, source = %tracker.source_id(), "running command");

    let started = Instant::now();
    let result = tokio::select! {
        result = execute(&cli.command, &tracker) => result?,
        _ = tokio::signal::ctrl_c() => return Err(CliError::Interrupted),
    };
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    Ok(Envelope {
        meta: Metadata::new(request_id, tracker.source_id(), result.chunks, latency_ms),
        data: result.data,
    })
}

async fn execute(command: &Command, tracker: &PriceTracker) -> Result<CommandResult, CliError> {
    match command {
        Command::Analyze(args) => analyze::run(args, tracker).await,
        Command::Prices(args) => prices::run(args, tracker).await,
        Command::Plan(args) => plan::run(args, tracker),
    }
}

/// Environment configuration with command-line overrides applied on top.
fn tracker_config(cli: &Cli) -> Result<TrackerConfig, CliError> {
    let mut config = TrackerConfig::from_env()?;
    if cli.mock {
        config.source = ProviderId::Synthetic;
    }
    if let Some(base_url) = &cli.base_url {
        config.base_url.clone_from(base_url);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.fetch_timeout = std::time::Duration::from_millis(timeout_ms);
    }
    if let Some(limit) = cli.max_concurrency {
        config.max_concurrency = limit;
    }
    config.validate()?;
    Ok(config)
}

fn parse_range(args: &RangeArgs) -> Result<DateRange, CliError> {
    Ok(DateRange::parse(&args.start, &args.end)?)
}
