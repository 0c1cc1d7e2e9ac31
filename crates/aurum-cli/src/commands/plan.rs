use aurum_core::{DateRange, PriceTracker};
use serde::Serialize;

use crate::cli::RangeArgs;
use crate::error::CliError;

use super::{parse_range, CommandResult};

#[derive(Debug, Serialize)]
struct PlanResponseData {
    range: DateRange,
    max_span_days: u32,
    chunks: Vec<DateRange>,
}

pub fn run(args: &RangeArgs, tracker: &PriceTracker) -> Result<CommandResult, CliError> {
    let range = parse_range(args)?;
    let chunks = tracker.plan(&range)?;

    let count = chunks.len();
    let data = serde_json::to_value(PlanResponseData {
        range,
        max_span_days: tracker.chunker().max_span_days(),
        chunks,
    })?;

    Ok(CommandResult::new(data, count))
}
