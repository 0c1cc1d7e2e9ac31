use aurum_core::{DateRange, PriceSeries, PriceTracker};
use serde::Serialize;

use crate::cli::RangeArgs;
use crate::error::CliError;

use super::{parse_range, CommandResult};

#[derive(Debug, Serialize)]
struct PricesResponseData {
    range: DateRange,
    dropped_duplicates: usize,
    points: PriceSeries,
}

pub async fn run(args: &RangeArgs, tracker: &PriceTracker) -> Result<CommandResult, CliError> {
    let range = parse_range(args)?;
    let fetched = tracker.get_prices(range).await?;

    let chunks = fetched.chunks.len();
    let data = serde_json::to_value(PricesResponseData {
        range,
        dropped_duplicates: fetched.dropped_duplicates,
        points: fetched.series,
    })?;

    Ok(CommandResult::new(data, chunks))
}
