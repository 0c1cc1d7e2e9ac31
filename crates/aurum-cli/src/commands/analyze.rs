use aurum_core::{AnalysisResult, DateRange, InvestmentAmount, PriceTracker, TradeOutcome};
use serde::Serialize;

use crate::cli::AnalyzeArgs;
use crate::error::CliError;

use super::{parse_range, CommandResult};

const DISPLAY_DECIMAL_PLACES: u32 = 2;

#[derive(Debug, Serialize)]
struct AnalyzeResponseData {
    range: DateRange,
    outcome: TradeOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    investment: Option<InvestmentAmount>,
    #[serde(flatten)]
    result: AnalysisResult,
}

pub async fn run(args: &AnalyzeArgs, tracker: &PriceTracker) -> Result<CommandResult, CliError> {
    let range = parse_range(&args.range)?;
    let investment = args
        .amount
        .as_deref()
        .map(str::parse::<InvestmentAmount>)
        .transpose()?;
    let chunks = tracker.plan(&range)?.len();

    let result = tracker.get_analysis(range, investment).await?;
    let data = serde_json::to_value(AnalyzeResponseData {
        range,
        outcome: result.outcome(),
        investment,
        result: result.rounded(DISPLAY_DECIMAL_PLACES),
    })?;

    Ok(CommandResult::new(data, chunks))
}
