//! Best single buy/sell trade over a price series.
//!
//! The analyzer is a pure function of a [`PriceSeries`] and an optional
//! [`InvestmentAmount`]. All arithmetic stays in exact decimal;
//! [`AnalysisResult::rounded`] is the only place precision is dropped.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{CalendarDate, InvestmentAmount, PriceSeries, ValidationError};

/// A buy index strictly before a sell index with positive profit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trade {
    pub buy_index: usize,
    pub sell_index: usize,
    pub profit_per_share: Decimal,
}

/// Finds the most profitable `(buy, sell)` pair in one forward pass.
///
/// Among equally profitable pairs the earliest buy day wins, then the earliest
/// sell day. Returns `None` when no pair yields a positive profit.
pub fn best_trade(series: &PriceSeries) -> Option<Trade> {
    let points = series.points();
    let first = points.first()?;

    let mut min_index = 0;
    let mut min_price = first.price();
    let mut best: Option<Trade> = None;

    for (index, point) in points.iter().enumerate().skip(1) {
        let profit = point.price() - min_price;
        let improves = match best {
            Some(current) => profit > current.profit_per_share,
            None => profit > Decimal::ZERO,
        };
        if improves {
            best = Some(Trade {
                buy_index: min_index,
                sell_index: index,
                profit_per_share: profit,
            });
        }

        if point.price() < min_price {
            min_index = index;
            min_price = point.price();
        }
    }

    best
}

/// Quadratic search over every `i < j` pair.
///
/// Kept as the reference definition [`best_trade`] is checked against.
pub fn best_trade_exhaustive(series: &PriceSeries) -> Option<Trade> {
    let points = series.points();
    let mut best: Option<Trade> = None;

    for (buy_index, buy) in points.iter().enumerate() {
        for (sell_index, sell) in points.iter().enumerate().skip(buy_index + 1) {
            let profit = sell.price() - buy.price();
            if profit <= Decimal::ZERO {
                continue;
            }
            if best.map_or(true, |current| profit > current.profit_per_share) {
                best = Some(Trade {
                    buy_index,
                    sell_index,
                    profit_per_share: profit,
                });
            }
        }
    }

    best
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeOutcome {
    Profitable,
    NoProfitableTrade,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub buy_date: Option<CalendarDate>,
    pub sell_date: Option<CalendarDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_price: Option<Decimal>,
    pub profit_per_share: Decimal,
    pub return_percentage: Decimal,
    pub actual_return: Decimal,
    pub final_amount: Decimal,
}

impl AnalysisResult {
    pub const fn no_trade() -> Self {
        Self {
            buy_date: None,
            sell_date: None,
            buy_price: None,
            sell_price: None,
            profit_per_share: Decimal::ZERO,
            return_percentage: Decimal::ZERO,
            actual_return: Decimal::ZERO,
            final_amount: Decimal::ZERO,
        }
    }

    pub const fn outcome(&self) -> TradeOutcome {
        match (self.buy_date, self.sell_date) {
            (Some(_), Some(_)) => TradeOutcome::Profitable,
            _ => TradeOutcome::NoProfitableTrade,
        }
    }

    /// Copy with every monetary field rounded half away from zero to `dp` places.
    pub fn rounded(&self, dp: u32) -> Self {
        let round = |value: Decimal| {
            value
                .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
                .normalize()
        };

        Self {
            buy_date: self.buy_date,
            sell_date: self.sell_date,
            buy_price: self.buy_price.map(round),
            sell_price: self.sell_price.map(round),
            profit_per_share: round(self.profit_per_share),
            return_percentage: round(self.return_percentage),
            actual_return: round(self.actual_return),
            final_amount: round(self.final_amount),
        }
    }
}

impl Default for AnalysisResult {
    fn default() -> Self {
        Self::no_trade()
    }
}

/// Finds the best trade in `series` and projects returns for `investment`.
///
/// Return fields stay zero when no profitable trade exists or when the amount
/// is zero or absent. Fails with [`ValidationError::AmountOutOfRange`] when the
/// projected amounts do not fit a [`Decimal`].
pub fn analyze(
    series: &PriceSeries,
    investment: Option<InvestmentAmount>,
) -> Result<AnalysisResult, ValidationError> {
    let Some(trade) = best_trade(series) else {
        return Ok(AnalysisResult::no_trade());
    };

    let points = series.points();
    let buy = &points[trade.buy_index];
    let sell = &points[trade.sell_index];

    let mut result = AnalysisResult {
        buy_date: Some(buy.date()),
        sell_date: Some(sell.date()),
        buy_price: Some(buy.price()),
        sell_price: Some(sell.price()),
        profit_per_share: trade.profit_per_share,
        ..AnalysisResult::no_trade()
    };

    if let Some(amount) = investment.filter(|amount| !amount.is_zero()) {
        let hundred = Decimal::ONE_HUNDRED;
        let out_of_range = || ValidationError::AmountOutOfRange {
            value: amount.to_string(),
        };

        result.return_percentage = trade
            .profit_per_share
            .checked_div(buy.price())
            .and_then(|ratio| ratio.checked_mul(hundred))
            .ok_or_else(out_of_range)?;
        result.actual_return = result
            .return_percentage
            .checked_div(hundred)
            .and_then(|ratio| ratio.checked_mul(amount.value()))
            .ok_or_else(out_of_range)?;
        result.final_amount = amount
            .value()
            .checked_add(result.actual_return)
            .ok_or_else(out_of_range)?;
    }

    Ok(result)
}
