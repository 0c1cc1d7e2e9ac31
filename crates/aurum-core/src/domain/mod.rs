//! # Domain Models
//!
//! Value types shared by the chunker and the analyzer.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`CalendarDate`] | Day-resolution date, `YYYY-MM-DD` on the wire |
//! | [`DateRange`] | Inclusive `[start, end]` span, `start <= end` |
//! | [`PricePoint`] | One dated, positive price |
//! | [`PriceSeries`] | Strictly chronological sequence of points |
//! | [`InvestmentAmount`] | Non-negative amount used for return projection |
//!
//! All types validate their invariants at construction and deserialization,
//! so a value that exists is a value that is valid.

mod date;
mod investment;
mod range;
mod series;

pub use date::CalendarDate;
pub use investment::InvestmentAmount;
pub use range::DateRange;
pub use series::{PricePoint, PriceSeries};
