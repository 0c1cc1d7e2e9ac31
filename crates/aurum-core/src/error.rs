use thiserror::Error;

use crate::data_source::SourceError;
use crate::domain::{CalendarDate, DateRange};

/// Validation and contract errors exposed by `aurum-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("date must use the YYYY-MM-DD form: '{value}'")]
    InvalidDate { value: String },
    #[error("range start {start} is after range end {end}")]
    InvalidRange {
        start: CalendarDate,
        end: CalendarDate,
    },
    #[error("range spans {days} days, which exceeds the {max}-day ceiling")]
    RangeTooLarge { days: i64, max: i64 },
    #[error("range starts at {start}, before the provider's first quotation on {earliest}")]
    BeforeProviderHistory {
        start: CalendarDate,
        earliest: CalendarDate,
    },

    #[error("price on {date} must be positive")]
    NonPositivePrice { date: CalendarDate },
    #[error("series dates must be strictly increasing: {next} follows {previous}")]
    UnorderedSeries {
        previous: CalendarDate,
        next: CalendarDate,
    },

    #[error("investment amount must not be negative")]
    NegativeInvestment,
    #[error("investment amount must be a decimal number: '{value}'")]
    InvalidAmount { value: String },
    #[error("investment amount {value} is too large to project returns")]
    AmountOutOfRange { value: String },

    #[error("invalid source '{value}', expected one of nbp, synthetic")]
    InvalidSource { value: String },
    #[error("invalid configuration for '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

/// Failure of a chunked range fetch.
///
/// A chunked fetch either produces the complete merged series or one of these;
/// there is no partial-success outcome.
#[derive(Debug, Error)]
pub enum ChunkError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("sub-range #{index} ({range}) failed: {source}")]
    SubRangeFetchFailed {
        index: usize,
        range: DateRange,
        #[source]
        source: SourceError,
    },

    #[error("merged series is inconsistent: {0}")]
    Merge(ValidationError),

    #[error("sub-range worker failed: {0}")]
    Worker(String),

    #[error("chunked fetch was cancelled")]
    Cancelled,
}

impl ChunkError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "chunk.validation",
            Self::SubRangeFetchFailed { .. } => "chunk.sub_range_fetch_failed",
            Self::Merge(_) => "chunk.merge",
            Self::Worker(_) => "chunk.worker",
            Self::Cancelled => "chunk.cancelled",
        }
    }

    /// The failing sub-range, when the failure came from a single fetch.
    pub fn failed_range(&self) -> Option<(usize, DateRange)> {
        match self {
            Self::SubRangeFetchFailed { index, range, .. } => Some((*index, *range)),
            _ => None,
        }
    }

    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
