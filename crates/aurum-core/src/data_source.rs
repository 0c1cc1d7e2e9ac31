//! Fetch capability contract and adapter error types.
//!
//! [`PriceSource`] is the single seam between the core and an upstream price
//! provider: given one provider-compliant [`DateRange`], return the quotations
//! inside it or fail. The chunker never looks behind this trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use aurum_core::{DateRange, PriceSource, SourceError, SyntheticSource};
//!
//! async fn first_price(source: &SyntheticSource) -> Result<(), SourceError> {
//!     let range = DateRange::parse("2024-01-01", "2024-01-31").expect("valid range");
//!     let series = source.fetch_prices(range).await?;
//!     if let Some(point) = series.first() {
//!         println!("{}: {}", point.date(), point.price());
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{DateRange, PriceSeries, ProviderId};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    Timeout,
    Malformed,
    Internal,
}

/// Structured source error carried inside chunk failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Timeout,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Malformed,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    /// Overrides the default retry classification of the error kind.
    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Timeout => "source.timeout",
            SourceErrorKind::Malformed => "source.malformed",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Future returned by [`PriceSource::fetch_prices`].
pub type FetchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<PriceSeries, SourceError>> + Send + 'a>>;

/// Fetch capability for one provider-compliant date range.
///
/// Implementations must be idempotent and safe to call concurrently for
/// different ranges: the chunker issues all sub-range fetches of a query at
/// once and may abandon any of them midway.
///
/// # Errors
///
/// Returns [`SourceError`] if the provider is unreachable, rejects the range,
/// or answers with a payload that is not a valid chronological series.
pub trait PriceSource: Send + Sync {
    /// Returns the provider identifier reported in output metadata.
    fn id(&self) -> ProviderId;

    /// Fetches the quotations published within `range`.
    fn fetch_prices(&self, range: DateRange) -> FetchFuture<'_>;
}
