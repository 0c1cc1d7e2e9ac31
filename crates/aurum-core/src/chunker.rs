//! Splitting of long date ranges into provider-compliant sub-ranges.
//!
//! The upstream provider caps the span of a single request, while a query may
//! cover up to the configured ceiling. [`RangeChunker`] partitions the query
//! range, fetches every sub-range concurrently through a [`PriceSource`], and
//! reassembles one chronological [`PriceSeries`].
//!
//! ```text
//! 2021-01-01 ................................................ 2022-12-31
//! [2021-01-01 .. 2022-01-01][2022-01-02 .. 2022-12-31]
//!        chunk #0                   chunk #1 (clipped)
//! ```
//!
//! Either every sub-range succeeds and the merged series is returned, or the
//! whole fetch fails; there is no partial result.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::TrackerConfig;
use crate::data_source::{PriceSource, SourceError};
use crate::error::ChunkError;
use crate::provider_policy::{ProviderPolicy, DEFAULT_CEILING_DAYS};
use crate::{CalendarDate, DateRange, PricePoint, PriceSeries, ValidationError};

/// Merged outcome of a chunked fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedSeries {
    pub series: PriceSeries,
    /// Sub-ranges in request order.
    pub chunks: Vec<DateRange>,
    /// Boundary dates reported by two adjacent chunks and kept once.
    pub dropped_duplicates: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeChunker {
    max_span_days: u32,
    ceiling_days: u32,
    earliest_date: Option<CalendarDate>,
    fetch_timeout: Duration,
    max_concurrency: usize,
}

impl Default for RangeChunker {
    fn default() -> Self {
        Self::new(365, DEFAULT_CEILING_DAYS)
    }
}

impl RangeChunker {
    pub fn new(max_span_days: u32, ceiling_days: u32) -> Self {
        Self {
            max_span_days,
            ceiling_days,
            earliest_date: None,
            fetch_timeout: Duration::from_secs(10),
            max_concurrency: 4,
        }
    }

    pub fn from_policy(policy: &ProviderPolicy) -> Self {
        Self::new(policy.max_span_days, policy.ceiling_days)
            .with_earliest_date(policy.earliest_date)
            .with_fetch_timeout(policy.request_timeout)
            .with_max_concurrency(policy.max_concurrency)
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.max_span_days, config.ceiling_days)
            .with_earliest_date(config.earliest_date)
            .with_fetch_timeout(config.fetch_timeout)
            .with_max_concurrency(config.max_concurrency)
    }

    pub fn with_earliest_date(mut self, earliest_date: Option<CalendarDate>) -> Self {
        self.earliest_date = earliest_date;
        self
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub const fn max_span_days(&self) -> u32 {
        self.max_span_days
    }

    pub const fn ceiling_days(&self) -> u32 {
        self.ceiling_days
    }

    /// Validates `[start, end]` and partitions it into sub-ranges whose
    /// `end - start` never exceeds `max_span_days`.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::InvalidRange`] when `start > end`
    /// - [`ValidationError::RangeTooLarge`] when `end - start` exceeds the ceiling
    /// - [`ValidationError::BeforeProviderHistory`] when `start` predates the
    ///   provider's first quotation
    pub fn split(
        &self,
        start: CalendarDate,
        end: CalendarDate,
    ) -> Result<Vec<DateRange>, ValidationError> {
        let range = DateRange::new(start, end)?;

        let span = range.span_days();
        let ceiling = i64::from(self.ceiling_days);
        if span > ceiling {
            return Err(ValidationError::RangeTooLarge {
                days: span,
                max: ceiling,
            });
        }

        if let Some(earliest) = self.earliest_date {
            if start < earliest {
                return Err(ValidationError::BeforeProviderHistory { start, earliest });
            }
        }

        let step = i64::from(self.max_span_days);
        let expected = usize::try_from(span / (step + 1) + 1).unwrap_or(1);
        let mut chunks = Vec::with_capacity(expected);
        let mut cursor = start;

        loop {
            let chunk_end = cursor
                .checked_add_days(step)
                .map_or(end, |candidate| candidate.min(end));
            chunks.push(DateRange::new(cursor, chunk_end)?);

            if chunk_end >= end {
                break;
            }
            match chunk_end.next_day() {
                Some(next) => cursor = next,
                None => break,
            }
        }

        Ok(chunks)
    }

    pub fn plan(&self, range: &DateRange) -> Result<Vec<DateRange>, ValidationError> {
        self.split(range.start(), range.end())
    }

    /// Fetches `range` chunk by chunk and merges the results in chronological order.
    ///
    /// All sub-range fetches are started at once (bounded by the concurrency
    /// limit) and each is subject to the fetch timeout. The first failure aborts
    /// the remaining fetches. Cancelling `cancel` aborts everything in flight
    /// and discards results that already arrived.
    pub async fn fetch(
        &self,
        source: Arc<dyn PriceSource>,
        range: DateRange,
        cancel: &CancellationToken,
    ) -> Result<ChunkedSeries, ChunkError> {
        let chunks = self.plan(&range)?;
        if cancel.is_cancelled() {
            return Err(ChunkError::Cancelled);
        }

        info!(
            %range,
            source = %source.id(),
            chunks = chunks.len(),
            max_span_days = self.max_span_days,
            "fetching price range"
        );

        let permits = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();
        for (index, sub_range) in chunks.iter().copied().enumerate() {
            let source = Arc::clone(&source);
            let permits = Arc::clone(&permits);
            let fetch_timeout = self.fetch_timeout;

            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                let outcome =
                    match tokio::time::timeout(fetch_timeout, source.fetch_prices(sub_range)).await
                    {
                        Ok(result) => result,
                        Err(_) => Err(SourceError::timeout(format!(
                            "no response within {} ms",
                            fetch_timeout.as_millis()
                        ))),
                    };
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<PriceSeries>> = (0..chunks.len()).map(|_| None).collect();
        loop {
            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tasks.abort_all();
                    warn!(%range, "chunked fetch cancelled; discarding partial results");
                    return Err(ChunkError::Cancelled);
                }
                joined = tasks.join_next() => joined,
            };

            let Some(joined) = joined else {
                break;
            };
            let (index, outcome) = joined.map_err(|e| ChunkError::Worker(e.to_string()))?;

            match outcome {
                Ok(series) => {
                    debug!(index, chunk = %chunks[index], points = series.len(), "sub-range fetched");
                    slots[index] = Some(series);
                }
                Err(source) => {
                    tasks.abort_all();
                    warn!(index, chunk = %chunks[index], error = %source, "sub-range fetch failed");
                    return Err(ChunkError::SubRangeFetchFailed {
                        index,
                        range: chunks[index],
                        source,
                    });
                }
            }
        }

        let ordered = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| ChunkError::Worker(format!("sub-range #{index} produced no result")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (series, dropped_duplicates) = merge_chunks(ordered).map_err(ChunkError::Merge)?;
        info!(
            %range,
            points = series.len(),
            dropped_duplicates,
            "price range assembled"
        );

        Ok(ChunkedSeries {
            series,
            chunks,
            dropped_duplicates,
        })
    }
}

/// Concatenates chunk series given in sub-range order.
///
/// A date reported by two adjacent chunks is kept once (the earlier chunk's
/// entry wins). Returns the merged series and the number of dropped entries.
///
/// # Errors
///
/// Returns [`ValidationError::UnorderedSeries`] when a chunk starts before the
/// previous chunk's last date.
pub fn merge_chunks(chunks: Vec<PriceSeries>) -> Result<(PriceSeries, usize), ValidationError> {
    let total = chunks.iter().map(PriceSeries::len).sum();
    let mut points: Vec<PricePoint> = Vec::with_capacity(total);
    let mut dropped = 0;

    for chunk in chunks {
        for point in chunk.into_points() {
            match points.last() {
                Some(last) if last.date() == point.date() => {
                    debug!(date = %point.date(), "dropping duplicate boundary quotation");
                    dropped += 1;
                }
                Some(last) if last.date() > point.date() => {
                    return Err(ValidationError::UnorderedSeries {
                        previous: last.date(),
                        next: point.date(),
                    });
                }
                _ => points.push(point),
            }
        }
    }

    Ok((PriceSeries::new(points)?, dropped))
}
