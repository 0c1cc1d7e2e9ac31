//! Query entry point composing the chunker and the analyzer.
//!
//! A tracker serves one logical query at a time. Starting a new query cancels
//! the one still in flight, so a superseded range can never be reported as the
//! answer to the newer request.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::adapters::{NbpAdapter, SyntheticSource};
use crate::analyzer::{analyze, AnalysisResult};
use crate::chunker::{ChunkedSeries, RangeChunker};
use crate::config::TrackerConfig;
use crate::data_source::PriceSource;
use crate::error::ChunkError;
use crate::{DateRange, InvestmentAmount, ProviderId, ValidationError};

struct InFlight {
    generation: u64,
    token: CancellationToken,
}

pub struct PriceTracker {
    source: Arc<dyn PriceSource>,
    chunker: RangeChunker,
    in_flight: Mutex<Option<InFlight>>,
    generation: AtomicU64,
}

impl PriceTracker {
    pub fn new(source: Arc<dyn PriceSource>, chunker: RangeChunker) -> Self {
        Self {
            source,
            chunker,
            in_flight: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Builds the configured source and a chunker honoring its limits.
    pub fn from_config(config: &TrackerConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        let source: Arc<dyn PriceSource> = match config.source {
            ProviderId::Nbp => Arc::new(NbpAdapter::from_config(config)),
            ProviderId::Synthetic => Arc::new(SyntheticSource::new()),
        };
        Ok(Self::new(source, RangeChunker::from_config(config)))
    }

    pub fn source_id(&self) -> ProviderId {
        self.source.id()
    }

    pub fn chunker(&self) -> &RangeChunker {
        &self.chunker
    }

    /// Sub-ranges a query for `range` would fetch, without fetching them.
    pub fn plan(&self, range: &DateRange) -> Result<Vec<DateRange>, ValidationError> {
        self.chunker.plan(range)
    }

    /// Fetches the merged series for `range`, superseding any query in flight.
    pub async fn get_prices(&self, range: DateRange) -> Result<ChunkedSeries, ChunkError> {
        let query = self.begin_query();
        self.chunker
            .fetch(Arc::clone(&self.source), range, &query.token)
            .await
    }

    /// Fetches `range` and reports its best trade, projected onto `investment`.
    pub async fn get_analysis(
        &self,
        range: DateRange,
        investment: Option<InvestmentAmount>,
    ) -> Result<AnalysisResult, ChunkError> {
        let fetched = self.get_prices(range).await?;
        let result = analyze(&fetched.series, investment)?;
        info!(
            %range,
            outcome = ?result.outcome(),
            points = fetched.series.len(),
            "analysis complete"
        );
        Ok(result)
    }

    /// Cancels the query in flight, if any.
    pub fn cancel_in_flight(&self) -> bool {
        let slot = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match slot {
            Some(previous) => {
                previous.token.cancel();
                info!(generation = previous.generation, "in-flight query cancelled");
                true
            }
            None => false,
        }
    }

    fn begin_query(&self) -> QueryGuard<'_> {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let token = CancellationToken::new();

        let previous = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(InFlight {
                generation,
                token: token.clone(),
            });
        if let Some(previous) = previous {
            previous.token.cancel();
            info!(
                superseded = previous.generation,
                by = generation,
                "query superseded"
            );
        }

        QueryGuard {
            tracker: self,
            generation,
            token,
        }
    }

    fn finish_query(&self, generation: u64) {
        let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|current| current.generation == generation) {
            *slot = None;
            debug!(generation, "query finished");
        }
    }
}

/// Clears the in-flight slot when a query ends, including when its future is dropped.
struct QueryGuard<'a> {
    tracker: &'a PriceTracker,
    generation: u64,
    token: CancellationToken,
}

impl Drop for QueryGuard<'_> {
    fn drop(&mut self) {
        self.tracker.finish_query(self.generation);
    }
}
