//! # Aurum Core
//!
//! Gold price retrieval and best-trade analysis.
//!
//! ## Overview
//!
//! - **Domain models** for dates, ranges, price series and investment amounts
//! - **Range chunking** of long queries into provider-compliant sub-ranges,
//!   fetched concurrently and merged back in chronological order
//! - **Profit analysis** finding the single most profitable buy/sell pair
//! - **Provider adapters** for the NBP gold price API and an offline source
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Price sources (NBP, synthetic) |
//! | [`analyzer`] | Best-trade search and return projection |
//! | [`chunker`] | Range splitting, concurrent fetch and merge |
//! | [`config`] | Environment-driven tracker configuration |
//! | [`data_source`] | Fetch capability trait and adapter errors |
//! | [`domain`] | Domain models (CalendarDate, DateRange, PriceSeries) |
//! | [`error`] | Validation and chunked-fetch errors |
//! | [`http_client`] | HTTP client abstraction |
//! | [`provider_policy`] | Per-provider span, history and retry limits |
//! | [`retry`] | Retry and backoff policy |
//! | [`source`] | Provider identifiers |
//! | [`tracker`] | Query entry point |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use aurum_core::{DateRange, InvestmentAmount, PriceTracker, TrackerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tracker = PriceTracker::from_config(&TrackerConfig::from_env()?)?;
//!
//!     let range = DateRange::parse("2021-01-04", "2022-12-30")?;
//!     let amount: InvestmentAmount = "1000".parse()?;
//!     let result = tracker.get_analysis(range, Some(amount)).await?;
//!
//!     if let (Some(buy), Some(sell)) = (result.buy_date, result.sell_date) {
//!         println!("buy {buy}, sell {sell}, final {}", result.rounded(2).final_amount);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / Caller   │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  PriceTracker   │────▶│ ProfitAnalyzer   │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  RangeChunker   │  split → concurrent fetch → ordered merge
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ PriceSource     │────▶│ HTTP Client      │
//! │ (Adapter Trait) │     │ (reqwest)        │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Invalid input is rejected as a [`ValidationError`] before any network
//! activity. A chunked fetch either returns the complete series or a
//! [`ChunkError`] naming the failing sub-range:
//!
//! ```rust
//! use aurum_core::{ChunkError, SourceErrorKind};
//!
//! fn describe(error: &ChunkError) -> String {
//!     match error {
//!         ChunkError::SubRangeFetchFailed { index, range, source }
//!             if source.kind() == SourceErrorKind::Timeout =>
//!         {
//!             format!("chunk #{index} ({range}) timed out")
//!         }
//!         other => other.to_string(),
//!     }
//! }
//! ```
//!
//! A series without a profitable pair is not an error; it is reported as
//! [`TradeOutcome::NoProfitableTrade`].

pub mod adapters;
pub mod analyzer;
pub mod chunker;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod provider_policy;
pub mod retry;
pub mod source;
pub mod tracker;

// Adapter implementations
pub use adapters::{NbpAdapter, SyntheticSource, NBP_GOLD_BASE_URL};

// Analysis
pub use analyzer::{analyze, best_trade, best_trade_exhaustive, AnalysisResult, Trade, TradeOutcome};

// Chunking
pub use chunker::{merge_chunks, ChunkedSeries, RangeChunker};

pub use config::TrackerConfig;

// Data source trait and types
pub use data_source::{FetchFuture, PriceSource, SourceError, SourceErrorKind};

// Domain models
pub use domain::{CalendarDate, DateRange, InvestmentAmount, PricePoint, PriceSeries};

// Errors
pub use error::{ChunkError, ValidationError};

// HTTP client
pub use http_client::{HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse, ReqwestHttpClient};

// Policies
pub use provider_policy::{ProviderPolicy, DEFAULT_CEILING_DAYS};
pub use retry::{Backoff, RetryConfig};

pub use source::ProviderId;
pub use tracker::PriceTracker;
