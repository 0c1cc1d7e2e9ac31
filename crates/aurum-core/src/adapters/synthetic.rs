use std::time::Duration;

use rust_decimal::Decimal;

use crate::data_source::{FetchFuture, PriceSource, SourceError};
use crate::{CalendarDate, DateRange, PricePoint, PriceSeries, ProviderId};

/// Deterministic offline price source.
///
/// Quotes every weekday with a price derived only from the date, so the same
/// range always yields the same series regardless of how it was chunked.
#[derive(Debug, Clone, Default)]
pub struct SyntheticSource {
    latency: Option<Duration>,
}

impl SyntheticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an artificial delay to every fetch.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
        }
    }

    pub fn price_on(day: CalendarDate) -> Decimal {
        // Slow sawtooth trend (about 0.15 per day over a ~4 year cycle) plus a
        // bounded day-to-day wobble, in hundredths.
        let julian = i64::from(day.julian_day());
        let trend = (julian * 15).rem_euclid(22_000);
        let wobble = (julian * 7_919).rem_euclid(1_201) - 600;
        Decimal::new(15_000 + trend + wobble, 2)
    }

    fn series_for(range: DateRange) -> Result<PriceSeries, SourceError> {
        let capacity = usize::try_from(range.day_count()).unwrap_or_default();
        let mut points = Vec::with_capacity(capacity);
        let mut cursor = Some(range.start());

        while let Some(day) = cursor.filter(|day| *day <= range.end()) {
            if !day.is_weekend() {
                let point = PricePoint::new(day, Self::price_on(day))
                    .map_err(|e| SourceError::internal(e.to_string()))?;
                points.push(point);
            }
            cursor = day.next_day();
        }

        PriceSeries::new(points).map_err(|e| SourceError::internal(e.to_string()))
    }
}

impl PriceSource for SyntheticSource {
    fn id(&self) -> ProviderId {
        ProviderId::Synthetic
    }

    fn fetch_prices(&self, range: DateRange) -> FetchFuture<'_> {
        Box::pin(async move {
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            Self::series_for(range)
        })
    }
}
