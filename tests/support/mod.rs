//! Shared fixtures for the behavior tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use aurum_core::{
    CalendarDate, DateRange, FetchFuture, PricePoint, PriceSeries, PriceSource, ProviderId,
    SourceError, SyntheticSource,
};
use rust_decimal::Decimal;

pub fn day(raw: &str) -> CalendarDate {
    CalendarDate::parse(raw).expect("valid day")
}

pub fn range(start: &str, end: &str) -> DateRange {
    DateRange::parse(start, end).expect("valid range")
}

/// Consecutive daily prices starting at `start`.
pub fn daily_series(start: &str, prices: &[i64]) -> PriceSeries {
    let first = day(start);
    let points = prices
        .iter()
        .enumerate()
        .map(|(offset, price)| {
            let date = first
                .checked_add_days(i64::try_from(offset).expect("offset"))
                .expect("date in range");
            PricePoint::new(date, Decimal::new(*price, 0)).expect("positive price")
        })
        .collect();
    PriceSeries::new(points).expect("ordered series")
}

/// Every day of `range` (weekends included), priced like the synthetic source.
pub fn every_day(range: DateRange) -> PriceSeries {
    let mut points = Vec::new();
    let mut cursor = Some(range.start());
    while let Some(date) = cursor.filter(|date| *date <= range.end()) {
        points.push(PricePoint::new(date, SyntheticSource::price_on(date)).expect("positive"));
        cursor = date.next_day();
    }
    PriceSeries::new(points).expect("ordered series")
}

/// What a scripted fetch does for one sub-range.
pub struct Step {
    pub delay: Duration,
    pub result: Result<PriceSeries, SourceError>,
}

impl Step {
    pub fn ok(series: PriceSeries) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(series),
        }
    }

    pub fn fail(error: SourceError) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(error),
        }
    }

    pub fn hang() -> Self {
        Self::ok(PriceSeries::empty()).after(Duration::from_secs(30))
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Script = dyn Fn(DateRange) -> Step + Send + Sync;

/// Price source driven by a closure, recording how it was called.
pub struct ScriptedSource {
    script: Box<Script>,
    calls: Mutex<Vec<DateRange>>,
    completed: Mutex<Vec<DateRange>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(DateRange) -> Step + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
            completed: Mutex::new(Vec::new()),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Answers every sub-range with its daily series.
    pub fn every_day() -> Self {
        Self::new(|range| Step::ok(every_day(range)))
    }

    pub fn calls(&self) -> Vec<DateRange> {
        self.calls.lock().expect("call log").clone()
    }

    /// Sub-ranges whose fetch ran to completion (not aborted).
    pub fn completed(&self) -> Vec<DateRange> {
        self.completed.lock().expect("completion log").clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl PriceSource for ScriptedSource {
    fn id(&self) -> ProviderId {
        ProviderId::Synthetic
    }

    fn fetch_prices(&self, range: DateRange) -> FetchFuture<'_> {
        self.calls.lock().expect("call log").push(range);
        let step = (self.script)(range);

        Box::pin(async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
            let _guard = InFlightGuard(Arc::clone(&self.in_flight));

            if !step.delay.is_zero() {
                tokio::time::sleep(step.delay).await;
            }
            self.completed.lock().expect("completion log").push(range);
            step.result
        })
    }
}
