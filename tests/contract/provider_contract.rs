//! Contract every `PriceSource` must honor: for a provider-compliant range,
//! return a strictly chronological series of positive prices inside that range.

use std::sync::Arc;

use aurum_core::{
    CalendarDate, DateRange, HttpClient, HttpFuture, HttpRequest, HttpResponse, NbpAdapter,
    PriceSource, ProviderId, RetryConfig, SyntheticSource,
};

/// Serves NBP-shaped payloads for whatever `{start}/{end}` the adapter asks for.
struct NbpLikeServer;

impl NbpLikeServer {
    fn respond(url: &str) -> HttpResponse {
        let mut segments = url.rsplit('/');
        let end = segments.next().and_then(|raw| CalendarDate::parse(raw).ok());
        let start = segments.next().and_then(|raw| CalendarDate::parse(raw).ok());
        let (Some(start), Some(end)) = (start, end) else {
            return HttpResponse::new(400, "400 BadRequest - Błędny zakres dat");
        };

        let mut records = Vec::new();
        let mut cursor = Some(start);
        while let Some(day) = cursor.filter(|day| *day <= end) {
            if !day.is_weekend() {
                records.push(format!(
                    r#"{{"data":"{day}","cena":{}}}"#,
                    SyntheticSource::price_on(day)
                ));
            }
            cursor = day.next_day();
        }

        if records.is_empty() {
            HttpResponse::new(404, "404 NotFound - Not Found - Brak danych")
        } else {
            HttpResponse::ok_json(format!("[{}]", records.join(",")))
        }
    }
}

impl HttpClient for NbpLikeServer {
    fn execute(&self, request: HttpRequest) -> HttpFuture<'_> {
        let response = Self::respond(&request.url);
        Box::pin(async move { Ok(response) })
    }
}

fn sources() -> Vec<(ProviderId, Arc<dyn PriceSource>)> {
    ProviderId::ALL
        .into_iter()
        .map(|id| {
            let source: Arc<dyn PriceSource> = match id {
                ProviderId::Nbp => Arc::new(
                    NbpAdapter::new(Arc::new(NbpLikeServer)).with_retry(RetryConfig::no_retry()),
                ),
                ProviderId::Synthetic => Arc::new(SyntheticSource::new()),
            };
            (id, source)
        })
        .collect()
}

fn range(start: &str, end: &str) -> DateRange {
    DateRange::parse(start, end).expect("valid range")
}

#[tokio::test]
async fn every_source_reports_its_identifier() {
    for (id, source) in sources() {
        assert_eq!(source.id(), id);
    }
}

#[tokio::test]
async fn every_source_returns_ordered_positive_prices_within_range() {
    let query = range("2023-02-01", "2024-01-31");

    for (id, source) in sources() {
        let series = source
            .fetch_prices(query)
            .await
            .unwrap_or_else(|error| panic!("provider '{id}' failed: {error}"));

        assert!(!series.is_empty(), "provider '{id}': empty series");
        for point in &series {
            assert!(query.contains(point.date()), "provider '{id}': {} outside", point.date());
            assert!(point.price().is_sign_positive(), "provider '{id}': non-positive price");
        }
        for pair in series.points().windows(2) {
            assert!(pair[0].date() < pair[1].date(), "provider '{id}': unordered");
        }
    }
}

#[tokio::test]
async fn every_source_treats_a_quiet_weekend_as_empty() {
    // 2024-03-30 and 2024-03-31 are a Saturday and a Sunday.
    let weekend = range("2024-03-30", "2024-03-31");

    for (id, source) in sources() {
        let series = source
            .fetch_prices(weekend)
            .await
            .unwrap_or_else(|error| panic!("provider '{id}' failed: {error}"));
        assert!(series.is_empty(), "provider '{id}': expected no quotations");
    }
}

#[tokio::test]
async fn sources_agree_on_identical_quotations() {
    let query = range("2024-01-01", "2024-01-31");
    let mut fetched = Vec::new();
    for (_, source) in sources() {
        fetched.push(source.fetch_prices(query).await.expect("fetch succeeds"));
    }

    assert!(fetched.windows(2).all(|pair| pair[0] == pair[1]));
}
