use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::TrackerConfig;
use crate::data_source::{FetchFuture, PriceSource, SourceError};
use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
use crate::retry::RetryConfig;
use crate::{CalendarDate, DateRange, PricePoint, PriceSeries, ProviderId, ValidationError};

/// Public NBP (Narodowy Bank Polski) gold price endpoint.
pub const NBP_GOLD_BASE_URL: &str = "https://api.nbp.pl/api/cenyzlota";

/// Gold price adapter for the NBP public API.
///
/// `GET {base}/{start}/{end}` returns `[{"data": "YYYY-MM-DD", "cena": 250.12}, ...]`
/// for ranges of at most 367 days. A 404 means the range holds no quotations.
#[derive(Clone)]
pub struct NbpAdapter {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    retry: RetryConfig,
    timeout_ms: u64,
}

impl NbpAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: String::from(NBP_GOLD_BASE_URL),
            retry: RetryConfig::default(),
            timeout_ms: 10_000,
        }
    }

    /// Adapter over a reqwest client configured from `config`.
    ///
    /// `fetch_timeout` bounds a whole sub-range fetch, so every attempt gets an
    /// equal share of it and a timed-out request can still be retried.
    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(Arc::new(ReqwestHttpClient::new()))
            .with_base_url(config.base_url.clone())
            .with_retry(config.retry.clone())
            .with_timeout_ms(per_attempt_timeout_ms(config))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn endpoint(&self, range: &DateRange) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            range.start(),
            range.end()
        )
    }

    async fn fetch_with_retry(&self, range: DateRange) -> Result<PriceSeries, SourceError> {
        let endpoint = self.endpoint(&range);
        let mut attempt = 0_u32;

        loop {
            let request = HttpRequest::get(endpoint.as_str())
                .with_header("accept", "application/json")
                .with_timeout_ms(self.timeout_ms);

            debug!(%endpoint, attempt, "requesting nbp gold prices");
            let error = match self.http_client.execute(request).await {
                Ok(response) if response.is_success() => return parse_gold_prices(&response.body),
                Ok(response) if response.status == 404 => {
                    debug!(%range, "nbp has no quotations in range");
                    return Ok(PriceSeries::empty());
                }
                Ok(response) => self.status_error(&response),
                Err(error) => transport_error(&error),
            };

            match self.retry.next_delay(attempt, &error) {
                Some(delay) => {
                    warn!(
                        %range,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %error,
                        "retrying nbp request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => return Err(error),
            }
        }
    }

    fn status_error(&self, response: &HttpResponse) -> SourceError {
        let retryable = self.retry.should_retry_status(response.status);
        let detail = response.body.trim();
        let message = if detail.is_empty() || detail.len() > 200 {
            format!("nbp returned status {}", response.status)
        } else {
            format!("nbp returned status {}: {detail}", response.status)
        };

        match response.status {
            400 => SourceError::invalid_request(message),
            429 => SourceError::rate_limited(message).with_retryable(retryable),
            _ => SourceError::unavailable(message).with_retryable(retryable),
        }
    }
}

impl PriceSource for NbpAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Nbp
    }

    fn fetch_prices(&self, range: DateRange) -> FetchFuture<'_> {
        Box::pin(self.fetch_with_retry(range))
    }
}

#[derive(Debug, Deserialize)]
struct NbpGoldRecord {
    #[serde(rename = "data")]
    date: String,
    #[serde(rename = "cena")]
    price: serde_json::Number,
}

fn parse_gold_prices(body: &str) -> Result<PriceSeries, SourceError> {
    let records: Vec<NbpGoldRecord> = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed(format!("failed to parse nbp gold prices: {e}")))?;

    let points = records
        .into_iter()
        .map(normalize_record)
        .collect::<Result<Vec<_>, _>>()?;

    PriceSeries::new(points).map_err(validation_to_error)
}

fn normalize_record(record: NbpGoldRecord) -> Result<PricePoint, SourceError> {
    let date = CalendarDate::parse(&record.date).map_err(validation_to_error)?;
    let raw = record.price.to_string();
    let price = Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| SourceError::malformed(format!("nbp price '{raw}' on {date} is not a decimal")))?;

    PricePoint::new(date, price).map_err(validation_to_error)
}

fn transport_error(error: &HttpError) -> SourceError {
    if error.timed_out() {
        SourceError::timeout(format!("nbp request timed out: {}", error.message()))
    } else if error.retryable() {
        SourceError::unavailable(format!("nbp transport error: {}", error.message()))
    } else {
        SourceError::internal(format!("nbp transport error: {}", error.message()))
    }
}

fn validation_to_error(error: ValidationError) -> SourceError {
    SourceError::malformed(error.to_string())
}

fn per_attempt_timeout_ms(config: &TrackerConfig) -> u64 {
    let attempts = config.retry.max_retries.saturating_add(1);
    let share = config.fetch_timeout / attempts;
    u64::try_from(share.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::HttpFuture;

    struct ScriptedHttpClient {
        responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedHttpClient {
        fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .clone()
        }
    }

    impl HttpClient for ScriptedHttpClient {
        fn execute(&self, request: HttpRequest) -> HttpFuture<'_> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self
                .responses
                .lock()
                .expect("response script should not be poisoned")
                .pop_front()
                .unwrap_or_else(|| Err(HttpError::non_retryable("script exhausted")));
            Box::pin(async move { response })
        }
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::parse(start, end).expect("valid range")
    }

    fn adapter(client: Arc<ScriptedHttpClient>) -> NbpAdapter {
        NbpAdapter::new(client).with_retry(RetryConfig::fixed(Duration::from_millis(1), 2))
    }

    #[tokio::test]
    async fn parses_polish_field_names() {
        let client = Arc::new(ScriptedHttpClient::new(vec![Ok(HttpResponse::ok_json(
            r#"[{"data":"2024-01-02","cena":258.93},{"data":"2024-01-03","cena":257.4}]"#,
        ))]));
        let series = adapter(client.clone())
            .fetch_prices(range("2024-01-02", "2024-01-03"))
            .await
            .expect("valid payload");

        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0].price(), Decimal::new(25893, 2));
        assert_eq!(series.points()[1].date().to_string(), "2024-01-03");

        let requests = client.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url,
            "https://api.nbp.pl/api/cenyzlota/2024-01-02/2024-01-03"
        );
        assert_eq!(
            requests[0].headers.get("accept").map(String::as_str),
            Some("application/json")
        );
    }

    #[tokio::test]
    async fn not_found_means_no_quotations() {
        let client = Arc::new(ScriptedHttpClient::new(vec![Ok(HttpResponse::new(
            404,
            "404 NotFound - Not Found - Brak danych",
        ))]));
        let series = adapter(client)
            .fetch_prices(range("2024-03-30", "2024-03-31"))
            .await
            .expect("404 is an empty range");
        assert!(series.is_empty());
    }

    #[tokio::test]
    async fn retries_transient_status_then_succeeds() {
        let client = Arc::new(ScriptedHttpClient::new(vec![
            Ok(HttpResponse::new(503, "")),
            Err(HttpError::timeout("slow")),
            Ok(HttpResponse::ok_json(r#"[{"data":"2024-01-02","cena":258.93}]"#)),
        ]));
        let series = adapter(client.clone())
            .fetch_prices(range("2024-01-02", "2024-01-02"))
            .await
            .expect("third attempt succeeds");

        assert_eq!(series.len(), 1);
        assert_eq!(client.recorded_requests().len(), 3);
    }

    #[tokio::test]
    async fn bad_request_is_not_retried() {
        let client = Arc::new(ScriptedHttpClient::new(vec![Ok(HttpResponse::new(
            400,
            "400 BadRequest - Przekroczony limit 367 dni",
        ))]));
        let error = adapter(client.clone())
            .fetch_prices(range("2020-01-01", "2024-01-01"))
            .await
            .expect_err("must fail");

        assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
        assert!(error.message().contains("367"));
        assert_eq!(client.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn gives_up_after_retry_budget() {
        let client = Arc::new(ScriptedHttpClient::new(vec![
            Ok(HttpResponse::new(502, "")),
            Ok(HttpResponse::new(502, "")),
            Ok(HttpResponse::new(502, "")),
            Ok(HttpResponse::ok_json("[]")),
        ]));
        let error = adapter(client.clone())
            .fetch_prices(range("2024-01-02", "2024-01-05"))
            .await
            .expect_err("must fail");

        assert_eq!(error.kind(), SourceErrorKind::Unavailable);
        assert_eq!(client.recorded_requests().len(), 3);
    }

    #[tokio::test]
    async fn unordered_payload_is_malformed() {
        let client = Arc::new(ScriptedHttpClient::new(vec![Ok(HttpResponse::ok_json(
            r#"[{"data":"2024-01-03","cena":257.4},{"data":"2024-01-02","cena":258.93}]"#,
        ))]));
        let error = adapter(client)
            .fetch_prices(range("2024-01-02", "2024-01-03"))
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Malformed);
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let adapter = NbpAdapter::new(Arc::new(ScriptedHttpClient::new(Vec::new())))
            .with_base_url("http://localhost:8080/cenyzlota/");
        assert_eq!(
            adapter.endpoint(&range("2023-01-01", "2023-12-31")),
            "http://localhost:8080/cenyzlota/2023-01-01/2023-12-31"
        );
    }

    #[test]
    fn each_attempt_gets_a_share_of_the_fetch_budget() {
        let mut config = TrackerConfig::for_provider(ProviderId::Nbp);
        config.fetch_timeout = Duration::from_secs(10);
        config.retry.max_retries = 3;
        assert_eq!(NbpAdapter::from_config(&config).timeout_ms, 2_500);

        config.retry.max_retries = 0;
        assert_eq!(NbpAdapter::from_config(&config).timeout_ms, 10_000);

        config.fetch_timeout = Duration::from_micros(10);
        config.retry.max_retries = u32::MAX;
        assert_eq!(per_attempt_timeout_ms(&config), 1);
    }

    #[tokio::test]
    async fn timed_out_attempt_is_retried_within_the_budget() {
        let mut config = TrackerConfig::for_provider(ProviderId::Nbp);
        config.fetch_timeout = Duration::from_millis(900);
        config.retry = RetryConfig::fixed(Duration::from_millis(1), 2);
        let client = Arc::new(ScriptedHttpClient::new(vec![
            Err(HttpError::timeout("slow")),
            Ok(HttpResponse::ok_json(r#"[{"data":"2024-01-02","cena":258.93}]"#)),
        ]));

        let series = NbpAdapter::new(client.clone())
            .with_retry(config.retry.clone())
            .with_timeout_ms(per_attempt_timeout_ms(&config))
            .fetch_prices(range("2024-01-02", "2024-01-02"))
            .await
            .expect("second attempt succeeds");

        assert_eq!(series.len(), 1);
        let requests = client.recorded_requests();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|request| request.timeout_ms == 300));
    }
}
