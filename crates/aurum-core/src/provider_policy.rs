use std::time::Duration;

use crate::retry::RetryConfig;
use crate::{CalendarDate, ProviderId};

/// Maximum total span a single query may request ("5 years").
pub const DEFAULT_CEILING_DAYS: u32 = 1825;

/// Per-provider request limits the chunker has to honor.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderPolicy {
    pub provider_id: ProviderId,
    /// Largest `end - start` (in days) one upstream request may cover.
    pub max_span_days: u32,
    /// Largest `end - start` (in days) a whole query may cover.
    pub ceiling_days: u32,
    /// First day the provider has data for, if bounded.
    pub earliest_date: Option<CalendarDate>,
    pub max_concurrency: usize,
    pub request_timeout: Duration,
    pub retry: RetryConfig,
}

impl ProviderPolicy {
    /// NBP gold prices: one year per request, published since 2013-01-02.
    pub fn nbp_default() -> Self {
        Self {
            provider_id: ProviderId::Nbp,
            max_span_days: 365,
            ceiling_days: DEFAULT_CEILING_DAYS,
            earliest_date: CalendarDate::from_ymd(2013, 1, 2).ok(),
            max_concurrency: 4,
            request_timeout: Duration::from_secs(10),
            retry: RetryConfig::exponential(3),
        }
    }

    pub fn synthetic_default() -> Self {
        Self {
            provider_id: ProviderId::Synthetic,
            max_span_days: 365,
            ceiling_days: DEFAULT_CEILING_DAYS,
            earliest_date: None,
            max_concurrency: 8,
            request_timeout: Duration::from_secs(1),
            retry: RetryConfig::no_retry(),
        }
    }

    pub fn default_for(provider_id: ProviderId) -> Self {
        match provider_id {
            ProviderId::Nbp => Self::nbp_default(),
            ProviderId::Synthetic => Self::synthetic_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nbp_policy_matches_public_api_limits() {
        let policy = ProviderPolicy::nbp_default();

        assert_eq!(policy.provider_id, ProviderId::Nbp);
        assert_eq!(policy.max_span_days, 365);
        assert_eq!(policy.ceiling_days, 1825);
        assert_eq!(
            policy.earliest_date.map(|day| day.to_string()).as_deref(),
            Some("2013-01-02")
        );
    }

    #[test]
    fn default_for_dispatches_on_provider() {
        assert_eq!(
            ProviderPolicy::default_for(ProviderId::Synthetic).provider_id,
            ProviderId::Synthetic
        );
        assert!(ProviderPolicy::default_for(ProviderId::Synthetic)
            .earliest_date
            .is_none());
    }
}
