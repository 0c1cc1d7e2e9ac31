//! Runtime configuration for a price tracker.
//!
//! Defaults come from the selected provider's [`ProviderPolicy`]; environment
//! variables override them, and callers (the CLI) may override again.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `AURUM_SOURCE` | [`TrackerConfig::source`] |
//! | `AURUM_BASE_URL` | [`TrackerConfig::base_url`] |
//! | `AURUM_MAX_SPAN_DAYS` | [`TrackerConfig::max_span_days`] |
//! | `AURUM_CEILING_DAYS` | [`TrackerConfig::ceiling_days`] |
//! | `AURUM_TIMEOUT_MS` | [`TrackerConfig::fetch_timeout`] |
//! | `AURUM_MAX_CONCURRENCY` | [`TrackerConfig::max_concurrency`] |
//! | `AURUM_MAX_RETRIES` | `retry.max_retries` |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::adapters::NBP_GOLD_BASE_URL;
use crate::provider_policy::ProviderPolicy;
use crate::retry::RetryConfig;
use crate::{CalendarDate, ProviderId, ValidationError};

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub source: ProviderId,
    pub base_url: String,
    pub max_span_days: u32,
    pub ceiling_days: u32,
    pub earliest_date: Option<CalendarDate>,
    /// Budget for one sub-range fetch, retries included.
    pub fetch_timeout: Duration,
    pub max_concurrency: usize,
    pub retry: RetryConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::for_provider(ProviderId::Nbp)
    }
}

impl TrackerConfig {
    pub fn for_provider(provider_id: ProviderId) -> Self {
        let policy = ProviderPolicy::default_for(provider_id);
        Self {
            source: provider_id,
            base_url: String::from(NBP_GOLD_BASE_URL),
            max_span_days: policy.max_span_days,
            ceiling_days: policy.ceiling_days,
            earliest_date: policy.earliest_date,
            fetch_timeout: policy.request_timeout,
            max_concurrency: policy.max_concurrency,
            retry: policy.retry,
        }
    }

    /// Builds a configuration from the process environment.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = match lookup("AURUM_SOURCE") {
            Some(raw) => raw.parse::<ProviderId>()?,
            None => ProviderId::Nbp,
        };
        let mut config = Self::for_provider(source);

        if let Some(base_url) = lookup("AURUM_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(days) = parse_var(&lookup, "AURUM_MAX_SPAN_DAYS", "max_span_days")? {
            config.max_span_days = days;
        }
        if let Some(days) = parse_var(&lookup, "AURUM_CEILING_DAYS", "ceiling_days")? {
            config.ceiling_days = days;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "AURUM_TIMEOUT_MS", "fetch_timeout")? {
            config.fetch_timeout = Duration::from_millis(ms);
        }
        if let Some(limit) = parse_var(&lookup, "AURUM_MAX_CONCURRENCY", "max_concurrency")? {
            config.max_concurrency = limit;
        }
        if let Some(retries) = parse_var(&lookup, "AURUM_MAX_RETRIES", "max_retries")? {
            config.retry.max_retries = retries;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(invalid("base_url", "must be an http(s) URL"));
        }
        if self.max_span_days == 0 {
            return Err(invalid("max_span_days", "must be at least one day"));
        }
        if self.fetch_timeout.is_zero() {
            return Err(invalid("fetch_timeout", "must be greater than zero"));
        }
        if self.max_concurrency == 0 {
            return Err(invalid("max_concurrency", "must be at least 1"));
        }
        Ok(())
    }
}

fn parse_var<T, F>(
    lookup: &F,
    key: &str,
    field: &'static str,
) -> Result<Option<T>, ValidationError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| invalid(field, format!("'{raw}' is not a valid number"))),
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidConfig {
        field,
        reason: reason.into(),
    }
}
