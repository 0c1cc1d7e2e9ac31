//! Retry policy for transient upstream failures.

use std::time::Duration;

use crate::data_source::SourceError;

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    Fixed(Duration),
    /// `base * factor^attempt`, capped at `max`. With `jitter` the delay is
    /// drawn uniformly from the upper half of that value.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(250),
            factor: 2.0,
            max: Duration::from_secs(4),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay before retry number `attempt` (0-based).
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed(delay) => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
                let seconds = (base.as_secs_f64() * factor.powi(exponent)).min(max.as_secs_f64());
                let capped = Duration::from_secs_f64(seconds.max(0.0));
                if !jitter {
                    return capped;
                }

                let ceiling_ms = u64::try_from(capped.as_millis()).unwrap_or(u64::MAX);
                Duration::from_millis(fastrand::u64(ceiling_ms / 2..=ceiling_ms))
            }
        }
    }
}

/// Retry settings applied by adapters around a single upstream request.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Retries after the first attempt; total attempts are `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
    pub retry_on_status: Vec<u16>,
    pub retry_on_timeout: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Backoff::default(),
            retry_on_status: vec![408, 429, 500, 502, 503, 504],
            retry_on_timeout: true,
        }
    }
}

impl RetryConfig {
    pub fn exponential(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed(delay),
            ..Self::default()
        }
    }

    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_on_status.contains(&status)
    }

    /// Returns how long to wait before retrying after `error` on attempt
    /// `attempt` (0-based), or `None` when the request must not be retried.
    pub fn next_delay(&self, attempt: u32, error: &SourceError) -> Option<Duration> {
        if attempt >= self.max_retries || !error.retryable() {
            return None;
        }
        if error.kind() == crate::SourceErrorKind::Timeout && !self.retry_on_timeout {
            return None;
        }
        Some(self.backoff.delay(attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_backoff_doubles_until_capped() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(100),
            factor: 2.0,
            max: Duration::from_millis(500),
            jitter: false,
        };

        assert_eq!(backoff.delay(0), Duration::from_millis(100));
        assert_eq!(backoff.delay(1), Duration::from_millis(200));
        assert_eq!(backoff.delay(2), Duration::from_millis(400));
        assert_eq!(backoff.delay(3), Duration::from_millis(500));
        assert_eq!(backoff.delay(40), Duration::from_millis(500));
    }

    #[test]
    fn jittered_delay_stays_in_upper_half() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(200),
            factor: 2.0,
            max: Duration::from_secs(1),
            jitter: true,
        };

        for _ in 0..50 {
            let delay = backoff.delay(1);
            assert!(delay >= Duration::from_millis(200), "{delay:?}");
            assert!(delay <= Duration::from_millis(400), "{delay:?}");
        }
    }

    #[test]
    fn stops_after_budget_or_on_permanent_errors() {
        let config = RetryConfig::fixed(Duration::from_millis(5), 2);
        let transient = SourceError::unavailable("status 503");

        assert_eq!(
            config.next_delay(0, &transient),
            Some(Duration::from_millis(5))
        );
        assert_eq!(
            config.next_delay(1, &transient),
            Some(Duration::from_millis(5))
        );
        assert_eq!(config.next_delay(2, &transient), None);
        assert_eq!(
            config.next_delay(0, &SourceError::invalid_request("bad range")),
            None
        );
    }

    #[test]
    fn timeouts_respect_toggle() {
        let mut config = RetryConfig::fixed(Duration::from_millis(1), 3);
        let timeout = SourceError::timeout("slow");
        assert!(config.next_delay(0, &timeout).is_some());

        config.retry_on_timeout = false;
        assert!(config.next_delay(0, &timeout).is_none());
    }

    #[test]
    fn default_retries_gateway_and_throttling_statuses() {
        let config = RetryConfig::default();
        for status in [408, 429, 500, 502, 503, 504] {
            assert!(config.should_retry_status(status), "{status}");
        }
        assert!(!config.should_retry_status(400));
        assert!(!config.should_retry_status(404));
        assert_eq!(RetryConfig::no_retry().max_retries, 0);
    }
}
