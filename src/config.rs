//! Measurement configuration
//!
//! One `MeasurementConfig` describes one pipeline invocation: which
//! strategy/geography/period to measure, how many repetitions to run, and
//! the budgets bounding session retries and per-repetition build retries.
//! Built through the builder; deserializable from JSON for file-driven
//! invocation.

use crate::relay::{Geography, Period, Strategy};
use crate::{Error, Result};
use serde::Deserialize;
use std::time::Duration;

/// Default repetitions per strategy/geography combination.
pub const DEFAULT_REPETITIONS: u32 = 10;

/// Default bound on whole-session attempts.
pub const DEFAULT_ATTEMPT_LIMIT: u32 = 5;

/// Default number of sequential requests per probe.
pub const DEFAULT_PROBE_REQUESTS: usize = 50;

/// Bounded retry schedule for circuit builds within one repetition.
///
/// Replaces retry-until-success: a persistently failing path costs
/// `max_build_attempts` builds with exponential backoff in between, then
/// surfaces [`crate::Error::BuildRetriesExhausted`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Build attempts per repetition before giving up.
    pub max_build_attempts: u32,
    /// Delay before the second attempt.
    #[serde(with = "duration_ms")]
    pub initial_backoff: Duration,
    /// Multiplier applied to the delay after every failed attempt.
    pub backoff_multiplier: f64,
    /// Ceiling on the per-attempt delay.
    #[serde(with = "duration_ms")]
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_build_attempts: 8,
            initial_backoff: Duration::from_millis(250),
            backoff_multiplier: 2.0,
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Delay to sleep after failed attempt number `attempt` (1-based).
    ///
    /// Exponential from `initial_backoff`, capped at `max_backoff`.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let factor = self.backoff_multiplier.powi(exponent as i32);
        let delay_ms = (self.initial_backoff.as_millis() as f64 * factor)
            .min(self.max_backoff.as_millis() as f64);
        Duration::from_millis(delay_ms as u64)
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}

/// Configuration for one measurement pipeline invocation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MeasurementConfig {
    /// Relay-selection strategy under measurement.
    pub strategy: Strategy,
    /// Geography restriction (tag only for the weighted strategy).
    pub geography: Geography,
    /// Time-of-day tag attached to persisted samples.
    pub period: Period,
    /// Repetitions per invocation.
    #[serde(default = "default_repetitions")]
    pub repetitions: u32,
    /// Bound on whole-session attempts.
    #[serde(default = "default_attempt_limit")]
    pub attempt_limit: u32,
    /// Sequential requests per probe.
    #[serde(default = "default_probe_requests")]
    pub probe_requests: usize,
    /// Measurement endpoint requests are issued against.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Control-protocol endpoint host.
    #[serde(default = "default_control_host")]
    pub control_host: String,
    /// Control-protocol port.
    #[serde(default = "default_control_port")]
    pub control_port: u16,
    /// Transport proxy (SOCKS) port requests are routed through.
    #[serde(default = "default_socks_port")]
    pub socks_port: u16,
    /// Build retry budget and backoff schedule.
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_repetitions() -> u32 {
    DEFAULT_REPETITIONS
}

fn default_attempt_limit() -> u32 {
    DEFAULT_ATTEMPT_LIMIT
}

fn default_probe_requests() -> usize {
    DEFAULT_PROBE_REQUESTS
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8080/probe.bin".to_string()
}

fn default_control_host() -> String {
    "127.0.0.1".to_string()
}

fn default_control_port() -> u16 {
    9051
}

fn default_socks_port() -> u16 {
    9050
}

impl MeasurementConfig {
    /// Create a builder for the given strategy, geography, and period.
    #[must_use]
    pub fn builder(strategy: Strategy, geography: Geography, period: Period) -> ConfigBuilder {
        ConfigBuilder::new(strategy, geography, period)
    }

    /// Validate budgets and endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when any count is zero or the
    /// endpoint is empty.
    pub fn validate(&self) -> Result<()> {
        if self.repetitions == 0 {
            return Err(Error::InvalidConfig("repetitions must be at least 1".into()));
        }
        if self.attempt_limit == 0 {
            return Err(Error::InvalidConfig(
                "attempt_limit must be at least 1".into(),
            ));
        }
        if self.probe_requests == 0 {
            return Err(Error::InvalidConfig(
                "probe_requests must be at least 1".into(),
            ));
        }
        if self.retry.max_build_attempts == 0 {
            return Err(Error::InvalidConfig(
                "max_build_attempts must be at least 1".into(),
            ));
        }
        if self.endpoint.is_empty() {
            return Err(Error::InvalidConfig("endpoint must not be empty".into()));
        }
        Ok(())
    }
}

/// Builder for [`MeasurementConfig`].
#[derive(Debug)]
pub struct ConfigBuilder {
    config: MeasurementConfig,
}

impl ConfigBuilder {
    /// Create a new builder with required fields and defaults elsewhere.
    #[must_use]
    pub fn new(strategy: Strategy, geography: Geography, period: Period) -> Self {
        Self {
            config: MeasurementConfig {
                strategy,
                geography,
                period,
                repetitions: DEFAULT_REPETITIONS,
                attempt_limit: DEFAULT_ATTEMPT_LIMIT,
                probe_requests: DEFAULT_PROBE_REQUESTS,
                endpoint: default_endpoint(),
                control_host: default_control_host(),
                control_port: default_control_port(),
                socks_port: default_socks_port(),
                retry: RetryPolicy::default(),
            },
        }
    }

    /// Set the repetition count.
    #[must_use]
    pub const fn repetitions(mut self, repetitions: u32) -> Self {
        self.config.repetitions = repetitions;
        self
    }

    /// Set the session attempt limit.
    #[must_use]
    pub const fn attempt_limit(mut self, attempt_limit: u32) -> Self {
        self.config.attempt_limit = attempt_limit;
        self
    }

    /// Set the number of requests per probe.
    #[must_use]
    pub const fn probe_requests(mut self, probe_requests: usize) -> Self {
        self.config.probe_requests = probe_requests;
        self
    }

    /// Set the measurement endpoint.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    /// Set the control endpoint host and port.
    #[must_use]
    pub fn control_endpoint(mut self, host: impl Into<String>, port: u16) -> Self {
        self.config.control_host = host.into();
        self.config.control_port = port;
        self
    }

    /// Set the transport proxy port.
    #[must_use]
    pub const fn socks_port(mut self, port: u16) -> Self {
        self.config.socks_port = port;
        self
    }

    /// Set the build retry policy.
    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// Validate and build the [`MeasurementConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when validation fails.
    pub fn build(self) -> Result<MeasurementConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_builder() -> ConfigBuilder {
        MeasurementConfig::builder(Strategy::Continent, Geography::new("EU"), Period::Day)
    }

    #[test]
    fn test_defaults_match_invocation_surface() {
        let config = base_builder().build().unwrap();
        assert_eq!(config.repetitions, 10);
        assert_eq!(config.attempt_limit, 5);
        assert_eq!(config.probe_requests, 50);
        assert_eq!(config.control_port, 9051);
        assert_eq!(config.socks_port, 9050);
    }

    #[test]
    fn test_zero_budgets_are_rejected() {
        assert!(base_builder().repetitions(0).build().is_err());
        assert!(base_builder().attempt_limit(0).build().is_err());
        assert!(base_builder().probe_requests(0).build().is_err());

        let bad_retry = RetryPolicy {
            max_build_attempts: 0,
            ..RetryPolicy::default()
        };
        assert!(base_builder().retry(bad_retry).build().is_err());
    }

    #[test]
    fn test_backoff_schedule_is_exponential_and_capped() {
        let policy = RetryPolicy {
            max_build_attempts: 6,
            initial_backoff: Duration::from_millis(100),
            backoff_multiplier: 2.0,
            max_backoff: Duration::from_millis(600),
        };

        assert_eq!(policy.delay_after(1), Duration::from_millis(100));
        assert_eq!(policy.delay_after(2), Duration::from_millis(200));
        assert_eq!(policy.delay_after(3), Duration::from_millis(400));
        // capped from here on
        assert_eq!(policy.delay_after(4), Duration::from_millis(600));
        assert_eq!(policy.delay_after(10), Duration::from_millis(600));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: MeasurementConfig = serde_json::from_str(
            r#"{
                "strategy": "country_code",
                "geography": "DE",
                "period": "ni",
                "repetitions": 3
            }"#,
        )
        .unwrap();

        assert_eq!(config.strategy, Strategy::Country);
        assert_eq!(config.geography.as_str(), "DE");
        assert_eq!(config.period, Period::Night);
        assert_eq!(config.repetitions, 3);
        assert_eq!(config.attempt_limit, 5);
        assert_eq!(config.retry, RetryPolicy::default());
        config.validate().unwrap();
    }
}
