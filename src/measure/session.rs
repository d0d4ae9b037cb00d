//! Measurement session state
//!
//! A `MeasurementSession` is created at the start of one pipeline
//! invocation and handed to the results writer at the end; it is never
//! persisted directly. It owns the session's `SuccessStatistics` and both
//! ordered sample sequences.

use super::SuccessStatistics;
use crate::config::MeasurementConfig;
use crate::relay::{Geography, Period, Strategy};

/// State for one measurement pipeline invocation.
///
/// Invariants maintained by the supervisor:
/// - build-latency samples equal successful builds within the surviving
///   session attempt, never exceeding `repetitions`
/// - each repetition contributes at most one request-latency sample
/// - statistics counters never decrease
#[derive(Debug, Clone)]
pub struct MeasurementSession {
    strategy: Strategy,
    geography: Geography,
    period: Period,
    repetitions: u32,
    attempt_limit: u32,
    statistics: SuccessStatistics,
    build_samples_ms: Vec<i64>,
    request_samples_ms: Vec<f64>,
}

impl MeasurementSession {
    /// Create a fresh session from a validated configuration.
    #[must_use]
    pub fn from_config(config: &MeasurementConfig) -> Self {
        Self::new(
            config.strategy,
            config.geography.clone(),
            config.period,
            config.repetitions,
            config.attempt_limit,
        )
    }

    /// Create a fresh session.
    #[must_use]
    pub fn new(
        strategy: Strategy,
        geography: Geography,
        period: Period,
        repetitions: u32,
        attempt_limit: u32,
    ) -> Self {
        Self {
            strategy,
            geography,
            period,
            repetitions,
            attempt_limit,
            statistics: SuccessStatistics::new(),
            build_samples_ms: Vec::new(),
            request_samples_ms: Vec::new(),
        }
    }

    /// Strategy under measurement.
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Geography tag for persisted samples.
    #[must_use]
    pub const fn geography(&self) -> &Geography {
        &self.geography
    }

    /// Time-of-day tag for persisted samples.
    #[must_use]
    pub const fn period(&self) -> Period {
        self.period
    }

    /// Configured repetition count.
    #[must_use]
    pub const fn repetitions(&self) -> u32 {
        self.repetitions
    }

    /// Bound on whole-session attempts.
    #[must_use]
    pub const fn attempt_limit(&self) -> u32 {
        self.attempt_limit
    }

    /// The session's build statistics.
    #[must_use]
    pub const fn statistics(&self) -> &SuccessStatistics {
        &self.statistics
    }

    /// Mutable access to the session's build statistics.
    pub fn statistics_mut(&mut self) -> &mut SuccessStatistics {
        &mut self.statistics
    }

    /// Build-latency samples in repetition order, milliseconds.
    #[must_use]
    pub fn build_samples_ms(&self) -> &[i64] {
        &self.build_samples_ms
    }

    /// Request-latency averages in repetition order, milliseconds.
    #[must_use]
    pub fn request_samples_ms(&self) -> &[f64] {
        &self.request_samples_ms
    }

    /// Append one build-latency sample.
    pub fn record_build_sample(&mut self, latency_ms: i64) {
        self.build_samples_ms.push(latency_ms);
    }

    /// Append one request-latency average.
    pub fn record_request_sample(&mut self, average_ms: f64) {
        self.request_samples_ms.push(average_ms);
    }

    /// Drop samples collected by an aborted session attempt.
    ///
    /// Called at the start of every attempt so the sample sequences only
    /// reflect the surviving attempt. Statistics are deliberately left
    /// untouched; counters span all attempts.
    pub fn reset_samples(&mut self) {
        self.build_samples_ms.clear();
        self.request_samples_ms.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> MeasurementSession {
        MeasurementSession::new(
            Strategy::Continent,
            Geography::new("EU"),
            Period::Day,
            10,
            5,
        )
    }

    #[test]
    fn test_samples_accumulate_in_order() {
        let mut s = session();
        s.record_build_sample(410);
        s.record_build_sample(395);
        s.record_request_sample(101.5);

        assert_eq!(s.build_samples_ms(), &[410, 395]);
        assert_eq!(s.request_samples_ms(), &[101.5]);
    }

    #[test]
    fn test_reset_keeps_statistics() {
        let mut s = session();
        s.statistics_mut().record_success();
        s.statistics_mut().record_failure();
        s.record_build_sample(410);
        s.record_request_sample(99.0);

        s.reset_samples();

        assert!(s.build_samples_ms().is_empty());
        assert!(s.request_samples_ms().is_empty());
        assert_eq!(s.statistics().successes(), 1);
        assert_eq!(s.statistics().failures(), 1);
    }
}
