//! Circuit build success statistics

use serde::{Deserialize, Serialize};

/// Success/failure counters for circuit builds within one session.
///
/// An owned value threaded explicitly through the supervisor — there is
/// no ambient counter state. Counters only ever increase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessStatistics {
    successes: u64,
    failures: u64,
}

impl SuccessStatistics {
    /// Create zeroed statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one successful circuit build.
    pub fn record_success(&mut self) {
        self.successes += 1;
    }

    /// Count one failed circuit build (or failed session attempt).
    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    /// Number of successful builds.
    #[must_use]
    pub const fn successes(&self) -> u64 {
        self.successes
    }

    /// Number of failures.
    #[must_use]
    pub const fn failures(&self) -> u64 {
        self.failures
    }
}
