//! Request latency probe
//!
//! Issues a fixed number of sequential requests over an established
//! circuit and reports the average elapsed time. The first failed request
//! invalidates the whole sample: the probe aborts immediately, produces
//! no average, and leaves closing the circuit to the caller. There are no
//! retry semantics at this level.

use crate::control::Circuit;
use tokio::time::Instant;
use tracing::debug;

/// Outcome of one probe run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeOutcome {
    /// All requests succeeded; `average_ms` is the mean elapsed time.
    Completed {
        /// Mean request latency in milliseconds.
        average_ms: f64,
    },
    /// A request failed before the full count completed. No average is
    /// produced and the sample must not be recorded.
    Aborted,
}

impl ProbeOutcome {
    /// The average latency, when the probe completed.
    #[must_use]
    pub const fn average_ms(&self) -> Option<f64> {
        match self {
            Self::Completed { average_ms } => Some(*average_ms),
            Self::Aborted => None,
        }
    }
}

/// Sequential request prober for one circuit.
#[derive(Debug, Clone)]
pub struct RequestLatencyProbe {
    requests: usize,
    endpoint: String,
}

impl RequestLatencyProbe {
    /// Create a probe issuing `requests` sequential requests against
    /// `endpoint`.
    #[must_use]
    pub fn new(requests: usize, endpoint: impl Into<String>) -> Self {
        Self {
            requests,
            endpoint: endpoint.into(),
        }
    }

    /// Number of requests per run.
    #[must_use]
    pub const fn requests(&self) -> usize {
        self.requests
    }

    /// Endpoint requests are issued against.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run the probe over `circuit`.
    pub async fn run<C: Circuit>(&self, circuit: &mut C) -> ProbeOutcome {
        let mut total_ms = 0.0_f64;

        for request in 0..self.requests {
            let started = Instant::now();
            match circuit.fetch(&self.endpoint).await {
                Ok(_) => {
                    total_ms += started.elapsed().as_millis() as f64;
                }
                Err(err) => {
                    debug!(
                        circuit_id = circuit.id(),
                        request,
                        error = %err,
                        "probe request failed, aborting sample"
                    );
                    return ProbeOutcome::Aborted;
                }
            }
        }

        ProbeOutcome::Completed {
            average_ms: total_ms / self.requests as f64,
        }
    }
}
