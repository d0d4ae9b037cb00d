//! Circuit build supervision
//!
//! Drives the two nested measurement loops. The session loop establishes
//! a fresh control connection per attempt and gives up after the
//! configured attempt limit, keeping whatever partial samples the last
//! attempt produced. The repetition loop selects a path, builds and times
//! a circuit under a bounded retry budget, probes request latency over
//! it, and closes it before the next repetition begins. Errors never
//! escape the session loop; the caller always proceeds to persistence.

use super::{BuildTimeline, MeasurementSession, ProbeOutcome, RequestLatencyProbe};
use crate::config::MeasurementConfig;
use crate::control::{Circuit, CircuitEvent, ControlClient, ControlSession};
use crate::selector::RelaySelector;
use crate::store::CandidateStore;
use crate::{Error, Result};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

/// Orchestrates build attempts and probes for one measurement session.
pub struct CircuitBuildSupervisor<'a, C, S> {
    client: &'a C,
    candidates: &'a S,
    config: &'a MeasurementConfig,
}

impl<'a, C, S> CircuitBuildSupervisor<'a, C, S>
where
    C: ControlClient,
    S: CandidateStore,
{
    /// Create a supervisor over a control client and candidate store.
    #[must_use]
    pub const fn new(client: &'a C, candidates: &'a S, config: &'a MeasurementConfig) -> Self {
        Self {
            client,
            candidates,
            config,
        }
    }

    /// Run the full session loop and return the finished session.
    ///
    /// Never fails: a session that exhausts its attempt budget returns
    /// with whatever partial samples the final attempt collected and a
    /// failure counter reflecting every aborted attempt.
    pub async fn run(&self) -> MeasurementSession {
        let mut session = MeasurementSession::from_config(self.config);
        let mut attempts = 0;

        while attempts < session.attempt_limit() {
            session.reset_samples();

            match self.run_attempt(&mut session).await {
                Ok(()) => {
                    info!(
                        strategy = %session.strategy(),
                        geography = %session.geography(),
                        builds = session.build_samples_ms().len(),
                        probes = session.request_samples_ms().len(),
                        "measurement session completed"
                    );
                    return session;
                }
                Err(err) => {
                    attempts += 1;
                    session.statistics_mut().record_failure();
                    warn!(
                        attempt = attempts,
                        limit = session.attempt_limit(),
                        error = %err,
                        "session attempt aborted"
                    );
                }
            }
        }

        warn!(
            strategy = %session.strategy(),
            geography = %session.geography(),
            failures = session.statistics().failures(),
            "session attempt budget exhausted, keeping partial samples"
        );
        session
    }

    /// One whole-session attempt: fresh connection, all repetitions.
    async fn run_attempt(&self, session: &mut MeasurementSession) -> Result<()> {
        let mut control = self.client.connect().await?;
        let mut events = control.events()?;
        let mut timeline = BuildTimeline::new();
        let selector = RelaySelector::new(self.candidates);
        let probe =
            RequestLatencyProbe::new(self.config.probe_requests, self.config.endpoint.clone());

        for repetition in 0..session.repetitions() {
            let mut circuit = self
                .build_with_retry(&mut control, &mut events, &mut timeline, &selector, session)
                .await?;

            let outcome = probe.run(&mut circuit).await;
            circuit.close().await?;

            match outcome {
                ProbeOutcome::Completed { average_ms } => {
                    session.record_request_sample(average_ms);
                }
                ProbeOutcome::Aborted => {
                    debug!(repetition, "request probe aborted, sample discarded");
                }
            }
        }

        Ok(())
    }

    /// Build one circuit under the bounded retry budget.
    ///
    /// Build-level failures (including a missing candidate) consume retry
    /// attempts with backoff in between; anything else aborts the session
    /// attempt. On success the session's statistics and build-latency
    /// sequence are updated before the circuit is handed back.
    async fn build_with_retry(
        &self,
        control: &mut C::Session,
        events: &mut UnboundedReceiver<CircuitEvent>,
        timeline: &mut BuildTimeline,
        selector: &RelaySelector<'_, S>,
        session: &mut MeasurementSession,
    ) -> Result<<C::Session as ControlSession>::Circuit> {
        let policy = &self.config.retry;

        for attempt in 1..=policy.max_build_attempts {
            match self
                .try_build(control, events, timeline, selector, session)
                .await
            {
                Ok((circuit, latency_ms)) => {
                    session.statistics_mut().record_success();
                    session.record_build_sample(latency_ms);
                    return Ok(circuit);
                }
                Err(err) if err.is_build_failure() => {
                    session.statistics_mut().record_failure();
                    debug!(attempt, error = %err, "circuit build failed");
                    if attempt < policy.max_build_attempts {
                        tokio::time::sleep(policy.delay_after(attempt)).await;
                    }
                }
                Err(err) => return Err(err),
            }
        }

        Err(Error::BuildRetriesExhausted {
            attempts: policy.max_build_attempts,
        })
    }

    /// One build: select a path, build, derive latency from events.
    async fn try_build(
        &self,
        control: &mut C::Session,
        events: &mut UnboundedReceiver<CircuitEvent>,
        timeline: &mut BuildTimeline,
        selector: &RelaySelector<'_, S>,
        session: &MeasurementSession,
    ) -> Result<(<C::Session as ControlSession>::Circuit, i64)> {
        let path = selector
            .select(session.strategy(), session.geography())
            .await?;
        let circuit = control.build_circuit(&path).await?;

        while let Ok(event) = events.try_recv() {
            timeline.observe(event);
        }

        let circuit_id = circuit.id();
        match timeline.latency_for(circuit_id) {
            Some(latency_ms) => Ok((circuit, latency_ms)),
            None => {
                circuit.close().await?;
                Err(Error::CircuitBuild(format!(
                    "no lifecycle events observed for circuit {circuit_id}"
                )))
            }
        }
    }
}
