//! Measurement orchestration
//!
//! The pieces of the measurement loop: session state, build statistics,
//! the lifecycle-event timeline, the request probe, and the supervisor
//! that ties them together. [`run_and_persist`] is the whole pipeline for
//! one invocation — run the session, then hand everything to the results
//! writer, which always attempts the summary row.

mod probe;
mod session;
mod stats;
mod supervisor;
mod timeline;

pub use probe::{ProbeOutcome, RequestLatencyProbe};
pub use session::MeasurementSession;
pub use stats::SuccessStatistics;
pub use supervisor::CircuitBuildSupervisor;
pub use timeline::BuildTimeline;

use crate::config::MeasurementConfig;
use crate::control::ControlClient;
use crate::results::{ResultsWriter, WriteReport};
use crate::store::{CandidateStore, ResultsStore};

/// Run one full measurement pipeline invocation and persist the results.
///
/// Equivalent to driving [`CircuitBuildSupervisor::run`] and handing the
/// finished session to [`ResultsWriter::persist`]. Infallible by design:
/// session failures are counted and the summary row is still attempted,
/// persistence failures are logged and skipped.
pub async fn run_and_persist<C, S, R>(
    client: &C,
    candidates: &S,
    results: &R,
    config: &MeasurementConfig,
) -> WriteReport
where
    C: ControlClient,
    S: CandidateStore,
    R: ResultsStore,
{
    let supervisor = CircuitBuildSupervisor::new(client, candidates, config);
    let session = supervisor.run().await;
    ResultsWriter::new(results).persist(&session).await
}
