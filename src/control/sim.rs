//! Scripted in-process control client
//!
//! `SimClient` implements the control seam without a network: connects,
//! builds, and requests consume scripted plans, and lifecycle events use
//! a deterministic simulated clock. Tests and benches drive the full
//! pipeline through it; combined with tokio's paused clock the measured
//! latencies are exact.

use super::{Circuit, CircuitEvent, ControlClient, ControlSession, PathChoice};
use crate::{Error, Result};
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;

/// Scripted outcome of one circuit build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPlan {
    /// Build succeeds; lifecycle events are `latency_ms` apart.
    Succeed {
        /// Simulated build latency in milliseconds.
        latency_ms: i64,
    },
    /// Build succeeds but the client emits no lifecycle events.
    SucceedWithoutEvents,
    /// Build fails.
    Fail,
}

/// Scripted outcome of one request over a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPlan {
    /// Request succeeds after `delay_ms` of simulated transfer time.
    Succeed {
        /// Simulated request duration in milliseconds.
        delay_ms: u64,
    },
    /// Request fails with a transport error.
    Fail,
}

const DEFAULT_BUILD_LATENCY_MS: i64 = 250;
const DEFAULT_REQUEST_DELAY_MS: u64 = 20;

/// Clock step inserted between builds so event timestamps never collide.
const CLOCK_STEP_MS: i64 = 7;

#[derive(Debug)]
struct SimState {
    connect_failures: AtomicUsize,
    builds: Mutex<VecDeque<BuildPlan>>,
    requests: Mutex<VecDeque<RequestPlan>>,
    built_paths: Mutex<Vec<PathChoice>>,
    next_circuit_id: AtomicU64,
    circuits_closed: AtomicUsize,
    clock_ms: AtomicI64,
}

/// Deterministic scripted implementation of the control seam.
///
/// Unscripted operations fall back to defaults: builds succeed with a
/// fixed latency, requests succeed with a fixed delay. Scripted plans are
/// consumed in FIFO order across all sessions of the client.
#[derive(Debug, Clone)]
pub struct SimClient {
    state: Arc<SimState>,
}

impl Default for SimClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SimClient {
    /// Create a client whose operations all succeed with default timings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(SimState {
                connect_failures: AtomicUsize::new(0),
                builds: Mutex::new(VecDeque::new()),
                requests: Mutex::new(VecDeque::new()),
                built_paths: Mutex::new(Vec::new()),
                next_circuit_id: AtomicU64::new(1),
                circuits_closed: AtomicUsize::new(0),
                clock_ms: AtomicI64::new(Utc::now().timestamp_millis()),
            }),
        }
    }

    /// Make the next `count` connect attempts fail.
    pub fn fail_connects(&self, count: usize) {
        self.state.connect_failures.store(count, Ordering::SeqCst);
    }

    /// Queue scripted build outcomes, consumed in order.
    pub async fn script_builds<I: IntoIterator<Item = BuildPlan>>(&self, plans: I) {
        self.state.builds.lock().await.extend(plans);
    }

    /// Queue scripted request outcomes, consumed in order.
    pub async fn script_requests<I: IntoIterator<Item = RequestPlan>>(&self, plans: I) {
        self.state.requests.lock().await.extend(plans);
    }

    /// Number of circuits closed so far.
    #[must_use]
    pub fn circuits_closed(&self) -> usize {
        self.state.circuits_closed.load(Ordering::SeqCst)
    }

    /// Paths handed to `build_circuit` so far, in order.
    pub async fn built_paths(&self) -> Vec<PathChoice> {
        self.state.built_paths.lock().await.clone()
    }
}

impl ControlClient for SimClient {
    type Session = SimSession;

    async fn connect(&self) -> Result<SimSession> {
        let remaining = self.state.connect_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.state
                .connect_failures
                .store(remaining - 1, Ordering::SeqCst);
            return Err(Error::Connection("simulated connect refused".into()));
        }

        let (tx, rx) = unbounded_channel();
        Ok(SimSession {
            state: Arc::clone(&self.state),
            events_tx: tx,
            events_rx: Some(rx),
        })
    }
}

/// Session handle produced by [`SimClient::connect`].
#[derive(Debug)]
pub struct SimSession {
    state: Arc<SimState>,
    events_tx: UnboundedSender<CircuitEvent>,
    events_rx: Option<UnboundedReceiver<CircuitEvent>>,
}

impl ControlSession for SimSession {
    type Circuit = SimCircuit;

    fn events(&mut self) -> Result<UnboundedReceiver<CircuitEvent>> {
        self.events_rx
            .take()
            .ok_or_else(|| Error::Connection("event stream already taken".into()))
    }

    async fn build_circuit(&mut self, path: &PathChoice) -> Result<SimCircuit> {
        self.state.built_paths.lock().await.push(path.clone());

        let plan = self
            .state
            .builds
            .lock()
            .await
            .pop_front()
            .unwrap_or(BuildPlan::Succeed {
                latency_ms: DEFAULT_BUILD_LATENCY_MS,
            });

        match plan {
            BuildPlan::Fail => Err(Error::CircuitBuild("simulated build failure".into())),
            BuildPlan::SucceedWithoutEvents => Ok(self.new_circuit()),
            BuildPlan::Succeed { latency_ms } => {
                let circuit = self.new_circuit();
                let launched_at = self
                    .state
                    .clock_ms
                    .fetch_add(latency_ms + CLOCK_STEP_MS, Ordering::SeqCst);

                // rx may be gone if the supervisor dropped the stream
                let _ = self.events_tx.send(CircuitEvent::Launched {
                    circuit_id: circuit.id,
                    at_ms: launched_at,
                });
                let _ = self.events_tx.send(CircuitEvent::Built {
                    circuit_id: circuit.id,
                    at_ms: launched_at + latency_ms,
                });

                Ok(circuit)
            }
        }
    }
}

impl SimSession {
    fn new_circuit(&self) -> SimCircuit {
        SimCircuit {
            id: self.state.next_circuit_id.fetch_add(1, Ordering::SeqCst),
            state: Arc::clone(&self.state),
        }
    }
}

/// Circuit handle produced by [`SimSession::build_circuit`].
#[derive(Debug)]
pub struct SimCircuit {
    id: u64,
    state: Arc<SimState>,
}

impl Circuit for SimCircuit {
    fn id(&self) -> u64 {
        self.id
    }

    async fn fetch(&mut self, _endpoint: &str) -> Result<Vec<u8>> {
        let plan = self
            .state
            .requests
            .lock()
            .await
            .pop_front()
            .unwrap_or(RequestPlan::Succeed {
                delay_ms: DEFAULT_REQUEST_DELAY_MS,
            });

        match plan {
            RequestPlan::Fail => Err(Error::Request("simulated transport error".into())),
            RequestPlan::Succeed { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(vec![0u8; 500])
            }
        }
    }

    async fn close(self) -> Result<()> {
        self.state.circuits_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
