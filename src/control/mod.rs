//! Control-protocol client seam
//!
//! Circuit construction, stream handling, and event delivery belong to an
//! external onion-routing control-protocol client. Core code programs
//! against the three traits here: a [`ControlClient`] yields a fresh
//! [`ControlSession`] per connect, a session builds [`Circuit`]s and
//! surfaces lifecycle events, and a circuit carries requests until it is
//! closed.
//!
//! Lifecycle events are explicit messages carrying the circuit id and an
//! epoch-millisecond timestamp, so build latency is derived by matching
//! ids rather than by assuming strictly sequential construction.

mod sim;

pub use sim::{BuildPlan, RequestPlan, SimClient};

use crate::candidate::CandidateCircuit;
use crate::Result;
use std::future::Future;
use tokio::sync::mpsc::UnboundedReceiver;

/// Path selection handed to the control-protocol client for one build.
#[derive(Debug, Clone, PartialEq)]
pub enum PathChoice {
    /// Let the client choose the full path with its normal
    /// bandwidth-weighted guard-selection algorithm.
    Automatic,
    /// Build through an explicit pre-generated three-hop path, bypassing
    /// the client's own guard selection.
    Fixed(CandidateCircuit),
}

impl PathChoice {
    /// Whether path selection is delegated to the client.
    #[must_use]
    pub const fn is_automatic(&self) -> bool {
        matches!(self, Self::Automatic)
    }
}

/// Circuit lifecycle event emitted by the control-protocol client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitEvent {
    /// Construction of a circuit started.
    Launched {
        /// Client-assigned circuit identifier.
        circuit_id: u64,
        /// Epoch milliseconds when construction started.
        at_ms: i64,
    },
    /// A circuit reached the built state.
    Built {
        /// Client-assigned circuit identifier.
        circuit_id: u64,
        /// Epoch milliseconds when the circuit was established.
        at_ms: i64,
    },
}

impl CircuitEvent {
    /// The circuit this event belongs to.
    #[must_use]
    pub const fn circuit_id(&self) -> u64 {
        match self {
            Self::Launched { circuit_id, .. } | Self::Built { circuit_id, .. } => *circuit_id,
        }
    }
}

/// Connection factory for the control-protocol endpoint.
pub trait ControlClient: Send + Sync {
    /// Session type produced by a successful connect.
    type Session: ControlSession;

    /// Connect to the control endpoint and open a fresh session.
    fn connect(&self) -> impl Future<Output = Result<Self::Session>> + Send;
}

/// One open session against the control-protocol client.
pub trait ControlSession: Send {
    /// Circuit handle type produced by successful builds.
    type Circuit: Circuit;

    /// Take the session's circuit lifecycle event stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream was already taken for this session.
    fn events(&mut self) -> Result<UnboundedReceiver<CircuitEvent>>;

    /// Ask the client to build a circuit along `path`.
    ///
    /// Resolves once the circuit is established; build failures and
    /// timeouts surface as [`crate::Error::CircuitBuild`].
    fn build_circuit(
        &mut self,
        path: &PathChoice,
    ) -> impl Future<Output = Result<Self::Circuit>> + Send;
}

/// An established circuit, exclusively owned by the current repetition.
pub trait Circuit: Send {
    /// Client-assigned identifier, matching lifecycle event ids.
    fn id(&self) -> u64;

    /// Issue one request over the circuit and return the response body.
    fn fetch(&mut self, endpoint: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Tear the circuit down.
    fn close(self) -> impl Future<Output = Result<()>> + Send
    where
        Self: Sized;
}
