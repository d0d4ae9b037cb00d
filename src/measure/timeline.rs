//! Circuit build timeline
//!
//! Derives build latency from lifecycle events. Each event carries the
//! circuit id and an epoch-ms timestamp, so latencies are matched per
//! circuit and concurrent or interleaved builds cannot corrupt each
//! other's timing.

use crate::control::CircuitEvent;
use std::collections::HashMap;

/// Accumulates lifecycle events and exposes per-circuit build latency.
#[derive(Debug, Default)]
pub struct BuildTimeline {
    launched_at: HashMap<u64, i64>,
    latencies: HashMap<u64, i64>,
}

impl BuildTimeline {
    /// Create an empty timeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one lifecycle event into the timeline.
    ///
    /// A `Built` event without a preceding `Launched` for the same
    /// circuit is dropped; latency stays unknown for that circuit.
    pub fn observe(&mut self, event: CircuitEvent) {
        match event {
            CircuitEvent::Launched { circuit_id, at_ms } => {
                self.launched_at.insert(circuit_id, at_ms);
            }
            CircuitEvent::Built { circuit_id, at_ms } => {
                if let Some(start) = self.launched_at.remove(&circuit_id) {
                    self.latencies.insert(circuit_id, at_ms - start);
                }
            }
        }
    }

    /// Build latency in milliseconds for a circuit, if both lifecycle
    /// events were observed.
    #[must_use]
    pub fn latency_for(&self, circuit_id: u64) -> Option<i64> {
        self.latencies.get(&circuit_id).copied()
    }

    /// Number of circuits with a derived latency.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.latencies.len()
    }
}
