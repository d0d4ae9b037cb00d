//! Candidate circuit record

use crate::relay::{Geography, Strategy};
use serde::{Deserialize, Serialize};

/// A pre-generated three-hop path, tagged with the strategy and geography
/// it was generated under.
///
/// Immutable once created. Candidates are produced in batch by the
/// generator, persisted, and drawn at random by the selector at
/// measurement time; they outlive many measurement sessions.
///
/// The three fingerprints come from disjoint role slices of the
/// population, but distinctness across slices is not enforced: a relay
/// listed under two roles can appear twice in one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCircuit {
    guard_fp: String,
    middle_fp: String,
    exit_fp: String,
    strategy: Strategy,
    geography: Geography,
}

impl CandidateCircuit {
    /// Create a candidate circuit.
    #[must_use]
    pub fn new(
        guard_fp: impl Into<String>,
        middle_fp: impl Into<String>,
        exit_fp: impl Into<String>,
        strategy: Strategy,
        geography: Geography,
    ) -> Self {
        Self {
            guard_fp: guard_fp.into(),
            middle_fp: middle_fp.into(),
            exit_fp: exit_fp.into(),
            strategy,
            geography,
        }
    }

    /// Get the guard fingerprint (first hop).
    #[must_use]
    pub fn guard_fp(&self) -> &str {
        &self.guard_fp
    }

    /// Get the middle fingerprint (second hop).
    #[must_use]
    pub fn middle_fp(&self) -> &str {
        &self.middle_fp
    }

    /// Get the exit fingerprint (final hop).
    #[must_use]
    pub fn exit_fp(&self) -> &str {
        &self.exit_fp
    }

    /// Get the strategy this candidate was generated under.
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Get the geography this candidate was generated under.
    #[must_use]
    pub const fn geography(&self) -> &Geography {
        &self.geography
    }

    /// The path as an ordered guard/middle/exit triple.
    #[must_use]
    pub fn hops(&self) -> [&str; 3] {
        [&self.guard_fp, &self.middle_fp, &self.exit_fp]
    }
}
