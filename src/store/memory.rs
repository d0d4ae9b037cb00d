//! In-memory store implementation using `DashMap`.
//!
//! The in-process backend behind both store traits — data is lost on
//! process restart. The production deployment points the pipeline at an
//! external SQL store instead; this backend exists for tests, benches,
//! and dry runs.

use super::{CandidateStore, ResultsStore, Table};
use crate::candidate::CandidateCircuit;
use crate::relay::{Geography, Strategy};
use crate::Result;
use dashmap::DashMap;

fn batch_key(strategy: Strategy, geography: &Geography) -> String {
    format!("{}/{}", strategy.as_str(), geography.as_str())
}

/// In-memory candidate and results store.
///
/// Candidates are bucketed by (strategy, geography) for O(1) batch
/// lookup; result rows accumulate per table in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    candidates: DashMap<String, Vec<CandidateCircuit>>,
    rows: DashMap<&'static str, Vec<serde_json::Value>>,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored candidates across all batches.
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.candidates.iter().map(|entry| entry.value().len()).sum()
    }

    /// Number of rows written to a result table.
    #[must_use]
    pub fn row_count(&self, table: Table) -> usize {
        self.rows.get(table.name()).map_or(0, |rows| rows.len())
    }

    /// Snapshot of the rows written to a result table, in insertion order.
    #[must_use]
    pub fn rows(&self, table: Table) -> Vec<serde_json::Value> {
        self.rows
            .get(table.name())
            .map(|rows| rows.clone())
            .unwrap_or_default()
    }

    /// Whether the store holds no candidates and no result rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty() && self.rows.is_empty()
    }

    /// Drop all candidates and result rows.
    pub fn clear(&self) {
        self.candidates.clear();
        self.rows.clear();
    }
}

impl CandidateStore for MemoryStore {
    async fn append(&self, candidates: &[CandidateCircuit]) -> Result<()> {
        for candidate in candidates {
            let key = batch_key(candidate.strategy(), candidate.geography());
            self.candidates.entry(key).or_default().push(candidate.clone());
        }
        Ok(())
    }

    async fn candidates_for(
        &self,
        strategy: Strategy,
        geography: &Geography,
    ) -> Result<Vec<CandidateCircuit>> {
        Ok(self
            .candidates
            .get(&batch_key(strategy, geography))
            .map(|batch| batch.clone())
            .unwrap_or_default())
    }

    async fn replace(&self, candidates: &[CandidateCircuit]) -> Result<()> {
        self.candidates.clear();
        self.append(candidates).await
    }
}

impl ResultsStore for MemoryStore {
    async fn insert(&self, table: Table, row: serde_json::Value) -> Result<()> {
        self.rows.entry(table.name()).or_default().push(row);
        Ok(())
    }
}
