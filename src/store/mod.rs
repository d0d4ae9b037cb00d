//! Persistence seams for candidates and measurement results
//!
//! The real datastore and its query engine live outside this crate; core
//! code only sees two narrow async traits. Result rows travel through a
//! parameterized `insert(table, row)` interface — core never assembles
//! query text.
//!
//! # Example
//!
//! ```rust
//! use hopwatch::store::{CandidateStore, MemoryStore};
//! use hopwatch::candidate::CandidateCircuit;
//! use hopwatch::relay::{Geography, Strategy};
//!
//! # async fn example() -> hopwatch::Result<()> {
//! let store = MemoryStore::new();
//! let circuit = CandidateCircuit::new(
//!     "G", "M", "E", Strategy::Continent, Geography::new("EU"),
//! );
//! store.append(&[circuit]).await?;
//!
//! let found = store
//!     .candidates_for(Strategy::Continent, &Geography::new("EU"))
//!     .await?;
//! assert_eq!(found.len(), 1);
//! # Ok(())
//! # }
//! ```

mod memory;

pub use memory::MemoryStore;

use crate::candidate::CandidateCircuit;
use crate::relay::{Geography, Strategy};
use crate::Result;
use std::future::Future;

/// Result tables the pipeline writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// One row per successful circuit build (latency sample).
    BuildSamples,
    /// One row per completed request probe (average latency sample).
    RequestSamples,
    /// Exactly one row per session (failure count and repetitions).
    FailureSummary,
}

impl Table {
    /// Stable table name used by store backends.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BuildSamples => "circuit_statistics",
            Self::RequestSamples => "request_statistics",
            Self::FailureSummary => "circuit_failures",
        }
    }
}

/// Read/write access to persisted candidate circuits.
pub trait CandidateStore: Send + Sync {
    /// Append a batch of candidates.
    fn append(
        &self,
        candidates: &[CandidateCircuit],
    ) -> impl Future<Output = Result<()>> + Send;

    /// All candidates matching a (strategy, geography) pair.
    fn candidates_for(
        &self,
        strategy: Strategy,
        geography: &Geography,
    ) -> impl Future<Output = Result<Vec<CandidateCircuit>>> + Send;

    /// Destructively replace the full candidate set.
    ///
    /// Population refresh truncates and rewrites; candidates from earlier
    /// generations do not survive.
    fn replace(
        &self,
        candidates: &[CandidateCircuit],
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Append-only sink for measurement result rows.
///
/// Rows are serialized records; the backend decides how `table` maps onto
/// actual storage. Implementations must append, never upsert: re-running
/// persistence for the same session produces additional rows.
pub trait ResultsStore: Send + Sync {
    /// Insert one row into `table`.
    fn insert(
        &self,
        table: Table,
        row: serde_json::Value,
    ) -> impl Future<Output = Result<()>> + Send;
}
