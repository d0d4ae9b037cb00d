//! Candidate circuit generation and refresh
//!
//! A candidate is a pre-generated three-hop path tagged with the strategy
//! and geography it was generated under. Candidates are produced in batch
//! ahead of measurement runs, persisted through the candidate store, and
//! drawn uniformly at random by the selector whenever a fixed strategy is
//! measured.
//!
//! ```rust
//! use hopwatch::candidate::{CandidateGenerator, GenerationCap};
//! use hopwatch::relay::{Geography, RelayRecord, RelayRole, Strategy};
//!
//! let guards: Vec<_> = (0..5)
//!     .map(|i| RelayRecord::new(format!("G{i}"), RelayRole::Guard, true))
//!     .collect();
//! let middles: Vec<_> = (0..5)
//!     .map(|i| RelayRecord::new(format!("M{i}"), RelayRole::Middle, true))
//!     .collect();
//! let exits: Vec<_> = (0..2)
//!     .map(|i| RelayRecord::new(format!("E{i}"), RelayRole::Exit, true))
//!     .collect();
//!
//! let generator = CandidateGenerator::with_cap(GenerationCap::Global(1000));
//! let batch = generator.generate(
//!     Strategy::Continent,
//!     &Geography::new("EU"),
//!     &guards,
//!     &middles,
//!     &exits,
//! );
//! assert_eq!(batch.len(), 6);
//! ```

mod circuit;
mod generator;
mod plan;

pub use circuit::CandidateCircuit;
pub use generator::{CandidateGenerator, GenerationCap, DEFAULT_CIRCUIT_LIMIT};
pub use plan::{regenerate, standard_batches, CONTINENT_CODES, COUNTRY_CODES};
