//! # Hopwatch: Anonymity-Circuit Measurement Pipeline
//!
//! Hopwatch measures how long it takes to build circuits through an
//! onion-routing network and how fast sequential requests over those
//! circuits complete, per relay-selection strategy (bandwidth-weighted or
//! geographically fixed), geography, and time-of-day period.
//!
//! Two halves make up the pipeline:
//!
//! - **Candidate generation** ([`candidate`]): ahead of measurement runs,
//!   a bounded batch of three-hop paths is generated from role-sliced,
//!   above-average-bandwidth relay populations and persisted through the
//!   candidate store.
//! - **Measurement** ([`measure`]): at measurement time, a supervisor
//!   drives bounded session attempts; each repetition selects a path,
//!   builds and times a circuit, probes request latency over it, and
//!   closes it. Results are persisted best-effort, summary row included,
//!   even when everything failed.
//!
//! Circuit construction itself, consensus parsing, the SQL store, and the
//! CLI surface are external collaborators behind traits.
//!
//! ## Example
//!
//! ```rust
//! use hopwatch::config::MeasurementConfig;
//! use hopwatch::control::SimClient;
//! use hopwatch::measure::run_and_persist;
//! use hopwatch::relay::{Geography, Period, Strategy};
//! use hopwatch::store::MemoryStore;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> hopwatch::Result<()> {
//! let config = MeasurementConfig::builder(
//!     Strategy::Weighted,
//!     Geography::unrestricted(),
//!     Period::Day,
//! )
//! .repetitions(3)
//! .probe_requests(5)
//! .build()?;
//!
//! let client = SimClient::new();
//! let store = MemoryStore::new();
//!
//! let report = run_and_persist(&client, &store, &store, &config).await;
//! assert_eq!(report.build_rows, 3);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod candidate;
pub mod config;
pub mod control;
pub mod error;
pub mod measure;
pub mod relay;
pub mod results;
pub mod selector;
pub mod store;

pub use error::{Error, Result};
