//! Result persistence
//!
//! Turns a finished measurement session into rows: one per build-latency
//! sample, one per request-latency average, and exactly one failure
//! summary. Writes are best-effort — a rejected row is logged and skipped
//! so later rows, the summary included, still land. The summary is
//! written even when the session collected no samples at all.

use crate::measure::MeasurementSession;
use crate::relay::{Geography, Period, Strategy};
use crate::store::{ResultsStore, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One persisted build-latency sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSampleRow {
    /// Circuit build latency in milliseconds.
    pub latency_ms: i64,
    /// Strategy the session measured.
    pub strategy: Strategy,
    /// Geography tag.
    pub geography: Geography,
    /// Time-of-day tag.
    pub period: Period,
    /// When the row was written.
    pub recorded_at: DateTime<Utc>,
}

/// One persisted request-latency average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSampleRow {
    /// Mean request latency over one probe run, milliseconds.
    pub average_ms: f64,
    /// Strategy the session measured.
    pub strategy: Strategy,
    /// Geography tag.
    pub geography: Geography,
    /// Time-of-day tag.
    pub period: Period,
    /// When the row was written.
    pub recorded_at: DateTime<Utc>,
}

/// The per-session failure summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureSummaryRow {
    /// Strategy the session measured.
    pub strategy: Strategy,
    /// Geography tag.
    pub geography: Geography,
    /// Time-of-day tag.
    pub period: Period,
    /// Total build and session failures counted.
    pub failure_count: u64,
    /// Configured repetitions for the session.
    pub repetitions: u32,
    /// When the row was written.
    pub recorded_at: DateTime<Utc>,
}

/// What actually landed during one persistence pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Build-latency rows written.
    pub build_rows: usize,
    /// Request-latency rows written.
    pub request_rows: usize,
    /// Rows that were rejected and skipped.
    pub rows_lost: usize,
    /// Whether the failure summary landed.
    pub summary_written: bool,
}

/// Best-effort writer for session results.
#[derive(Debug)]
pub struct ResultsWriter<'a, R> {
    store: &'a R,
}

impl<'a, R: ResultsStore> ResultsWriter<'a, R> {
    /// Create a writer over a results store.
    #[must_use]
    pub const fn new(store: &'a R) -> Self {
        Self { store }
    }

    /// Persist all of a session's samples and its failure summary.
    ///
    /// Append-only: running this twice for the same session doubles the
    /// rows. Individual write failures are logged and skipped.
    pub async fn persist(&self, session: &MeasurementSession) -> WriteReport {
        let mut report = WriteReport::default();
        let strategy = session.strategy();
        let geography = session.geography().clone();
        let period = session.period();

        for &latency_ms in session.build_samples_ms() {
            let row = BuildSampleRow {
                latency_ms,
                strategy,
                geography: geography.clone(),
                period,
                recorded_at: Utc::now(),
            };
            if self.insert(Table::BuildSamples, &row).await {
                report.build_rows += 1;
            } else {
                report.rows_lost += 1;
            }
        }

        for &average_ms in session.request_samples_ms() {
            let row = RequestSampleRow {
                average_ms,
                strategy,
                geography: geography.clone(),
                period,
                recorded_at: Utc::now(),
            };
            if self.insert(Table::RequestSamples, &row).await {
                report.request_rows += 1;
            } else {
                report.rows_lost += 1;
            }
        }

        let summary = FailureSummaryRow {
            strategy,
            geography,
            period,
            failure_count: session.statistics().failures(),
            repetitions: session.repetitions(),
            recorded_at: Utc::now(),
        };
        report.summary_written = self.insert(Table::FailureSummary, &summary).await;
        if !report.summary_written {
            report.rows_lost += 1;
        }

        info!(
            build_rows = report.build_rows,
            request_rows = report.request_rows,
            rows_lost = report.rows_lost,
            "session results persisted"
        );
        report
    }

    async fn insert<T: Serialize>(&self, table: Table, row: &T) -> bool {
        let value = match serde_json::to_value(row) {
            Ok(value) => value,
            Err(err) => {
                warn!(table = table.name(), error = %err, "row serialization failed, skipping");
                return false;
            }
        };

        match self.store.insert(table, value).await {
            Ok(()) => true,
            Err(err) => {
                warn!(table = table.name(), error = %err, "row write failed, skipping");
                false
            }
        }
    }
}
