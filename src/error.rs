//! Error types for hopwatch
//!
//! The taxonomy mirrors the pipeline's retry layers: connection errors are
//! retried at the session level, circuit-build errors at the repetition
//! level, and persistence errors are logged and swallowed.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Hopwatch error types
#[derive(Error, Debug)]
pub enum Error {
    /// Control-protocol endpoint unreachable; retried up to the session
    /// attempt limit
    #[error("control connection failed: {0}")]
    Connection(String),

    /// Circuit construction failed or timed out
    #[error("circuit build failed: {0}")]
    CircuitBuild(String),

    /// The bounded build-retry budget for one repetition ran out
    #[error("circuit build still failing after {attempts} attempts")]
    BuildRetriesExhausted {
        /// Build attempts made before giving up
        attempts: u32,
    },

    /// A fixed strategy has no stored candidate circuits for the requested
    /// strategy/geography pair
    #[error("no candidate circuit for strategy {strategy} in {geography}")]
    NoCandidate {
        /// Strategy the selector was asked for
        strategy: String,
        /// Geography code the selector was asked for
        geography: String,
    },

    /// A probe request over the circuit failed; the probe aborts without
    /// an average
    #[error("request over circuit failed: {0}")]
    Request(String),

    /// A store write failed; callers log and continue (best-effort
    /// persistence)
    #[error("persistence failed: {0}")]
    Persistence(String),

    /// Configuration rejected during validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Row serialization error
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error should be retried within the same repetition
    /// (build-level) rather than aborting the session attempt.
    ///
    /// `NoCandidate` counts as a build failure here: an empty candidate
    /// store must never silently degrade into automatic path selection.
    #[must_use]
    pub const fn is_build_failure(&self) -> bool {
        matches!(self, Self::CircuitBuild(_) | Self::NoCandidate { .. })
    }
}
