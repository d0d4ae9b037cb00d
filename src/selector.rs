//! Measurement-time path selection
//!
//! The weighted strategy delegates path choice to the control-protocol
//! client. Fixed strategies draw one pre-generated candidate uniformly at
//! random from the persisted batch for the requested strategy/geography;
//! an empty batch is an explicit error, never a silent fall-back to
//! automatic selection.

use crate::control::PathChoice;
use crate::relay::{Geography, Strategy};
use crate::store::CandidateStore;
use crate::{Error, Result};
use rand::seq::SliceRandom;

/// Chooses the path for one circuit build.
#[derive(Debug)]
pub struct RelaySelector<'a, S> {
    store: &'a S,
}

impl<'a, S: CandidateStore> RelaySelector<'a, S> {
    /// Create a selector over a candidate store.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Select a path for the given strategy and geography.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoCandidate`] when a fixed strategy has no stored
    /// candidates for the pair, or a store error when the lookup fails.
    pub async fn select(&self, strategy: Strategy, geography: &Geography) -> Result<PathChoice> {
        if strategy.is_automatic() {
            return Ok(PathChoice::Automatic);
        }

        let candidates = self.store.candidates_for(strategy, geography).await?;
        let chosen = candidates
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| Error::NoCandidate {
                strategy: strategy.as_str().to_string(),
                geography: geography.as_str().to_string(),
            })?;

        Ok(PathChoice::Fixed(chosen))
    }
}
